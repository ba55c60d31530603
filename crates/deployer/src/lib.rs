//! One-shot deployment of a Solidity contract to a local development node.
//!
//! A run compiles the contract with `solc`, persists the compiler output,
//! deploys the contract with a locally signed transaction, reads its state,
//! updates it with a second transaction and reads it again.

pub mod account;
pub mod arguments;
pub mod chain;
pub mod compile;
pub mod config;
pub mod confirmation;
pub mod contract;
pub mod driver;
pub mod error;
pub mod nonce;
mod observe;
pub mod report;
mod run;

pub use {
    error::Error,
    run::{run, start},
};
