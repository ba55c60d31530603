//! This crate is intended to contain code that is required to provide or
//! improve the observability of the deployment tooling. That includes
//! initialization logic for metrics and logging as well as the panic hook.
pub mod config;
pub mod metrics;
pub mod panic_hook;
pub mod tracing;

pub use config::Config;
