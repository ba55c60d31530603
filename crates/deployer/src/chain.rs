//! The node as seen by the deployment driver.
//!
//! Only the handful of JSON-RPC methods a deployment needs are exposed, which
//! keeps the driver testable against a mock.

use {
    alloy::{
        network::ReceiptResponse,
        primitives::{Address, B256, Bytes},
        providers::Provider,
        rpc::types::TransactionRequest,
        transports::TransportError,
    },
    ethrpc::AlloyProvider,
};

/// Confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    /// Whether execution succeeded. A reverted transaction is still mined and
    /// still consumes its nonce.
    pub success: bool,
    /// Address of the created contract for contract creation transactions.
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> Result<u64, TransportError>;

    /// `eth_getTransactionCount` on the pending block, so transactions that
    /// are known to the node but not yet mined are counted.
    async fn transaction_count(&self, address: Address) -> Result<u64, TransportError>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> Result<u128, TransportError>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, TransportError>;

    /// `eth_call` on the latest block.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, TransportError>;

    /// `eth_sendRawTransaction`, returns the hash the node reports.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, TransportError>;

    /// `eth_getTransactionReceipt`, `None` while the transaction is pending.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>, TransportError>;
}

/// [`Chain`] backed by an RPC provider.
#[derive(Clone)]
pub struct AlloyChain(AlloyProvider);

impl AlloyChain {
    pub fn new(provider: AlloyProvider) -> Self {
        Self(provider)
    }
}

#[async_trait::async_trait]
impl Chain for AlloyChain {
    async fn chain_id(&self) -> Result<u64, TransportError> {
        self.0.get_chain_id().await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, TransportError> {
        self.0.get_transaction_count(address).pending().await
    }

    async fn gas_price(&self) -> Result<u128, TransportError> {
        self.0.get_gas_price().await
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, TransportError> {
        self.0.estimate_gas(tx).await
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, TransportError> {
        self.0.call(tx).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, TransportError> {
        let pending = self.0.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>, TransportError> {
        let receipt = self.0.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| Receipt {
            transaction_hash: receipt.transaction_hash(),
            success: receipt.status(),
            contract_address: receipt.contract_address(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        }))
    }
}
