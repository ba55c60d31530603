use {
    crate::{
        Error,
        account::Account,
        chain::{Chain, Receipt},
        config,
        confirmation,
        contract::{self, Call},
        error::ConnectionError,
        nonce::NonceAllocator,
        observe,
        report::Report,
    },
    alloy::{
        network::TransactionBuilder,
        primitives::{Address, Bytes, TxKind},
        rpc::types::TransactionRequest,
    },
    solc::CompiledContract,
    tokio::time::Instant,
    tokio_util::sync::CancellationToken,
};

/// Deploys a compiled contract and exercises it once: read, update, read
/// again. Every step waits for the previous one; the first failure aborts
/// the run.
pub struct Driver<C> {
    chain: C,
    config: config::Driver,
    account: Account,
    nonces: NonceAllocator,
    cancel: CancellationToken,
}

impl<C: Chain> Driver<C> {
    pub fn new(
        chain: C,
        config: config::Driver,
        account: Account,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            chain,
            config,
            account,
            nonces: NonceAllocator::default(),
            cancel,
        }
    }

    pub async fn run(&mut self, contract: &CompiledContract) -> Result<Report, Error> {
        // ABI problems surface before anything is sent.
        let deploy_code = contract::deploy_code(contract, &self.config.constructor_args)?;
        let read = Call::new(&contract.abi, &self.config.read_function, &[])?;
        let update = Call::new(
            &contract.abi,
            &self.config.update_function,
            &self.config.update_args,
        )?;

        let chain_id = self.connect().await?;

        let deployment = self
            .transact(chain_id, "deployment", TxKind::Create, deploy_code)
            .await?;
        let contract_address =
            deployment
                .contract_address
                .ok_or_else(|| Error::NetworkRejection {
                    context: "deployment".to_string(),
                    message: "receipt carries no contract address".to_string(),
                })?;
        observe::deployed(contract_address, deployment.transaction_hash);

        let initial_value = self.read(contract_address, &read).await?;
        let update_receipt = self
            .transact(
                chain_id,
                "update",
                TxKind::Call(contract_address),
                update.calldata,
            )
            .await?;
        let updated_value = self.read(contract_address, &read).await?;

        Ok(Report {
            contract_address,
            deployment_transaction: deployment.transaction_hash,
            initial_value,
            update_transaction: update_receipt.transaction_hash,
            updated_value,
        })
    }

    async fn connect(&self) -> Result<u64, Error> {
        let actual = self
            .chain
            .chain_id()
            .await
            .map_err(|source| ConnectionError::Rpc {
                context: "chain id query".to_string(),
                source,
            })?;
        if let Some(expected) = self.config.chain_id {
            if expected != actual {
                return Err(ConnectionError::ChainIdMismatch { expected, actual }.into());
            }
        }
        observe::connected(actual);
        Ok(actual)
    }

    async fn transact(
        &mut self,
        chain_id: u64,
        kind: &'static str,
        to: TxKind,
        input: Bytes,
    ) -> Result<Receipt, Error> {
        let result = self.try_transact(chain_id, kind, to, input).await;
        observe::transaction(kind, &result);
        result
    }

    async fn try_transact(
        &mut self,
        chain_id: u64,
        kind: &'static str,
        to: TxKind,
        input: Bytes,
    ) -> Result<Receipt, Error> {
        self.ensure_not_cancelled()?;
        let sender = self.account.address();
        let pending = self
            .chain
            .transaction_count(sender)
            .await
            .map_err(|err| Error::rpc("nonce query", err))?;
        let nonce = self.nonces.allocate(pending);
        let gas_price = match self.config.gas_price {
            Some(gas_price) => gas_price,
            None => self
                .chain
                .gas_price()
                .await
                .map_err(|err| Error::rpc("gas price query", err))?,
        };
        let request = TransactionRequest::default()
            .with_from(sender)
            .with_chain_id(chain_id)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_kind(to)
            .with_input(input);
        let gas_limit = match self.config.gas_limit {
            Some(gas_limit) => gas_limit,
            None => self
                .chain
                .estimate_gas(request.clone())
                .await
                .map_err(|err| Error::rpc(format!("{kind} gas estimation"), err))?,
        };

        // The node queries above may take a while. Nothing was broadcast yet,
        // so a shutdown request still stops the transaction here.
        self.ensure_not_cancelled()?;
        let signed = self.account.sign(request.with_gas_limit(gas_limit)).await?;
        observe::submitting(kind, signed.hash, nonce, gas_price, gas_limit);
        let hash = self
            .chain
            .send_raw_transaction(signed.raw)
            .await
            .map_err(|err| Error::rpc(kind, err))?;

        let start = Instant::now();
        let receipt =
            confirmation::await_receipt(&self.chain, hash, &self.config.polling, &self.cancel)
                .await?;
        observe::confirmed(kind, &receipt, start.elapsed());
        if !receipt.success {
            return Err(Error::NetworkRejection {
                context: kind.to_string(),
                message: format!("transaction {hash} reverted"),
            });
        }
        Ok(receipt)
    }

    fn ensure_not_cancelled(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    async fn read(&self, address: Address, call: &Call) -> Result<String, Error> {
        let request = TransactionRequest::default()
            .with_from(self.account.address())
            .with_to(address)
            .with_input(call.calldata.clone());
        let data = self
            .chain
            .call(request)
            .await
            .map_err(|err| Error::rpc(format!("{} call", call.signature()), err))?;
        let value = contract::display(&call.decode(&data)?);
        observe::read(&call.signature(), &value);
        Ok(value)
    }
}
