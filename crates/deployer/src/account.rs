use {
    crate::error::SigningError,
    alloy::{
        eips::eip2718::Encodable2718,
        network::{EthereumWallet, TransactionBuilder},
        primitives::{Address, B256, Bytes},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    std::{fmt, str::FromStr},
};

/// Hex encoded secp256k1 private key. Never shows up in logs.
#[derive(Clone)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl FromStr for PrivateKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SECRET")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SECRET")
    }
}

/// The account deployment transactions are sent from.
#[derive(Debug, Clone)]
pub struct Account {
    address: Address,
    signer: Option<PrivateKeySigner>,
}

/// A signed transaction ready to be broadcast.
#[derive(Debug, Clone)]
pub struct Signed {
    pub hash: B256,
    pub raw: Bytes,
}

impl Account {
    /// Resolves the sending account from the configured sender and key.
    ///
    /// The sender defaults to the key's address. An explicit sender without a
    /// key is accepted so the run can proceed up to the first signature,
    /// which then fails with [`SigningError::MissingKey`].
    pub fn new(sender: Option<Address>, key: Option<&PrivateKey>) -> Result<Self, SigningError> {
        let key = key.map(|key| key.0.trim()).filter(|key| !key.is_empty());
        let signer = key
            .map(|key| PrivateKeySigner::from_str(key).map_err(|_| SigningError::MalformedKey))
            .transpose()?;

        let address = match (sender, &signer) {
            (Some(configured), Some(signer)) if configured != signer.address() => {
                return Err(SigningError::SenderMismatch {
                    configured,
                    derived: signer.address(),
                });
            }
            (_, Some(signer)) => signer.address(),
            (Some(configured), None) => configured,
            (None, None) => return Err(SigningError::MissingKey),
        };
        Ok(Self { address, signer })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a fully populated transaction request.
    pub async fn sign(&self, request: TransactionRequest) -> Result<Signed, SigningError> {
        let signer = self.signer.clone().ok_or(SigningError::MissingKey)?;
        let wallet = EthereumWallet::from(signer);
        let envelope = request
            .with_from(self.address)
            .build(&wallet)
            .await
            .map_err(|err| SigningError::Sign(err.to_string()))?;
        Ok(Signed {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}
