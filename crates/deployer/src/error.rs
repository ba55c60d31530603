use {
    alloy::{
        primitives::B256,
        transports::TransportError,
    },
    ethrpc::alloy::errors::RpcErrorExt,
    std::{path::PathBuf, time::Duration},
};

/// Reasons a deployment run aborts. Every variant is fatal; nothing is
/// retried and nothing that already happened on chain is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("compilation error: {0}")]
    Compilation(#[source] solc::Error),
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("{context} rejected by node: {message}")]
    NetworkRejection { context: String, message: String },
    #[error("transaction {hash} not confirmed within {timeout:?}")]
    ConfirmationTimeout { hash: B256, timeout: Duration },
    #[error("cancelled")]
    Cancelled,
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Contract(solc::Error),
    #[error("function {0:?} not found in ABI")]
    Function(String),
    #[error("invalid arguments for {target}: {reason}")]
    Arguments { target: String, reason: String },
    #[error("could not decode output of {function}: {reason}")]
    Output { function: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Provider(#[from] ethrpc::alloy::ProviderError),
    #[error("{context}: {source}")]
    Rpc {
        context: String,
        #[source]
        source: TransportError,
    },
    #[error("node is on chain {actual} but chain {expected} is configured")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("no private key configured")]
    MissingKey,
    #[error("private key is malformed")]
    MalformedKey,
    #[error("configured sender {configured} does not match the key's address {derived}")]
    SenderMismatch {
        configured: alloy::primitives::Address,
        derived: alloy::primitives::Address,
    },
    #[error("failed to sign transaction: {0}")]
    Sign(String),
}

impl Error {
    /// Classifies a failed RPC request issued while doing `context`.
    pub fn rpc(context: impl Into<String>, err: TransportError) -> Self {
        let context = context.into();
        if err.is_node_rejection() {
            let message = err.node_message().unwrap_or_default().to_string();
            return Self::NetworkRejection { context, message };
        }
        ConnectionError::Rpc {
            context,
            source: err,
        }
        .into()
    }

    /// Short name of the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Compilation(_) => "compilation",
            Self::Lookup(_) => "lookup",
            Self::Connection(_) => "connection",
            Self::Signing(_) => "signing",
            Self::NetworkRejection { .. } => "network_rejection",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Cancelled => "cancelled",
            Self::Io { .. } => "io",
        }
    }
}

impl From<solc::Error> for Error {
    fn from(err: solc::Error) -> Self {
        match err {
            solc::Error::Persist { path, source } => Self::Io { path, source },
            err if err.is_lookup() => LookupError::Contract(err).into(),
            err => Self::Compilation(err),
        }
    }
}
