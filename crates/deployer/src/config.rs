use {
    crate::confirmation::Polling,
    std::path::PathBuf,
};

/// Where the contract comes from and how it is compiled.
#[derive(Debug, Clone)]
pub struct Compiler {
    /// The `solc` binary.
    pub solc: PathBuf,
    /// Compiler version the binary has to report, if any.
    pub version: Option<String>,
    pub optimizer_runs: Option<u32>,
    pub contract_path: PathBuf,
    pub contract_name: String,
    /// Where the full compiler output gets written.
    pub artifact_path: PathBuf,
}

/// What gets sent to the chain and how long to wait for it.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Chain the node has to be on. Checked before anything is signed.
    pub chain_id: Option<u64>,
    pub constructor_args: Vec<String>,
    /// Read-only function called after deployment and after the update.
    pub read_function: String,
    /// State changing function called once after deployment.
    pub update_function: String,
    pub update_args: Vec<String>,
    /// Overrides the node's gas price, in wei.
    pub gas_price: Option<u128>,
    /// Overrides gas estimation.
    pub gas_limit: Option<u64>,
    pub polling: Polling,
}

impl Default for Driver {
    fn default() -> Self {
        Self {
            chain_id: None,
            constructor_args: Vec::new(),
            read_function: "retrieve".to_string(),
            update_function: "store".to_string(),
            update_args: vec!["81".to_string()],
            gas_price: None,
            gas_limit: None,
            polling: Polling::default(),
        }
    }
}
