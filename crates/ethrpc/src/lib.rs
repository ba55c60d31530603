pub mod alloy;

use {
    ::alloy::providers::DynProvider,
    std::time::Duration,
};

pub type AlloyProvider = DynProvider;

#[derive(Debug, Clone)]
pub struct Config {
    /// Label attached to every request issued through the provider. Shows up
    /// in logs and in the `component` label of the RPC metrics.
    pub label: String,

    /// Upper bound for a single HTTP round trip to the node.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: "main".into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}
