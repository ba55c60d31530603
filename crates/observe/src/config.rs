use tracing::Level;

/// How log output is filtered, formatted and split between stdout and
/// stderr.
#[derive(Debug, Clone)]
pub struct Config {
    /// `tracing_subscriber::EnvFilter` directives, e.g.
    /// `warn,deployer=debug`.
    pub(crate) env_filter: String,
    /// Events at this level or more severe go to stderr, everything else to
    /// stdout. Defaults to `ERROR`.
    pub(crate) stderr_threshold: Option<Level>,
    /// One JSON object per event instead of human readable lines.
    pub(crate) use_json_format: bool,
}

impl Config {
    pub fn new(env_filter: &str, stderr_threshold: Option<Level>, use_json_format: bool) -> Self {
        Self {
            env_filter: env_filter.into(),
            stderr_threshold,
            use_json_format,
        }
    }

    pub fn with_env_filter(mut self, env_filter: &str) -> Self {
        self.env_filter = env_filter.to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("info", None, false)
    }
}
