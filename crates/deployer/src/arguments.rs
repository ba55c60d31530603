use {
    crate::{account::PrivateKey, config, confirmation::Polling},
    alloy::primitives::Address,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
        time::Duration,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://127.0.0.1:7545")]
    pub node_url: Url,

    /// Chain id the node has to report. Guards against deploying to the
    /// wrong network.
    #[clap(long, env, default_value = "1337")]
    pub chain_id: u64,

    /// Address transactions are sent from. Defaults to the address of the
    /// private key.
    #[clap(long, env)]
    pub sender_address: Option<Address>,

    /// Hex encoded private key of the sender.
    #[clap(long, env, hide_env_values = true)]
    pub private_key: Option<PrivateKey>,

    /// Path of the `solc` binary.
    #[clap(long, env, default_value = "solc")]
    pub solc: PathBuf,

    /// Compiler version `solc --version` has to report, e.g. `0.8.0`.
    #[clap(long, env)]
    pub solc_version: Option<String>,

    /// Enables the optimizer with the given number of runs.
    #[clap(long, env)]
    pub optimizer_runs: Option<u32>,

    /// Solidity source file to compile.
    #[clap(long, env, default_value = "SimpleStorage.sol")]
    pub contract_path: PathBuf,

    /// Name of the contract within the source file to deploy.
    #[clap(long, env, default_value = "SimpleStorage")]
    pub contract_name: String,

    /// Where to write the full compiler output.
    #[clap(long, env, default_value = "compiled_code.json")]
    pub artifact_path: PathBuf,

    /// Constructor arguments in the following format: `<ARG>,<ARG>`. An
    /// empty value means no arguments.
    #[clap(long, env, value_delimiter = ',')]
    pub constructor_args: Vec<String>,

    /// Read-only function called after deployment and after the update.
    #[clap(long, env, default_value = "retrieve")]
    pub read_function: String,

    /// State changing function called after deployment.
    #[clap(long, env, default_value = "store")]
    pub update_function: String,

    /// Arguments of the update function in the following format:
    /// `<ARG>,<ARG>`. An empty value means no arguments.
    #[clap(long, env, default_value = "81", value_delimiter = ',')]
    pub update_args: Vec<String>,

    /// Gas price in wei. Uses the node's gas price if unset.
    #[clap(long, env)]
    pub gas_price: Option<u128>,

    /// Gas limit of every transaction. Estimated by the node if unset.
    #[clap(long, env)]
    pub gas_limit: Option<u64>,

    /// How long to wait for a transaction to be mined.
    #[clap(long, env, default_value = "60s", value_parser = nonzero_duration)]
    pub confirmation_timeout: Duration,

    /// Delay between the first two receipt queries. Doubles after every
    /// query.
    #[clap(long, env, default_value = "500ms", value_parser = nonzero_duration)]
    pub poll_interval: Duration,

    /// Upper bound for the delay between two receipt queries.
    #[clap(long, env, default_value = "5s", value_parser = nonzero_duration)]
    pub max_poll_interval: Duration,

    /// Upper bound for a single request to the node.
    #[clap(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
    pub request_timeout: Duration,

    /// Write a JSON summary of the deployment to this file.
    #[clap(long, env)]
    pub report_path: Option<PathBuf>,

    /// Write metrics in the prometheus text format to this file at the end
    /// of the run.
    #[clap(long, env)]
    pub metrics_path: Option<PathBuf>,
}

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,deployer=debug,solc=debug,ethrpc=debug")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,
}

impl Arguments {
    pub fn compiler(&self) -> config::Compiler {
        config::Compiler {
            solc: self.solc.clone(),
            version: self.solc_version.clone(),
            optimizer_runs: self.optimizer_runs,
            contract_path: self.contract_path.clone(),
            contract_name: self.contract_name.clone(),
            artifact_path: self.artifact_path.clone(),
        }
    }

    pub fn driver(&self) -> config::Driver {
        config::Driver {
            chain_id: Some(self.chain_id),
            constructor_args: argument_list(&self.constructor_args),
            read_function: self.read_function.clone(),
            update_function: self.update_function.clone(),
            update_args: argument_list(&self.update_args),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            polling: Polling {
                interval: self.poll_interval,
                max_interval: self.max_poll_interval,
                timeout: self.confirmation_timeout,
            },
        }
    }
}

/// `--update-args ""` parses as a single empty argument, which callers mean
/// as "no arguments".
fn argument_list(values: &[String]) -> Vec<String> {
    match values {
        [only] if only.is_empty() => Vec::new(),
        _ => values.to_vec(),
    }
}

fn nonzero_duration(s: &str) -> Result<Duration, String> {
    match humantime::parse_duration(s) {
        Ok(Duration::ZERO) => Err("duration must be greater than zero".to_string()),
        Ok(duration) => Ok(duration),
        Err(err) => Err(err.to_string()),
    }
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: &Option<T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            use_json_logs,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            node_url,
            chain_id,
            sender_address,
            private_key,
            solc,
            solc_version,
            optimizer_runs,
            contract_path,
            contract_name,
            artifact_path,
            constructor_args,
            read_function,
            update_function,
            update_args,
            gas_price,
            gas_limit,
            confirmation_timeout,
            poll_interval,
            max_poll_interval,
            request_timeout,
            report_path,
            metrics_path,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "chain_id: {chain_id}")?;
        display_option(f, "sender_address", sender_address)?;
        display_secret_option(f, "private_key", private_key)?;
        writeln!(f, "solc: {}", solc.display())?;
        display_option(f, "solc_version", solc_version)?;
        display_option(f, "optimizer_runs", optimizer_runs)?;
        writeln!(f, "contract_path: {}", contract_path.display())?;
        writeln!(f, "contract_name: {contract_name}")?;
        writeln!(f, "artifact_path: {}", artifact_path.display())?;
        writeln!(f, "constructor_args: {constructor_args:?}")?;
        writeln!(f, "read_function: {read_function}")?;
        writeln!(f, "update_function: {update_function}")?;
        writeln!(f, "update_args: {update_args:?}")?;
        display_option(f, "gas_price", gas_price)?;
        display_option(f, "gas_limit", gas_limit)?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        writeln!(f, "poll_interval: {poll_interval:?}")?;
        writeln!(f, "max_poll_interval: {max_poll_interval:?}")?;
        writeln!(f, "request_timeout: {request_timeout:?}")?;
        display_option(f, "report_path", &report_path.as_ref().map(|p| p.display()))?;
        display_option(f, "metrics_path", &metrics_path.as_ref().map(|p| p.display()))?;
        Ok(())
    }
}
