use {
    crate::{
        Error,
        account::Account,
        arguments::Arguments,
        chain::AlloyChain,
        compile,
        driver::Driver,
        error::ConnectionError,
        observe,
        report::Report,
    },
    clap::Parser,
    std::process::ExitCode,
    tokio_util::sync::CancellationToken,
};

pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    // Real environment variables take precedence over the `.env` file.
    let _ = dotenvy::dotenv();
    let args = Arguments::parse_from(args);
    let obs_config = ::observe::Config::new(
        args.logging.log_filter.as_str(),
        args.logging.log_stderr_threshold.into_level(),
        args.logging.use_json_logs,
    );
    ::observe::tracing::initialize(&obs_config);
    tracing::info!("running deployer with validated arguments:\n{}", args);
    ::observe::metrics::setup_registry(Some("deployer".into()), None);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let result = run(&args, cancel).await;
    match &result {
        Ok(report) => observe::finished(report),
        Err(err) => observe::failed(err),
    }
    if let Some(path) = &args.metrics_path {
        if let Err(err) = ::observe::metrics::write_textfile(path).await {
            observe::metrics_not_written(path, &err);
        }
    }

    match result {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}

/// Assumes tracing and the metrics registry have already been set up.
pub async fn run(args: &Arguments, cancel: CancellationToken) -> Result<Report, Error> {
    let contract = compile::compile(&args.compiler()).await?;

    let provider = ethrpc::alloy::provider(
        &args.node_url,
        &ethrpc::Config {
            label: "deployer".into(),
            request_timeout: args.request_timeout,
        },
    )
    .map_err(ConnectionError::from)?;
    let account = Account::new(args.sender_address, args.private_key.as_ref())?;

    let mut driver = Driver::new(AlloyChain::new(provider), args.driver(), account, cancel);
    let report = driver.run(&contract).await?;

    if let Some(path) = &args.report_path {
        report.write(path).await?;
    }
    Ok(report)
}

/// Triggers `cancel` on SIGINT or SIGTERM.
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix;
        let mut sigterm = match unix::signal(unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                tracing::warn!(?err, "failed to install SIGTERM handler");
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(?err, "failed to install CTRL+C handler");
            return;
        }
        tracing::info!("received SIGINT");
    }
    cancel.cancel();
}
