use {
    crate::{Error, config, observe},
    solc::{CompiledContract, Solc, StandardJsonInput},
};

/// Compiles the configured contract, persists the full compiler output and
/// extracts the contract's bytecode and ABI.
pub async fn compile(config: &config::Compiler) -> Result<CompiledContract, Error> {
    let source = tokio::fs::read_to_string(&config.contract_path)
        .await
        .map_err(|source| Error::Io {
            path: config.contract_path.clone(),
            source,
        })?;
    // The source unit name is what the compiler output is keyed by.
    let file_name = config
        .contract_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.contract_path.to_string_lossy().into_owned());

    let solc = Solc::new(&config.solc);
    if let Some(version) = &config.version {
        solc.ensure_version(version).await?;
    }
    let mut input = StandardJsonInput::solidity(&file_name, source);
    if let Some(runs) = config.optimizer_runs {
        input = input.with_optimizer(runs);
    }

    observe::compiling(&config.contract_path, solc.binary());
    let compilation = solc.compile(&input).await?;
    solc::artifact::persist(&config.artifact_path, &compilation.raw).await?;
    observe::persisted(&config.artifact_path);

    let contract = compilation
        .output
        .contract(&file_name, &config.contract_name)?;
    observe::compiled(&contract);
    Ok(contract)
}
