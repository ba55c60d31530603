pub mod errors;
mod instrumentation;

use {
    crate::{AlloyProvider, Config},
    alloy::{
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
        transports::http::{Http, reqwest},
    },
    instrumentation::InstrumentationLayer,
    url::Url,
};

#[derive(Debug, thiserror::Error)]
#[error("failed to build HTTP client for {url}: {source}")]
pub struct ProviderError {
    url: Url,
    #[source]
    source: reqwest::Error,
}

/// Creates an instrumented provider talking JSON-RPC over HTTP to `url`.
///
/// Creating the provider does not contact the node; connection failures
/// surface on the first request.
pub fn provider(url: &Url, config: &Config) -> Result<AlloyProvider, ProviderError> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|source| ProviderError {
            url: url.clone(),
            source,
        })?;
    let transport = Http::with_client(client, url.clone());
    let is_local = transport.guess_local();
    let rpc = ClientBuilder::default()
        .layer(InstrumentationLayer::new(&config.label))
        .transport(transport, is_local);
    Ok(ProviderBuilder::new().connect_client(rpc).erased())
}
