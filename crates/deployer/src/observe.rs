//! Events that are meaningful to a deployment run. Each function logs the
//! event and updates the metrics, if the event is worth measuring.

use {
    crate::{Error, chain::Receipt, report::Report},
    alloy::primitives::{Address, B256},
    solc::CompiledContract,
    std::{path::Path, time::Duration},
};

/// Observe that compilation of `path` is about to start.
pub fn compiling(path: &Path, solc: &Path) {
    tracing::debug!(?path, ?solc, "compiling");
}

/// Observe the contract extracted from the compiler output.
pub fn compiled(contract: &CompiledContract) {
    tracing::info!(
        name = %contract.name,
        bytecode_len = contract.bytecode.len(),
        functions = contract.abi.functions().count(),
        "compiled contract"
    );
}

/// Observe that the compiler output was persisted.
pub fn persisted(path: &Path) {
    tracing::debug!(?path, "wrote compiler output");
}

/// Observe a successful connection to the node.
pub fn connected(chain_id: u64) {
    tracing::info!(chain_id, "connected to node");
}

/// Observe that the node reported a transaction count that would reissue an
/// already used nonce.
pub fn stale_transaction_count(pending: u64, last: u64) {
    tracing::warn!(
        pending,
        last,
        "node reports stale transaction count, continuing after last used nonce"
    );
}

/// Observe a transaction that is about to be broadcast.
pub fn submitting(kind: &str, hash: B256, nonce: u64, gas_price: u128, gas_limit: u64) {
    tracing::info!(kind, ?hash, nonce, gas_price, gas_limit, "submitting transaction");
}

/// Observe that a transaction is still pending.
pub fn awaiting_receipt(hash: B256, delay: Duration) {
    tracing::trace!(?hash, ?delay, "transaction pending");
}

/// Observe a mined transaction.
pub fn confirmed(kind: &str, receipt: &Receipt, elapsed: Duration) {
    tracing::info!(
        kind,
        hash = ?receipt.transaction_hash,
        success = receipt.success,
        block = ?receipt.block_number,
        gas_used = receipt.gas_used,
        ?elapsed,
        "transaction mined"
    );
    metrics()
        .confirmation_time
        .with_label_values(&[kind])
        .observe(elapsed.as_secs_f64());
}

/// Observe the outcome of a transaction. Called exactly once per attempted
/// transaction.
pub fn transaction(kind: &str, result: &Result<Receipt, Error>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(err) => {
            tracing::warn!(kind, ?err, "transaction failed");
            err.kind()
        }
    };
    metrics()
        .transactions
        .with_label_values(&[kind, outcome])
        .inc();
}

/// Observe the freshly deployed contract.
pub fn deployed(address: Address, hash: B256) {
    tracing::info!(%address, ?hash, "contract deployed");
}

/// Observe the decoded result of a read-only call.
pub fn read(function: &str, value: &str) {
    tracing::info!(function, value, "read contract state");
}

/// Observe a completed run.
pub fn finished(report: &Report) {
    tracing::info!(%report, "deployment finished");
    metrics().runs.with_label_values(&["success"]).inc();
}

/// Observe an aborted run.
pub fn failed(err: &Error) {
    tracing::error!(?err, "deployment failed: {err}");
    metrics().runs.with_label_values(&[err.kind()]).inc();
}

/// Observe that the metrics file could not be written.
pub fn metrics_not_written(path: &Path, err: &std::io::Error) {
    tracing::warn!(?path, ?err, "failed to write metrics file");
}

#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
struct Metrics {
    /// Transactions sent, by kind and outcome.
    #[metric(labels("kind", "result"))]
    transactions: prometheus::IntCounterVec,

    /// Time from broadcast until a receipt was available.
    #[metric(
        labels("kind"),
        buckets(0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0)
    )]
    confirmation_time: prometheus::HistogramVec,

    /// Deployment runs, by outcome.
    #[metric(labels("result"))]
    runs: prometheus::IntCounterVec,
}

fn metrics() -> &'static Metrics {
    Metrics::instance(observe::metrics::get_storage_registry())
        .expect("unexpected error getting metrics instance")
}
