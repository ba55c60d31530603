use {
    prometheus::Encoder,
    prometheus_metric_storage::StorageRegistry,
    std::{collections::HashMap, path::Path, sync::OnceLock},
};

static REGISTRY: OnceLock<StorageRegistry> = OnceLock::new();

/// Sets up the process wide registry every metric storage registers with.
/// `prefix` is prepended to all metric names, `labels` are attached to all
/// metrics.
///
/// # Panics
///
/// If the registry was already set up, or already used through
/// [`get_storage_registry`], or if the prefix or labels are invalid.
pub fn setup_registry(prefix: Option<String>, labels: Option<HashMap<String, String>>) {
    let registry = prometheus::Registry::new_custom(prefix, labels).unwrap();
    REGISTRY.set(StorageRegistry::new(registry)).unwrap();
}

/// Like [`setup_registry`], but only the first call has an effect. For tests
/// sharing one process.
pub fn setup_registry_reentrant(prefix: Option<String>, labels: Option<HashMap<String, String>>) {
    let registry = prometheus::Registry::new_custom(prefix, labels).unwrap();
    REGISTRY.set(StorageRegistry::new(registry)).ok();
}

pub fn get_registry() -> &'static prometheus::Registry {
    get_storage_registry().registry()
}

/// Falls back to an unprefixed registry if [`setup_registry`] wasn't called,
/// so unit tests can record metrics without any setup.
pub fn get_storage_registry() -> &'static StorageRegistry {
    REGISTRY.get_or_init(StorageRegistry::default)
}

/// Renders all metrics of `registry` in the prometheus text format.
pub fn encode(registry: &prometheus::Registry) -> String {
    let mut buffer = Vec::new();
    prometheus::TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Writes the global registry in the prometheus text format to `path`, for a
/// node exporter textfile collector to pick up.
///
/// The content goes to a sibling temporary file first and is then renamed,
/// so a collector never reads a partially written file.
pub async fn write_textfile(path: &Path) -> std::io::Result<()> {
    let encoded = encode(get_registry());
    let tmp = path.with_extension("prom.tmp");
    tokio::fs::write(&tmp, encoded).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(prometheus_metric_storage::MetricStorage)]
    #[metric(subsystem = "observe_test")]
    struct Metrics {
        /// Number of things that happened.
        things: prometheus::IntCounter,
    }

    #[tokio::test]
    async fn textfile_contains_registered_metrics() {
        let metrics = Metrics::instance(get_storage_registry()).unwrap();
        metrics.things.inc();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployer.prom");
        write_textfile(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("observe_test_things 1"));
        assert!(!path.with_extension("prom.tmp").exists());
    }
}
