//! Persisting raw compiler output.

use {crate::Error, std::path::Path};

/// Writes the compiler output to `path` as pretty-printed JSON, replacing any
/// existing file. Missing parent directories are created.
pub async fn persist(path: &Path, raw: &serde_json::Value) -> Result<(), Error> {
    let persist_error = |source| Error::Persist {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(persist_error)?;
    }
    let mut contents = serde_json::to_vec_pretty(raw)?;
    contents.push(b'\n');
    tokio::fs::write(path, contents)
        .await
        .map_err(persist_error)?;
    tracing::debug!(?path, "persisted compiler output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[tokio::test]
    async fn overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build").join("compiled_code.json");

        persist(&path, &json!({ "contracts": {} })).await.unwrap();
        let output = json!({ "contracts": { "SimpleStorage.sol": {} }, "sources": {} });
        persist(&path, &output).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, output);
    }

    #[tokio::test]
    async fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = persist(&blocker.join("compiled_code.json"), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persist { .. }));
    }
}
