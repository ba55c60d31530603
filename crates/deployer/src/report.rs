use {
    crate::Error,
    alloy::primitives::{Address, B256},
    serde::Serialize,
    std::{fmt, path::Path},
};

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub contract_address: Address,
    pub deployment_transaction: B256,
    /// Result of the read call right after deployment.
    pub initial_value: String,
    pub update_transaction: B256,
    /// Result of the read call after the update was mined.
    pub updated_value: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            contract_address,
            deployment_transaction,
            initial_value,
            update_transaction,
            updated_value,
        } = self;
        writeln!(f, "contract_address: {contract_address}")?;
        writeln!(f, "deployment_transaction: {deployment_transaction}")?;
        writeln!(f, "initial_value: {initial_value}")?;
        writeln!(f, "update_transaction: {update_transaction}")?;
        writeln!(f, "updated_value: {updated_value}")?;
        Ok(())
    }
}

impl Report {
    /// Writes the report as JSON to `path`.
    pub async fn write(&self, path: &Path) -> Result<(), Error> {
        let io = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|err| io(err.into()))?;
        tokio::fs::write(path, json).await.map_err(io)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[tokio::test]
    async fn writes_json() {
        let report = Report {
            contract_address: Address::repeat_byte(0x11),
            deployment_transaction: B256::repeat_byte(0x22),
            initial_value: "0".to_string(),
            update_transaction: B256::repeat_byte(0x33),
            updated_value: "81".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        report.write(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "contractAddress": "0x1111111111111111111111111111111111111111",
                "deploymentTransaction": format!("0x{}", "22".repeat(32)),
                "initialValue": "0",
                "updateTransaction": format!("0x{}", "33".repeat(32)),
                "updatedValue": "81",
            })
        );
    }
}
