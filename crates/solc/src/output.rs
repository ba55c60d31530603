use {
    crate::Error,
    alloy::{json_abi::JsonAbi, primitives::Bytes},
    serde::Deserialize,
    std::collections::BTreeMap,
};

/// Output document of `solc --standard-json`, reduced to what is needed to
/// deploy a contract. Fields the compiler didn't emit are left empty.
///
/// https://docs.soliditylang.org/en/latest/using-the-compiler.html#output-description
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandardJsonOutput {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceOutput>,
    /// Source unit name -> contract name -> contract output.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceOutput {
    pub id: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: Option<JsonAbi>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub evm: Option<Evm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Evm {
    #[serde(default)]
    pub bytecode: Option<Bytecode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    pub object: String,
    #[serde(default)]
    pub source_map: Option<String>,
    /// File -> library -> offsets. Non-empty when the bytecode still contains
    /// placeholders for unlinked libraries.
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// Everything needed to deploy a contract and to talk to it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledContract {
    pub name: String,
    /// Creation bytecode, never empty.
    pub bytecode: Bytes,
    pub abi: JsonAbi,
}

impl Diagnostic {
    fn render(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

pub(crate) fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::render)
        .collect::<Vec<_>>()
        .join("\n")
}

impl StandardJsonOutput {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    /// Fails with [`Error::Compilation`] if the compiler reported at least one
    /// diagnostic with error severity. Warnings are logged and otherwise
    /// ignored.
    pub fn ensure_success(&self) -> Result<(), Error> {
        for warning in self.warnings() {
            tracing::warn!(code = ?warning.error_code, "{}", warning.render());
        }
        let errors: Vec<_> = self.errors().cloned().collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Compilation(errors))
        }
    }

    /// Looks up the contract `name` declared in the source unit `file`.
    pub fn contract(&self, file: &str, name: &str) -> Result<CompiledContract, Error> {
        let output = self
            .contracts
            .get(file)
            .and_then(|contracts| contracts.get(name))
            .ok_or_else(|| Error::ContractNotFound {
                file: file.to_string(),
                name: name.to_string(),
                available: self.available(),
            })?;
        let missing = |field| Error::MissingOutput {
            name: name.to_string(),
            field,
        };
        let abi = output.abi.clone().ok_or_else(|| missing("abi"))?;
        let bytecode = output
            .evm
            .as_ref()
            .and_then(|evm| evm.bytecode.as_ref())
            .ok_or_else(|| missing("evm.bytecode"))?;

        Ok(CompiledContract {
            name: name.to_string(),
            bytecode: decode_bytecode(name, bytecode)?,
            abi,
        })
    }

    /// All contracts in the output as `file:name`.
    fn available(&self) -> Vec<String> {
        self.contracts
            .iter()
            .flat_map(|(file, contracts)| {
                contracts.keys().map(move |name| format!("{file}:{name}"))
            })
            .collect()
    }
}

fn decode_bytecode(name: &str, bytecode: &Bytecode) -> Result<Bytes, Error> {
    let invalid = |reason: String| Error::InvalidBytecode {
        name: name.to_string(),
        reason,
    };
    if !bytecode.link_references.is_empty() || bytecode.object.contains("__$") {
        let libraries: Vec<_> = bytecode
            .link_references
            .values()
            .flat_map(|libraries| libraries.keys())
            .collect();
        return Err(invalid(format!("unlinked libraries {libraries:?}")));
    }
    let code = const_hex::decode(&bytecode.object).map_err(|err| invalid(err.to_string()))?;
    if code.is_empty() {
        // Interfaces and abstract contracts compile to nothing.
        return Err(invalid("empty bytecode".to_string()));
    }
    Ok(code.into())
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn simple_storage_abi() -> serde_json::Value {
        json!([
            {
                "inputs": [
                    { "internalType": "string", "name": "_name", "type": "string" },
                    { "internalType": "uint256", "name": "_favoriteNumber", "type": "uint256" }
                ],
                "name": "addPerson",
                "outputs": [],
                "stateMutability": "nonpayable",
                "type": "function"
            },
            {
                "inputs": [],
                "name": "retrieve",
                "outputs": [{ "internalType": "uint256", "name": "", "type": "uint256" }],
                "stateMutability": "view",
                "type": "function"
            },
            {
                "inputs": [
                    { "internalType": "uint256", "name": "_favoriteNumber", "type": "uint256" }
                ],
                "name": "store",
                "outputs": [],
                "stateMutability": "nonpayable",
                "type": "function"
            }
        ])
    }

    fn output(object: &str, errors: serde_json::Value) -> StandardJsonOutput {
        serde_json::from_value(json!({
            "errors": errors,
            "sources": { "SimpleStorage.sol": { "id": 0 } },
            "contracts": {
                "SimpleStorage.sol": {
                    "SimpleStorage": {
                        "abi": simple_storage_abi(),
                        "metadata": "{}",
                        "evm": {
                            "bytecode": {
                                "object": object,
                                "linkReferences": {},
                                "opcodes": "PUSH1 0x80",
                                "sourceMap": "57:471:0:-:0;;;;;;;;;;;;;;;;;;;"
                            }
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn extracts_bytecode_and_abi() {
        let output = output("6080604052348015600f57600080fd5b50", json!([]));
        let contract = output.contract("SimpleStorage.sol", "SimpleStorage").unwrap();

        assert_eq!(contract.name, "SimpleStorage");
        assert_eq!(&contract.bytecode[..4], &[0x60, 0x80, 0x60, 0x40]);
        assert!(contract.abi.function("retrieve").is_some());
        assert!(contract.abi.function("store").is_some());
    }

    #[test]
    fn accepts_prefixed_bytecode() {
        let output = output("0x6080604052", json!([]));
        let contract = output.contract("SimpleStorage.sol", "SimpleStorage").unwrap();
        assert_eq!(contract.bytecode.len(), 5);
    }

    #[test]
    fn unknown_contract_lists_available_ones() {
        let output = output("6080604052", json!([]));
        let err = output.contract("SimpleStorage.sol", "SimpleStore").unwrap_err();

        assert!(err.is_lookup());
        match err {
            Error::ContractNotFound { available, .. } => {
                assert_eq!(available, vec!["SimpleStorage.sol:SimpleStorage"])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_unusable_bytecode() {
        for object in ["", "60zz", "73__$1ab2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7$__63"] {
            let err = output(object, json!([]))
                .contract("SimpleStorage.sol", "SimpleStorage")
                .unwrap_err();
            assert!(matches!(err, Error::InvalidBytecode { .. }), "{object}: {err:?}");
        }
    }

    #[test]
    fn only_error_severity_fails_compilation() {
        let warning = json!({
            "severity": "warning",
            "type": "Warning",
            "component": "general",
            "errorCode": "1878",
            "message": "SPDX license identifier not provided in source file.",
            "formattedMessage": "Warning: SPDX license identifier not provided in source file.\n"
        });
        let error = json!({
            "severity": "error",
            "type": "ParserError",
            "component": "general",
            "errorCode": "2314",
            "message": "Expected ';' but got '}'",
            "formattedMessage": "ParserError: Expected ';' but got '}'\n --> SimpleStorage.sol:7:5:\n"
        });

        assert!(output("6080", json!([warning.clone()])).ensure_success().is_ok());

        let err = output("6080", json!([warning, error]))
            .ensure_success()
            .unwrap_err();
        match &err {
            Error::Compilation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].kind, "ParserError");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("Expected ';' but got '}'"));
    }
}
