use {serde::Serialize, std::collections::BTreeMap};

/// Outputs requested for every contract of every source unit.
pub const OUTPUT_SELECTION: &[&str] = &["abi", "metadata", "evm.bytecode", "evm.sourceMap"];

/// Input document of `solc --standard-json`.
///
/// https://docs.soliditylang.org/en/latest/using-the-compiler.html#input-description
#[derive(Debug, Clone, Serialize)]
pub struct StandardJsonInput {
    pub language: String,
    pub sources: BTreeMap<String, Source>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<Optimizer>,
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Optimizer {
    pub enabled: bool,
    pub runs: u32,
}

impl StandardJsonInput {
    /// Input for a single Solidity source unit named `file_name`.
    pub fn solidity(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        let selection = OUTPUT_SELECTION.iter().map(ToString::to_string).collect();
        Self {
            language: "Solidity".to_string(),
            sources: BTreeMap::from([(
                file_name.into(),
                Source {
                    content: content.into(),
                },
            )]),
            settings: Settings {
                optimizer: None,
                output_selection: BTreeMap::from([(
                    "*".to_string(),
                    BTreeMap::from([("*".to_string(), selection)]),
                )]),
            },
        }
    }

    pub fn with_optimizer(mut self, runs: u32) -> Self {
        self.settings.optimizer = Some(Optimizer {
            enabled: true,
            runs,
        });
        self
    }
}
