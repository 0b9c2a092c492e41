//! Solidity standard-JSON compiler input
//!
//! Mirrors the document `solc --standard-json` reads on stdin.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default optimizer run count
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// Outputs requested for every contract
pub const DEFAULT_OUTPUTS: [&str; 2] = ["abi", "evm.bytecode"];

/// A single source document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceFile {
    pub content: String,
}

/// Optimizer configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub runs: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

/// Compiler settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// file glob -> contract glob -> requested outputs
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub optimizer: OptimizerSettings,
}

impl Settings {
    /// Request `outputs` for every contract in every file
    pub fn select_all(outputs: &[&str], optimizer: OptimizerSettings) -> Self {
        let per_contract: BTreeMap<String, Vec<String>> = [(
            "*".to_string(),
            outputs.iter().map(|o| o.to_string()).collect(),
        )]
        .into_iter()
        .collect();

        Self {
            output_selection: [("*".to_string(), per_contract)].into_iter().collect(),
            optimizer,
        }
    }
}

/// A complete standard-JSON compilation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompilerInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceFile>,
    pub settings: Settings,
}

impl CompilerInput {
    /// Build a request for a single Solidity document
    pub fn single_source(name: &str, content: String, optimizer: OptimizerSettings) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(name.to_string(), SourceFile { content });

        Self {
            language: "Solidity".to_string(),
            sources,
            settings: Settings::select_all(&DEFAULT_OUTPUTS, optimizer),
        }
    }
}
