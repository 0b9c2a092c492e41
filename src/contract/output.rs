//! Solidity standard-JSON compiler output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Diagnostic severity as reported by solc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// A compiler diagnostic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(default)]
    pub formatted_message: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
}

impl Diagnostic {
    /// Message to show the user (solc's pre-formatted text when present)
    pub fn display_message(&self) -> &str {
        self.formatted_message
            .as_deref()
            .unwrap_or(self.message.as_str())
    }
}

/// `evm.bytecode`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvmBytecode {
    /// Hex encoded creation code, without `0x`
    #[serde(default)]
    pub object: String,
}

/// `evm`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evm {
    #[serde(default)]
    pub bytecode: Option<EvmBytecode>,
}

/// One compiled contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompiledContract {
    #[serde(default)]
    pub abi: Option<serde_json::Value>,
    #[serde(default)]
    pub evm: Option<Evm>,
}

impl CompiledContract {
    pub fn bytecode_object(&self) -> Option<&str> {
        self.evm
            .as_ref()
            .and_then(|evm| evm.bytecode.as_ref())
            .map(|b| b.object.as_str())
    }
}

/// A complete standard-JSON compilation response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    /// file name -> contract name -> contract
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, CompiledContract>>,
}

impl CompilerOutput {
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|d| d.severity.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().filter(|d| !d.severity.is_fatal())
    }

    pub fn contract(&self, file: &str, name: &str) -> Option<&CompiledContract> {
        self.contracts.get(file).and_then(|c| c.get(name))
    }

    /// Contract names compiled from `file`
    pub fn contract_names(&self, file: &str) -> Vec<String> {
        self.contracts
            .get(file)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"{
        "errors": [
            {
                "severity": "warning",
                "formattedMessage": "Warning: SPDX license identifier not provided.",
                "message": "SPDX license identifier not provided.",
                "type": "Warning",
                "component": "general"
            }
        ],
        "contracts": {
            "freelancer.sol": {
                "EscrowMilestones": {
                    "abi": [{"type": "function", "name": "jobCount", "inputs": [], "outputs": [{"type": "uint256"}]}],
                    "evm": {"bytecode": {"object": "6080604052"}}
                }
            }
        },
        "sources": {"freelancer.sol": {"id": 0}}
    }"#;

    #[test]
    fn test_parse_output() {
        let output: CompilerOutput = serde_json::from_str(OUTPUT).unwrap();

        assert!(!output.has_errors());
        assert_eq!(output.warnings().count(), 1);

        let contract = output.contract("freelancer.sol", "EscrowMilestones").unwrap();
        assert_eq!(contract.bytecode_object(), Some("6080604052"));
        assert!(contract.abi.as_ref().unwrap().is_array());
        assert_eq!(
            output.contract_names("freelancer.sol"),
            vec!["EscrowMilestones".to_string()]
        );
    }

    #[test]
    fn test_error_severity_is_fatal() {
        let output: CompilerOutput = serde_json::from_str(
            r#"{"errors": [{"severity": "error", "message": "Expected ';'"}]}"#,
        )
        .unwrap();

        assert!(output.has_errors());
        assert_eq!(output.errors[0].display_message(), "Expected ';'");
        assert!(output.contracts.is_empty());
    }

    #[test]
    fn test_unknown_severity() {
        let output: CompilerOutput =
            serde_json::from_str(r#"{"errors": [{"severity": "notice", "message": "x"}]}"#)
                .unwrap();
        assert_eq!(output.errors[0].severity, Severity::Unknown);
        assert!(!output.has_errors());
    }
}
