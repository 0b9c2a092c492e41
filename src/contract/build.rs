//! Compile-then-persist pipeline
//!
//! Reads one Solidity file, compiles it, and writes the artifacts for one
//! named contract. Nothing is written unless compilation is clean of
//! error-severity diagnostics.

use crate::contract::artifact::{self, ArtifactError, Bytecode, ABI_FILE, BYTECODE_FILE};
use crate::contract::compiler::{CompilerError, SolidityCompiler};
use crate::contract::input::{CompilerInput, OptimizerSettings};
use crate::contract::output::Diagnostic;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default contract source
pub const DEFAULT_SOURCE: &str = "freelancer.sol";

/// Default contract to extract
pub const DEFAULT_CONTRACT: &str = "EscrowMilestones";

/// Start of an unlinked library reference in solc bytecode
const LINK_MARKER: &str = "__$";

/// `__$` + 34 hex characters + `$__`
const PLACEHOLDER_LEN: usize = 40;

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot read source {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Compiler error: {0}")]
    Compiler(#[from] CompilerError),
    #[error("Compilation failed with {} error(s)", count_fatal(.diagnostics))]
    CompilationFailed { diagnostics: Vec<Diagnostic> },
    #[error("Contract {contract} not found in {file} (available: {})", .available.join(", "))]
    ContractNotFound {
        file: String,
        contract: String,
        available: Vec<String>,
    },
    #[error("Compiler output for {0} is missing {1}")]
    MissingOutput(String, &'static str),
    #[error("Contract {0} has no bytecode (abstract contract or interface?)")]
    EmptyBytecode(String),
    #[error(
        "Contract {contract} references unlinked libraries ({}); link them before deploying",
        .placeholders.join(", ")
    )]
    UnlinkedLibraries {
        contract: String,
        placeholders: Vec<String>,
    },
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

fn count_fatal(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.severity.is_fatal()).count()
}

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Solidity source file
    pub source_path: PathBuf,
    /// Contract to extract from the compiler output
    pub contract_name: String,
    /// Directory receiving `bytecode.bin` and `abi.json`
    pub out_dir: PathBuf,
    pub optimizer: OptimizerSettings,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE),
            contract_name: DEFAULT_CONTRACT.to_string(),
            out_dir: PathBuf::from("."),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl BuildConfig {
    pub fn bytecode_path(&self) -> PathBuf {
        self.out_dir.join(BYTECODE_FILE)
    }

    pub fn abi_path(&self) -> PathBuf {
        self.out_dir.join(ABI_FILE)
    }

    /// Document name handed to the compiler
    fn document_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.to_string_lossy().into_owned())
    }
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub contract_name: String,
    pub bytecode: Bytecode,
    pub abi: serde_json::Value,
    /// Non-fatal diagnostics
    pub warnings: Vec<Diagnostic>,
    pub bytecode_path: PathBuf,
    pub abi_path: PathBuf,
}

impl BuildReport {
    pub fn bytecode_size(&self) -> usize {
        self.bytecode.size()
    }
}

/// Compile `config.source_path` and write the artifacts for
/// `config.contract_name`
pub fn build_contract(
    compiler: &dyn SolidityCompiler,
    config: &BuildConfig,
) -> Result<BuildReport, BuildError> {
    build_contract_with(compiler, config, |_| {})
}

/// Like [`build_contract`], handing every diagnostic to `on_diagnostic` as
/// soon as the compiler answers, before any other check can fail
pub fn build_contract_with<F>(
    compiler: &dyn SolidityCompiler,
    config: &BuildConfig,
    mut on_diagnostic: F,
) -> Result<BuildReport, BuildError>
where
    F: FnMut(&Diagnostic),
{
    let source = read_source(&config.source_path)?;
    let document = config.document_name();

    log::info!(
        "Compiling {} (optimizer: {}, runs: {})",
        document,
        config.optimizer.enabled,
        config.optimizer.runs
    );

    let input = CompilerInput::single_source(&document, source, config.optimizer);
    let output = compiler.compile(&input)?;

    for diagnostic in &output.errors {
        log::debug!("{}: {}", diagnostic.severity, diagnostic.display_message());
        on_diagnostic(diagnostic);
    }

    if output.has_errors() {
        return Err(BuildError::CompilationFailed {
            diagnostics: output.errors,
        });
    }

    let contract = output
        .contract(&document, &config.contract_name)
        .ok_or_else(|| BuildError::ContractNotFound {
            file: document.clone(),
            contract: config.contract_name.clone(),
            available: output.contract_names(&document),
        })?;

    let object = contract
        .bytecode_object()
        .ok_or_else(|| BuildError::MissingOutput(config.contract_name.clone(), "evm.bytecode"))?;
    let abi = contract
        .abi
        .clone()
        .ok_or_else(|| BuildError::MissingOutput(config.contract_name.clone(), "abi"))?;

    let placeholders = link_placeholders(object);
    if !placeholders.is_empty() {
        return Err(BuildError::UnlinkedLibraries {
            contract: config.contract_name.clone(),
            placeholders,
        });
    }

    let bytecode = Bytecode::from_hex(object)?;
    if bytecode.is_empty() {
        return Err(BuildError::EmptyBytecode(config.contract_name.clone()));
    }

    let bytecode_path = config.bytecode_path();
    let abi_path = config.abi_path();
    artifact::write_bytecode(&bytecode_path, &bytecode)?;
    artifact::write_abi(&abi_path, &abi)?;

    log::info!(
        "Wrote {} ({} bytes) and {}",
        bytecode_path.display(),
        bytecode.size(),
        abi_path.display()
    );

    Ok(BuildReport {
        contract_name: config.contract_name.clone(),
        bytecode,
        abi,
        warnings: output.warnings().cloned().collect(),
        bytecode_path,
        abi_path,
    })
}

/// Distinct `__$<34 hex>$__` library placeholders left by solc
fn link_placeholders(object: &str) -> Vec<String> {
    let mut found: Vec<String> = object
        .match_indices(LINK_MARKER)
        .map(|(start, _)| {
            let end = (start + PLACEHOLDER_LEN).min(object.len());
            object.get(start..end).unwrap_or(LINK_MARKER).to_string()
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

fn read_source(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Returns a fixed response and remembers the last request
    struct FakeSolc {
        response: String,
        last_request: RefCell<Option<serde_json::Value>>,
    }

    impl FakeSolc {
        fn new(response: serde_json::Value) -> Self {
            Self {
                response: response.to_string(),
                last_request: RefCell::new(None),
            }
        }
    }

    impl SolidityCompiler for FakeSolc {
        fn compile_json(&self, input: &str) -> Result<String, CompilerError> {
            *self.last_request.borrow_mut() = Some(serde_json::from_str(input)?);
            Ok(self.response.clone())
        }
    }

    fn escrow_output() -> serde_json::Value {
        serde_json::json!({
            "errors": [{
                "severity": "warning",
                "formattedMessage": "Warning: Unused local variable.",
                "message": "Unused local variable."
            }],
            "contracts": {
                "freelancer.sol": {
                    "EscrowMilestones": {
                        "abi": [
                            {"type": "function", "name": "jobCount", "inputs": [],
                             "outputs": [{"name": "", "type": "uint256"}],
                             "stateMutability": "view"}
                        ],
                        "evm": {"bytecode": {"object": "608060405234801561001057600080fd5b50"}}
                    },
                    "IEscrow": {
                        "abi": [],
                        "evm": {"bytecode": {"object": ""}}
                    }
                }
            }
        })
    }

    fn setup(response: serde_json::Value) -> (tempfile::TempDir, BuildConfig, FakeSolc) {
        let temp_dir = tempfile::tempdir().unwrap();
        let source_path = temp_dir.path().join("freelancer.sol");
        fs::write(&source_path, "contract EscrowMilestones { uint256 public jobCount; }").unwrap();

        let config = BuildConfig {
            source_path,
            out_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        (temp_dir, config, FakeSolc::new(response))
    }

    #[test]
    fn test_build_writes_artifacts() {
        let (_dir, config, solc) = setup(escrow_output());

        let report = build_contract(&solc, &config).unwrap();

        let written = fs::read_to_string(config.bytecode_path()).unwrap();
        assert!(!written.is_empty());
        assert_eq!(written.len() % 2, 0);
        assert!(written.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(report.bytecode_size(), written.len() / 2);

        let abi: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.abi_path()).unwrap()).unwrap();
        assert!(!abi.as_array().unwrap().is_empty());

        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_build_sends_fixed_settings() {
        let (_dir, config, solc) = setup(escrow_output());
        build_contract(&solc, &config).unwrap();

        let request = solc.last_request.borrow().clone().unwrap();
        assert!(request["sources"]["freelancer.sol"]["content"]
            .as_str()
            .unwrap()
            .contains("EscrowMilestones"));
        assert_eq!(request["settings"]["optimizer"]["runs"], 200);
        assert_eq!(
            request["settings"]["outputSelection"]["*"]["*"],
            serde_json::json!(["abi", "evm.bytecode"])
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let (_dir, config, solc) = setup(escrow_output());

        let first = build_contract(&solc, &config).unwrap();
        let first_file = fs::read(config.bytecode_path()).unwrap();
        let second = build_contract(&solc, &config).unwrap();
        let second_file = fs::read(config.bytecode_path()).unwrap();

        assert_eq!(first.bytecode, second.bytecode);
        assert_eq!(first_file, second_file);
    }

    #[test]
    fn test_error_diagnostic_writes_nothing() {
        let (_dir, config, solc) = setup(serde_json::json!({
            "errors": [
                {"severity": "warning", "message": "unused"},
                {"severity": "error", "formattedMessage": "ParserError: Expected ';'", "message": "Expected ';'"}
            ]
        }));

        let err = build_contract(&solc, &config).unwrap_err();
        match err {
            BuildError::CompilationFailed { diagnostics } => {
                assert_eq!(diagnostics.len(), 2);
                assert_eq!(count_fatal(&diagnostics), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!config.bytecode_path().exists());
        assert!(!config.abi_path().exists());
    }

    #[test]
    fn test_missing_source() {
        let (_dir, mut config, solc) = setup(escrow_output());
        config.source_path = config.out_dir.join("nope.sol");

        let err = build_contract(&solc, &config).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
        assert!(solc.last_request.borrow().is_none());
    }

    #[test]
    fn test_contract_not_found() {
        let (_dir, mut config, solc) = setup(escrow_output());
        config.contract_name = "Escrow".to_string();

        let err = build_contract(&solc, &config).unwrap_err();
        match &err {
            BuildError::ContractNotFound { available, .. } => {
                assert!(available.contains(&"EscrowMilestones".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("EscrowMilestones"));
        assert!(!config.bytecode_path().exists());
    }

    #[test]
    fn test_warnings_reported_when_contract_missing() {
        let (_dir, mut config, solc) = setup(escrow_output());
        config.contract_name = "Escrow".to_string();

        let mut seen = Vec::new();
        let err = build_contract_with(&solc, &config, |d| {
            seen.push(d.display_message().to_string())
        })
        .unwrap_err();

        assert!(matches!(err, BuildError::ContractNotFound { .. }));
        assert_eq!(seen, vec!["Warning: Unused local variable.".to_string()]);
    }

    #[test]
    fn test_unlinked_library_placeholder() {
        let placeholder = "__$1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e$__";
        let object = format!("6080{}6040{}52", placeholder, placeholder);
        let (_dir, config, solc) = setup(serde_json::json!({
            "contracts": {
                "freelancer.sol": {
                    "EscrowMilestones": {
                        "abi": [],
                        "evm": {"bytecode": {"object": object}}
                    }
                }
            }
        }));

        let err = build_contract(&solc, &config).unwrap_err();
        match &err {
            BuildError::UnlinkedLibraries { placeholders, .. } => {
                assert_eq!(placeholders, &vec![placeholder.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("link them"));
        assert!(!config.bytecode_path().exists());
    }

    #[test]
    fn test_interface_has_no_bytecode() {
        let (_dir, mut config, solc) = setup(escrow_output());
        config.contract_name = "IEscrow".to_string();

        let err = build_contract(&solc, &config).unwrap_err();
        assert!(matches!(err, BuildError::EmptyBytecode(_)));
    }
}
