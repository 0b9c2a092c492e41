//! CLI commands for the contract pipeline
//!
//! Implements the `compile` and `deploy` handlers.

use crate::contract::{build_contract_with, BuildConfig, BuildReport, Diagnostic, Solc, SolidityCompiler};
use crate::network::{DeployConfig, DeployError, Deployer, Deployment, HederaClient, OperatorIdentity};
use std::io::{self, Write};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Write one diagnostic: errors to `err`, everything else to `out`
pub fn write_diagnostic<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    diagnostic: &Diagnostic,
) -> io::Result<()> {
    let message = diagnostic.display_message().trim_end();
    if diagnostic.severity.is_fatal() {
        writeln!(err, "{}", message)
    } else {
        writeln!(out, "{}", message)
    }
}

/// Build the contract, streaming every diagnostic to `out`/`err` before
/// the build can fail for any other reason
pub fn compile_with_diagnostics<O: Write, E: Write>(
    compiler: &dyn SolidityCompiler,
    config: &BuildConfig,
    out: &mut O,
    err: &mut E,
) -> CliResult<BuildReport> {
    let mut write_failed = None;
    let report = build_contract_with(compiler, config, |diagnostic| {
        if let Err(e) = write_diagnostic(&mut *out, &mut *err, diagnostic) {
            if write_failed.is_none() {
                write_failed = Some(e);
            }
        }
    });
    if let Some(e) = write_failed {
        log::warn!("Could not print diagnostics: {}", e);
    }
    Ok(report?)
}

/// Compile the contract and write its artifacts
pub fn cmd_compile(config: &BuildConfig, solc: &Solc) -> CliResult<()> {
    println!(
        "🔨 Compiling {} from {}...",
        config.contract_name,
        config.source_path.display()
    );
    match solc.version() {
        Ok(version) => println!("   Compiler: solc {}", version),
        Err(e) => log::warn!("Could not query solc version: {}", e),
    }

    let report = compile_with_diagnostics(solc, config, &mut io::stdout(), &mut io::stderr())?;

    println!("💾 Bytecode saved to {}", report.bytecode_path.display());
    println!("💾 ABI saved to {}", report.abi_path.display());
    println!("   Bytecode size: {} bytes", report.bytecode_size());
    println!("\n✅ Compilation successful!");

    Ok(())
}

/// Deploy the compiled bytecode and verify the new contract
pub async fn cmd_deploy(config: DeployConfig, identity: OperatorIdentity) -> CliResult<Deployment> {
    println!(
        "🌐 Deploying {} to Hedera {}...",
        config.bytecode_path.display(),
        config.network
    );

    let network = config.network;
    let mut deployer = Deployer::new(config);
    let result = deployer
        .run(|| HederaClient::connect(network, &identity))
        .await;

    match result {
        Ok(deployment) => {
            println!("\n🎉 Deployment complete! Contract ID: {}", deployment.contract_id);
            Ok(deployment)
        }
        Err(e) => {
            if let DeployError::Unverified { contract_id, .. } = &e {
                eprintln!(
                    "⚠️  Contract {} exists on {} but failed verification; it is not rolled back.",
                    contract_id, network
                );
            }
            if let Some(stage) = deployer.failed_at() {
                eprintln!("   Failed during stage: {}", stage);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{BuildError, CompilerError};
    use std::fs;

    struct FakeSolc(serde_json::Value);

    impl SolidityCompiler for FakeSolc {
        fn compile_json(&self, _input: &str) -> Result<String, CompilerError> {
            Ok(self.0.to_string())
        }
    }

    fn diagnostic(severity: &str, formatted: &str) -> serde_json::Value {
        serde_json::json!({
            "severity": severity,
            "formattedMessage": formatted,
            "message": formatted
        })
    }

    fn setup(dir: &tempfile::TempDir, contract: &str) -> BuildConfig {
        let source_path = dir.path().join("freelancer.sol");
        fs::write(&source_path, "contract EscrowMilestones {}").unwrap();
        BuildConfig {
            source_path,
            contract_name: contract.to_string(),
            out_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_write_diagnostic_split() {
        let warning: Diagnostic =
            serde_json::from_value(diagnostic("warning", "Warning: unused\n")).unwrap();
        let error: Diagnostic =
            serde_json::from_value(diagnostic("error", "TypeError: bad")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        write_diagnostic(&mut out, &mut err, &warning).unwrap();
        write_diagnostic(&mut out, &mut err, &error).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Warning: unused\n");
        assert_eq!(String::from_utf8(err).unwrap(), "TypeError: bad\n");
    }

    #[test]
    fn test_warning_printed_when_contract_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(&dir, "Escrow");
        let solc = FakeSolc(serde_json::json!({
            "errors": [diagnostic("warning", "Warning: Unused local variable.")],
            "contracts": {
                "freelancer.sol": {
                    "EscrowMilestones": {"abi": [], "evm": {"bytecode": {"object": "6080"}}}
                }
            }
        }));

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let result = compile_with_diagnostics(&solc, &config, &mut out, &mut err);

        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::ContractNotFound { .. })
        ));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Warning: Unused local variable.\n"
        );
        assert!(err.is_empty());
    }

    #[test]
    fn test_errors_printed_once_on_failed_compilation() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(&dir, "EscrowMilestones");
        let solc = FakeSolc(serde_json::json!({
            "errors": [
                diagnostic("warning", "Warning: shadowing"),
                diagnostic("error", "ParserError: Expected ';'")
            ]
        }));

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let result = compile_with_diagnostics(&solc, &config, &mut out, &mut err);

        assert!(result.is_err());
        assert_eq!(String::from_utf8(out).unwrap(), "Warning: shadowing\n");
        assert_eq!(String::from_utf8(err).unwrap(), "ParserError: Expected ';'\n");
        assert!(!config.bytecode_path().exists());
    }

    #[test]
    fn test_clean_build_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(&dir, "EscrowMilestones");
        let solc = FakeSolc(serde_json::json!({
            "contracts": {
                "freelancer.sol": {
                    "EscrowMilestones": {"abi": [], "evm": {"bytecode": {"object": "6080"}}}
                }
            }
        }));

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = compile_with_diagnostics(&solc, &config, &mut out, &mut err).unwrap();

        assert_eq!(report.bytecode_size(), 2);
        assert!(out.is_empty() && err.is_empty());
    }
}
