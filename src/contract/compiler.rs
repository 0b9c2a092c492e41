//! Solidity compiler driver
//!
//! Talks to `solc` through its standard-JSON interface.

use crate::contract::input::CompilerInput;
use crate::contract::output::CompilerOutput;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Compiler errors
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Failed to run {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Compiler exited with {status}: {stderr}")]
    Process { status: String, stderr: String },
    #[error("Invalid compiler output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

/// Anything that accepts a standard-JSON request and answers with a
/// standard-JSON response
pub trait SolidityCompiler {
    /// Compile a raw JSON request
    fn compile_json(&self, input: &str) -> Result<String, CompilerError>;

    /// Compile a typed request and parse the response
    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput, CompilerError> {
        let request = serde_json::to_string(input)?;
        let response = self.compile_json(&request)?;
        Ok(serde_json::from_str(&response)?)
    }
}

/// The native `solc` binary
#[derive(Debug, Clone)]
pub struct Solc {
    path: PathBuf,
}

impl Solc {
    /// Use the binary at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// First line of `solc --version` that carries the version
    pub fn version(&self) -> Result<String, CompilerError> {
        let output = Command::new(&self.path)
            .arg("--version")
            .output()
            .map_err(|source| CompilerError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .find(|l| l.starts_with("Version:"))
            .map(|l| l.trim_start_matches("Version:").trim().to_string())
            .unwrap_or_else(|| stdout.trim().to_string()))
    }
}

impl Default for Solc {
    fn default() -> Self {
        Self::new("solc")
    }
}

impl SolidityCompiler for Solc {
    fn compile_json(&self, input: &str) -> Result<String, CompilerError> {
        let spawn_err = |source: std::io::Error| CompilerError::Spawn {
            path: self.path.clone(),
            source,
        };

        log::debug!("Running {:?} --standard-json", self.path);

        let mut child = Command::new(&self.path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(spawn_err)?;
        }

        let output = child.wait_with_output().map_err(spawn_err)?;

        // solc reports compile errors in the JSON body and still exits 0
        if !output.status.success() {
            return Err(CompilerError::Process {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
