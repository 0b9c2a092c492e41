//! Build artifacts
//!
//! `bytecode.bin` holds the raw creation code as hex, `abi.json` the
//! pretty-printed ABI. The deployer reads `bytecode.bin` back verbatim.

use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default bytecode artifact file name
pub const BYTECODE_FILE: &str = "bytecode.bin";

/// Default ABI artifact file name
pub const ABI_FILE: &str = "abi.json";

/// Artifact errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid bytecode hex: {0}")]
    InvalidHex(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ArtifactError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Hex encoded contract creation code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytecode {
    hex: String,
    bytes: Vec<u8>,
}

impl Bytecode {
    /// Validate a hex string (no `0x` prefix, even length)
    pub fn from_hex(hex_str: impl Into<String>) -> Result<Self, ArtifactError> {
        let hex = hex_str.into();
        let bytes = hex::decode(&hex).map_err(|e| ArtifactError::InvalidHex(e.to_string()))?;
        Ok(Self { hex, bytes })
    }

    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the decoded code in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Write the raw hex, no trailing newline
pub fn write_bytecode(path: &Path, bytecode: &Bytecode) -> Result<(), ArtifactError> {
    fs::write(path, bytecode.as_hex()).map_err(|e| ArtifactError::io(path, e))
}

/// Read a bytecode artifact
///
/// A trailing line break left by an editor is dropped; nothing else is
/// touched.
pub fn read_bytecode(path: &Path) -> Result<Bytecode, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))?;
    let text = text.trim_end_matches(['\n', '\r']);
    Bytecode::from_hex(text)
}

/// Write the ABI as two-space indented JSON
pub fn write_abi(path: &Path, abi: &serde_json::Value) -> Result<(), ArtifactError> {
    let file = fs::File::create(path).map_err(|e| ArtifactError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, abi)?;
    writer.flush().map_err(|e| ArtifactError::io(path, e))?;
    Ok(())
}
