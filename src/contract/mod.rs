//! Solidity contract build module
//!
//! Compiles a Solidity source with `solc` and persists the artifacts the
//! deployer consumes.
//!
//! # Overview
//!
//! This module implements:
//! - Standard-JSON request and response types
//! - A compiler seam with a `solc` process implementation
//! - Bytecode and ABI artifact files
//! - The compile-then-persist pipeline
//!
//! # Example
//!
//! ```no_run
//! use contract_pipeline::contract::{build_contract, BuildConfig, Solc};
//!
//! let report = build_contract(&Solc::default(), &BuildConfig::default()).unwrap();
//! println!("{} bytes of bytecode", report.bytecode_size());
//! ```

pub mod artifact;
pub mod build;
pub mod compiler;
pub mod input;
pub mod output;

pub use artifact::{read_bytecode, ArtifactError, Bytecode, ABI_FILE, BYTECODE_FILE};
pub use build::{build_contract, build_contract_with, BuildConfig, BuildError, BuildReport};
pub use compiler::{CompilerError, Solc, SolidityCompiler};
pub use input::{CompilerInput, OptimizerSettings, DEFAULT_OPTIMIZER_RUNS};
pub use output::{CompiledContract, CompilerOutput, Diagnostic, Severity};
