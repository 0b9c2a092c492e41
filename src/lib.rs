//! Contract Pipeline: compile Solidity contracts and deploy them to Hedera
//!
//! This crate provides the two halves of a contract release:
//! - Compiling a Solidity source through `solc --standard-json` with a
//!   fixed optimizer configuration
//! - Writing `bytecode.bin` and `abi.json` only when compilation is clean
//! - Creating the contract on a Hedera network under an injected operator
//! - Verifying the new contract with a read-only call
//!
//! Deploying is not idempotent: every successful run creates a new contract
//! and pays its fees. A contract created by a run whose verification fails
//! stays on the network.
//!
//! # Example
//!
//! ```no_run
//! use contract_pipeline::contract::{build_contract, BuildConfig, Solc};
//! use contract_pipeline::network::{DeployConfig, Deployer, HederaClient, KeyType, OperatorIdentity};
//!
//! # async fn release() -> Result<(), Box<dyn std::error::Error>> {
//! // Compile
//! let report = build_contract(&Solc::default(), &BuildConfig::default())?;
//! println!("Bytecode size: {} bytes", report.bytecode_size());
//!
//! // Deploy
//! let identity = OperatorIdentity::new("0.0.1234", "<hex key>", KeyType::Ecdsa)?;
//! let config = DeployConfig::default();
//! let network = config.network;
//! let deployment = Deployer::new(config)
//!     .run(|| HederaClient::connect(network, &identity))
//!     .await?;
//! println!("Contract ID: {}", deployment.contract_id);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod contract;
pub mod network;

// Re-export commonly used types
pub use contract::{build_contract, BuildConfig, BuildError, BuildReport, Bytecode, Solc};
pub use network::{
    DeployConfig, DeployError, DeployStage, Deployer, Deployment, HederaClient, HederaNetwork,
    OperatorIdentity,
};
