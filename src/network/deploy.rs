//! Deploy-then-verify pipeline
//!
//! Walks a fixed sequence of stages:
//!
//! ```text
//! Uninitialized -> Connected -> BytecodeLoaded -> Submitted -> Created -> Verifying -> Verified
//! ```
//!
//! Any error moves the deployer to `Failed` and records the stage it failed
//! in. Once a client exists it is closed on every exit path. A contract that
//! reached `Created` stays on the ledger even when verification fails.

use crate::contract::artifact::{self, ArtifactError, BYTECODE_FILE};
use crate::network::client::{ContractCallRequest, ContractCreateRequest, LedgerClient, NetworkError};
use crate::network::hedera::HederaNetwork;
use primitive_types::U256;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Gas limit for the contract-creation transaction
pub const DEFAULT_CREATE_GAS: u64 = 30_000_000;

/// Maximum file-append chunks for large bytecode
pub const DEFAULT_MAX_CHUNKS: usize = 30;

/// Gas allowance for the verification query
pub const DEFAULT_QUERY_GAS: u64 = 100_000;

/// Read-only function called after creation
pub const DEFAULT_VERIFY_FUNCTION: &str = "jobCount";

/// ABI word size
const WORD_SIZE: usize = 32;

/// Deployment stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    Uninitialized,
    Connected,
    BytecodeLoaded,
    Submitted,
    Created,
    Verifying,
    Verified,
    Failed,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStage::Uninitialized => "uninitialized",
            DeployStage::Connected => "connected",
            DeployStage::BytecodeLoaded => "bytecode-loaded",
            DeployStage::Submitted => "submitted",
            DeployStage::Created => "created",
            DeployStage::Verifying => "verifying",
            DeployStage::Verified => "verified",
            DeployStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a created contract could not be verified
#[derive(Error, Debug)]
pub enum VerifyFailure {
    #[error("query failed: {0}")]
    Query(NetworkError),
    #[error("result is {0} bytes, expected at least 32")]
    ShortResult(usize),
    #[error("{function}() returned {actual}, expected {expected}")]
    Unexpected {
        function: String,
        expected: U256,
        actual: U256,
    },
}

/// Deployment errors
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Failed to connect: {0}")]
    Connect(NetworkError),
    #[error("Bytecode artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Contract creation failed: {0}")]
    Creation(NetworkError),
    #[error("Receipt for {transaction_id} carries no contract id")]
    MissingContractId { transaction_id: String },
    #[error("Contract {contract_id} was created but not verified: {reason}")]
    Unverified {
        contract_id: String,
        transaction_id: String,
        #[source]
        reason: VerifyFailure,
    },
}

impl DeployError {
    /// Contract left on the ledger by a failed run
    pub fn orphaned_contract(&self) -> Option<&str> {
        match self {
            DeployError::Unverified { contract_id, .. } => Some(contract_id),
            _ => None,
        }
    }
}

/// Deployment configuration
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub bytecode_path: PathBuf,
    pub network: HederaNetwork,
    pub create_gas: u64,
    pub max_chunks: usize,
    pub query_gas: u64,
    pub verify_function: String,
    /// Value the verification call must return, if any
    pub expected_value: Option<U256>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            bytecode_path: PathBuf::from(BYTECODE_FILE),
            network: HederaNetwork::default(),
            create_gas: DEFAULT_CREATE_GAS,
            max_chunks: DEFAULT_MAX_CHUNKS,
            query_gas: DEFAULT_QUERY_GAS,
            verify_function: DEFAULT_VERIFY_FUNCTION.to_string(),
            expected_value: Some(U256::zero()),
        }
    }
}

/// A created and verified contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract_id: String,
    pub transaction_id: String,
    pub explorer_url: String,
    pub verified_value: U256,
}

/// Runs one deployment
pub struct Deployer {
    config: DeployConfig,
    stage: DeployStage,
    failed_at: Option<DeployStage>,
}

impl Deployer {
    pub fn new(config: DeployConfig) -> Self {
        Self {
            config,
            stage: DeployStage::Uninitialized,
            failed_at: None,
        }
    }

    pub fn stage(&self) -> DeployStage {
        self.stage
    }

    /// Last stage reached before failing
    pub fn failed_at(&self) -> Option<DeployStage> {
        self.failed_at
    }

    /// Connect with `connect`, deploy, verify, and close the client
    pub async fn run<C, F>(&mut self, connect: F) -> Result<Deployment, DeployError>
    where
        C: LedgerClient,
        F: FnOnce() -> Result<C, NetworkError>,
    {
        self.stage = DeployStage::Uninitialized;
        self.failed_at = None;

        let mut client = match connect() {
            Ok(client) => client,
            Err(e) => return Err(self.fail(DeployError::Connect(e))),
        };
        self.advance(DeployStage::Connected);
        println!("👤 Operator: {}", client.operator());

        let result = self.drive(&mut client).await;
        client.close().await;

        result.map_err(|e| self.fail(e))
    }

    async fn drive<C: LedgerClient>(&mut self, client: &mut C) -> Result<Deployment, DeployError> {
        let bytecode = artifact::read_bytecode(&self.config.bytecode_path)?;
        println!(
            "📦 Loaded {} bytes of bytecode from {}",
            bytecode.size(),
            self.config.bytecode_path.display()
        );
        self.advance(DeployStage::BytecodeLoaded);

        let request = ContractCreateRequest {
            bytecode: bytecode.to_bytes(),
            gas: self.config.create_gas,
            max_chunks: self.config.max_chunks,
        };

        println!("🚀 Creating contract...");
        let submitted = client
            .create_contract(&request)
            .await
            .map_err(DeployError::Creation)?;
        self.advance(DeployStage::Submitted);

        let receipt = client
            .get_receipt(&submitted)
            .await
            .map_err(DeployError::Creation)?;
        let contract_id = receipt
            .contract_id
            .ok_or_else(|| DeployError::MissingContractId {
                transaction_id: submitted.transaction_id.clone(),
            })?;
        self.advance(DeployStage::Created);

        let explorer_url = self.config.network.explorer_contract_url(&contract_id);
        println!("✅ Contract deployed!");
        println!("   ├─ Contract ID: {}", contract_id);
        println!("   ├─ Transaction ID: {}", submitted.transaction_id);
        println!("   └─ HashScan: {}", explorer_url);

        self.advance(DeployStage::Verifying);
        println!("\n🔍 Calling {}()...", self.config.verify_function);
        let value = self
            .verify(client, &contract_id)
            .await
            .map_err(|reason| DeployError::Unverified {
                contract_id: contract_id.clone(),
                transaction_id: submitted.transaction_id.clone(),
                reason,
            })?;
        println!("   └─ {}() = {}", self.config.verify_function, value);
        self.advance(DeployStage::Verified);

        Ok(Deployment {
            contract_id,
            transaction_id: submitted.transaction_id,
            explorer_url,
            verified_value: value,
        })
    }

    async fn verify<C: LedgerClient>(
        &self,
        client: &mut C,
        contract_id: &str,
    ) -> Result<U256, VerifyFailure> {
        let request = ContractCallRequest {
            contract_id: contract_id.to_string(),
            gas: self.config.query_gas,
            function: self.config.verify_function.clone(),
        };

        let raw = client
            .call_contract(&request)
            .await
            .map_err(VerifyFailure::Query)?;
        let value = decode_uint256(&raw)?;

        match self.config.expected_value {
            Some(expected) if expected != value => Err(VerifyFailure::Unexpected {
                function: self.config.verify_function.clone(),
                expected,
                actual: value,
            }),
            _ => Ok(value),
        }
    }

    fn advance(&mut self, stage: DeployStage) {
        log::debug!("Deployment stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn fail(&mut self, error: DeployError) -> DeployError {
        log::error!("Deployment failed while {}: {}", self.stage, error);
        self.failed_at = Some(self.stage);
        self.stage = DeployStage::Failed;
        error
    }
}

/// First ABI word of a call result as uint256
pub fn decode_uint256(raw: &[u8]) -> Result<U256, VerifyFailure> {
    if raw.len() < WORD_SIZE {
        return Err(VerifyFailure::ShortResult(raw.len()));
    }
    Ok(U256::from_big_endian(&raw[..WORD_SIZE]))
}
