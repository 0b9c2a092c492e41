//! Hedera deployment module
//!
//! Creates a compiled contract on a Hedera network and checks that it
//! answers a read-only call.
//!
//! # Features
//! - Operator identity injected from configuration
//! - A `LedgerClient` seam with a Hedera SDK implementation
//! - Explicit deployment stages, observable on failure
//! - Guaranteed client release on every exit path

pub mod client;
pub mod deploy;
pub mod hedera;
pub mod identity;

pub use client::{
    ContractCallRequest, ContractCreateRequest, CreateReceipt, LedgerClient, NetworkError,
    SubmittedTransaction,
};
pub use deploy::{
    decode_uint256, DeployConfig, DeployError, DeployStage, Deployer, Deployment, VerifyFailure,
    DEFAULT_CREATE_GAS, DEFAULT_MAX_CHUNKS, DEFAULT_QUERY_GAS, DEFAULT_VERIFY_FUNCTION,
};
pub use hedera::{HederaClient, HederaNetwork};
pub use identity::{IdentityError, KeyType, OperatorIdentity, SecretKey};
