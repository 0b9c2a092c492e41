//! Ledger client seam
//!
//! The operations the deployer needs from a network SDK. `HederaClient`
//! is the real implementation; tests plug in an in-memory one.

use async_trait::async_trait;
use thiserror::Error;

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Invalid {what}: {reason}")]
    InvalidInput { what: &'static str, reason: String },
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),
    #[error("SDK error: {0}")]
    Sdk(String),
    #[error("Client is closed")]
    Closed,
}

/// A contract-creation transaction
#[derive(Debug, Clone)]
pub struct ContractCreateRequest {
    pub bytecode: Vec<u8>,
    pub gas: u64,
    /// Upper bound on file-append chunks for large bytecode
    pub max_chunks: usize,
}

/// A submitted, not yet final, transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub transaction_id: String,
}

/// Receipt of a finalized contract creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReceipt {
    pub status: String,
    pub contract_id: Option<String>,
}

/// A read-only call without arguments
#[derive(Debug, Clone)]
pub struct ContractCallRequest {
    pub contract_id: String,
    pub gas: u64,
    pub function: String,
}

/// Connected client bound to one network and operator
#[async_trait(?Send)]
pub trait LedgerClient {
    /// Operator account paying for transactions
    fn operator(&self) -> &str;

    /// Submit a contract creation; resolves once the network accepted it
    async fn create_contract(
        &mut self,
        request: &ContractCreateRequest,
    ) -> Result<SubmittedTransaction, NetworkError>;

    /// Wait for consensus on a submitted transaction
    async fn get_receipt(
        &mut self,
        submitted: &SubmittedTransaction,
    ) -> Result<CreateReceipt, NetworkError>;

    /// Run a query call and return the raw ABI encoded result
    async fn call_contract(&mut self, request: &ContractCallRequest) -> Result<Vec<u8>, NetworkError>;

    /// Release the connection
    async fn close(&mut self);
}
