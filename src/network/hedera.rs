//! Hedera implementation of [`LedgerClient`]

use crate::network::client::{
    ContractCallRequest, ContractCreateRequest, CreateReceipt, LedgerClient, NetworkError,
    SubmittedTransaction,
};
use crate::network::identity::{KeyType, OperatorIdentity};
use async_trait::async_trait;
use hedera::{
    AccountId, Client, ContractCallQuery, ContractCreateFlow, ContractId, PrivateKey,
    TransactionResponse,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Hedera networks the client can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HederaNetwork {
    #[default]
    Testnet,
    Previewnet,
    Mainnet,
}

impl HederaNetwork {
    pub fn name(&self) -> &'static str {
        match self {
            HederaNetwork::Testnet => "testnet",
            HederaNetwork::Previewnet => "previewnet",
            HederaNetwork::Mainnet => "mainnet",
        }
    }

    /// HashScan page for a contract
    pub fn explorer_contract_url(&self, contract_id: &str) -> String {
        format!("https://hashscan.io/{}/contract/{}", self.name(), contract_id)
    }
}

impl fmt::Display for HederaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HederaNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(HederaNetwork::Testnet),
            "previewnet" => Ok(HederaNetwork::Previewnet),
            "mainnet" => Ok(HederaNetwork::Mainnet),
            other => Err(format!(
                "unknown network {:?}, expected testnet, previewnet or mainnet",
                other
            )),
        }
    }
}

fn sdk_err(e: hedera::Error) -> NetworkError {
    NetworkError::Sdk(e.to_string())
}

/// Client for one Hedera network under one operator
pub struct HederaClient {
    client: Option<Client>,
    operator: String,
    pending: HashMap<String, TransactionResponse>,
}

impl HederaClient {
    /// Build a client and set its operator
    ///
    /// Must be called from inside a tokio runtime.
    pub fn connect(network: HederaNetwork, identity: &OperatorIdentity) -> Result<Self, NetworkError> {
        let account_id =
            AccountId::from_str(&identity.account_id).map_err(|e| NetworkError::InvalidInput {
                what: "account id",
                reason: e.to_string(),
            })?;

        let key = match identity.key_type {
            KeyType::Ecdsa => PrivateKey::from_str_ecdsa(identity.private_key.expose()),
            KeyType::Ed25519 => PrivateKey::from_str_ed25519(identity.private_key.expose()),
        }
        .map_err(|e| NetworkError::InvalidInput {
            what: "private key",
            reason: e.to_string(),
        })?;

        let client = match network {
            HederaNetwork::Testnet => Client::for_testnet(),
            HederaNetwork::Previewnet => Client::for_previewnet(),
            HederaNetwork::Mainnet => Client::for_mainnet(),
        };
        client.set_operator(account_id, key);

        log::info!("Connected to Hedera {} as {}", network, identity.account_id);

        Ok(Self {
            client: Some(client),
            operator: identity.account_id.clone(),
            pending: HashMap::new(),
        })
    }

    fn client(&self) -> Result<&Client, NetworkError> {
        self.client.as_ref().ok_or(NetworkError::Closed)
    }
}

#[async_trait(?Send)]
impl LedgerClient for HederaClient {
    fn operator(&self) -> &str {
        &self.operator
    }

    async fn create_contract(
        &mut self,
        request: &ContractCreateRequest,
    ) -> Result<SubmittedTransaction, NetworkError> {
        let client = self.client()?;

        let response = ContractCreateFlow::new()
            .bytecode(request.bytecode.clone())
            .gas(request.gas)
            .max_chunks(request.max_chunks)
            .execute(client)
            .await
            .map_err(sdk_err)?;

        let transaction_id = response.transaction_id.to_string();
        log::debug!("Contract create submitted: {}", transaction_id);
        self.pending.insert(transaction_id.clone(), response);

        Ok(SubmittedTransaction { transaction_id })
    }

    async fn get_receipt(
        &mut self,
        submitted: &SubmittedTransaction,
    ) -> Result<CreateReceipt, NetworkError> {
        // Closed takes precedence over an unknown transaction
        let client = self.client.as_ref().ok_or(NetworkError::Closed)?;
        let response = self
            .pending
            .remove(&submitted.transaction_id)
            .ok_or_else(|| NetworkError::UnknownTransaction(submitted.transaction_id.clone()))?;

        // get_receipt fails on any status other than SUCCESS
        let receipt = response
            .get_receipt(client)
            .await
            .map_err(|e| NetworkError::Rejected(e.to_string()))?;

        Ok(CreateReceipt {
            status: format!("{:?}", receipt.status),
            contract_id: receipt.contract_id.map(|id| id.to_string()),
        })
    }

    async fn call_contract(&mut self, request: &ContractCallRequest) -> Result<Vec<u8>, NetworkError> {
        let client = self.client()?;
        let contract_id =
            ContractId::from_str(&request.contract_id).map_err(|e| NetworkError::InvalidInput {
                what: "contract id",
                reason: e.to_string(),
            })?;

        let result = ContractCallQuery::new()
            .contract_id(contract_id)
            .gas(request.gas)
            .function(&request.function)
            .execute(client)
            .await
            .map_err(sdk_err)?;

        Ok(result.bytes)
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            self.pending.clear();
            log::debug!("Hedera client closed");
        }
    }
}
