//! Shared mock provider for orchestration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom};
use alloy::primitives::{Address, Bloom, Bytes, LogData, B256, U256};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use stencil::EthereumProvider;

pub type CallHandler = Box<dyn Fn(&TransactionRequest) -> anyhow::Result<Bytes> + Send + Sync>;
pub type SendHandler = Box<dyn Fn(&TransactionRequest) -> anyhow::Result<()> + Send + Sync>;

/// Scriptable in-memory chain endpoint.
#[derive(Default)]
pub struct MockProvider {
    pub chain_id: u64,
    pub live: bool,
    pub code: Mutex<HashMap<Address, Bytes>>,
    pub sent: Mutex<Vec<TransactionRequest>>,
    pub raw_sent: Mutex<Vec<Bytes>>,
    pub logs: Mutex<Vec<Log>>,
    pub receipts: Mutex<HashMap<B256, TransactionReceipt>>,
    pub balances: Mutex<HashMap<Address, U256>>,
    pub impersonated: Mutex<Vec<Address>>,
    /// Answers eth_call; tests install contract behavior here.
    pub call_handler: Mutex<Option<CallHandler>>,
    /// Observes every sent transaction; lets tests mutate contract state.
    pub send_handler: Mutex<Option<SendHandler>>,
    /// Code installed (in order) as a side effect of sent transactions,
    /// emulating contract deployments.
    pub install_on_send: Mutex<Vec<(Address, Bytes)>>,
    /// Code installed as a side effect of raw broadcasts (the factory path).
    pub install_on_raw: Mutex<Vec<(Address, Bytes)>>,
    /// When set, every raw broadcast fails with this message.
    pub raw_failure: Option<String>,
}

impl MockProvider {
    pub fn new(chain_id: u64, live: bool) -> Self {
        Self {
            chain_id,
            live,
            ..Default::default()
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn set_code(&self, address: Address, code: Bytes) {
        self.code.lock().unwrap().insert(address, code);
    }
}

pub fn dummy_receipt(hash: B256) -> TransactionReceipt {
    TransactionReceipt {
        inner: ReceiptEnvelope::Legacy(ReceiptWithBloom {
            receipt: Receipt {
                status: Eip658Value::Eip658(true),
                cumulative_gas_used: 21_000,
                logs: vec![],
            },
            logs_bloom: Bloom::ZERO,
        }),
        transaction_hash: hash,
        transaction_index: Some(0),
        block_hash: None,
        block_number: None,
        gas_used: 21_000,
        effective_gas_price: 1_000_000_000,
        blob_gas_used: None,
        blob_gas_price: None,
        from: Address::ZERO,
        to: None,
        contract_address: None,
    }
}

/// A minimal execution-log entry pointing at `tx_hash`.
pub fn execution_log(module: Address, topics: Vec<B256>, tx_hash: B256) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: module,
            data: LogData::new_unchecked(topics, Bytes::new()),
        },
        block_hash: None,
        block_number: None,
        block_timestamp: None,
        transaction_hash: Some(tx_hash),
        transaction_index: None,
        log_index: None,
        removed: false,
    }
}

#[async_trait::async_trait]
impl EthereumProvider for MockProvider {
    async fn chain_id(&self) -> anyhow::Result<u64> {
        Ok(self.chain_id)
    }

    async fn get_block_number(&self) -> anyhow::Result<u64> {
        Ok(1)
    }

    async fn get_code(&self, address: Address) -> anyhow::Result<Bytes> {
        Ok(self
            .code
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_balance(&self, address: Address) -> anyhow::Result<U256> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn call(&self, request: TransactionRequest) -> anyhow::Result<Bytes> {
        let handler = self.call_handler.lock().unwrap();
        match handler.as_ref() {
            Some(handler) => handler(&request),
            None => anyhow::bail!("unexpected eth_call in mock"),
        }
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> anyhow::Result<TransactionReceipt> {
        if let Some(handler) = self.send_handler.lock().unwrap().as_ref() {
            handler(&request)?;
        }
        if let Some((address, code)) = {
            let mut pending = self.install_on_send.lock().unwrap();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        } {
            self.set_code(address, code);
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(request);
        Ok(dummy_receipt(B256::from(U256::from(sent.len()))))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> anyhow::Result<TransactionReceipt> {
        if let Some(message) = &self.raw_failure {
            anyhow::bail!("{message}");
        }
        if let Some((address, code)) = {
            let mut pending = self.install_on_raw.lock().unwrap();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        } {
            self.set_code(address, code);
        }

        let mut raw_sent = self.raw_sent.lock().unwrap();
        raw_sent.push(raw);
        Ok(dummy_receipt(B256::from(U256::from(raw_sent.len() + 1000))))
    }

    async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> anyhow::Result<Option<TransactionReceipt>> {
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }

    async fn get_logs(&self, _filter: &Filter) -> anyhow::Result<Vec<Log>> {
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn estimate_eip1559_fees(&self) -> anyhow::Result<(u128, u128)> {
        Ok((2_000_000_000, 1_000_000_000))
    }

    async fn set_balance(&self, address: Address, balance: U256) -> anyhow::Result<()> {
        anyhow::ensure!(!self.live, "not a dev node");
        self.balances.lock().unwrap().insert(address, balance);
        Ok(())
    }

    async fn impersonate_account(&self, address: Address) -> anyhow::Result<()> {
        anyhow::ensure!(!self.live, "not a dev node");
        self.impersonated.lock().unwrap().push(address);
        Ok(())
    }

    async fn is_live_network(&self) -> anyhow::Result<bool> {
        Ok(self.live)
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}
