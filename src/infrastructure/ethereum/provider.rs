//! Ethereum provider abstraction and the Alloy HTTP implementation
//!
//! The engine is written against the `EthereumProvider` trait; the Alloy
//! implementation signs locally for registered keys and falls back to
//! node-side signing for impersonated accounts on dev nodes. Non-standard
//! methods (dev-node balance setting, impersonation, liveness probing) go
//! through `raw_request`.

use std::time::Duration;

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{
    fillers::{
        BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
    },
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

/// Everything the engine needs from a per-network RPC endpoint.
///
/// All methods return `anyhow::Result`; transient transport failures pass
/// through unchanged (no retries at this layer). `send_transaction` and
/// `send_raw_transaction` wait for confirmation before returning, which is
/// what serializes the signer's nonce sequence across calls.
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn get_block_number(&self) -> Result<u64>;

    /// Deployed code at `address`; empty bytes for unallocated addresses.
    async fn get_code(&self, address: Address) -> Result<Bytes>;

    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Execute a read-only call (eth_call).
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Broadcast a transaction and wait for its receipt.
    ///
    /// Signs locally when `from` (or an unset `from`) maps to a registered
    /// key; otherwise hands the request to the node, which only works for
    /// impersonated accounts on dev nodes.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionReceipt>;

    /// Broadcast a pre-signed raw transaction and wait for its receipt.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TransactionReceipt>;

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>>;

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>>;

    /// EIP-1559 fee suggestion: (max_fee_per_gas, max_priority_fee_per_gas).
    async fn estimate_eip1559_fees(&self) -> Result<(u128, u128)>;

    /// Set an account balance on a dev node. Call sites treat failure as
    /// "not a dev node" and move on.
    async fn set_balance(&self, address: Address, balance: U256) -> Result<()>;

    /// Start impersonating `address` on a dev node.
    async fn impersonate_account(&self, address: Address) -> Result<()>;

    /// True when neither the hardhat nor the anvil metadata method answers,
    /// i.e. the endpoint is a live network rather than a dev node.
    async fn is_live_network(&self) -> Result<bool>;

    fn endpoint_name(&self) -> String;
}

// Type alias for the filled+signing provider stack.
type SignedHttpProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider,
    Ethereum,
>;

/// HTTP provider with locally-registered signers.
pub struct AlloyHttpProvider {
    provider: SignedHttpProvider,
    endpoint: String,
    signer_addresses: Vec<Address>,
}

impl AlloyHttpProvider {
    /// Connect to `url` with one or more local signing keys. The first
    /// signer is the default sender for requests without a `from` field.
    pub fn connect(url: &str, signers: Vec<PrivateKeySigner>) -> Result<Self> {
        anyhow::ensure!(!signers.is_empty(), "at least one signer is required");
        let rpc_url = url.parse().context("Invalid HTTP URL")?;

        let signer_addresses = signers.iter().map(|s| s.address()).collect();
        let mut iter = signers.into_iter();
        let mut wallet = EthereumWallet::from(iter.next().context("missing signer")?);
        for signer in iter {
            wallet.register_signer(signer);
        }

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url);
        Ok(Self {
            provider,
            endpoint: url.to_string(),
            signer_addresses,
        })
    }

    fn has_signer_for(&self, from: Option<Address>) -> bool {
        match from {
            None => true,
            Some(addr) => self.signer_addresses.contains(&addr),
        }
    }

    /// Poll for a receipt after node-side submission. Unbounded on purpose:
    /// this layer imposes no timeout beyond the transport's.
    async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyHttpProvider {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn get_block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        Ok(self.provider.call(request).await?)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionReceipt> {
        if self.has_signer_for(request.from) {
            let pending = self.provider.send_transaction(request).await?;
            Ok(pending.get_receipt().await?)
        } else {
            // Node-side signing; the impersonation path on dev nodes.
            let hash: B256 = self
                .provider
                .raw_request("eth_sendTransaction".into(), (request,))
                .await?;
            self.wait_for_receipt(hash).await
        }
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TransactionReceipt> {
        let pending = self.provider.send_raw_transaction(&raw).await?;
        Ok(pending.get_receipt().await?)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(self.provider.get_transaction_receipt(hash).await?)
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        Ok(self.provider.get_logs(filter).await?)
    }

    async fn estimate_eip1559_fees(&self) -> Result<(u128, u128)> {
        let estimate = self.provider.estimate_eip1559_fees().await?;
        Ok((estimate.max_fee_per_gas, estimate.max_priority_fee_per_gas))
    }

    async fn set_balance(&self, address: Address, balance: U256) -> Result<()> {
        let hex_balance = format!("0x{balance:x}");
        let result: std::result::Result<(), _> = self
            .provider
            .raw_request("hardhat_setBalance".into(), (address, &hex_balance))
            .await;
        if result.is_ok() {
            return Ok(());
        }
        self.provider
            .raw_request("anvil_setBalance".into(), (address, &hex_balance))
            .await
            .context("Failed to set balance (not a dev node?)")
    }

    async fn impersonate_account(&self, address: Address) -> Result<()> {
        let result: std::result::Result<(), _> = self
            .provider
            .raw_request("anvil_impersonateAccount".into(), (address,))
            .await;
        if result.is_ok() {
            return Ok(());
        }
        self.provider
            .raw_request("hardhat_impersonateAccount".into(), (address,))
            .await
            .context("Failed to impersonate account (not a dev node?)")
    }

    async fn is_live_network(&self) -> Result<bool> {
        let hardhat: std::result::Result<serde_json::Value, _> = self
            .provider
            .raw_request("hardhat_metadata".into(), ())
            .await;
        if hardhat.is_ok() {
            return Ok(false);
        }
        let anvil: std::result::Result<serde_json::Value, _> = self
            .provider
            .raw_request("anvil_metadata".into(), ())
            .await;
        Ok(anvil.is_err())
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
