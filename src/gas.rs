//! Execution-mode-aware gas pricing and deployment cost estimation
//!
//! One `GasPricingPolicy` lives for the duration of an orchestration run and
//! quotes fees exactly once, so every transaction in the run carries the
//! same fee fields. The fee-suggestion algorithm itself is behind the
//! `FeeQuoter` seam.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use tokio::sync::OnceCell;

use crate::core::{Error, ExecutionMode, Result};
use crate::infrastructure::ethereum::EthereumProvider;

/// EIP-1559 fee suggestion.
#[derive(Debug, Clone, Copy)]
pub struct FeeQuote {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// External fee-suggestion collaborator.
#[async_trait::async_trait]
pub trait FeeQuoter: Send + Sync {
    async fn quote(&self) -> anyhow::Result<FeeQuote>;
}

/// Default quoter: the node's own EIP-1559 estimation.
pub struct ProviderFeeQuoter {
    provider: Arc<dyn EthereumProvider>,
}

impl ProviderFeeQuoter {
    pub fn new(provider: Arc<dyn EthereumProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl FeeQuoter for ProviderFeeQuoter {
    async fn quote(&self) -> anyhow::Result<FeeQuote> {
        let (max_fee_per_gas, max_priority_fee_per_gas) =
            self.provider.estimate_eip1559_fees().await?;
        Ok(FeeQuote {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }
}

pub struct GasPricingPolicy {
    mode: ExecutionMode,
    quoter: Arc<dyn FeeQuoter>,
    quote: OnceCell<FeeQuote>,
}

impl GasPricingPolicy {
    pub fn new(mode: ExecutionMode, quoter: Arc<dyn FeeQuoter>) -> Self {
        Self {
            mode,
            quoter,
            quote: OnceCell::new(),
        }
    }

    /// Policy backed by the node's own fee estimation.
    pub fn for_provider(mode: ExecutionMode, provider: Arc<dyn EthereumProvider>) -> Self {
        Self::new(mode, Arc::new(ProviderFeeQuoter::new(provider)))
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Augment `tx` with fee fields appropriate to the execution mode.
    ///
    /// The quote is fetched on first use and reused for every subsequent
    /// transaction of this run.
    pub async fn overrides(&self, tx: TransactionRequest) -> Result<TransactionRequest> {
        let quote = self
            .quote
            .get_or_try_init(|| self.quoter.quote())
            .await
            .map_err(Error::Rpc)?;

        Ok(match self.mode {
            // Dev nodes accept legacy pricing; keeps simulated runs simple.
            ExecutionMode::LocalNetworkCli => tx.with_gas_price(quote.max_fee_per_gas),
            ExecutionMode::LiveNetworkCli | ExecutionMode::Platform => tx
                .with_max_fee_per_gas(quote.max_fee_per_gas)
                .with_max_priority_fee_per_gas(quote.max_priority_fee_per_gas),
        })
    }
}

/// Compiler-reported creation cost for one contract.
#[derive(Debug, Clone, Copy)]
pub struct CreationGasEstimate {
    pub total_cost: GasCost,
    pub code_deposit_cost: u128,
}

/// A gas figure the compiler may refuse to bound.
#[derive(Debug, Clone, Copy)]
pub enum GasCost {
    Bounded(u128),
    /// Constructor contains logic the compiler cannot statically cost.
    Unbounded,
}

/// Estimated total deployment cost for one contract.
///
/// When the total is unbounded, pads the code-deposit cost by 1.5x to cover
/// the constructor execution.
pub fn estimate_deployment_cost(estimate: &CreationGasEstimate) -> u128 {
    match estimate.total_cost {
        GasCost::Bounded(total) => total,
        GasCost::Unbounded => estimate.code_deposit_cost * 3 / 2,
    }
}
