//! Sequential multi-network execution of a committed deployment

use std::collections::HashSet;
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::{Filter, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol;
use alloy_sol_types::{SolCall, SolEvent};

use crate::core::{
    ApprovalSignature, Error, ExecutionMode, Progress, Result, RootState,
};
use crate::execute::outcome::{AttemptOutcome, DeploymentAttempt, NetworkResult, NetworkRunStatus};
use crate::infrastructure::ethereum::EthereumProvider;
use crate::networks::Network;

sol! {
    /// The on-chain module verifying approvals and executing a committed
    /// action batch on behalf of the fund-holding contract. Opaque here; we
    /// only read its root state and execution log.
    interface IDeploymentModule {
        function rootStates(bytes32 root) external view returns (uint8);
        event RootActionExecuted(bytes32 indexed root, uint256 index);
    }
}

/// One network to execute the committed deployment on.
pub struct NetworkTarget {
    pub network: Network,
    pub provider: Arc<dyn EthereumProvider>,
    pub module_address: Address,
    pub safe_address: Address,
}

/// Hooks for injecting/removing simulation roles. Meaningful only for
/// locally-simulated networks; live execution always uses the no-op.
#[async_trait::async_trait]
pub trait RoleHooks: Send + Sync {
    async fn inject(&self, ctx: &DeploymentContext) -> anyhow::Result<()>;
    async fn remove(&self, ctx: &DeploymentContext) -> anyhow::Result<()>;
}

pub struct NoopRoleHooks;

#[async_trait::async_trait]
impl RoleHooks for NoopRoleHooks {
    async fn inject(&self, _ctx: &DeploymentContext) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove(&self, _ctx: &DeploymentContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Per-network execution state handed to the attempt procedure.
///
/// Exclusively owned by the coordinator for one network's run; never shared
/// across networks.
pub struct DeploymentContext {
    pub network: Network,
    pub chain_id: u64,
    pub module_address: Address,
    pub safe_address: Address,
    pub merkle_root: B256,
    /// Root state as reported by the module contract before the attempt.
    pub root_state: RootState,
    /// Collected approvals over the root identifier.
    pub signatures: Vec<ApprovalSignature>,
    pub mode: ExecutionMode,
    pub provider: Arc<dyn EthereumProvider>,
    pub role_hooks: Arc<dyn RoleHooks>,
}

/// Drives the external attempt procedure across networks strictly in input
/// order. A fatal failure on network N aborts before network N+1; results
/// already broadcast on earlier networks stay broadcast, since on-chain
/// effects cannot be rolled back.
pub struct DeploymentExecutionCoordinator<A> {
    attempt: A,
    signer: PrivateKeySigner,
    mode: ExecutionMode,
}

impl<A: DeploymentAttempt> DeploymentExecutionCoordinator<A> {
    /// `signer` is the single configured key whose approval signature is
    /// reused on every network.
    pub fn new(attempt: A, signer: PrivateKeySigner, mode: ExecutionMode) -> Self {
        Self {
            attempt,
            signer,
            mode,
        }
    }

    pub async fn run(
        &self,
        merkle_root: B256,
        targets: &[NetworkTarget],
        progress: &dyn Progress,
    ) -> Result<Vec<NetworkResult>> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            // Each network fully resolves before the next begins; this is
            // also what keeps the abort order deterministic.
            let result = self.run_network(merkle_root, target, progress).await?;
            results.push(result);
        }
        Ok(results)
    }

    async fn run_network(
        &self,
        merkle_root: B256,
        target: &NetworkTarget,
        progress: &dyn Progress,
    ) -> Result<NetworkResult> {
        progress.start(&format!("Executing on {}...", target.network.name()));

        let root_state =
            read_root_state(target.provider.as_ref(), target.module_address, merkle_root).await?;

        let signature = self
            .signer
            .sign_hash(&merkle_root)
            .await
            .map_err(|e| Error::Configuration(format!("failed to sign merkle root: {e}")))?;

        let ctx = DeploymentContext {
            network: target.network,
            chain_id: target.network.chain_id(),
            module_address: target.module_address,
            safe_address: target.safe_address,
            merkle_root,
            root_state,
            signatures: vec![ApprovalSignature {
                signer: self.signer.address(),
                signature: Bytes::from(signature.as_bytes().to_vec()),
            }],
            mode: self.mode,
            provider: target.provider.clone(),
            role_hooks: Arc::new(NoopRoleHooks),
        };

        tracing::info!(network = target.network.name(), root = %merkle_root, "attempting deployment");
        let outcome = self.attempt.attempt(&ctx).await?;

        match outcome {
            AttemptOutcome::Success { receipts } => {
                if receipts.is_empty() {
                    return Err(Error::UnexpectedState(format!(
                        "deployment on {} reported success without receipts",
                        target.network.name()
                    )));
                }
                progress.succeed(&format!("Executed on {}", target.network.name()));
                Ok(NetworkResult {
                    network: target.network,
                    status: NetworkRunStatus::Succeeded,
                    receipts,
                })
            }
            AttemptOutcome::AlreadyExecuted => {
                // Idempotent re-entry: recover the historical receipts from
                // the module's execution log instead of re-broadcasting.
                let receipts = fetch_executed_receipts(
                    target.provider.as_ref(),
                    target.module_address,
                    merkle_root,
                )
                .await?;
                if receipts.is_empty() {
                    return Err(Error::UnexpectedState(format!(
                        "root {merkle_root} reported as executed on {} but its \
                         execution log is empty",
                        target.network.name()
                    )));
                }
                progress.succeed(&format!(
                    "Already executed on {}, recovered receipts",
                    target.network.name()
                ));
                Ok(NetworkResult {
                    network: target.network,
                    status: NetworkRunStatus::AlreadyExecuted,
                    receipts,
                })
            }
            AttemptOutcome::ExecutionFailed { reason } => {
                progress.fail(&format!(
                    "Action reverted on {}: {reason}",
                    target.network.name()
                ));
                Err(Error::ExecutionFailure { reason })
            }
            AttemptOutcome::Error { message } => {
                progress.fail(&message);
                Err(Error::Deployment(message))
            }
        }
    }
}

async fn read_root_state(
    provider: &dyn EthereumProvider,
    module: Address,
    root: B256,
) -> Result<RootState> {
    let call = IDeploymentModule::rootStatesCall { root };
    let ret = provider
        .call(
            TransactionRequest::default()
                .with_to(module)
                .with_input(Bytes::from(call.abi_encode())),
        )
        .await?;
    let raw = IDeploymentModule::rootStatesCall::abi_decode_returns(&ret)
        .map_err(|e| Error::UnexpectedState(format!("undecodable root state: {e}")))?;
    RootState::from_u8(raw)
}

/// Receipts of the transactions that executed `root`, recovered from the
/// module contract's execution log.
pub async fn fetch_executed_receipts(
    provider: &dyn EthereumProvider,
    module: Address,
    root: B256,
) -> Result<Vec<TransactionReceipt>> {
    let filter = Filter::new()
        .address(module)
        .event_signature(IDeploymentModule::RootActionExecuted::SIGNATURE_HASH)
        .topic1(root);
    let logs = provider.get_logs(&filter).await?;

    let mut seen = HashSet::new();
    let mut receipts = Vec::new();
    for log in logs {
        let Some(hash) = log.transaction_hash else {
            continue;
        };
        if !seen.insert(hash) {
            continue;
        }
        if let Some(receipt) = provider.get_transaction_receipt(hash).await? {
            receipts.push(receipt);
        }
    }
    Ok(receipts)
}
