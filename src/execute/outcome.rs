//! Outcome contract between the coordinator and the attempt procedure

use alloy::rpc::types::TransactionReceipt;

use crate::execute::DeploymentContext;

/// Resolution of one deployment attempt, as a tagged outcome the coordinator
/// matches exhaustively. Totality of the handling is checked by the
/// compiler, not by convention.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The committed batch was broadcast and confirmed.
    Success { receipts: Vec<TransactionReceipt> },
    /// The module contract reports this root as already finalized; nothing
    /// was broadcast.
    AlreadyExecuted,
    /// An action reverted during broadcast. Carries the human-readable
    /// revert reason verbatim.
    ExecutionFailed { reason: String },
    /// The attempt failed before producing any of the above.
    Error { message: String },
}

/// The opaque external deployment-attempt procedure: simulation, approval
/// verification and broadcast against the on-chain module contract.
#[async_trait::async_trait]
pub trait DeploymentAttempt: Send + Sync {
    async fn attempt(&self, ctx: &DeploymentContext) -> anyhow::Result<AttemptOutcome>;
}

/// How a network's run resolved. Only terminal, receipt-bearing states
/// appear here; a failed network aborts the run with a typed error instead
/// of producing a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRunStatus {
    Succeeded,
    AlreadyExecuted,
}

/// Per-network result of a coordinator run.
#[derive(Debug)]
pub struct NetworkResult {
    pub network: crate::networks::Network,
    pub status: NetworkRunStatus,
    pub receipts: Vec<TransactionReceipt>,
}
