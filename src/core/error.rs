//! Typed errors for the orchestration engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the deployment engine.
///
/// None of these are retried by this layer. Transport failures pass through
/// `Rpc` unchanged; retry policy belongs to the transport.
#[derive(Debug, Error)]
pub enum Error {
    /// User-fixable setup problem: missing signer/secret, unsupported
    /// network/authority combination, archived funding-rule reuse.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fatal, bug-indicating failure: address mismatch after a deterministic
    /// deploy, code missing after a confirmed broadcast, unfunded factory
    /// bootstrap. Aborts the run.
    #[error("deployment error: {0}")]
    Deployment(String),

    /// An action reverted during broadcast. Fatal for that network, reported
    /// with the revert reason verbatim.
    #[error("action reverted during execution: {reason}")]
    ExecutionFailure { reason: String },

    /// A chain id outside the closed network catalog.
    #[error("chain id {chain_id} is not a supported network")]
    UnsupportedNetwork { chain_id: u64 },

    /// On-chain state that the engine's invariants say cannot happen.
    #[error("unexpected on-chain state: {0}")]
    UnexpectedState(String),

    /// Transport-level RPC failure, surfaced unchanged to the caller.
    #[error(transparent)]
    Rpc(#[from] anyhow::Error),
}

impl Error {
    /// True if the underlying RPC error message contains `needle`.
    ///
    /// Used to map well-known node error strings (e.g. "insufficient
    /// balance") onto typed errors without parsing provider-specific codes.
    pub fn rpc_message_contains(&self, needle: &str) -> bool {
        matches!(self, Error::Rpc(e) if e.to_string().contains(needle))
    }
}
