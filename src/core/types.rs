//! Shared domain types

use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::TransactionReceipt;
use alloy_json_abi::JsonAbi;

use crate::core::{Error, Result};

/// One entry of the fixed infrastructure catalog.
///
/// The expected address must equal the CREATE2 derivation from the factory
/// address, the salt and the hash of `bytecode ++ constructor_args`; a
/// mismatch after deployment is fatal.
#[derive(Debug, Clone)]
pub struct ContractSpec {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    /// ABI-encoded constructor arguments, appended to the bytecode to form
    /// the initcode. Empty for argument-less constructors.
    pub constructor_args: Bytes,
    pub salt: B256,
    pub expected_address: Address,
}

/// Environment context that determines signer selection, fee fields and
/// whether dev-node conveniences (balance setting, impersonation) apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Self-hosted local node (anvil/hardhat).
    LocalNetworkCli,
    /// Externally-keyed CLI run against a live network.
    LiveNetworkCli,
    /// Managed service execution.
    Platform,
}

impl ExecutionMode {
    /// Modes where the deploying wallet is ours to fund at will.
    pub fn is_self_funded(self) -> bool {
        matches!(self, ExecutionMode::LocalNetworkCli | ExecutionMode::Platform)
    }
}

/// Lifecycle status of a funding rule, mirroring the on-chain encoding.
///
/// Transitions: Uninitialized -> Paused (create), Paused -> Active
/// (activate), Paused/Active -> Archived. Archived is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DripStatus {
    Uninitialized = 0,
    Paused = 1,
    Active = 2,
    Archived = 3,
}

impl DripStatus {
    /// Decode the raw on-chain status byte. Any value outside the known
    /// range is a fatal assertion, never silently coerced.
    pub fn from_u8(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(DripStatus::Uninitialized),
            1 => Ok(DripStatus::Paused),
            2 => Ok(DripStatus::Active),
            3 => Ok(DripStatus::Archived),
            other => Err(Error::UnexpectedState(format!(
                "unknown drip status byte {other}"
            ))),
        }
    }
}

/// State of a committed deployment root as reported by the module contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RootState {
    Empty = 0,
    Approved = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl RootState {
    pub fn from_u8(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(RootState::Empty),
            1 => Ok(RootState::Approved),
            2 => Ok(RootState::Completed),
            3 => Ok(RootState::Cancelled),
            4 => Ok(RootState::Failed),
            other => Err(Error::UnexpectedState(format!(
                "unknown merkle root state byte {other}"
            ))),
        }
    }
}

/// An off-chain approval over a deployment's root identifier.
#[derive(Debug, Clone)]
pub struct ApprovalSignature {
    pub signer: Address,
    pub signature: Bytes,
}

/// Result of a single deterministic deployment.
///
/// `receipts` is empty when the contract already existed and no transaction
/// was broadcast (the idempotent short-circuit).
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub address: Address,
    pub receipts: Vec<TransactionReceipt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drip_status_roundtrip() {
        for raw in 0..=3u8 {
            let status = DripStatus::from_u8(raw).unwrap();
            assert_eq!(status as u8, raw);
        }
    }

    #[test]
    fn test_drip_status_rejects_unknown_byte() {
        assert!(matches!(
            DripStatus::from_u8(7),
            Err(Error::UnexpectedState(_))
        ));
    }

    #[test]
    fn test_self_funded_modes() {
        assert!(ExecutionMode::LocalNetworkCli.is_self_funded());
        assert!(ExecutionMode::Platform.is_self_funded());
        assert!(!ExecutionMode::LiveNetworkCli.is_self_funded());
    }
}
