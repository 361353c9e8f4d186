//! stencil - deterministic multi-network contract deployment orchestration
//!
//! Bootstraps a fixed catalog of infrastructure contracts across independent
//! networks via CREATE2, keeps per-relayer funding rules current through a
//! versioned lifecycle, and coordinates the execution of cryptographically
//! committed deployments network by network.
//!
//! All authoritative state lives on chain; nothing here is persisted
//! locally, and every entry point is safe to re-run.

pub mod config;
pub mod core;
pub mod deploy;
pub mod execute;
pub mod funding;
pub mod gas;
pub mod infrastructure;
pub mod networks;

pub use crate::core::{
    ApprovalSignature, ContractSpec, DeployOutcome, DripStatus, Error, ExecutionMode, LogProgress,
    NullProgress, Progress, Result, RootState,
};
pub use crate::deploy::SystemBootstrapper;
pub use crate::execute::{
    AttemptOutcome, DeploymentAttempt, DeploymentContext, DeploymentExecutionCoordinator,
    NetworkResult, NetworkRunStatus, NetworkTarget,
};
pub use crate::funding::{InfraAddressBook, RelayerFundingManager};
pub use crate::gas::{GasPricingPolicy, GasCost};
pub use crate::infrastructure::ethereum::{AlloyHttpProvider, EthereumProvider};
pub use crate::networks::Network;
