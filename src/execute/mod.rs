//! Multi-network execution coordination

mod coordinator;
mod outcome;

pub use coordinator::{
    fetch_executed_receipts, DeploymentContext, DeploymentExecutionCoordinator, IDeploymentModule,
    NetworkTarget, NoopRoleHooks, RoleHooks,
};
pub use outcome::{AttemptOutcome, DeploymentAttempt, NetworkResult, NetworkRunStatus};
