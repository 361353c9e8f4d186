pub mod error;
pub mod progress;
pub mod types;

pub use error::{Error, Result};
pub use progress::{LogProgress, NullProgress, Progress};
pub use types::{
    ApprovalSignature, ContractSpec, DeployOutcome, DripStatus, ExecutionMode, RootState,
};
