//! Deterministic deployment and system bootstrap

pub mod bootstrap;
pub mod create2;
pub mod deterministic;

pub use bootstrap::SystemBootstrapper;
pub use create2::compute_create2_address;
pub use deterministic::{deploy, ensure_factory, FACTORY_ADDRESS, FACTORY_DEPLOYER};
