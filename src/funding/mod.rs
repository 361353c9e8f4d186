//! Relayer funding-rule ("drip") lifecycle management

pub mod contracts;
mod manager;

pub use manager::{
    relayer_role, InfraAddressBook, RelayerFundingManager, SHARED_AUTHORITY_MULTISIG,
};
