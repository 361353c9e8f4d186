//! Ethereum infrastructure - Alloy provider implementation

mod provider;

pub use provider::{AlloyHttpProvider, EthereumProvider};
