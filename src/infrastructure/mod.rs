//! Infrastructure layer - External service integrations
//!
//! This layer contains the Alloy-based Ethereum provider implementation and
//! the provider trait the rest of the engine is written against.

pub mod ethereum;
