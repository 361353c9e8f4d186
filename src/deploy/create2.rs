//! CREATE2 address derivation

use alloy::primitives::{keccak256, Address, B256};

/// CREATE2 address = keccak256(0xff ++ deployer ++ salt ++ initcode_hash)[12:]
///
/// Purely arithmetic: the result is identical on every network for fixed
/// inputs.
pub fn compute_create2_address(deployer: Address, salt: B256, initcode_hash: B256) -> Address {
    let mut buffer = Vec::with_capacity(85);
    buffer.push(0xff);
    buffer.extend_from_slice(deployer.as_slice());
    buffer.extend_from_slice(salt.as_ref());
    buffer.extend_from_slice(initcode_hash.as_ref());

    let hash = keccak256(&buffer);
    Address::from_slice(&hash[12..])
}
