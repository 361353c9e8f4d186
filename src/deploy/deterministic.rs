//! Idempotent single-contract deployment via the deterministic-deployment proxy

use alloy::network::TransactionBuilder;
use alloy::primitives::{address, bytes, keccak256, Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;

use crate::core::{ContractSpec, DeployOutcome, Error, Result};
use crate::deploy::create2::compute_create2_address;
use crate::gas::GasPricingPolicy;
use crate::infrastructure::ethereum::EthereumProvider;

/// The well-known deterministic-deployment proxy, at the same address on
/// every chain.
pub const FACTORY_ADDRESS: Address = address!("4e59b44847b379578588920ca78fbf26c0b4956c");

/// One-time sender of the pre-signed proxy deployment transaction.
pub const FACTORY_DEPLOYER: Address = address!("3fab184622dc19b6109349b94811493bf2a45362");

/// Pre-signed raw transaction that deploys the proxy. Signed with a
/// throwaway key (r = s = 0x2222...) so anyone can broadcast it and the
/// proxy lands at the same address everywhere.
const FACTORY_DEPLOYMENT_TX: Bytes = bytes!("f8a58085174876e800830186a08080b853604580600e600039806000f350fe7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf31ba02222222222222222222222222222222222222222222222222222222222222222a02222222222222222222222222222222222222222222222222222222222222222");

/// Ensure the deterministic-deployment proxy exists on this network,
/// broadcasting its pre-signed deployment transaction if necessary.
///
/// Funding the one-time sender is best-effort: it works on dev nodes and is
/// silently skipped elsewhere, in which case the sender must already hold
/// enough funds.
pub async fn ensure_factory(provider: &dyn EthereumProvider) -> Result<Address> {
    if !provider.get_code(FACTORY_ADDRESS).await?.is_empty() {
        return Ok(FACTORY_ADDRESS);
    }

    let _ = provider
        .set_balance(FACTORY_DEPLOYER, U256::from(0xFFFFFFFFFFFFFFFFFFFFFFu128))
        .await;

    tracing::info!(factory = %FACTORY_ADDRESS, "deploying deterministic deployment proxy");
    match provider.send_raw_transaction(FACTORY_DEPLOYMENT_TX).await {
        Ok(_) => Ok(FACTORY_ADDRESS),
        Err(e) if e.to_string().contains("insufficient balance") => Err(Error::Deployment(format!(
            "insufficient balance to deploy the deterministic deployment proxy, \
             please fund the sender: {FACTORY_DEPLOYER}"
        ))),
        Err(e) => Err(Error::Rpc(e)),
    }
}

/// Deploy one contract at its CREATE2 address, doing nothing if it is
/// already there.
///
/// Post-confirmation the code presence is re-checked; absence at that point
/// indicates a bug (bytecode/salt drift, a broken factory) and is never
/// retried.
pub async fn deploy(
    provider: &dyn EthereumProvider,
    gas: &GasPricingPolicy,
    spec: &ContractSpec,
) -> Result<DeployOutcome> {
    let factory = ensure_factory(provider).await?;

    let mut initcode = spec.bytecode.to_vec();
    initcode.extend_from_slice(&spec.constructor_args);
    let address = compute_create2_address(factory, spec.salt, keccak256(&initcode));

    // Short circuit if already deployed.
    if !provider.get_code(address).await?.is_empty() {
        return Ok(DeployOutcome {
            address,
            receipts: Vec::new(),
        });
    }

    // The proxy's calldata format is salt ++ initcode.
    let mut data = spec.salt.to_vec();
    data.extend_from_slice(&initcode);
    let tx = TransactionRequest::default()
        .with_to(factory)
        .with_input(Bytes::from(data));
    let tx = gas.overrides(tx).await?;

    tracing::info!(contract = %spec.name, %address, "broadcasting deterministic deployment");
    let receipt = provider.send_transaction(tx).await?;

    if provider.get_code(address).await?.is_empty() {
        return Err(Error::Deployment(format!(
            "failed to deploy contract {} at {address}: no code after confirmed transaction",
            spec.name
        )));
    }

    Ok(DeployOutcome {
        address,
        receipts: vec![receipt],
    })
}
