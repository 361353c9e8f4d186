//! Versioned funding-rule lifecycle per relayer

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::utils::{parse_ether, parse_units};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolValue};

use crate::config::Settings;
use crate::core::{DripStatus, Error, Progress, Result};
use crate::funding::contracts::{DripAction, DripConfig, IAccessControl, IDripController};
use crate::gas::GasPricingPolicy;
use crate::infrastructure::ethereum::EthereumProvider;
use crate::networks::Network;

/// The shared authority multisig. On dev nodes it can be impersonated; on
/// live networks there is no automated signing path for it.
pub const SHARED_AUTHORITY_MULTISIG: Address =
    alloy::primitives::address!("226F14C3e19788934Ff37C653Cf5e24caD198341");

/// Prefix of every relayer funding rule name.
const DRIP_NAME_PREFIX: &str = "stencil_fund";

/// Balance threshold multiplier: a drip fires when the relayer holds less
/// than this many drip sizes.
const LOW_BALANCE_MULTIPLIER: u64 = 10;

/// Role granted to relayers on the funding controller.
pub fn relayer_role() -> B256 {
    keccak256(b"RELAYER_ROLE")
}

/// Addresses of the already-bootstrapped funding infrastructure, supplied by
/// the contracts-catalog collaborator.
#[derive(Debug, Clone)]
pub struct InfraAddressBook {
    /// Role-bearing controller contract relayers are registered with.
    pub funding_controller: Address,
    /// The drip contract holding the funding rules.
    pub drip_contract: Address,
    /// Balance-low precondition checker referenced by every rule.
    pub balance_check: Address,
    /// Account authorized to administer roles and rules.
    pub authority: Address,
}

/// Keeps exactly one active funding rule per relayer on one network,
/// migrating forward to new versions and archiving superseded ones.
pub struct RelayerFundingManager<'a> {
    provider: Arc<dyn EthereumProvider>,
    gas: &'a GasPricingPolicy,
    addresses: InfraAddressBook,
    network: Network,
    authority: Address,
}

impl std::fmt::Debug for RelayerFundingManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayerFundingManager")
            .field("addresses", &self.addresses)
            .field("network", &self.network)
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}

impl<'a> RelayerFundingManager<'a> {
    /// Resolve the target network and an authority signing path.
    ///
    /// Authority resolution priority:
    /// 1. explicit override key from settings (its signer must be registered
    ///    on the provider);
    /// 2. impersonation, when the authority is the shared multisig and the
    ///    endpoint is not a live network (the impersonated account is seeded
    ///    with gas money from the deployer);
    /// 3. otherwise there is no signing path: configuration error.
    pub async fn connect(
        provider: Arc<dyn EthereumProvider>,
        gas: &'a GasPricingPolicy,
        addresses: InfraAddressBook,
        settings: &Settings,
        deployer: Address,
    ) -> Result<Self> {
        let chain_id = provider.chain_id().await?;
        let network = Network::from_chain_id(chain_id)?;

        let authority = if let Some(key) = &settings.authority_private_key {
            let signer: PrivateKeySigner = key.parse().map_err(|e| {
                Error::Configuration(format!("invalid authority_private_key: {e}"))
            })?;
            signer.address()
        } else if addresses.authority == SHARED_AUTHORITY_MULTISIG
            && !provider.is_live_network().await?
        {
            provider.impersonate_account(addresses.authority).await?;

            // Seed the impersonated authority with gas money.
            let one_native = U256::from(10).pow(U256::from(network.decimals()));
            let tx = TransactionRequest::default()
                .with_from(deployer)
                .with_to(addresses.authority)
                .with_value(one_native);
            provider.send_transaction(gas.overrides(tx).await?).await?;

            addresses.authority
        } else {
            return Err(Error::Configuration(format!(
                "no signing path for funding authority {} on network {}: \
                 set `authority_private_key`",
                addresses.authority,
                network.name()
            )));
        };

        Ok(Self {
            provider,
            gas,
            addresses,
            network,
            authority,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Grant the relayer role to each relayer. Idempotent: already-granted
    /// relayers are skipped without a transaction.
    pub async fn assign_roles(&self, relayers: &[Address], progress: &dyn Progress) -> Result<()> {
        progress.start("Assigning relayer roles...");
        let role = relayer_role();
        for &relayer in relayers {
            let call = IAccessControl::hasRoleCall {
                role,
                account: relayer,
            };
            let ret = self
                .provider
                .call(
                    TransactionRequest::default()
                        .with_to(self.addresses.funding_controller)
                        .with_input(Bytes::from(call.abi_encode())),
                )
                .await?;
            let has_role = IAccessControl::hasRoleCall::abi_decode_returns(&ret)
                .map_err(|e| Error::UnexpectedState(format!("undecodable hasRole result: {e}")))?;
            if has_role {
                continue;
            }

            tracing::info!(%relayer, "granting relayer role");
            let grant = IAccessControl::grantRoleCall {
                role,
                account: relayer,
            };
            let tx = TransactionRequest::default()
                .with_from(self.authority)
                .with_to(self.addresses.funding_controller)
                .with_input(Bytes::from(grant.abi_encode()));
            self.provider.send_transaction(self.gas.overrides(tx).await?).await?;
        }
        progress.succeed("Finished assigning relayer roles");
        Ok(())
    }

    /// Archive superseded rule versions and bring the current version to
    /// Active for each relayer.
    pub async fn setup_drips(&self, relayers: &[Address], progress: &dyn Progress) -> Result<()> {
        progress.start("Creating relayer funding rules...");
        let current_version = self.network.drip_version();
        for &relayer in relayers {
            self.cancel_previous_versions(relayer, current_version, progress)
                .await?;
            self.create_or_advance(relayer, progress).await?;
        }
        progress.succeed("Finished creating relayer funding rules");
        Ok(())
    }

    /// Archive every rule version below `current_version`.
    ///
    /// Never-created and already-archived versions are skipped; Paused and
    /// Active versions transition directly to Archived.
    pub async fn cancel_previous_versions(
        &self,
        relayer: Address,
        current_version: u64,
        progress: &dyn Progress,
    ) -> Result<()> {
        for version in 0..current_version {
            let name = self.drip_name(relayer, version);
            match self.drip_status(&name).await? {
                DripStatus::Uninitialized | DripStatus::Archived => continue,
                DripStatus::Paused | DripStatus::Active => {
                    progress.start(&format!("Archiving outdated funding rule: {name}..."));
                    self.set_drip_status(&name, DripStatus::Archived).await?;
                    progress.succeed(&format!("Archived outdated funding rule: {name}"));
                }
            }
        }
        Ok(())
    }

    /// Drive the current rule version to Active.
    ///
    /// Active is a no-op; Uninitialized is created then activated; Paused is
    /// activated. Archived means the version table is stale and must be
    /// bumped: configuration error.
    pub async fn create_or_advance(&self, relayer: Address, progress: &dyn Progress) -> Result<()> {
        let name = self.drip_name(relayer, self.network.drip_version());
        match self.drip_status(&name).await? {
            DripStatus::Active => {
                progress.info(&format!("Funding rule {name} already active"));
            }
            DripStatus::Uninitialized => {
                progress.start(&format!("Creating funding rule {name}..."));
                self.create_drip(relayer, &name).await?;
                self.set_drip_status(&name, DripStatus::Active).await?;
                progress.succeed(&format!("Created funding rule {name}"));
            }
            DripStatus::Paused => {
                progress.start(&format!("Activating funding rule {name}..."));
                self.set_drip_status(&name, DripStatus::Active).await?;
                progress.succeed(&format!("Activated funding rule {name}"));
            }
            DripStatus::Archived => {
                return Err(Error::Configuration(format!(
                    "funding rule {name} is archived and cannot be recreated; \
                     bump the drip version for network {}",
                    self.network.name()
                )));
            }
        }
        Ok(())
    }

    /// Versioned rule name. Version 0 carries no suffix, matching the names
    /// that existed before versioning was introduced.
    pub fn drip_name(&self, relayer: Address, version: u64) -> String {
        let base = format!("{DRIP_NAME_PREFIX}_{relayer}");
        if version == 0 {
            base
        } else {
            format!("{base}_{version}")
        }
    }

    async fn drip_status(&self, name: &str) -> Result<DripStatus> {
        let call = IDripController::dripStatusCall {
            name: name.to_string(),
        };
        let ret = self
            .provider
            .call(
                TransactionRequest::default()
                    .with_to(self.addresses.drip_contract)
                    .with_input(Bytes::from(call.abi_encode())),
            )
            .await?;
        let raw = IDripController::dripStatusCall::abi_decode_returns(&ret)
            .map_err(|e| Error::UnexpectedState(format!("undecodable drip status: {e}")))?;
        DripStatus::from_u8(raw)
    }

    async fn set_drip_status(&self, name: &str, status: DripStatus) -> Result<()> {
        let call = IDripController::setStatusCall {
            name: name.to_string(),
            status: status as u8,
        };
        let tx = TransactionRequest::default()
            .with_from(self.authority)
            .with_to(self.addresses.drip_contract)
            .with_input(Bytes::from(call.abi_encode()));
        self.provider.send_transaction(self.gas.overrides(tx).await?).await?;
        Ok(())
    }

    async fn create_drip(&self, relayer: Address, name: &str) -> Result<()> {
        let size = self.network.drip_size()?;
        let decimals = self.network.decimals();

        let amount: U256 = parse_units(size, decimals)
            .map_err(|e| Error::Configuration(format!("bad funding size {size}: {e}")))?
            .get_absolute();
        let threshold = parse_ether(size)
            .map_err(|e| Error::Configuration(format!("bad funding size {size}: {e}")))?
            * U256::from(LOW_BALANCE_MULTIPLIER);

        let config = DripConfig {
            reentrant: false,
            interval: U256::from(1),
            dripcheck: self.addresses.balance_check,
            // Fire only while the relayer balance is below the threshold.
            checkparams: Bytes::from((relayer, threshold).abi_encode_params()),
            actions: vec![DripAction {
                target: relayer,
                data: Bytes::new(),
                value: amount,
            }],
        };

        let call = IDripController::createCall {
            name: name.to_string(),
            config,
        };
        let tx = TransactionRequest::default()
            .with_from(self.authority)
            .with_to(self.addresses.drip_contract)
            .with_input(Bytes::from(call.abi_encode()));
        self.provider.send_transaction(self.gas.overrides(tx).await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relayer_role_is_keccak_of_label() {
        assert_eq!(relayer_role(), keccak256(b"RELAYER_ROLE"));
    }

    #[test]
    fn test_checkparams_encoding_layout() {
        let relayer: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        let threshold = U256::from(1_500_000_000_000_000_000u128);
        let encoded = (relayer, threshold).abi_encode_params();

        // Two static words: padded address then the threshold.
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[12..32], relayer.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[32..64]), threshold);
    }
}
