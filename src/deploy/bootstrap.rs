//! Ordered bootstrap of the fixed infrastructure contract catalog

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::config::Settings;
use crate::core::{Error, Progress, Result};
use crate::deploy::deterministic;
use crate::funding::{InfraAddressBook, RelayerFundingManager};
use crate::gas::GasPricingPolicy;
use crate::infrastructure::ethereum::EthereumProvider;

/// Orchestrates the ordered deployment of the full infrastructure set on one
/// network and verifies every address against the catalog.
///
/// The catalog is an immutable ordered sequence supplied by the external
/// contracts-catalog collaborator; it is iterated exactly once per
/// bootstrap.
pub struct SystemBootstrapper {
    catalog: Vec<crate::core::ContractSpec>,
    addresses: InfraAddressBook,
}

impl SystemBootstrapper {
    pub fn new(catalog: Vec<crate::core::ContractSpec>, addresses: InfraAddressBook) -> Self {
        Self { catalog, addresses }
    }

    /// Deploy every catalog entry in order, then optionally set up relayer
    /// roles and funding rules.
    ///
    /// Running this twice against the same network is a no-op on the second
    /// run: every deployment short-circuits on existing code.
    pub async fn bootstrap(
        &self,
        provider: Arc<dyn EthereumProvider>,
        gas: &GasPricingPolicy,
        wallet: Address,
        relayers: &[Address],
        include_roles: bool,
        settings: &Settings,
        progress: &dyn Progress,
    ) -> Result<()> {
        if gas.mode().is_self_funded() {
            // Top up the deploying wallet to its maximum spendable balance.
            // Only dev nodes honor this; elsewhere the wallet pays its own way.
            let _ = provider
                .set_balance(wallet, U256::from(0xFFFFFFFFFFFFFFFFFFFFFFu128))
                .await;
        }

        // Fail fast on a dead endpoint before any state is touched.
        provider.get_block_number().await?;

        deterministic::ensure_factory(provider.as_ref()).await?;

        for spec in &self.catalog {
            progress.start(&format!("Deploying {}...", spec.name));
            let outcome = deterministic::deploy(provider.as_ref(), gas, spec).await?;
            if outcome.address != spec.expected_address {
                // Bytecode or salt drift; nothing downstream can be trusted.
                return Err(Error::Deployment(format!(
                    "address mismatch for {}: expected {}, deployed {}",
                    spec.name, spec.expected_address, outcome.address
                )));
            }
            progress.succeed(&format!("Deployed {} at {}", spec.name, outcome.address));
        }
        progress.succeed("Finished deploying infrastructure contracts");

        if include_roles {
            let manager = RelayerFundingManager::connect(
                provider.clone(),
                gas,
                self.addresses.clone(),
                settings,
                wallet,
            )
            .await?;
            manager.assign_roles(relayers, progress).await?;
            manager.setup_drips(relayers, progress).await?;
        }

        Ok(())
    }

    /// True iff every catalog entry has code at its expected address.
    ///
    /// The existence checks are independent reads and issued concurrently.
    pub async fn check_system_deployed(&self, provider: &dyn EthereumProvider) -> Result<bool> {
        let checks = self
            .catalog
            .iter()
            .map(|spec| provider.get_code(spec.expected_address));
        let codes = futures::future::try_join_all(checks).await?;
        Ok(codes.iter().all(|code| !code.is_empty()))
    }
}
