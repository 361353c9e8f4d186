//! Closed catalog of supported networks
//!
//! Chain id is the globally unique key. Everything here is a pure lookup
//! over the enumeration; unknown chain ids are rejected with a typed error
//! rather than defaulted.

use crate::config::RpcSettings;
use crate::core::{Error, Result};

/// Every network the engine can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    // Local
    Anvil,
    // Mainnets
    Ethereum,
    Optimism,
    Arbitrum,
    Polygon,
    Bnb,
    Gnosis,
    Linea,
    PolygonZkevm,
    Avalanche,
    Fantom,
    Base,
    // Testnets
    Sepolia,
    OptimismSepolia,
    ArbitrumSepolia,
    PolygonMumbai,
    BnbTestnet,
    GnosisChiado,
    LineaGoerli,
    PolygonZkevmGoerli,
    AvalancheFuji,
    FantomTestnet,
    BaseSepolia,
}

pub const ALL_NETWORKS: [Network; 23] = [
    Network::Anvil,
    Network::Ethereum,
    Network::Optimism,
    Network::Arbitrum,
    Network::Polygon,
    Network::Bnb,
    Network::Gnosis,
    Network::Linea,
    Network::PolygonZkevm,
    Network::Avalanche,
    Network::Fantom,
    Network::Base,
    Network::Sepolia,
    Network::OptimismSepolia,
    Network::ArbitrumSepolia,
    Network::PolygonMumbai,
    Network::BnbTestnet,
    Network::GnosisChiado,
    Network::LineaGoerli,
    Network::PolygonZkevmGoerli,
    Network::AvalancheFuji,
    Network::FantomTestnet,
    Network::BaseSepolia,
];

impl Network {
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Anvil => 31337,
            Network::Ethereum => 1,
            Network::Optimism => 10,
            Network::Arbitrum => 42161,
            Network::Polygon => 137,
            Network::Bnb => 56,
            Network::Gnosis => 100,
            Network::Linea => 59144,
            Network::PolygonZkevm => 1101,
            Network::Avalanche => 43114,
            Network::Fantom => 250,
            Network::Base => 8453,
            Network::Sepolia => 11155111,
            Network::OptimismSepolia => 11155420,
            Network::ArbitrumSepolia => 421614,
            Network::PolygonMumbai => 80001,
            Network::BnbTestnet => 97,
            Network::GnosisChiado => 10200,
            Network::LineaGoerli => 59140,
            Network::PolygonZkevmGoerli => 1442,
            Network::AvalancheFuji => 43113,
            Network::FantomTestnet => 4002,
            Network::BaseSepolia => 84532,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Result<Self> {
        ALL_NETWORKS
            .iter()
            .copied()
            .find(|n| n.chain_id() == chain_id)
            .ok_or(Error::UnsupportedNetwork { chain_id })
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Anvil => "anvil",
            Network::Ethereum => "ethereum",
            Network::Optimism => "optimism",
            Network::Arbitrum => "arbitrum",
            Network::Polygon => "polygon",
            Network::Bnb => "bnb",
            Network::Gnosis => "gnosis",
            Network::Linea => "linea",
            Network::PolygonZkevm => "polygon_zkevm",
            Network::Avalanche => "avalanche",
            Network::Fantom => "fantom",
            Network::Base => "base",
            Network::Sepolia => "sepolia",
            Network::OptimismSepolia => "optimism_sepolia",
            Network::ArbitrumSepolia => "arbitrum_sepolia",
            Network::PolygonMumbai => "polygon_mumbai",
            Network::BnbTestnet => "bnb_testnet",
            Network::GnosisChiado => "gnosis_chiado",
            Network::LineaGoerli => "linea_goerli",
            Network::PolygonZkevmGoerli => "polygon_zkevm_goerli",
            Network::AvalancheFuji => "avalanche_fuji",
            Network::FantomTestnet => "fantom_testnet",
            Network::BaseSepolia => "base_sepolia",
        }
    }

    /// Native currency symbol.
    pub fn currency(self) -> &'static str {
        match self {
            Network::Bnb | Network::BnbTestnet => "BNB",
            Network::Gnosis | Network::GnosisChiado => "xDAI",
            Network::Polygon | Network::PolygonMumbai => "MATIC",
            Network::Fantom | Network::FantomTestnet => "FTM",
            Network::Avalanche | Network::AvalancheFuji => "AVAX",
            _ => "ETH",
        }
    }

    /// Native currency decimals. Uniform today, but funding amounts are
    /// always scaled through this lookup so a non-18-decimal network only
    /// needs a new match arm.
    pub fn decimals(self) -> u8 {
        18
    }

    pub fn is_local(self) -> bool {
        matches!(self, Network::Anvil)
    }

    pub fn is_testnet(self) -> bool {
        matches!(
            self,
            Network::Sepolia
                | Network::OptimismSepolia
                | Network::ArbitrumSepolia
                | Network::PolygonMumbai
                | Network::BnbTestnet
                | Network::GnosisChiado
                | Network::LineaGoerli
                | Network::PolygonZkevmGoerli
                | Network::AvalancheFuji
                | Network::FantomTestnet
                | Network::BaseSepolia
        )
    }

    /// Funding-rule top-up size as a decimal native-currency string.
    /// Local networks have no funding rules.
    pub fn drip_size(self) -> Result<&'static str> {
        match self {
            Network::Ethereum => Ok("0.15"),
            Network::Optimism => Ok("0.025"),
            Network::Arbitrum => Ok("0.025"),
            Network::Polygon => Ok("1"),
            Network::Bnb => Ok("0.05"),
            Network::Gnosis => Ok("1"),
            Network::Linea => Ok("0.025"),
            Network::PolygonZkevm => Ok("0.025"),
            Network::Avalanche => Ok("1"),
            Network::Fantom => Ok("1"),
            Network::Base => Ok("0.025"),
            Network::AvalancheFuji | Network::FantomTestnet => Ok("1"),
            n if n.is_testnet() => Ok("0.15"),
            n => Err(Error::Configuration(format!(
                "no funding size configured for network {}",
                n.name()
            ))),
        }
    }

    /// Current funding-rule version for this network. Bumped whenever the
    /// rule parameters change, so superseded versions can be archived.
    pub fn drip_version(self) -> u64 {
        match self {
            Network::PolygonMumbai | Network::LineaGoerli => 1,
            _ => 0,
        }
    }

    /// Resolve the RPC endpoint for this network from statically-known
    /// settings slots.
    pub fn rpc_url(self, rpc: &RpcSettings) -> Result<String> {
        if let Some(port_base) = rpc.local_port_base {
            return Ok(format!(
                "http://127.0.0.1:{}",
                u64::from(port_base) + self.chain_id() % 1000
            ));
        }

        if self.is_local() {
            return Ok("http://127.0.0.1:8545".to_string());
        }

        let alchemy = |subdomain: &str| {
            rpc.alchemy_api_key
                .as_deref()
                .map(|key| format!("https://{subdomain}.g.alchemy.com/v2/{key}"))
                .ok_or_else(|| missing_slot(self, "rpc.alchemy_api_key"))
        };
        let infura = |subdomain: &str| {
            rpc.infura_api_key
                .as_deref()
                .map(|key| format!("https://{subdomain}.infura.io/v3/{key}"))
                .ok_or_else(|| missing_slot(self, "rpc.infura_api_key"))
        };
        let slot = |value: &Option<String>, slot_name: &str| {
            value
                .clone()
                .ok_or_else(|| missing_slot(self, slot_name))
        };

        match self {
            Network::Ethereum => alchemy("eth-mainnet"),
            Network::Sepolia => alchemy("eth-sepolia"),
            Network::Optimism => alchemy("opt-mainnet"),
            Network::OptimismSepolia => alchemy("opt-sepolia"),
            Network::Arbitrum => alchemy("arb-mainnet"),
            Network::ArbitrumSepolia => alchemy("arb-sepolia"),
            Network::Polygon => alchemy("polygon-mainnet"),
            Network::PolygonMumbai => alchemy("polygon-mumbai"),
            Network::Base => alchemy("base-mainnet"),
            Network::BaseSepolia => alchemy("base-sepolia"),
            Network::Linea => infura("linea-mainnet"),
            Network::LineaGoerli => infura("linea-goerli"),
            Network::Avalanche => infura("avalanche-mainnet"),
            Network::AvalancheFuji => infura("avalanche-fuji"),
            Network::Bnb => slot(&rpc.bnb_mainnet_url, "rpc.bnb_mainnet_url"),
            Network::BnbTestnet => slot(&rpc.bnb_testnet_url, "rpc.bnb_testnet_url"),
            Network::Gnosis => slot(&rpc.gnosis_mainnet_url, "rpc.gnosis_mainnet_url"),
            Network::GnosisChiado => slot(&rpc.gnosis_chiado_url, "rpc.gnosis_chiado_url"),
            Network::PolygonZkevm => slot(
                &rpc.polygon_zkevm_mainnet_url,
                "rpc.polygon_zkevm_mainnet_url",
            ),
            Network::PolygonZkevmGoerli => slot(
                &rpc.polygon_zkevm_testnet_url,
                "rpc.polygon_zkevm_testnet_url",
            ),
            Network::Fantom => slot(&rpc.fantom_mainnet_url, "rpc.fantom_mainnet_url"),
            Network::FantomTestnet => slot(&rpc.fantom_testnet_url, "rpc.fantom_testnet_url"),
            Network::Anvil => unreachable!("handled above"),
        }
    }
}

fn missing_slot(network: Network, slot: &str) -> Error {
    Error::Configuration(format!(
        "network {} requires the `{slot}` setting",
        network.name()
    ))
}
