use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Statically-named RPC endpoint slots.
///
/// Every supported network resolves its endpoint from one of these fields;
/// there is no dynamic environment-variable lookup by string key. A missing
/// slot for a requested network is a configuration error at resolution time,
/// not a silent fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcSettings {
    pub alchemy_api_key: Option<String>,
    pub infura_api_key: Option<String>,

    pub bnb_mainnet_url: Option<String>,
    pub bnb_testnet_url: Option<String>,
    pub gnosis_mainnet_url: Option<String>,
    pub gnosis_chiado_url: Option<String>,
    pub polygon_zkevm_mainnet_url: Option<String>,
    pub polygon_zkevm_testnet_url: Option<String>,
    pub fantom_mainnet_url: Option<String>,
    pub fantom_testnet_url: Option<String>,

    /// When set, every network resolves to a local node at
    /// `http://127.0.0.1:{port_base + chain_id % 1000}` and no API keys are
    /// required. Used by multi-network simulation harnesses.
    pub local_port_base: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Override key for the funding-rule authority. Required on live
    /// networks where the authority is the shared multisig, since no
    /// automated signing path exists for the multisig there.
    pub authority_private_key: Option<String>,
}

pub fn load() -> Settings {
    let Some(path) = config_path() else {
        return Settings::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Settings::default(),
    };
    toml::from_str::<Settings>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("STENCIL_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("stencil").join("config.toml"));
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(".config").join("stencil").join("config.toml"))
}
