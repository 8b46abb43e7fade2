//! # portal-config
//!
//! Configuration for the portal wallet tools.
//!
//! Values are layered the same way for every command: built-in defaults, then `portal.toml`,
//! then `PORTAL_*` environment variables, then whatever the caller merges on top (usually CLI
//! arguments).

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, ChainId, address};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

mod error;
pub use error::*;

pub use figment;

/// Default JSON-RPC endpoint of the game's network.
pub const DEFAULT_RPC_URL: &str = "https://rpc.test2.btcs.network/";

/// Default address of the level reward NFT contract.
pub const DEFAULT_CONTRACT: Address = address!("0x72b0e0C76cd6Ae41979B728282C3e748D0C2A278");

/// Default chain id used when signing with a local key.
pub const DEFAULT_CHAIN_ID: ChainId = 444444444500;

/// Default metadata attached to minted rewards.
pub const DEFAULT_METADATA_URI: &str =
    "ipfs://bafkreihftsqvo4wg6bgf7n5cs3664wb5bm6r3wrsq537h6xf4ut4nxqdoi";

/// Which wallet backend signs and submits transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    /// An injected browser wallet reached through the local bridge page.
    #[default]
    Browser,
    /// A raw private key held by this process. Not meant for production.
    Local,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => f.write_str("browser"),
            Self::Local => f.write_str("local"),
        }
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown wallet kind `{other}`, expected `browser` or `local`")),
        }
    }
}

/// Portal configuration.
///
/// None of these values are validated here; the RPC endpoint, contract and key are checked by
/// whatever consumes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint used for view calls and local signing.
    pub rpc_url: String,
    /// The NFT contract every mint and query targets.
    pub contract: Address,
    /// Chain id declared when signing with a local key.
    pub chain_id: ChainId,
    /// Raw private key for the local signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// The wallet backend to use.
    pub wallet: WalletKind,
    /// Port of the browser bridge, `0` picks a free one.
    pub browser_port: u16,
    /// Seconds to wait for a wallet to connect.
    pub connect_timeout: u64,
    /// Seconds to wait for a single provider request.
    pub request_timeout: u64,
    /// Metadata URI used when a mint does not specify one.
    pub metadata_uri: String,
    /// Where player progress is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract: DEFAULT_CONTRACT,
            chain_id: DEFAULT_CHAIN_ID,
            private_key: None,
            wallet: WalletKind::default(),
            browser_port: 0,
            connect_timeout: 300,
            request_timeout: 120,
            metadata_uri: DEFAULT_METADATA_URI.to_string(),
            progress_file: None,
        }
    }
}

impl Config {
    /// The default config file name.
    pub const FILE_NAME: &'static str = "portal.toml";

    /// Environment variable that overrides the config file location.
    pub const CONFIG_ENV: &'static str = "PORTAL_CONFIG";

    /// Prefix of environment variables that override individual settings.
    pub const ENV_PREFIX: &'static str = "PORTAL_";

    /// Loads the config from the default figment.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Loads the config with `provider` merged on top of the default figment.
    pub fn load_with(provider: impl Provider) -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment().merge(provider))
    }

    /// Attempts to extract a `Config` from `provider`.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        let figment = Figment::from(provider);
        trace!("load config with provider: {:?}", figment.metadata().collect::<Vec<_>>());
        figment.extract::<Self>().map_err(ExtractConfigError::new)
    }

    /// Returns the default figment: defaults, then the toml file, then `PORTAL_*` variables.
    pub fn figment() -> Figment {
        Self::figment_with_file(Self::config_file())
    }

    /// Same as [`figment`](Self::figment) but reads the given toml file.
    pub fn figment_with_file(path: impl AsRef<Path>) -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG"]))
    }

    /// The config file to read, honouring `PORTAL_CONFIG`.
    pub fn config_file() -> PathBuf {
        std::env::var_os(Self::CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME))
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Returns the configured progress file, falling back to `<data dir>/portal/progress.json`.
    pub fn progress_path(&self) -> Option<PathBuf> {
        self.progress_file
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("portal").join("progress.json")))
    }

    /// Returns a copy that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.private_key.is_some() {
            config.private_key = Some("<redacted>".to_string());
        }
        config
    }

    /// Renders the config as toml with the private key redacted.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&self.redacted())
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("Portal Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
