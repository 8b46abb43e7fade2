use crate::cmd::{
    config::ConfigArgs, connect::ConnectArgs, mint::MintArgs, nfts::NftsArgs,
    progress::ProgressSubcommand,
};
use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use eyre::Result;
use portal_config::{
    Config, WalletKind,
    figment::{
        self, Metadata, Profile,
        value::{Dict, Map},
    },
};
use std::path::PathBuf;

/// Connect a wallet and mint level rewards.
#[derive(Debug, Parser)]
#[command(name = "portal", version, next_display_order = None)]
pub struct Portal {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub cmd: PortalSubcommand,
}

/// Settings that apply to every command and override the config file.
#[derive(Clone, Debug, Default, Parser)]
pub struct GlobalOpts {
    /// Path to the config file, `portal.toml` by default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The wallet backend: `browser` or `local`.
    #[arg(long, global = true, value_name = "KIND")]
    pub wallet: Option<WalletKind>,

    /// The RPC endpoint.
    #[arg(long, short, global = true, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// The reward contract.
    #[arg(long, global = true, value_name = "ADDRESS")]
    pub contract: Option<Address>,

    /// Port of the browser wallet page, a free one by default.
    #[arg(long, global = true, value_name = "PORT")]
    pub browser_port: Option<u16>,
}

impl GlobalOpts {
    /// Loads the config with these options merged on top.
    pub fn load_config(&self) -> Result<Config> {
        let figment = match &self.config {
            Some(path) => Config::figment_with_file(path),
            None => Config::figment(),
        };
        Ok(Config::try_from(figment.merge(self.clone()))?)
    }

    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(wallet) = self.wallet {
            dict.insert("wallet".into(), wallet.to_string().into());
        }
        if let Some(url) = &self.rpc_url {
            dict.insert("rpc_url".into(), url.clone().into());
        }
        if let Some(contract) = self.contract {
            dict.insert("contract".into(), contract.to_string().into());
        }
        if let Some(port) = self.browser_port {
            dict.insert("browser_port".into(), port.into());
        }
        dict
    }
}

impl figment::Provider for GlobalOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("GlobalOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Profile::Default, self.dict())]))
    }
}

#[derive(Debug, Subcommand)]
pub enum PortalSubcommand {
    /// Connect a wallet and print the session.
    #[command(visible_alias = "c")]
    Connect(ConnectArgs),

    /// Mint the reward NFT for a completed level.
    #[command(visible_alias = "m")]
    Mint(MintArgs),

    /// List the reward NFTs a player owns.
    #[command(visible_alias = "tokens")]
    Nfts(NftsArgs),

    /// Show or update local player progress.
    #[command(subcommand)]
    Progress(ProgressSubcommand),

    /// Print the resolved configuration.
    Config(ConfigArgs),
}
