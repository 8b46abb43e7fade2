use crate::{cmd::connect::ConnectedWallet, utils};
use alloy_primitives::U256;
use clap::Parser;
use eyre::{Result, WrapErr};
use portal_config::Config;
use portal_mint::{MintClient, PlayerProgress, request::parse_level_id};
use portal_wallets::RpcReader;

/// CLI arguments for `portal mint`.
#[derive(Clone, Debug, Parser)]
pub struct MintArgs {
    /// The completed level, as a decimal number.
    #[arg(value_name = "LEVEL_ID")]
    pub level_id: String,

    /// Metadata of the minted token, the configured `metadata_uri` by default.
    #[arg(long, value_name = "URI")]
    pub metadata_uri: Option<String>,

    /// Mint even if the level was not unlocked locally.
    #[arg(long)]
    pub ignore_progress: bool,
}

impl MintArgs {
    pub async fn run(self, config: Config) -> Result<()> {
        let Self { level_id, metadata_uri, ignore_progress } = self;

        let level = parse_level_id(&level_id)?;
        if !ignore_progress {
            let (_, progress) = utils::load_progress(&config)?;
            ensure_unlocked(&progress, level)?;
        }

        let reader = RpcReader::new(&config.rpc_url)?;
        let wallet = ConnectedWallet::connect(&config).await?;
        let client = MintClient::new(
            wallet.session.clone(),
            wallet.backend.clone(),
            reader,
            config.contract,
        )
        .with_timeout(config.request_timeout());

        let metadata_uri = metadata_uri.as_deref().unwrap_or(&config.metadata_uri);
        let result = client.mint(&level_id, metadata_uri).await;
        wallet.close().await?;

        let hash = result.wrap_err_with(|| format!("could not mint level {level_id}"))?;
        println!("Transaction hash: {hash}");
        Ok(())
    }
}

fn ensure_unlocked(progress: &PlayerProgress, level: U256) -> Result<()> {
    eyre::ensure!(
        progress.can_mint(level),
        "level {level} is locked, the last unlocked portal is {}",
        progress.nft_index
    );
    Ok(())
}
