use crate::cmd::connect::ConnectedWallet;
use alloy_primitives::Address;
use clap::Parser;
use eyre::{Result, WrapErr};
use itertools::Itertools;
use portal_config::Config;
use portal_mint::MintClient;
use portal_wallets::{RpcReader, WalletSession};
use std::sync::Arc;

/// CLI arguments for `portal nfts`.
#[derive(Clone, Debug, Parser)]
pub struct NftsArgs {
    /// The player to look up, the connected wallet's account by default.
    #[arg(value_name = "PLAYER")]
    pub player: Option<Address>,

    /// Print the token ids as a JSON array.
    #[arg(long)]
    pub json: bool,
}

impl NftsArgs {
    pub async fn run(self, config: Config) -> Result<()> {
        let player = match self.player {
            Some(player) => player,
            None => {
                let wallet = ConnectedWallet::connect(&config).await?;
                let address = wallet.session.address();
                wallet.close().await?;
                address.ok_or_else(|| eyre::eyre!("the wallet did not report an account"))?
            }
        };

        let reader = RpcReader::new(&config.rpc_url)?;
        let client = MintClient::new(Arc::new(WalletSession::default()), (), reader, config.contract)
            .with_timeout(config.request_timeout());
        let result = client
            .query_owned_tokens(player)
            .await
            .wrap_err_with(|| format!("could not list the tokens of {player}"))?;

        if self.json {
            println!("{}", serde_json::to_string(&result.token_ids)?);
        } else if result.token_ids.is_empty() {
            println!("{player} owns no reward tokens");
        } else {
            println!("{}", result.token_ids.iter().format("\n"));
        }
        Ok(())
    }
}
