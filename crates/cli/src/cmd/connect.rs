use clap::Parser;
use eyre::{Result, WrapErr};
use portal_config::Config;
use portal_wallets::{WalletBackend, WalletSession};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// CLI arguments for `portal connect`.
#[derive(Clone, Debug, Parser)]
pub struct ConnectArgs {
    /// Print the session as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ConnectArgs {
    pub async fn run(self, config: Config) -> Result<()> {
        let wallet = ConnectedWallet::connect(&config).await?;
        let state = wallet.session.snapshot();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else if let Some(address) = state.address {
            println!("Connected: {address}");
            println!("Chain id:  {}", state.chain_id);
        }
        wallet.close().await
    }
}

/// A wallet backend with a connected session that follows its account and chain changes.
pub struct ConnectedWallet {
    pub backend: WalletBackend,
    pub session: Arc<WalletSession>,
    watcher: JoinHandle<()>,
}

impl ConnectedWallet {
    /// Starts the configured backend and waits for the wallet to connect.
    pub async fn connect(config: &Config) -> Result<Self> {
        let backend = WalletBackend::from_config(config)
            .await
            .wrap_err_with(|| format!("failed to set up the {} wallet", config.wallet))?;
        if let WalletBackend::Browser(provider) = &backend {
            println!("Open {} in a browser with a wallet extension.", provider.server().url());
        }

        let session = Arc::new(WalletSession::new(config.connect_timeout()));
        if let Err(err) = session.connect(&backend).await {
            shutdown(&backend).await;
            return Err(err).wrap_err("could not connect a wallet");
        }
        let watcher = session.watch(&backend);
        Ok(Self { backend, session, watcher })
    }

    /// Stops watching and shuts the backend down.
    pub async fn close(self) -> Result<()> {
        self.watcher.abort();
        self.backend.shutdown().await?;
        Ok(())
    }
}

async fn shutdown(backend: &WalletBackend) {
    if let Err(err) = backend.shutdown().await {
        debug!(%err, "failed to stop wallet backend");
    }
}
