use clap::Parser;
use eyre::Result;
use portal_cli::{
    args::{Portal, PortalSubcommand},
    handler, utils,
};

fn main() -> Result<()> {
    handler::install();
    utils::subscriber();
    let args = Portal::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Portal) -> Result<()> {
    let config = args.global.load_config()?;
    match args.cmd {
        PortalSubcommand::Connect(cmd) => cmd.run(config).await,
        PortalSubcommand::Mint(cmd) => cmd.run(config).await,
        PortalSubcommand::Nfts(cmd) => cmd.run(config).await,
        PortalSubcommand::Progress(cmd) => cmd.run(config).await,
        PortalSubcommand::Config(cmd) => cmd.run(config).await,
    }
}
