use clap::Parser;
use eyre::Result;
use portal_config::Config;

/// CLI arguments for `portal config`.
#[derive(Clone, Debug, Parser)]
pub struct ConfigArgs {
    /// Print as JSON instead of TOML.
    #[arg(long)]
    pub json: bool,
}

impl ConfigArgs {
    pub async fn run(self, config: Config) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        } else {
            print!("{}", config.to_string_pretty()?);
        }
        Ok(())
    }
}
