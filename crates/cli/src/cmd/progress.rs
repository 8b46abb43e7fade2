use crate::utils;
use clap::Subcommand;
use eyre::{Result, WrapErr};
use portal_config::Config;

/// CLI subcommands for `portal progress`.
#[derive(Clone, Debug, Subcommand)]
pub enum ProgressSubcommand {
    /// Print the stored progress.
    Show,

    /// Record teleporting through a portal, unlocking its reward.
    Unlock {
        /// Index of the portal.
        index: u64,
    },

    /// Record a completed run.
    Record {
        /// Duration of the run in seconds.
        seconds: f64,
    },
}

impl ProgressSubcommand {
    pub async fn run(self, config: Config) -> Result<()> {
        let (path, mut progress) = utils::load_progress(&config)?;
        match self {
            Self::Show => {
                println!("Unlocked portal: {}", progress.nft_index);
                match progress.best_duration {
                    Some(best) => println!("Best run:        {best:.2}s"),
                    None => println!("Best run:        none"),
                }
                return Ok(());
            }
            Self::Unlock { index } => {
                progress.unlock(index);
                println!("Unlocked portal {index}");
            }
            Self::Record { seconds } => {
                eyre::ensure!(
                    seconds.is_finite() && seconds > 0.0,
                    "run duration must be a positive number of seconds, got {seconds}"
                );
                if progress.record_run(seconds) {
                    println!("New best run: {seconds:.2}s");
                } else {
                    let best = progress.best_duration.unwrap_or(seconds);
                    println!("Run recorded, best is still {best:.2}s");
                }
            }
        }
        progress.save(&path).wrap_err("could not save player progress")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_mint::PlayerProgress;

    #[tokio::test]
    async fn unlock_and_record_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let config = Config { progress_file: Some(path.clone()), ..Default::default() };

        ProgressSubcommand::Unlock { index: 3 }.run(config.clone()).await.unwrap();
        ProgressSubcommand::Record { seconds: 80.0 }.run(config.clone()).await.unwrap();
        ProgressSubcommand::Record { seconds: 95.0 }.run(config.clone()).await.unwrap();
        ProgressSubcommand::Show.run(config).await.unwrap();

        let progress = PlayerProgress::load(&path).unwrap();
        assert_eq!(progress, PlayerProgress { nft_index: 3, best_duration: Some(80.0) });
    }

    #[tokio::test]
    async fn zero_duration_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let config = Config { progress_file: Some(path.clone()), ..Default::default() };

        let err = ProgressSubcommand::Record { seconds: 0.0 }.run(config).await.unwrap_err();
        assert!(err.to_string().contains("positive"), "{err}");
        assert!(!path.exists());
    }
}
