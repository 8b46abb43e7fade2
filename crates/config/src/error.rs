//! Config extraction errors
use figment::{
    Metadata, Source,
    providers::{Format, Toml},
};
use std::{error::Error, fmt, path::PathBuf};

use crate::Config;

/// The message shown if the config could not be extracted from the figment
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract portal config:";

/// A failed attempt to extract [`Config`], with one [`ConfigProblem`] per offending value.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    error: figment::Error,
    problems: Vec<ConfigProblem>,
}

impl ExtractConfigError {
    /// Sorts every error figment collected by the layer it came from, dropping duplicates.
    pub fn new(error: figment::Error) -> Self {
        let mut problems = Vec::with_capacity(error.count());
        for err in error.clone() {
            let problem = ConfigProblem::from(err);
            if !problems.contains(&problem) {
                problems.push(problem);
            }
        }
        Self { error, problems }
    }

    pub fn problems(&self) -> &[ConfigProblem] {
        &self.problems
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{FAILED_TO_EXTRACT_CONFIG_MSG}")?;
        for problem in &self.problems {
            writeln!(f, "{problem}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(&self.error)
    }
}

/// A single bad value, attributed to the config layer that supplied it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigProblem {
    /// Set in a toml config file.
    #[error("{}: {message}{}", path.display(), setting(key))]
    File { path: PathBuf, key: Option<String>, message: String },
    /// Set through a `PORTAL_*` environment variable.
    #[error("environment variable `{var}`: {message}")]
    Env { var: String, message: String },
    /// Supplied by defaults or command line arguments.
    #[error("portal config error: {message}{}", setting(key))]
    Other { key: Option<String>, message: String },
}

impl From<figment::Error> for ConfigProblem {
    fn from(err: figment::Error) -> Self {
        let key = (!err.path.is_empty()).then(|| err.path.join("."));
        let message = err.kind.to_string();
        match err.metadata.as_ref().map(Layer::of).unwrap_or(Layer::Other) {
            Layer::File(path) => Self::File { path, key, message },
            Layer::Env => match key {
                Some(key) => {
                    let var = key.replace('.', "_").to_ascii_uppercase();
                    Self::Env { var: format!("{}{var}", Config::ENV_PREFIX), message }
                }
                None => Self::Other { key: None, message },
            },
            Layer::Other => Self::Other { key, message },
        }
    }
}

enum Layer {
    File(PathBuf),
    Env,
    Other,
}

impl Layer {
    fn of(metadata: &Metadata) -> Self {
        match &metadata.source {
            Some(Source::File(path)) if metadata.name.contains(Toml::NAME) => Self::File(path.clone()),
            _ if metadata.name.contains("environment variable") => Self::Env,
            _ => Self::Other,
        }
    }
}

fn setting(key: &Option<String>) -> String {
    key.as_ref().map(|key| format!(" for setting `{key}`")).unwrap_or_default()
}
