//! CLI configuration utilities

use anyhow::Result;
use serde::{Deserialize, Serialize};
use staffdir_client::ClientConfig;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `STAFFDIR_API__BASE_URL`
const ENV_PREFIX: &str = "STAFFDIR";

/// Name of the credential file inside the state directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Effective CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Backend connection
    pub api: ClientConfig,

    /// Where the session is kept between invocations
    pub state_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration: defaults, then the optional file, then `STAFFDIR_*`
    /// environment variables (`__` separates nested keys)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// State directory with default fallback
    pub fn state_dir(&self, overridden: Option<PathBuf>) -> PathBuf {
        overridden
            .or_else(|| self.state_dir.clone())
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("staffdir")
            })
    }
}

/// Write the default configuration as TOML
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    save_config(&CliConfig::default(), path)
}

/// Save configuration to a TOML file
pub fn save_config<P: AsRef<Path>>(config: &CliConfig, path: P) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
