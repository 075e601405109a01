use std::{net::IpAddr, path::Path, path::PathBuf};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use folio_models::{email_address::EmailAddressWithName, Sensitive};
use serde::Deserialize;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of config files, later files take precedence.
pub const CONFIG_PATHS_ENV: &str = "FOLIO_CONFIG";

const ENV_PREFIX: &str = "FOLIO";

/// Load the config from the files listed in `FOLIO_CONFIG` (or the default
/// config file), overlaid with `FOLIO__*` environment variables.
pub fn load() -> anyhow::Result<Config> {
    let paths = match std::env::var(CONFIG_PATHS_ENV) {
        Ok(paths) => paths.split(':').map(PathBuf::from).collect(),
        Err(_) => vec![PathBuf::from(DEFAULT_CONFIG_PATH)],
    };
    load_with_overrides(&paths, &[])
}

/// Load the config from the given files, then apply each override, a TOML
/// snippet like `"http.port = 8080"`, on top.
pub fn load_with_overrides(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("http.allowed_origins"),
        );

    overrides
        .iter()
        .fold(builder, |builder, &snippet| {
            builder.add_source(File::from_str(snippet, FileFormat::Toml))
        })
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub public_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from: EmailAddressWithName,
    pub username: Option<String>,
    pub password: Option<Sensitive<String>>,
}

impl EmailConfig {
    /// The mail account login, if both halves are configured.
    pub fn credentials(&self) -> Option<(String, Sensitive<String>)> {
        self.username
            .clone()
            .filter(|username| !username.is_empty())
            .zip(self.password.clone().filter(|password| !password.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub recipient: EmailAddressWithName,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}
