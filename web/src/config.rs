use anyhow::{Context, Result};
use libnearby::tripcost::{DEFAULT_PROVIDER_URL, FuelEstimate};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::{collections::HashMap, path::Path};
use tracing::debug;

const API_KEY_ENV_VAR: &str = "NEARBYWEB_TOLLGURU_API_KEY";

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) api_key_file: String,
    /// request timeout in seconds
    pub(crate) timeout: Option<u64>,
    #[serde(skip)]
    pub(crate) api_key: SecretString,
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

impl PartialEq for ProviderConfig {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && self.api_key_file == other.api_key_file
            && self.timeout == other.timeout
            && self.api_key.expose_secret() == other.api_key.expose_secret()
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct TripCostConfig {
    pub(crate) provider: Option<ProviderConfig>,
    #[serde(default)]
    pub(crate) fuel: FuelEstimate,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_HOST: &str = "0.0.0.0";
fn default_listen() -> ListenConfig {
    ListenConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
    }
}

// This handles the case where the `listen` block is PRESENT, but a field may be missing.
fn deserialize_listen_with_default_port<'de, D>(deserializer: D) -> Result<ListenConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct PartialListenConfig {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial_config = PartialListenConfig::deserialize(deserializer)?;

    Ok(ListenConfig {
        host: partial_config
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: partial_config.port.unwrap_or(DEFAULT_PORT),
    })
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_listen")]
    #[serde(deserialize_with = "deserialize_listen_with_default_port")]
    pub(crate) listen: ListenConfig,
    pub(crate) database: String,
    #[serde(default)]
    pub(crate) trip_cost: TripCostConfig,
}

impl EnvConfig {
    /// Reads the file at `path` and returns the environment named `envname`
    pub(crate) async fn load<P: AsRef<Path>>(path: P, envname: &str) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, envname, "Loading configuration");
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        let mut configs: HashMap<String, EnvConfig> = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {path:?}"))?;
        let mut config = configs
            .remove(envname)
            .with_context(|| format!("No environment '{envname}' in config file {path:?}"))?;
        config.init()?;
        Ok(config)
    }

    pub(crate) fn init(&mut self) -> Result<()> {
        if let Some(ref mut provider) = self.trip_cost.provider {
            // 'api_key_file' entry in environment config takes priority
            if !provider.api_key_file.is_empty() {
                debug!(
                    "Looking up trip cost api key from file '{}'",
                    provider.api_key_file
                );
                provider.api_key = std::fs::read_to_string(&provider.api_key_file)
                    .with_context(|| {
                        format!(
                            "Failed to read trip cost api key from file '{}'",
                            provider.api_key_file
                        )
                    })?
                    .trim()
                    .to_string()
                    .into();
            } else {
                debug!("Looking up trip cost api key from environment variable");
                provider.api_key = std::env::var(API_KEY_ENV_VAR)
                    .with_context(|| {
                        format!("Failed to get trip cost api key from env variable {API_KEY_ENV_VAR}")
                    })?
                    .into();
            }
        }
        Ok(())
    }
}
