//! # Engine Configuration
//!
//! Every subsystem config starts from its `Default` and is overridden by
//! `NP_*` environment variables. Unparseable values are rejected rather
//! than silently ignored.
//!
//! | Variable | Target |
//! |----------|--------|
//! | `NP_MAX_ATTEMPTS` | `QueueConfig::max_attempts` |
//! | `NP_BATCH_SIZE` | `QueueConfig::batch_size` |
//! | `NP_SWEEP_INTERVAL_SECS` | `QueueConfig::sweep_interval_secs` |
//! | `NP_CORE_CHAIN_IDS` | `VerificationConfig::core_chain_ids` (comma separated) |
//! | `NP_COMMUNICATOR_<chainId>` | communicator contract of a chain |
//! | `NP_RPC_<chainId>` | JSON-RPC endpoint of a chain |
//! | `NP_IPFS_GATEWAY` | `ContentConfig::ipfs_gateway` |
//! | `NP_SUBGRAPH_BASE_URL` | `ContentConfig::subgraph_base_url` |
//! | `NP_MAX_SUBSET_RECIPIENTS` | `RecipientConfig::max_subset_recipients` |
//! | `NP_PGP_VERIFIER_URL` | remote PGP verification endpoint |
//! | `NP_DIRECTORY_SEED` | JSON file loaded into the in-memory directory |
//! | `NP_HTTP_TIMEOUT_SECS` | timeout of every outbound HTTP call |

use np_02_verification::VerificationConfig;
use np_03_content_resolution::ContentConfig;
use np_05_recipient_resolution::RecipientConfig;
use np_06_processing_queue::QueueConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Directory seed error: {0}")]
    Seed(String),
}

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub queue: QueueConfig,
    pub verification: VerificationConfig,
    pub content: ContentConfig,
    pub recipients: RecipientConfig,
    /// JSON-RPC endpoint per chain id.
    pub rpc_endpoints: HashMap<u64, String>,
    pub pgp_verifier_url: Option<String>,
    pub directory_seed: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let verification = VerificationConfig::default();
        let queue = QueueConfig {
            default_chain_id: verification.primary_chain_id(),
            ..QueueConfig::default()
        };
        Self {
            queue,
            verification,
            content: ContentConfig::default(),
            recipients: RecipientConfig::default(),
            rpc_endpoints: HashMap::new(),
            pgp_verifier_url: None,
            directory_seed: None,
            http_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Build from an explicit set of variables. Unknown keys are ignored.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            match key.as_str() {
                "NP_MAX_ATTEMPTS" => config.queue.max_attempts = parse(&key, &value)?,
                "NP_BATCH_SIZE" => config.queue.batch_size = parse(&key, &value)?,
                "NP_SWEEP_INTERVAL_SECS" => {
                    config.queue.sweep_interval_secs = parse(&key, &value)?
                }
                "NP_CORE_CHAIN_IDS" => {
                    config.verification.core_chain_ids = value
                        .split(',')
                        .filter(|part| !part.trim().is_empty())
                        .map(|part| parse(&key, part))
                        .collect::<Result<_, _>>()?;
                }
                "NP_IPFS_GATEWAY" => config.content.ipfs_gateway = value,
                "NP_SUBGRAPH_BASE_URL" => config.content.subgraph_base_url = value,
                "NP_MAX_SUBSET_RECIPIENTS" => {
                    config.recipients.max_subset_recipients = parse(&key, &value)?
                }
                "NP_PGP_VERIFIER_URL" if !value.is_empty() => {
                    config.pgp_verifier_url = Some(value)
                }
                "NP_DIRECTORY_SEED" if !value.is_empty() => {
                    config.directory_seed = Some(PathBuf::from(value))
                }
                "NP_HTTP_TIMEOUT_SECS" => config.http_timeout_secs = parse(&key, &value)?,
                _ => {
                    if let Some(chain) = key.strip_prefix("NP_COMMUNICATOR_") {
                        let chain_id = parse(&key, chain)?;
                        config.verification.communicators.insert(chain_id, value);
                    } else if let Some(chain) = key.strip_prefix("NP_RPC_") {
                        let chain_id = parse(&key, chain)?;
                        config.rpc_endpoints.insert(chain_id, value);
                    }
                }
            }
        }

        config.queue.default_chain_id = config.verification.primary_chain_id();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.queue.validate().map_err(ConfigError::Invalid)?;
        if self.recipients.max_subset_recipients == 0 {
            return Err(ConfigError::Invalid(
                "max_subset_recipients must be at least 1".into(),
            ));
        }
        if self.verification.core_chain_ids.is_empty() {
            return Err(ConfigError::Invalid("no core chain configured".into()));
        }
        if let Some(chain_id) = self
            .verification
            .core_chain_ids
            .iter()
            .find(|id| !self.verification.communicators.contains_key(id))
        {
            return Err(ConfigError::Invalid(format!(
                "core chain {chain_id} has no communicator contract"
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue.max_attempts, 5);
        assert_eq!(config.queue.batch_size, 50);
        assert_eq!(config.queue.default_chain_id, 1);
        assert_eq!(config.recipients.max_subset_recipients, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_vars(vars(&[
            ("NP_MAX_ATTEMPTS", "3"),
            ("NP_SWEEP_INTERVAL_SECS", "15"),
            ("NP_CORE_CHAIN_IDS", "11155111, 1"),
            ("NP_COMMUNICATOR_10", "0xabc"),
            ("NP_RPC_1", "http://localhost:8545"),
            ("NP_IPFS_GATEWAY", "http://ipfs.local/ipfs"),
            ("NP_PGP_VERIFIER_URL", ""),
            ("HOME", "/root"),
        ]))
        .unwrap();

        assert_eq!(config.queue.max_attempts, 3);
        assert_eq!(config.queue.sweep_interval_secs, 15);
        assert_eq!(config.verification.core_chain_ids, vec![11155111, 1]);
        assert_eq!(config.queue.default_chain_id, 11155111);
        assert_eq!(config.verification.communicators[&10], "0xabc");
        assert_eq!(config.rpc_endpoints[&1], "http://localhost:8545");
        assert_eq!(config.content.ipfs_gateway, "http://ipfs.local/ipfs");
        assert!(config.pgp_verifier_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparseable_value_rejected() {
        let err = EngineConfig::from_vars(vars(&[("NP_MAX_ATTEMPTS", "five")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "NP_MAX_ATTEMPTS".into(),
                value: "five".into()
            }
        );
        assert!(EngineConfig::from_vars(vars(&[("NP_RPC_mainnet", "http://x")])).is_err());
    }

    #[test]
    fn test_validate_rejects_core_chain_without_communicator() {
        let config = EngineConfig::from_vars(vars(&[("NP_CORE_CHAIN_IDS", "1,42")])).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = EngineConfig::from_vars(vars(&[("NP_MAX_ATTEMPTS", "0")])).unwrap();
        assert!(config.validate().is_err());
    }
}
