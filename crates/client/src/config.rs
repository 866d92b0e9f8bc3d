use crate::ConfigError;
use std::{path::PathBuf, time::Duration};

use alloy_primitives::B256;
use rollup_client_primitives::{AccountId, ScriptTemplate};
use rollup_client_providers::{HttpRollupRpc, DEFAULT_METHOD_PREFIX};
use rollup_client_watcher::{PollPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};

/// The scripts and identifiers of a rollup deployment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeploymentConfig {
    /// The type hash of the rollup cell, which identifies the rollup instance.
    pub rollup_type_hash: B256,
    /// The lock of the accounts owned by Ethereum addresses.
    pub eth_account_lock: ScriptTemplate,
    /// The validator of the contract accounts.
    pub polyjuice_validator: ScriptTemplate,
}

impl DeploymentConfig {
    /// Reads the deployment from a JSON file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// The arguments of the rollup client.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientArgs {
    /// The URL of the rollup JSON-RPC.
    #[arg(long = "rollup.url", id = "rollup_url", value_name = "ROLLUP_URL")]
    pub url: Option<reqwest::Url>,
    /// The prefix of the rollup JSON-RPC methods.
    #[arg(long = "rollup.method-prefix", id = "rollup_method_prefix", value_name = "ROLLUP_METHOD_PREFIX", default_value = DEFAULT_METHOD_PREFIX)]
    pub method_prefix: String,
    /// The path to the deployment JSON file.
    #[arg(long = "deployment.path", id = "deployment_path", value_name = "DEPLOYMENT_PATH")]
    pub deployment_path: Option<PathBuf>,
    /// The polling timeout in seconds.
    #[arg(long = "poll.timeout", id = "poll_timeout", value_name = "POLL_TIMEOUT", default_value_t = DEFAULT_POLL_TIMEOUT.as_secs())]
    pub poll_timeout: u64,
    /// The polling interval in seconds.
    #[arg(long = "poll.interval", id = "poll_interval", value_name = "POLL_INTERVAL", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval: u64,
    /// The id of the account creating contracts.
    #[arg(long = "creator-account-id", id = "creator_account_id", value_name = "CREATOR_ACCOUNT_ID")]
    pub creator_account_id: Option<AccountId>,
}

impl ClientArgs {
    /// Validates the arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_none() {
            return Err("The rollup URL is required".to_string());
        }
        if self.deployment_path.is_none() {
            return Err("The deployment file path is required".to_string());
        }
        if self.poll_interval == 0 {
            return Err("The polling interval must be positive".to_string());
        }
        if self.poll_interval > self.poll_timeout {
            return Err("The polling interval cannot exceed the polling timeout".to_string());
        }
        Ok(())
    }

    /// Returns the polling policy.
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.poll_timeout),
            Duration::from_secs(self.poll_interval),
        )
    }

    /// Returns the rollup rpc, if a URL was provided.
    pub fn rollup_rpc(&self) -> Option<HttpRollupRpc> {
        self.url.clone().map(|url| HttpRollupRpc::new_http(url, self.method_prefix.clone()))
    }

    /// Reads the deployment, if a path was provided.
    pub fn deployment(&self) -> Result<Option<DeploymentConfig>, ConfigError> {
        self.deployment_path.as_ref().map(DeploymentConfig::from_path).transpose()
    }
}
