//! Core configuration: credential, knowledge-base binding, assistant reuse, polling cadence.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | OPENAI_API_KEY | unset | Credential for the hosted assistant backend. Required to answer. |
//! | ASSISTANT_ID | unset | Pre-provisioned assistant; skips lazy creation. |
//! | VECTOR_STORE_ID | `DEFAULT_VECTOR_STORE_ID` | Knowledge base the assistant searches. |
//! | OPENAI_API_BASE | https://api.openai.com/v1 | Backend base URL. |
//! | TOME_MODEL | gpt-4o-mini | Model for a lazily created assistant. |
//! | TOME_POLL_INTERVAL_MS | 1000 | Wait between run polls. |
//! | TOME_POLL_MAX_ATTEMPTS | 60 | Polls before a pending run times out. |
//! | TOME_BIND | 127.0.0.1:8000 | Gateway listen address. |
//!
//! An optional TOML file (`TOME_CONFIG`, default `config/tome.toml`) sits between the defaults
//! and the environment.

use crate::error::CoreResult;
use crate::openai::DEFAULT_API_BASE;
use crate::run_state::PollPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Knowledge base the assistant is bound to unless overridden.
pub const DEFAULT_VECTOR_STORE_ID: &str = "vs_tome_library";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    pub vector_store_id: String,
    pub api_base: String,
    pub model: String,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
    pub bind: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            assistant_id: None,
            vector_store_id: DEFAULT_VECTOR_STORE_ID.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval_ms: 1000,
            poll_max_attempts: 60,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl CoreConfig {
    /// Load from defaults, then the TOML file (if present), then the environment.
    pub fn load() -> CoreResult<Self> {
        let config_path = std::env::var("TOME_CONFIG").unwrap_or_else(|_| "config/tome.toml".to_string());
        let builder = config::Config::builder()
            .set_default("vector_store_id", DEFAULT_VECTOR_STORE_ID)?
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("model", DEFAULT_MODEL)?
            .set_default("poll_interval_ms", 1000_i64)?
            .set_default("poll_max_attempts", 60_i64)?
            .set_default("bind", DEFAULT_BIND)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("TOME").try_parsing(true))
            .set_override_option("openai_api_key", env_opt_string("OPENAI_API_KEY"))?
            .set_override_option("assistant_id", env_opt_string("ASSISTANT_ID"))?
            .set_override_option("vector_store_id", env_opt_string("VECTOR_STORE_ID"))?
            .set_override_option("api_base", env_opt_string("OPENAI_API_BASE"))?
            .build()?;

        Ok(built.try_deserialize::<CoreConfig>()?.normalized())
    }

    /// Blank strings count as unset; the poll cap is at least one attempt.
    fn normalized(mut self) -> Self {
        self.openai_api_key = self.openai_api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self.assistant_id = self.assistant_id.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self.poll_max_attempts = self.poll_max_attempts.max(1);
        self
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts.max(1),
        }
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_one_second_by_sixty() {
        let cfg = CoreConfig::default();
        let policy = cfg.poll_policy();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 60);
        assert_eq!(cfg.vector_store_id, DEFAULT_VECTOR_STORE_ID);
    }

    #[test]
    fn normalization_drops_blank_ids_and_zero_cap() {
        let cfg = CoreConfig {
            openai_api_key: Some("  ".to_string()),
            assistant_id: Some(" asst_1 ".to_string()),
            poll_max_attempts: 0,
            ..CoreConfig::default()
        }
        .normalized();
        assert_eq!(cfg.openai_api_key, None);
        assert_eq!(cfg.assistant_id.as_deref(), Some("asst_1"));
        assert_eq!(cfg.poll_max_attempts, 1);
    }
}
