//! TOML run configuration

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use knowledge_index::ChunkingConfig;
use section_writer::{GeneratorConfig, Provider, ServiceConfig};
use serde::{Deserialize, Serialize};

use crate::assembler::AssemblyOptions;

/// Full run configuration; every table and field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub index: ChunkingConfig,
    #[serde(default)]
    pub generation: GeneratorConfig,
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub assembly: AssemblyOptions,
}

impl ReportConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// ```
    /// use report_core::config::ReportConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ReportConfig::from_str(r#"
    ///     [generation]
    ///     cooldown_ms = 500
    ///
    ///     [service]
    ///     provider = "grok"
    /// "#)?;
    /// assert_eq!(config.generation.cooldown_ms, 500);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config
            .index
            .validate()
            .context("Invalid [index] configuration")?;
        Ok(config)
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "REPORT_API_KEY".to_string()
}

/// The `[service]` table; the API key itself is read from the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            base_url: None,
            model: None,
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ServiceSettings {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> anyhow::Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("Environment variable {} is not set", self.api_key_env))
    }

    pub fn to_service_config(&self, api_key: impl Into<String>) -> ServiceConfig {
        let mut config = ServiceConfig::new(self.provider, api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        config
    }
}
