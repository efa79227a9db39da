//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rehearse_core::retry::RetryPolicy;
use rehearse_core::traits::LlmProvider;
use rehearse_core::PracticeConfig;

use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Longest single backoff between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
        }
    }
}

impl ProviderConfig {
    fn api_key(&self) -> &str {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::OpenAI { api_key, .. } => {
                api_key
            }
        }
    }
}

/// Top-level `rehearse.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RehearseConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is named on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Attempts per LLM call, including the first.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds; doubled per retry.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub practice: PracticeConfig,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for RehearseConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            practice: PracticeConfig::default(),
        }
    }
}

impl RehearseConfig {
    /// Backoff policy for every LLM call.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            max_delay: MAX_RETRY_DELAY,
        }
    }

    /// Check value ranges after loading.
    pub fn validate(&self) -> Result<()> {
        self.practice.validate().context("invalid [practice] table")?;
        anyhow::ensure!(self.max_retries >= 1, "max_retries must be at least 1");
        Ok(())
    }

    /// The named provider's config, or the default provider's.
    pub fn provider(&self, name: Option<&str>) -> Result<(&str, &ProviderConfig)> {
        let name = name.unwrap_or(&self.default_provider);
        let (key, config) = self.providers.get_key_value(name).with_context(|| {
            format!(
                "provider '{name}' is not configured; add [providers.{name}] to rehearse.toml \
                 or set REHEARSE_GEMINI_KEY / REHEARSE_OPENAI_KEY"
            )
        })?;
        anyhow::ensure!(
            !config.api_key().trim().is_empty(),
            "provider '{name}' has an empty api_key"
        );
        Ok((key.as_str(), config))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables expand to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            org_id: org_id.as_deref().map(resolve_env_vars),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `rehearse.toml` in the current directory
/// 2. `~/.config/rehearse/config.toml`
///
/// Environment variable overrides: `REHEARSE_GEMINI_KEY`, `REHEARSE_OPENAI_KEY`.
pub fn load_config() -> Result<RehearseConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<RehearseConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("rehearse.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => RehearseConfig::default(),
    };

    apply_env_overrides(&mut config);

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<RehearseConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<RehearseConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_env_overrides(config: &mut RehearseConfig) {
    if let Ok(key) = std::env::var("REHEARSE_GEMINI_KEY") {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("REHEARSE_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("rehearse"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => Ok(Arc::new(
            GeminiProvider::new(api_key, base_url.clone())
                .context("failed to create Gemini provider")?,
        )),
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Arc::new(
            OpenAiProvider::new(api_key, base_url.clone(), org_id.clone())
                .context("failed to create OpenAI provider")?,
        )),
    }
}
