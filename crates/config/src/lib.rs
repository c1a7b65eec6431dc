//! Configuration loading, validation, and management for AlterEgo.
//!
//! Loads configuration from `~/.alterego/config.toml` with environment
//! variable overrides. Validates all settings at startup and hands the
//! persona-specific part to the rest of the system as an immutable
//! [`PersonaConfig`].

use alterego_core::persona::{PersonaConfig, PromptStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.alterego/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for every turn
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Who the assistant speaks as
    #[serde(default)]
    pub persona: PersonaSection,

    /// Grounding sources
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Push-notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Conversation loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP front end
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("persona", &self.persona)
            .field("profile", &self.profile)
            .field("notify", &self.notify)
            .field("agent", &self.agent)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSection {
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// "main", "professional" or "casual"; anything else means "main"
    #[serde(default = "default_prompt_style")]
    pub prompt_style: String,
}

fn default_persona_name() -> String {
    "AlterEgo".into()
}
fn default_prompt_style() -> String {
    "main".into()
}

impl Default for PersonaSection {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            prompt_style: default_prompt_style(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_summary_path")]
    pub summary_path: Option<PathBuf>,

    #[serde(default = "default_resume_path")]
    pub resume_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Seconds a fetched GitHub block is reused; 0 = always refetch
    #[serde(default = "default_cache_duration")]
    pub cache_duration_secs: u64,
}

fn default_summary_path() -> Option<PathBuf> {
    Some(PathBuf::from("me/summary.txt"))
}
fn default_resume_path() -> Option<PathBuf> {
    Some(PathBuf::from("me/resume.pdf"))
}
fn default_cache_duration() -> u64 {
    3600
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            summary_path: default_summary_path(),
            resume_path: default_resume_path(),
            github_username: None,
            github_token: None,
            cache_duration_secs: default_cache_duration(),
        }
    }
}

impl std::fmt::Debug for ProfileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileConfig")
            .field("summary_path", &self.summary_path)
            .field("resume_path", &self.resume_path)
            .field("github_username", &self.github_username)
            .field("github_token", &redact(&self.github_token))
            .field("cache_duration_secs", &self.cache_duration_secs)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushover_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushover_user: Option<String>,
}

impl NotifyConfig {
    /// Both Pushover credentials are present.
    pub fn has_pushover(&self) -> bool {
        self.pushover_token.is_some() && self.pushover_user.is_some()
    }
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("pushover_token", &redact(&self.pushover_token))
            .field("pushover_user", &redact(&self.pushover_user))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Safety bound on model calls per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    7860
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.alterego/config.toml).
    ///
    /// Environment overrides:
    /// - `ALTEREGO_API_KEY`, then `OPENAI_API_KEY` (when no key is configured)
    /// - `ALTEREGO_MODEL`
    /// - `GITHUB_USERNAME`, `GITHUB_TOKEN`
    /// - `PUSHOVER_TOKEN`, `PUSHOVER_USER`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("ALTEREGO_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(model) = lookup("ALTEREGO_MODEL") {
            self.model = model;
        }
        if let Some(username) = lookup("GITHUB_USERNAME") {
            self.profile.github_username = Some(username);
        }
        if self.profile.github_token.is_none() {
            self.profile.github_token = lookup("GITHUB_TOKEN");
        }
        if self.notify.pushover_token.is_none() {
            self.notify.pushover_token = lookup("PUSHOVER_TOKEN");
        }
        if self.notify.pushover_user.is_none() {
            self.notify.pushover_user = lookup("PUSHOVER_USER");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".alterego")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.persona.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "persona.name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The immutable persona configuration handed to the profile and agent
    /// layers.
    pub fn persona_config(&self) -> PersonaConfig {
        PersonaConfig {
            name: self.persona.name.clone(),
            prompt_style: PromptStyle::parse(&self.persona.prompt_style),
            summary_path: self.profile.summary_path.clone(),
            resume_path: self.profile.resume_path.clone(),
            github_username: self
                .profile
                .github_username
                .clone()
                .filter(|u| !u.trim().is_empty()),
            github_token: self.profile.github_token.clone(),
            cache_duration_secs: self.profile.cache_duration_secs,
        }
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            persona: PersonaSection::default(),
            profile: ProfileConfig::default(),
            notify: NotifyConfig::default(),
            agent: AgentConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
