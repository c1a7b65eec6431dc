//! Language-model provider implementations for AlterEgo.
//!
//! All providers implement the `alterego_core::Provider` trait.
//! [`build_from_config`] picks the provider for the loaded configuration.

pub mod openai_compat;

use std::sync::Arc;

use alterego_config::AppConfig;
use alterego_core::error::ProviderError;
use alterego_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key; set OPENAI_API_KEY or api_key in config.toml".into(),
        )
    })?;
    let provider = OpenAiCompatProvider::new("openai", &config.api_url, api_key)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn builds_with_key() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
