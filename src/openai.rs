//! OpenAI-compatible client construction.
//!
//! The default endpoint is the Dedalus gateway, which speaks the OpenAI chat
//! completions protocol and accepts provider-prefixed model ids such as
//! `openai/gpt-5`.

use crate::config::AgentSettings;
use crate::error::{DeskhandError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the configured endpoint.
///
/// Reads the API key from the environment variable named in the settings.
pub fn create_client(settings: &AgentSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
        DeskhandError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            settings.api_key_env, settings.api_key_env
        ))
    })?;

    create_client_with(
        &settings.api_base,
        &api_key,
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create a client with an explicit endpoint, key and timeout.
pub fn create_client_with(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let settings = AgentSettings {
            api_key_env: "DESKHAND_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AgentSettings::default()
        };

        match create_client(&settings) {
            Err(DeskhandError::Config(msg)) => {
                assert!(msg.contains("DESKHAND_TEST_KEY_THAT_IS_NEVER_SET"))
            }
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }
    }
}
