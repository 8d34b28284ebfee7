//! Server configuration and credential lookup

use std::fmt;

use nomi_api::DEFAULT_BASE_URL;

use crate::{Error, Result};

/// Environment variable holding the Nomi API key
pub const DEFAULT_API_KEY_ENV: &str = "NOMI_API_KEY";

/// Where the API credential comes from
///
/// The credential is resolved on every tool call, never at startup, so the
/// server starts without one and only fails once a tool is invoked.
#[derive(Clone)]
pub enum CredentialSource {
    /// Read the named environment variable at call time
    Env(String),
    /// A fixed value (or its absence)
    Fixed(Option<String>),
}

impl CredentialSource {
    /// Read the default `NOMI_API_KEY` variable
    pub fn env() -> Self {
        CredentialSource::Env(DEFAULT_API_KEY_ENV.to_string())
    }

    /// Resolve the credential, failing if it is unset or empty
    pub fn resolve(&self) -> Result<String> {
        match self {
            CredentialSource::Env(var) => std::env::var(var)
                .ok()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Configuration {
                    message: format!("{} environment variable not set", var),
                }),
            CredentialSource::Fixed(value) => value
                .clone()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Configuration {
                    message: "Nomi API key not configured".to_string(),
                }),
        }
    }
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::env()
    }
}

// Never print the secret itself
impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Env(var) => f.debug_tuple("Env").field(var).finish(),
            CredentialSource::Fixed(Some(_)) => f.write_str("Fixed(<redacted>)"),
            CredentialSource::Fixed(None) => f.write_str("Fixed(None)"),
        }
    }
}

/// Configuration for [`crate::NomiMcpServer`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the Nomi API
    pub base_url: String,

    /// Credential lookup
    pub credentials: CredentialSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: CredentialSource::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_credential_resolves() {
        let source = CredentialSource::Fixed(Some("abc".to_string()));
        assert_eq!(source.resolve().unwrap(), "abc");
    }

    #[test]
    fn missing_fixed_credential_is_configuration_error() {
        for source in [
            CredentialSource::Fixed(None),
            CredentialSource::Fixed(Some(String::new())),
        ] {
            assert!(matches!(
                source.resolve(),
                Err(Error::Configuration { .. })
            ));
        }
    }

    #[test]
    fn unset_env_credential_names_variable() {
        let source = CredentialSource::Env("NOMI_MCP_TEST_SURELY_UNSET_VAR".to_string());
        let err = source.resolve().unwrap_err();
        assert_eq!(
            err.to_string(),
            "NOMI_MCP_TEST_SURELY_UNSET_VAR environment variable not set"
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let source = CredentialSource::Fixed(Some("super-secret".to_string()));
        let printed = format!("{:?}", source);
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn default_config_targets_production() {
        let config = ServerConfig::default();
        assert_eq!(config.base_url, "https://api.nomi.ai/v1");
        assert!(matches!(
            config.credentials,
            CredentialSource::Env(ref var) if var == "NOMI_API_KEY"
        ));
    }
}
