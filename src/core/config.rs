//! Runtime settings for the gateway CLI.
//!
//! Settings come from process environment variables (`GWA_ENV`,
//! `GWA_NAMESPACE`, `CLIENT_ID`, `CLIENT_SECRET`), with a `.env` file in the
//! working directory loaded first. Process variables always win over the
//! file, and a missing file is not an error. Validation is deferred to the
//! point of use: an operation that needs a namespace reports the missing
//! namespace itself.

use std::fmt::{self, Display};
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Gateway environment tiers recognized by the endpoint resolver.
///
/// Unknown or unset values degrade to [`Environment::Dev`], the documented
/// default, so a misconfigured `GWA_ENV` never takes down every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    /// Fixed pre-migration endpoints
    Legacy,
    /// Development tier (default)
    #[default]
    Dev,
    /// Test tier
    Test,
    /// Production tier
    Prod,
}

impl Environment {
    /// Get the string identifier for this environment
    pub fn name(self) -> &'static str {
        match self {
            Environment::Legacy => "legacy",
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Get all recognized environments
    pub fn all() -> &'static [Environment] {
        &[
            Environment::Legacy,
            Environment::Dev,
            Environment::Test,
            Environment::Prod,
        ]
    }

    /// Lenient parse used when reading `GWA_ENV`: anything unrecognized
    /// (including the empty string) resolves to the default tier.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Environment {
    type Err = EnvironmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Environment::Legacy),
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" => Ok(Environment::Prod),
            _ => Err(EnvironmentParseError::Unknown(s.to_string())),
        }
    }
}

/// Error type for strict environment parsing (CLI flags, init validation)
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentParseError {
    Unknown(String),
}

impl Display for EnvironmentParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentParseError::Unknown(env) => {
                write!(
                    f,
                    "Unknown environment: '{}'. Available environments: {}",
                    env,
                    Environment::all()
                        .iter()
                        .map(|e| e.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for EnvironmentParseError {}

/// OAuth2 client secret, cleared from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the secret value (limited access)
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Resolved runtime settings consumed by the API layer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub namespace: String,
    pub client_id: String,
    pub client_secret: ClientSecret,
}

impl Settings {
    /// Load settings, merging `./.env` into the process environment first.
    /// Existing process variables win; a missing file is ignored.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Read settings straight from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            env: Environment::parse_or_default(&get("GWA_ENV")),
            namespace: get("GWA_NAMESPACE"),
            client_id: get("CLIENT_ID"),
            client_secret: ClientSecret::new(get("CLIENT_SECRET")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!(
            " legacy ".parse::<Environment>().unwrap(),
            Environment::Legacy
        );
    }

    #[test]
    fn test_environment_from_str_invalid() {
        let result = "staging".parse::<Environment>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("staging"));
    }

    #[test]
    fn test_environment_parse_or_default() {
        assert_eq!(Environment::parse_or_default(""), Environment::Dev);
        assert_eq!(Environment::parse_or_default("sandbox"), Environment::Dev);
        assert_eq!(Environment::parse_or_default("test"), Environment::Test);
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Legacy), "legacy");
        assert_eq!(format!("{}", Environment::Prod), "prod");
    }

    #[test]
    fn test_settings_from_lookup() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GWA_ENV", "test"),
            ("GWA_NAMESPACE", "sampler"),
            ("CLIENT_ID", "sampler-ci"),
            ("CLIENT_SECRET", "s3cret"),
        ]));
        assert_eq!(settings.env, Environment::Test);
        assert_eq!(settings.namespace, "sampler");
        assert_eq!(settings.client_id, "sampler-ci");
        assert_eq!(settings.client_secret.expose_secret(), "s3cret");
    }

    #[test]
    fn test_settings_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[]));
        assert_eq!(settings.env, Environment::Dev);
        assert!(settings.namespace.is_empty());
        assert!(settings.client_id.is_empty());
        assert!(settings.client_secret.is_empty());
    }

    #[test]
    fn test_client_secret_debug_is_redacted() {
        let secret = ClientSecret::new("very-secret");
        assert_eq!(format!("{:?}", secret), "ClientSecret(***)");
    }
}
