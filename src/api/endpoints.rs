//! Environment to endpoint resolution.
//!
//! Each environment tier maps to an OAuth2 token endpoint and an API host.
//! Legacy and prod are fixed pairs; the remaining tiers interpolate the
//! environment name into the gateway URL templates. Resolution is a pure
//! function of the environment and can never fail: unknown values were
//! already folded into the default tier when settings were parsed.

use crate::core::config::Environment;

const LEGACY_AUTH_ENDPOINT: &str =
    "https://aps.pathfinder.gov.bc.ca/auth/realms/aps/protocol/openid-connect/token";
const LEGACY_API_HOST: &str = "https://gwa-api.pathfinder.gov.bc.ca/v1";

const PROD_AUTH_ENDPOINT: &str =
    "https://authz.apps.gov.bc.ca/auth/realms/aps/protocol/openid-connect/token";
const PROD_API_HOST: &str = "https://gwa.api.gov.bc.ca/v1";

/// Token endpoint and API host for one environment tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPair {
    pub auth_endpoint: String,
    pub api_host: String,
}

/// Resolve the endpoint pair for `env`.
pub fn resolve(env: Environment) -> EndpointPair {
    match env {
        Environment::Legacy => EndpointPair {
            auth_endpoint: LEGACY_AUTH_ENDPOINT.to_string(),
            api_host: LEGACY_API_HOST.to_string(),
        },
        Environment::Prod => EndpointPair {
            auth_endpoint: PROD_AUTH_ENDPOINT.to_string(),
            api_host: PROD_API_HOST.to_string(),
        },
        Environment::Dev | Environment::Test => EndpointPair {
            auth_endpoint: format!(
                "https://authz-apps-gov-bc-ca.{}.apsgw.xyz/auth/realms/aps/protocol/openid-connect/token",
                env.name()
            ),
            api_host: format!("https://gwa-api-gov-bc-ca.{}.apsgw.xyz/v1", env.name()),
        },
    }
}
