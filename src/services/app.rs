//! Project setup helpers: `.env` generation and release checks.

use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::core::config::Environment;
use crate::core::error::{Error, Result};

const ENV_FILE: &str = ".env";
const RELEASES_URL: &str = "https://api.github.com/repos/bcgov/gwa-cli/releases/latest";

static NAMESPACE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]{4,14}$").expect("valid namespace pattern"));

/// Values collected for a new `.env` file.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub namespace: String,
    pub client_id: String,
    pub client_secret: String,
    pub env: String,
}

pub fn env_file_exists(dir: impl AsRef<Path>) -> bool {
    dir.as_ref().join(ENV_FILE).exists()
}

/// Validate the options and write `.env` into the given directory.
///
/// Every violated rule is collected so the operator sees the full list in one
/// run instead of fixing them one at a time.
pub async fn make_env_file(dir: impl AsRef<Path>, options: &InitOptions) -> Result<String> {
    let problems = validate_init_options(options);
    if !problems.is_empty() {
        return Err(Error::validation(problems.join("\n")));
    }

    let contents = format!(
        "GWA_NAMESPACE={}\nCLIENT_ID={}\nCLIENT_SECRET={}\nGWA_ENV={}\n",
        options.namespace, options.client_id, options.client_secret, options.env
    );
    fs::write(dir.as_ref().join(ENV_FILE), contents).await?;

    Ok(".env file successfully generated".to_string())
}

fn validate_init_options(options: &InitOptions) -> Vec<String> {
    let mut problems = Vec::new();

    let namespace = options.namespace.trim();
    if namespace.is_empty() {
        problems.push("Namespace can't be blank".to_string());
    } else {
        let length = namespace.chars().count();
        if length < 5 {
            problems.push("Namespace is too short (minimum is 5 characters)".to_string());
        } else if length > 15 {
            problems.push("Namespace is too long (maximum is 15 characters)".to_string());
        }
        if !NAMESPACE_FORMAT.is_match(namespace) {
            problems.push("Namespace can only contain a-z, 0-9 and dashes".to_string());
        }
    }

    if options.client_id.trim().is_empty() {
        problems.push("Client id can't be blank".to_string());
    }
    if options.client_secret.trim().is_empty() {
        problems.push("Client secret can't be blank".to_string());
    }
    if options.env.parse::<Environment>().is_err() {
        problems.push(format!(
            "Env must be one of {}",
            Environment::all()
                .iter()
                .map(|env| env.name())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    problems
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Ask GitHub for the latest release and report a newer version when one
/// exists. Callers treat failures as non-fatal; the check never blocks a
/// command from running.
pub async fn check_version(current: &str) -> Result<Option<String>> {
    check_version_at(RELEASES_URL, current).await
}

async fn check_version_at(url: &str, current: &str) -> Result<Option<String>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .expect("Failed to create HTTP client");

    let release: LatestRelease = client.get(url).send().await?.json().await?;
    let latest = release.tag_name.trim_start_matches('v').to_string();
    debug!(%latest, %current, "release check");

    if version_newer(&latest, current) {
        Ok(Some(latest))
    } else {
        Ok(None)
    }
}

/// Numeric segment-wise comparison, so `1.10.0` ranks above `1.9.0`.
fn version_newer(candidate: &str, current: &str) -> bool {
    let parse = |value: &str| -> Vec<u64> {
        value
            .split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };
    let candidate = parse(candidate);
    let current = parse(current);
    let len = candidate.len().max(current.len());

    for i in 0..len {
        let a = candidate.get(i).copied().unwrap_or(0);
        let b = current.get(i).copied().unwrap_or(0);
        if a != b {
            return a > b;
        }
    }
    false
}
