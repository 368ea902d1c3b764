//! Publishing config bundles and updating namespace membership.
//!
//! Publishing performs its own multipart upload because the dispatcher is
//! JSON-only; it still resolves endpoints and authenticates through the same
//! [`ApiClient`]. Membership updates go through the dispatcher.

use std::path::Path;

use reqwest::Method;
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::fs;
use tracing::debug;

use crate::api::request::{ApiClient, RequestOptions, compile_path};
use crate::core::error::{Error, Result};

const TEMP_BUNDLE_NAME: &str = ".temp.yaml";
const NAMESPACE_ERROR: &str =
    "You do not have a namespace set. Check your .env file in this directory or run gwa init";

/// Payload returned by the gateway on a successful publish.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: String,
}

/// Counters returned by a membership update.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MembershipCounters {
    #[serde(default)]
    pub added: u32,
    #[serde(default)]
    pub missing: u32,
    #[serde(default)]
    pub removed: u32,
}

#[derive(Debug, Serialize)]
struct MembershipEntry {
    username: String,
    roles: Vec<String>,
}

/// Publish a config bundle with a multipart PUT to the gateway.
///
/// With no explicit file, every `.yaml`/`.yml` in the working directory is
/// merged into one bundle. A configured namespace is required; the error
/// message tells the operator how to set one.
pub async fn publish_config(
    client: &ApiClient,
    file: Option<&str>,
    dry_run: bool,
) -> Result<PublishResponse> {
    let settings = client.settings();
    if settings.namespace.is_empty() {
        return Err(Error::config(NAMESPACE_ERROR));
    }

    let (bundle, filename) = match file {
        Some(path) => (fs::read_to_string(path).await?, path.to_string()),
        None => (
            merge_configs(Path::new(".")).await?,
            TEMP_BUNDLE_NAME.to_string(),
        ),
    };

    let token = client.token().await?;
    let path = compile_path("/namespaces/:namespace/gateway", &settings.namespace);
    let url = format!("{}{}", client.endpoints().api_host, path);
    debug!(%url, dry_run, "uploading config bundle");

    let part = multipart::Part::bytes(bundle.into_bytes()).file_name(filename);
    let form = multipart::Form::new()
        .part("configFile", part)
        .text("dryRun", if dry_run { "true" } else { "false" });

    let response = client
        .http()
        .put(&url)
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let body: JsonValue = response.json().await?;

    if status.as_u16() >= 400 {
        let detail = body
            .get("results")
            .and_then(|value| value.as_str())
            .or_else(|| body.get("error").and_then(|value| value.as_str()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown"));
        return Err(Error::dispatch(detail));
    }

    Ok(serde_json::from_value(body)?)
}

/// Replace the namespace membership list.
///
/// Managers are granted the admin role; every listed user, managers included,
/// is granted the viewer role. Blank and duplicate names are dropped.
pub async fn add_members(
    client: &ApiClient,
    users: &[String],
    managers: &[String],
) -> Result<MembershipCounters> {
    let entries = membership_entries(users, managers);
    let body = serde_json::to_value(&entries)?;

    client
        .request(
            "/namespaces/:namespace/membership",
            RequestOptions::default()
                .with_method(Method::PUT)
                .with_body(body),
        )
        .await
}

fn membership_entries(users: &[String], managers: &[String]) -> Vec<MembershipEntry> {
    let mut entries = Vec::new();

    for manager in managers {
        let manager = manager.trim();
        if manager.is_empty() {
            continue;
        }
        entries.push(MembershipEntry {
            username: manager.to_string(),
            roles: vec!["admin".to_string()],
        });
    }

    let mut viewers: Vec<&str> = Vec::new();
    for name in users.iter().chain(managers.iter()) {
        let name = name.trim();
        if name.is_empty() || viewers.contains(&name) {
            continue;
        }
        viewers.push(name);
    }
    for viewer in viewers {
        entries.push(MembershipEntry {
            username: viewer.to_string(),
            roles: vec!["viewer".to_string()],
        });
    }

    entries
}

/// Merge every YAML file in a directory into one multi-document bundle.
async fn merge_configs(dir: &Path) -> Result<String> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            files.push(path);
        }
    }

    // Directory iteration order is platform-dependent.
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        documents.push(fs::read_to_string(&path).await?);
    }

    Ok(documents.join("\n---\n"))
}
