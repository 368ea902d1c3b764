//! OpenAPI document loading and gateway config generation.
//!
//! Loading accepts a local JSON/YAML file or an HTTP(S) URL and performs only
//! minimal validation of the document. Conversion to gateway declarative
//! configuration goes through the [`GatewayConverter`] seam; the shipped
//! implementation emits a Kong-style skeleton with one service per document
//! and one route per path, tagged with the owning team.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::fs;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::utils::is_local_input;
use crate::services::plugins::PluginConfig;

static SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"));

/// A parsed OpenAPI document held as raw JSON.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    json: JsonValue,
}

impl OpenApiDocument {
    /// Load a document from a local file path or an HTTP(S) URL.
    pub async fn from_file_or_url(input: &str) -> Result<Self> {
        let document = if is_local_input(input) {
            Self::from_file(input).await?
        } else {
            Self::from_url(input).await?
        };
        document.validate()?;
        Ok(document)
    }

    async fn from_file(path: &str) -> Result<Self> {
        debug!(%path, "loading OpenAPI document from file");
        let content = fs::read_to_string(path).await?;

        let json = if path.ends_with(".json") {
            serde_json::from_str(&content)?
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .map_err(|err| Error::openapi(format!("Failed to parse OpenAPI spec: {err}")))?
        };

        Ok(Self { json })
    }

    async fn from_url(url: &str) -> Result<Self> {
        debug!(%url, "fetching OpenAPI document");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to create HTTP client");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|err| Error::openapi(format!("Failed to fetch OpenAPI spec: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::openapi(format!("HTTP {status} when fetching {url}")));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let content = response
            .text()
            .await
            .map_err(|err| Error::openapi(format!("Failed to read response body: {err}")))?;

        let json = if content_type.contains("json") || url.ends_with(".json") {
            serde_json::from_str(&content)?
        } else if content_type.contains("yaml") || url.ends_with(".yaml") || url.ends_with(".yml")
        {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .map_err(|err| Error::openapi(format!("Failed to parse OpenAPI spec: {err}")))?
        };

        Ok(Self { json })
    }

    /// Check the few fields every usable document must carry.
    pub fn validate(&self) -> Result<()> {
        self.json
            .get("openapi")
            .or_else(|| self.json.get("swagger"))
            .and_then(|value| value.as_str())
            .ok_or_else(|| Error::openapi("Missing OpenAPI version"))?;

        self.title().ok_or_else(|| Error::openapi("Missing info.title"))?;

        self.json
            .get("paths")
            .and_then(|value| value.as_object())
            .ok_or_else(|| Error::openapi("Missing paths"))?;

        Ok(())
    }

    pub fn title(&self) -> Option<&str> {
        self.json
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(|value| value.as_str())
    }

    /// URL of the first declared server, when one exists.
    pub fn first_server_url(&self) -> Option<String> {
        self.json
            .get("servers")
            .and_then(|value| value.as_array())
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(|value| value.as_str())
            .map(|url| url.to_string())
    }

    /// Collect `(path, methods)` pairs for every declared path.
    pub fn paths(&self) -> Vec<(String, Vec<String>)> {
        const METHODS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options"];

        let Some(paths) = self.json.get("paths").and_then(|value| value.as_object()) else {
            return Vec::new();
        };

        paths
            .iter()
            .map(|(path, item)| {
                let methods = item
                    .as_object()
                    .map(|item| {
                        METHODS
                            .iter()
                            .filter(|method| item.contains_key(**method))
                            .map(|method| method.to_uppercase())
                            .collect()
                    })
                    .unwrap_or_default();
                (path.clone(), methods)
            })
            .collect()
    }
}

/// Options applied during conversion.
#[derive(Debug, Default)]
pub struct ConvertOptions {
    /// Team tag stamped onto every generated object.
    pub team: String,
    /// Plugin templates attached to the generated service.
    pub plugins: Vec<PluginConfig>,
}

/// Seam between spec loading and the emitted gateway format.
#[async_trait]
pub trait GatewayConverter: Send + Sync {
    async fn convert(&self, document: &OpenApiDocument, options: &ConvertOptions)
    -> Result<String>;
}

#[derive(Debug, Serialize)]
struct DeclarativeConfig {
    #[serde(rename = "_format_version")]
    format_version: String,
    services: Vec<DeclarativeService>,
}

#[derive(Debug, Serialize)]
struct DeclarativeService {
    name: String,
    url: String,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<PluginConfig>,
    routes: Vec<DeclarativeRoute>,
}

#[derive(Debug, Serialize)]
struct DeclarativeRoute {
    name: String,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    methods: Vec<String>,
    paths: Vec<String>,
}

/// Emits a Kong-style declarative YAML skeleton.
pub struct DeclarativeConverter;

#[async_trait]
impl GatewayConverter for DeclarativeConverter {
    async fn convert(
        &self,
        document: &OpenApiDocument,
        options: &ConvertOptions,
    ) -> Result<String> {
        let service_name = slugify(document.title().unwrap_or("service"));
        let upstream = document
            .first_server_url()
            .unwrap_or_else(|| "http://localhost".to_string());
        let tags = vec![options.team.clone()];

        let routes = document
            .paths()
            .into_iter()
            .enumerate()
            .map(|(index, (path, methods))| {
                let path_slug = slugify(&path);
                let name = if path_slug.is_empty() {
                    format!("{service_name}-route-{index}")
                } else {
                    format!("{service_name}-{path_slug}")
                };
                DeclarativeRoute {
                    name,
                    tags: tags.clone(),
                    methods,
                    paths: vec![path],
                }
            })
            .collect();

        let config = DeclarativeConfig {
            format_version: "1.1".to_string(),
            services: vec![DeclarativeService {
                name: service_name,
                url: upstream,
                tags,
                plugins: options.plugins.clone(),
                routes,
            }],
        };

        Ok(serde_yaml::to_string(&config)?)
    }
}

/// Structural checks on a gateway config file.
///
/// Returns one message per problem; an empty list means the file passed. The
/// checks are shape-level only: the gateway itself remains the authority on
/// whether a config is acceptable.
pub async fn validate_config(path: &str) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).await?;
    let mut problems = Vec::new();

    for (index, document) in content.split("\n---\n").enumerate() {
        if document.trim().is_empty() {
            continue;
        }
        let value: serde_yaml::Value = serde_yaml::from_str(document)?;
        check_document(&value, index, &mut problems);
    }

    Ok(problems)
}

fn check_document(value: &serde_yaml::Value, index: usize, problems: &mut Vec<String>) {
    let Some(services) = value.get("services").and_then(|v| v.as_sequence()) else {
        problems.push(format!("document {index}: no services defined"));
        return;
    };
    if services.is_empty() {
        problems.push(format!("document {index}: services list is empty"));
        return;
    }

    for (service_index, service) in services.iter().enumerate() {
        let service_name = service.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if service_name.is_empty() {
            problems.push(format!(
                "document {index}: service {service_index} has no name"
            ));
        }

        let routes = service
            .get("routes")
            .and_then(|v| v.as_sequence())
            .map(|seq| seq.as_slice())
            .unwrap_or_default();
        for (route_index, route) in routes.iter().enumerate() {
            let named = route
                .get("name")
                .and_then(|v| v.as_str())
                .is_some_and(|name| !name.is_empty());
            if !named {
                let label = if service_name.is_empty() {
                    format!("service {service_index}")
                } else {
                    service_name.to_string()
                };
                problems.push(format!("document {index}: {label} route {route_index} has no name"));
            }
        }
    }
}

fn slugify(input: &str) -> String {
    SLUG_CHARS
        .replace_all(&input.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
