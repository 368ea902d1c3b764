//! Plugin catalogue loading and template generation.
//!
//! Each catalogue entry lives in one YAML file holding two documents split on
//! `---`: descriptive metadata first, then the config template embedded in
//! generated gateway configs. Files that fail to read or parse are skipped
//! with a warning so one broken file does not hide the rest of the catalogue.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::core::error::Result;

/// Descriptive metadata, the first document of a plugin file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMeta {
    /// Catalogue id, defaulted to the file stem when the document omits it.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub bcgov: bool,
    #[serde(default)]
    pub description: String,
}

/// Config template, the second document of a plugin file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub meta: PluginMeta,
    pub config: PluginConfig,
}

/// Catalogue keyed by file stem, iteration order deterministic.
pub type PluginCatalogue = BTreeMap<String, PluginEntry>;

/// Crawl a directory for `.yaml`/`.yml` plugin files.
pub async fn load_plugins(dir: impl AsRef<Path>) -> Result<PluginCatalogue> {
    let dir = dir.as_ref();
    let mut catalogue = PluginCatalogue::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if !is_yaml {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        match parse_plugin_file(&path, stem).await {
            Ok(entry) => {
                catalogue.insert(stem.to_string(), entry);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable plugin file");
            }
        }
    }

    Ok(catalogue)
}

async fn parse_plugin_file(path: &Path, stem: &str) -> Result<PluginEntry> {
    let contents = fs::read_to_string(path).await?;

    // Meta and config template are the first two documents.
    let mut documents = contents.splitn(2, "---");
    let meta_doc = documents.next().unwrap_or_default();
    let config_doc = documents.next().unwrap_or_default();

    let mut meta: PluginMeta = serde_yaml::from_str(meta_doc)?;
    if meta.id.is_empty() {
        meta.id = stem.to_string();
    }
    let config: PluginConfig = serde_yaml::from_str(config_doc)?;

    Ok(PluginEntry { meta, config })
}

/// Resolve plugin names against the catalogue and stamp the team tag.
///
/// Names are deduplicated and unknown names dropped; the caller can compare
/// lengths to warn about entries it could not resolve. Every returned template
/// is enabled and tagged with the team.
pub fn generate_plugin_templates(
    names: &[String],
    team: &str,
    catalogue: &PluginCatalogue,
) -> Vec<PluginConfig> {
    let mut seen = Vec::new();
    let mut templates = Vec::new();

    for name in names {
        let name = name.trim();
        if name.is_empty() || seen.contains(&name) {
            continue;
        }
        seen.push(name);

        if let Some(entry) = catalogue.get(name) {
            templates.push(PluginConfig {
                name: entry.config.name.clone(),
                enabled: true,
                tags: vec![team.to_string()],
                config: entry.config.config.clone(),
            });
        }
    }

    templates
}
