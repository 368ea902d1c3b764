//! Input helpers shared by the conversion commands.

use url::Url;

use crate::core::error::{Error, Result};

/// True when `input` names a local file rather than an http(s) URL.
pub fn is_local_input(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => !matches!(url.scheme(), "http" | "https"),
        Err(_) => true,
    }
}

/// Derive the output filename for a generated gateway config.
///
/// An explicit non-blank `filename` always wins. For local inputs a trailing
/// `json` extension becomes `yaml`; for URLs the last path segment is used
/// the same way. Errors when no usable name can be derived.
pub fn output_filename(input: &str, filename: Option<&str>) -> Result<String> {
    if let Some(name) = filename {
        let name = name.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }

    if is_local_input(input) {
        return Ok(replace_json_suffix(input));
    }

    let url = Url::parse(input).map_err(|_| Error::config("No outfile specified"))?;
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(str::to_string);

    match segment {
        Some(name) => Ok(replace_json_suffix(&name)),
        None => Err(Error::config("No outfile specified")),
    }
}

/// Replace a trailing `json` (any case) with `yaml`, leaving other names
/// untouched.
fn replace_json_suffix(name: &str) -> String {
    if name.to_lowercase().ends_with("json") {
        format!("{}yaml", &name[..name.len() - 4])
    } else {
        name.to_string()
    }
}
