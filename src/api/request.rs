//! Authenticated dispatch against the gateway API.
//!
//! Every request authenticates first, compiles `:param` placeholders in the
//! path, then issues the call with a bearer token. Callers customize method,
//! headers and body through [`RequestOptions`]; anything left unset falls back
//! to a GET with only the authorization header.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::auth::authenticate;
use crate::api::endpoints::{self, EndpointPair};
use crate::core::config::Settings;
use crate::core::error::{Error, Result};

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("valid path param pattern"));

/// Per-call overrides merged over the dispatch defaults.
///
/// Headers set here win over the defaults, so a caller may even replace the
/// authorization header if it needs to.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client bound to the endpoints of one environment.
pub struct ApiClient {
    http: reqwest::Client,
    settings: Settings,
    pair: EndpointPair,
}

impl ApiClient {
    /// Build a client whose endpoints are resolved from the settings' environment.
    pub fn new(settings: Settings) -> Self {
        let pair = endpoints::resolve(settings.env);
        Self::with_endpoints(settings, pair)
    }

    /// Build a client against an explicit endpoint pair.
    pub fn with_endpoints(settings: Settings, pair: EndpointPair) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            settings,
            pair,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn endpoints(&self) -> &EndpointPair {
        &self.pair
    }

    /// Obtain a fresh access token for this client's environment.
    pub async fn token(&self) -> Result<String> {
        authenticate(&self.http, &self.pair.auth_endpoint, &self.settings).await
    }

    /// Issue an authenticated request and decode the JSON response.
    ///
    /// Every failure, authentication included, is reported as a request
    /// error carrying the underlying message; callers never see another
    /// error kind from this method.
    pub async fn request<T>(&self, path: &str, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self.dispatch(path, options).await {
            Ok(value) => Ok(value),
            Err(err @ Error::Dispatch(_)) => Err(err),
            Err(err) => Err(Error::dispatch(err.to_string())),
        }
    }

    async fn dispatch<T>(&self, path: &str, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.token().await?;

        let compiled = compile_path(path, &self.settings.namespace);
        let url = format!("{}{}", self.pair.api_host, compiled);
        let method = options.method.unwrap_or(Method::GET);
        debug!(%method, %url, "dispatching gateway request");

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| Error::dispatch(err.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.extend(options.headers);

        let mut builder = self.http.request(method, &url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::dispatch(status.canonical_reason().unwrap_or("Unknown")));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Substitute known `:param` placeholders in a path template.
///
/// Only `:namespace` has a binding today; unknown placeholders are left
/// verbatim so a bad template surfaces in the failing URL instead of
/// panicking here. Values are percent-encoded on the way in.
pub fn compile_path(template: &str, namespace: &str) -> String {
    PATH_PARAM
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "namespace" => urlencoding::encode(namespace).into_owned(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
