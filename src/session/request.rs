//! Requests and responses exchanged with the game

use crate::{AutopilotError, Result};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// A request relative to the game's base URL
///
/// ```
/// use tycoon_autopilot::session::PortalRequest;
///
/// let request = PortalRequest::post("/login_check")
///     .referer("/login")
///     .form([("_remember_me", "off")]);
/// assert_eq!(request.path(), "/login_check");
/// ```
#[derive(Debug, Clone)]
pub struct PortalRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) referer: Option<String>,
    pub(crate) accept: Option<String>,
    pub(crate) xhr: bool,
    pub(crate) follow_redirects: bool,
    pub(crate) form: Option<Vec<(String, String)>>,
}

impl PortalRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            referer: None,
            accept: None,
            xhr: false,
            follow_redirects: true,
            form: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Sets the `Referer` header; relative values are joined to the base URL
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Marks the request as issued by page scripts
    pub fn xhr(mut self) -> Self {
        self.xhr = true;
        self
    }

    /// Returns 3xx responses as-is instead of following them
    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    /// URL-encoded form body
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A fully read response, after any followed redirects
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: StatusCode,
    /// URL of the final hop
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

impl PortalResponse {
    /// Decodes a JSON body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            AutopilotError::Protocol(format!("{} did not return JSON: {}", self.url.path(), e))
        })
    }
}

pub(crate) fn redirect_target(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}
