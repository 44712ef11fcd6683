//! HTTP client construction and request dispatch
//!
//! Redirects are disabled in reqwest and followed here instead, so that:
//! - cookies set by intermediate hops are captured
//! - callers can opt out and observe raw 3xx statuses

use crate::config::RemoteConfig;
use crate::session::cookies::CookieJar;
use crate::session::request::{redirect_target, PortalRequest, PortalResponse};
use crate::{AutopilotError, Result};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, COOKIE, REFERER,
};
use reqwest::{redirect::Policy, Client, Method, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for one request
pub const MAX_REDIRECTS: usize = 10;

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Builds the HTTP client shared by every request of a session
///
/// # Arguments
///
/// * `config` - The remote configuration (user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &RemoteConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends `request`, following redirects unless the request opts out
///
/// Every hop carries the current cookies and feeds its `Set-Cookie` headers
/// back into `jar`. A redirected POST continues as a GET without body, except
/// for 307/308.
pub(crate) async fn dispatch(
    client: &Client,
    jar: &mut CookieJar,
    base: &Url,
    request: &PortalRequest,
) -> Result<PortalResponse> {
    let mut url = base.join(&request.path)?;
    let mut method = request.method.clone();
    let mut form = request.form.clone();
    let referer = match &request.referer {
        Some(referer) => Some(base.join(referer)?),
        None => None,
    };
    let mut hops = 0;

    loop {
        let mut builder = client.request(method.clone(), url.clone());
        if let Some(cookies) = jar.header_value() {
            builder = builder.header(COOKIE, cookies);
        }
        if let Some(referer) = &referer {
            builder = builder.header(REFERER, referer.as_str());
        }
        if let Some(accept) = &request.accept {
            builder = builder.header(ACCEPT, accept.as_str());
        }
        if request.xhr {
            builder = builder.header("X-Requested-With", "XMLHttpRequest");
        }
        if let Some(fields) = &form {
            builder = builder.form(fields);
        }

        let response = builder.send().await.map_err(|source| AutopilotError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", method, url.path(), status.as_u16());

        if jar.absorb(response.headers()) {
            tracing::debug!("Cookie jar updated by {}", url.path());
        }

        if request.follow_redirects && status.is_redirection() {
            if let Some(next) = redirect_target(&url, response.headers()) {
                hops += 1;
                if hops > MAX_REDIRECTS {
                    return Err(AutopilotError::RedirectLimit {
                        url: base.join(&request.path)?.to_string(),
                    });
                }
                if status != StatusCode::TEMPORARY_REDIRECT && status != StatusCode::PERMANENT_REDIRECT {
                    method = Method::GET;
                    form = None;
                }
                tracing::debug!("Following redirect to {}", next);
                url = next;
                continue;
            }
        }

        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| AutopilotError::Http {
            url: url.to_string(),
            source,
        })?;

        return Ok(PortalResponse {
            status,
            url,
            headers,
            body,
        });
    }
}
