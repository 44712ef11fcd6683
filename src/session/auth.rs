use crate::config::{AccountConfig, Config};
use crate::scrape::endpoints;
use crate::scrape::pages::parse_login_csrf;
use crate::scrape::{ErrorDumper, LayoutError};
use crate::session::client::{build_http_client, dispatch};
use crate::session::cookies::{CookieJar, CredentialStore};
use crate::session::pacing::RandomInterval;
use crate::session::request::{PortalRequest, PortalResponse};
use crate::{AutopilotError, Result};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use url::Url;

/// How [`AuthSession::acquire`] obtained a valid session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Already known valid; nothing was sent
    Reused,
    /// The persisted cookies passed the validity probe
    Verified,
    /// A fresh login was needed and succeeded
    Reauthenticated,
}

/// The single authenticated connection to the game
///
/// All remote calls go through [`AuthSession::request`], which persists the
/// cookie jar and then pauses for a random pacing delay, whatever the
/// outcome. Components that talk to the game borrow the session mutably, so
/// two requests can never be in flight at once.
pub struct AuthSession {
    client: Client,
    base_url: Url,
    account: AccountConfig,
    jar: CookieJar,
    credentials: CredentialStore,
    pacer: RandomInterval,
    dumper: ErrorDumper,
    validated: bool,
    requests_sent: u64,
}

impl AuthSession {
    /// Creates a session from the configuration and the persisted cookies
    ///
    /// Nothing is sent until the first [`acquire`](Self::acquire).
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = CredentialStore::new(&config.storage.cookies_path);
        let jar = credentials.load()?;
        tracing::debug!("Loaded {} persisted cookies", jar.len());

        Ok(Self {
            client: build_http_client(&config.remote)?,
            base_url: Url::parse(&config.remote.base_url)?,
            account: config.account.clone(),
            jar,
            credentials,
            pacer: RandomInterval::new(
                config.schedule.request_interval_min,
                config.schedule.request_interval_max,
            ),
            dumper: ErrorDumper::new(&config.storage.dump_dir),
            validated: false,
            requests_sent: 0,
        })
    }

    /// Ensures the session is authenticated
    ///
    /// Idempotent: once a probe or login succeeded, later calls send nothing
    /// until [`invalidate`](Self::invalidate) is called.
    ///
    /// # Errors
    ///
    /// * `AutopilotError::Protocol` - The login page has no CSRF token, or the
    ///   game still refuses the session after logging in
    /// * `AutopilotError::Config` - Credentials are needed but not configured
    pub async fn acquire(&mut self) -> Result<SessionStatus> {
        if self.validated {
            return Ok(SessionStatus::Reused);
        }

        if self.probe().await? {
            tracing::info!("Persisted session is still valid");
            self.validated = true;
            return Ok(SessionStatus::Verified);
        }

        tracing::info!("Session expired, logging in");
        self.login().await?;

        if !self.probe().await? {
            return Err(AutopilotError::Protocol(
                "authentication rejected".to_string(),
            ));
        }

        tracing::info!("Logged in");
        self.validated = true;
        Ok(SessionStatus::Reauthenticated)
    }

    /// Forgets that the session was valid; the next `acquire` probes again
    pub fn invalidate(&mut self) {
        self.validated = false;
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Number of requests sent so far, logins and probes included
    pub fn request_count(&self) -> u64 {
        self.requests_sent
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.jar
    }

    /// Sends an authenticated request, acquiring the session first if needed
    pub async fn request(&mut self, request: PortalRequest) -> Result<PortalResponse> {
        self.acquire().await?;
        self.send(request).await
    }

    /// Runs a page parser over a response body
    ///
    /// On failure the body is dumped under the parser's tag and the error
    /// becomes `AutopilotError::Protocol`.
    pub fn parse<T>(
        &self,
        response: &PortalResponse,
        parser: impl FnOnce(&str) -> std::result::Result<T, LayoutError>,
    ) -> Result<T> {
        parser(&response.body).map_err(|e| {
            self.dumper.dump(e.tag, &response.body);
            AutopilotError::Protocol(format!("{}: {} ({})", response.url.path(), e.message, e.tag))
        })
    }

    /// Fails with `Protocol` unless the response has status `expected`
    pub fn expect_status(
        &self,
        response: &PortalResponse,
        expected: StatusCode,
        tag: &'static str,
    ) -> Result<()> {
        if response.status == expected {
            return Ok(());
        }
        self.dumper.dump(tag, &response.body);
        Err(AutopilotError::Protocol(format!(
            "{} answered {} instead of {}",
            response.url.path(),
            response.status.as_u16(),
            expected.as_u16()
        )))
    }

    /// Saves a raw body for offline diagnosis
    pub fn dump(&self, tag: &str, body: &str) -> Option<PathBuf> {
        self.dumper.dump(tag, body)
    }

    /// Validity probe: the home page answers 200 only to a logged-in client
    async fn probe(&mut self) -> Result<bool> {
        let response = self
            .send(PortalRequest::get(endpoints::HOME).no_redirects())
            .await?;
        let valid = response.status == StatusCode::OK;
        tracing::debug!("Validity probe answered {}", response.status.as_u16());
        Ok(valid)
    }

    async fn login(&mut self) -> Result<()> {
        let credentials = self.account.resolve()?;

        let page = self.send(PortalRequest::get(endpoints::LOGIN)).await?;
        let token = self.parse(&page, parse_login_csrf)?;

        let form = PortalRequest::post(endpoints::LOGIN_CHECK)
            .referer(endpoints::LOGIN)
            .form([
                ("_remember_me", "off".to_string()),
                ("_username", credentials.email),
                ("_password", credentials.password),
                ("_csrf_token", token),
            ]);

        // Success is only known from the next probe
        let response = self.send(form).await?;
        tracing::debug!("Login form answered {}", response.status.as_u16());
        Ok(())
    }

    async fn send(&mut self, request: PortalRequest) -> Result<PortalResponse> {
        self.requests_sent += 1;
        let result = dispatch(&self.client, &mut self.jar, &self.base_url, &request).await;
        let persisted = self.credentials.save(&self.jar);
        self.pacer.pause().await;

        let response = result?;
        persisted?;
        Ok(response)
    }
}
