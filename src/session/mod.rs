//! Authenticated access to the game
//!
//! [`AuthSession`] owns the HTTP client, the cookie jar and its persistence,
//! request pacing and error dumps. It is created once per process and lent
//! mutably to every component that needs the game.

mod auth;
mod client;
mod cookies;
mod pacing;
mod request;

pub use auth::{AuthSession, SessionStatus};
pub use client::{build_http_client, MAX_REDIRECTS};
pub use cookies::{CookieJar, CredentialStore};
pub use pacing::RandomInterval;
pub use request::{PortalRequest, PortalResponse};
