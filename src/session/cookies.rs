//! Cookie jar and its on-disk persistence

use crate::storage::write_atomic;
use crate::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Cookies of the game domain, by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Applies every `Set-Cookie` header of a response
    ///
    /// Returns true when the jar changed.
    pub fn absorb(&mut self, headers: &HeaderMap) -> bool {
        let before = self.cookies.clone();
        for value in headers.get_all(SET_COOKIE) {
            match value.to_str() {
                Ok(raw) => self.apply_set_cookie(raw),
                Err(_) => tracing::debug!("Ignoring non-ASCII Set-Cookie header"),
            }
        }
        self.cookies != before
    }

    fn apply_set_cookie(&mut self, raw: &str) {
        let mut parts = raw.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() {
            return;
        }

        let now = Utc::now();
        let expired = parts.any(|attribute| attribute_expires(attribute, now));

        if expired || value == "deleted" {
            self.cookies.remove(name);
        } else {
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }

    /// Value of the `Cookie` request header, None for an empty jar
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }
}

/// True for a `Max-Age` of zero or less, or an `Expires` date already past
fn attribute_expires(attribute: &str, now: DateTime<Utc>) -> bool {
    let Some((key, value)) = attribute.split_once('=') else {
        return false;
    };
    let (key, value) = (key.trim(), value.trim());

    if key.eq_ignore_ascii_case("max-age") {
        return value.parse::<i64>().map_or(false, |seconds| seconds <= 0);
    }
    if key.eq_ignore_ascii_case("expires") {
        return parse_cookie_date(value).map_or(false, |expires| expires <= now);
    }
    false
}

/// Reads `Expires` in RFC 1123 form or the dashed Netscape form
fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Persists the cookie jar between runs
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the persisted jar
    ///
    /// A missing file gives an empty jar. So does an unreadable blob, after a
    /// warning: the next validity probe fails and re-authentication rebuilds it.
    pub fn load(&self) -> Result<CookieJar> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No cookie blob at {}", self.path.display());
                return Ok(CookieJar::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&content) {
            Ok(jar) => Ok(jar),
            Err(e) => {
                tracing::warn!(
                    "Discarding unreadable cookie blob {}: {}",
                    self.path.display(),
                    e
                );
                Ok(CookieJar::new())
            }
        }
    }

    /// Overwrites the blob with the full jar
    pub fn save(&self, jar: &CookieJar) -> Result<()> {
        let json = serde_json::to_vec_pretty(jar).map_err(crate::storage::StorageError::from)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!("Persisted {} cookies to {}", jar.len(), self.path.display());
        Ok(())
    }
}
