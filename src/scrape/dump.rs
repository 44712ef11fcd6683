//! Raw response dumps for offline diagnosis of layout failures

use chrono::Utc;
use std::path::PathBuf;

/// Saves response bodies that failed to parse
#[derive(Debug, Clone)]
pub struct ErrorDumper {
    dir: PathBuf,
}

impl ErrorDumper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `body` to `<dir>/<timestamp>__<tag>.html`
    ///
    /// A failure to write is logged and swallowed: the dump must never hide
    /// the error that triggered it.
    pub fn dump(&self, tag: &str, body: &str) -> Option<PathBuf> {
        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S%.3f");
        let path = self.dir.join(format!("{}__{}.html", timestamp, tag));

        let written = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, body));
        match written {
            Ok(()) => {
                tracing::info!("Saved error dump to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Could not save error dump {}: {}", path.display(), e);
                None
            }
        }
    }
}
