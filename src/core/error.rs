use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Mods ────────────────────────────────────────────
    #[error("Mod catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Mod state file {path:?} is corrupt: {reason}")]
    StateFileCorrupt { path: PathBuf, reason: String },

    #[error("Cannot rename {from:?} to {to:?}: {source}")]
    FileRenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown optional mod: {0:?}")]
    UnknownMod(String),

    // ── Launch ──────────────────────────────────────────
    #[error("Invalid launch settings: {0}")]
    LaunchValidation(String),

    #[error("Launch engine error: {0}")]
    LaunchEngine(String),

    #[error("A launch session is already active")]
    SessionActive,

    #[error("Launch engine did not answer within {0:?}")]
    HandshakeTimeout(Duration),

    // ── Settings ────────────────────────────────────────
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Not a java executable: {0:?}")]
    InvalidJavaPath(PathBuf),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for UI payloads ───────────────────────
// The shell only needs the rendered message.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
