use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BrowserlessError, Result};

/// A cookie in Playwright storage-state form, forwarded verbatim to the
/// Browserless `/content` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// Session state captured from a prior interactive login.
///
/// An empty JSON object (`{}`) is a valid "no session" placeholder, so a
/// fresh deployment works without any login step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub cookies: Vec<SessionCookie>,
}

impl SessionState {
    /// Load session state from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BrowserlessError::Session(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            BrowserlessError::Session(format!("invalid session state in {}: {e}", path.display()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Create an empty session-state file if none exists (first run).
pub fn ensure_session_state(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::write(path, "{}").map_err(|e| {
            BrowserlessError::Session(format!("failed to create {}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "Created empty session state file");
    }
    Ok(())
}
