use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
///
/// Constructed once in the binary and passed by reference into each
/// component's constructor. No component reads the environment itself.
#[derive(Debug, Clone)]
pub struct Config {
    // Generative model
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Storage backend (Google Sheets)
    pub spreadsheet_id: String,
    pub sheets_access_token: String,
    pub sheet_name: String,
    pub sheet_pacing_ms: u64,

    // Rendered fetch
    pub browserless_url: String,
    pub browserless_token: Option<String>,
    pub session_state_path: String,

    // Extraction criteria
    pub icp_criteria_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    ///
    /// `GEMINI_API_KEY` is deliberately not required here: a missing model
    /// credential is handled per-domain by the extractor, not at boot.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-lite".to_string()),
            spreadsheet_id: required_env("SPREADSHEET_ID"),
            sheets_access_token: required_env("SHEETS_ACCESS_TOKEN"),
            sheet_name: env::var("SHEET_NAME").unwrap_or_else(|_| "companies".to_string()),
            sheet_pacing_ms: env::var("SHEET_PACING_MS")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()
                .expect("SHEET_PACING_MS must be a number"),
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            session_state_path: env::var("SESSION_STATE_PATH")
                .unwrap_or_else(|_| "session_state.json".to_string()),
            icp_criteria_path: env::var("ICP_CRITERIA_PATH").ok(),
        }
    }

    /// Log which credentials are present without leaking their values.
    pub fn log_redacted(&self) {
        info!(
            gemini_key = !self.gemini_api_key.is_empty(),
            sheets_token = !self.sheets_access_token.is_empty(),
            browserless_token = self.browserless_token.is_some(),
            model = self.gemini_model.as_str(),
            sheet = self.sheet_name.as_str(),
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
