pub mod error;
pub mod session;

pub use error::{BrowserlessError, Result};
pub use session::{ensure_session_state, SessionCookie, SessionState};

use std::time::Duration;

/// Primary and fallback navigation wait conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    DomContentLoaded,
    NetworkIdle,
}

impl WaitUntil {
    fn as_str(self) -> &'static str {
        match self {
            WaitUntil::DomContentLoaded => "domcontentloaded",
            WaitUntil::NetworkIdle => "networkidle2",
        }
    }
}

/// Options for a single `/content` navigation.
#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub wait_until: WaitUntil,
    pub navigation_timeout: Duration,
    /// Extra delay after navigation so late-loading content settles.
    pub settle: Duration,
    pub cookies: Vec<SessionCookie>,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            wait_until: WaitUntil::DomContentLoaded,
            navigation_timeout: Duration::from_secs(15),
            settle: Duration::from_secs(2),
            cookies: Vec::new(),
        }
    }
}

impl ContentOptions {
    pub fn wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    pub fn cookies(mut self, cookies: Vec<SessionCookie>) -> Self {
        self.cookies = cookies;
        self
    }
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML for a URL via the Browserless `/content`
    /// endpoint. The browser session lives server-side for the duration of
    /// this one request and is torn down with it, so no state leaks between
    /// calls on any exit path.
    pub async fn content(&self, url: &str, options: &ContentOptions) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let mut body = serde_json::json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": options.wait_until.as_str(),
                "timeout": options.navigation_timeout.as_millis() as u64,
            },
            "waitForTimeout": options.settle.as_millis() as u64,
        });
        if !options.cookies.is_empty() {
            body["cookies"] = serde_json::to_value(&options.cookies)
                .map_err(|e| BrowserlessError::Session(e.to_string()))?;
        }

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
