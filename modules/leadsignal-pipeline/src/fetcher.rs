use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use browserless_client::{BrowserlessClient, ContentOptions, SessionState, WaitUntil};
use scraper::{Html, Selector};
use tracing::{info, warn};

/// Cap on extracted text, bounding downstream prompt size.
const CONTENT_CAP: usize = 10_000;

/// Static results shorter than this signal a JS-rendered or access-gated
/// page and trigger the rendered fallback tier.
const MIN_STATIC_CONTENT: usize = 200;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// --- PageFetcher trait ---

/// One acquisition tier: fetch a single page of a domain and return its
/// visible block text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, domain: &str, path: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// Extract human-readable block content (paragraphs, list items, headings)
/// from HTML, excluding script/style text, capped at `cap` bytes.
pub fn extract_block_text(html: &str, cap: usize) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p, li, h1, h2, h3").expect("valid selector");

    let mut parts: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let mut texts: Vec<String> = Vec::new();
        for node in element.descendants() {
            if let Some(text) = node.value().as_text() {
                let in_hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| e.name() == "script" || e.name() == "style")
                });
                if in_hidden {
                    continue;
                }
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    texts.push(trimmed.to_string());
                }
            }
        }
        if !texts.is_empty() {
            parts.push(texts.join(" "));
        }
    }

    let mut combined = parts.join(" ");
    if combined.len() > cap {
        let mut end = cap;
        while !combined.is_char_boundary(end) {
            end -= 1;
        }
        combined.truncate(end);
    }
    combined
}

fn page_url(domain: &str, path: &str) -> Result<String> {
    let url = format!("https://{}{}", domain.trim_end_matches('/'), path);
    let parsed = url::Url::parse(&url).context("Invalid URL")?;
    if parsed.scheme() != "https" {
        anyhow::bail!("Only https URLs are allowed, got: {}", parsed.scheme());
    }
    Ok(url)
}

// --- Static tier (plain HTTP GET) ---

pub struct StaticFetcher {
    client: reqwest::Client,
}

impl StaticFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for StaticFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, domain: &str, path: &str) -> Result<String> {
        let url = page_url(domain, path)?;

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?
            .error_for_status()
            .with_context(|| format!("Bad status for {url}"))?;

        let html = response.text().await?;
        Ok(extract_block_text(&html, CONTENT_CAP))
    }

    fn name(&self) -> &str {
        "static"
    }
}

// --- Rendered tier (Browserless) ---

/// Fetches via a full browser engine, presenting saved session state
/// (cookies) so gated pages render as a logged-in user. The browser
/// session is per-request and torn down server-side on every exit path.
pub struct RenderedFetcher {
    client: BrowserlessClient,
    session_state_path: String,
}

impl RenderedFetcher {
    pub fn new(base_url: &str, token: Option<&str>, session_state_path: &str) -> Self {
        info!(base_url, "Using Browserless for rendered fetches");
        Self {
            client: BrowserlessClient::new(base_url, token),
            session_state_path: session_state_path.to_string(),
        }
    }

    fn session_cookies(&self) -> Vec<browserless_client::SessionCookie> {
        match SessionState::load(&self.session_state_path) {
            Ok(state) => state.cookies,
            Err(e) => {
                warn!(error = %e, "Could not load session state, proceeding without cookies");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, domain: &str, path: &str) -> Result<String> {
        let url = page_url(domain, path)?;
        let options = ContentOptions::default().cookies(self.session_cookies());

        info!(url, fetcher = "rendered", "Navigating");

        let html = match self.client.content(&url, &options).await {
            Ok(html) => html,
            // Primary wait condition timed out; retry once with the laxer one
            Err(e) if e.is_timeout() => {
                warn!(url, error = %e, "domcontentloaded timed out, retrying with networkidle");
                self.client
                    .content(&url, &options.wait_until(WaitUntil::NetworkIdle))
                    .await
                    .context("Rendered fetch failed on both wait conditions")?
            }
            Err(e) => return Err(e).context("Rendered fetch failed"),
        };

        Ok(extract_block_text(&html, CONTENT_CAP))
    }

    fn name(&self) -> &str {
        "rendered"
    }
}

// --- Two-tier acquisition ---

#[derive(Debug, Clone, Default)]
pub struct FetchedContent {
    pub text: String,
    /// Whether the rendered tier supplied (or attempted to supply) the text.
    pub rendered: bool,
}

/// Acquires visible text for a whole domain. Infallible by contract:
/// acquisition failure degrades to empty text, never an error.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn acquire(&self, domain: &str) -> FetchedContent;
}

/// The two-tier strategy: cheap static fetch of `/about` then `/`, with a
/// single rendered-fetch fallback when the static result is too thin.
pub struct TieredFetcher {
    static_tier: Box<dyn PageFetcher>,
    rendered_tier: Box<dyn PageFetcher>,
    min_static: usize,
}

impl TieredFetcher {
    pub fn new(static_tier: Box<dyn PageFetcher>, rendered_tier: Box<dyn PageFetcher>) -> Self {
        Self {
            static_tier,
            rendered_tier,
            min_static: MIN_STATIC_CONTENT,
        }
    }

    async fn static_text(&self, domain: &str, path: &str) -> String {
        match self.static_tier.fetch(domain, path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(domain, path, error = %e, "Static fetch failed");
                String::new()
            }
        }
    }
}

#[async_trait]
impl ContentFetcher for TieredFetcher {
    async fn acquire(&self, domain: &str) -> FetchedContent {
        let mut text = self.static_text(domain, "/about").await;
        if text.is_empty() {
            text = self.static_text(domain, "/").await;
        }

        if text.len() < self.min_static {
            info!(domain, static_len = text.len(), "Falling back to rendered fetch");
            let rendered_text = match self.rendered_tier.fetch(domain, "/").await {
                Ok(t) => t,
                Err(e) => {
                    warn!(domain, error = %e, "Rendered fetch failed");
                    String::new()
                }
            };
            return FetchedContent {
                text: rendered_text,
                rendered: true,
            };
        }

        FetchedContent {
            text,
            rendered: false,
        }
    }
}
