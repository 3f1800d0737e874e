//! Schema-constrained profile extraction from page text.

use async_trait::async_trait;
use chrono::NaiveDate;
use genai_client::{GeminiClient, StructuredRequest};
use leadsignal_core::{CompanyProfile, IcpCriteria};
use tracing::{debug, warn};

/// Outcome of one extraction attempt. `Invalid` means the model answered but
/// the answer failed parsing or validation; `Unavailable` means the model
/// could not be reached at all. Callers treat both as a per-domain failure
/// but log them at different levels.
#[derive(Debug, Clone)]
pub enum Extraction {
    Profile(CompanyProfile),
    Invalid(String),
    Unavailable(String),
}

#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    async fn extract(
        &self,
        domain: &str,
        page_text: &str,
        reference_date: NaiveDate,
    ) -> Extraction;
}

/// Extractor backed by the Gemini generateContent API with a response schema
/// derived from [`CompanyProfile`].
pub struct GeminiExtractor {
    client: Option<GeminiClient>,
    model: String,
    icp: IcpCriteria,
}

impl GeminiExtractor {
    pub fn new(api_key: &str, model: &str, icp: IcpCriteria) -> Self {
        let client = if api_key.is_empty() {
            warn!("GEMINI_API_KEY not set, extraction will be unavailable");
            None
        } else {
            Some(GeminiClient::new(api_key))
        };

        Self {
            client,
            model: model.to_string(),
            icp,
        }
    }

    #[cfg(test)]
    fn with_client(client: GeminiClient, model: &str, icp: IcpCriteria) -> Self {
        Self {
            client: Some(client),
            model: model.to_string(),
            icp,
        }
    }

    fn build_prompt(&self, domain: &str, page_text: &str, reference_date: NaiveDate) -> String {
        format!(
            "You are a B2B sales-intelligence analyst. Analyze the company behind \
             the domain \"{domain}\" using the website text below.\n\n\
             {icp}\n\n\
             Rules:\n\
             - Report only verifiable facts from the provided text or well-known \
             public knowledge about this company.\n\
             - Cite the URLs you relied on in `sources`.\n\
             - When a field cannot be verified, return null for it. Never guess.\n\
             - `fit_score` is 0-100; `fit_class` reflects it (High/Medium/Low).\n\
             - Today's date is {date}; use it for `first_seen` and `last_seen`.\n\n\
             Website text for {domain}:\n\
             ---\n\
             {page_text}\n\
             ---",
            icp = self.icp.render(),
            date = reference_date.format("%Y-%m-%d"),
        )
    }
}

#[async_trait]
impl ProfileExtractor for GeminiExtractor {
    async fn extract(
        &self,
        domain: &str,
        page_text: &str,
        reference_date: NaiveDate,
    ) -> Extraction {
        let Some(client) = &self.client else {
            return Extraction::Unavailable("GEMINI_API_KEY not configured".to_string());
        };

        let prompt = self.build_prompt(domain, page_text, reference_date);
        let request = StructuredRequest::new::<CompanyProfile>(&self.model, prompt);

        debug!(domain, model = %self.model, "Requesting profile extraction");

        let response = match client.structured(&request).await {
            Ok(response) => response,
            Err(e) => return Extraction::Unavailable(format!("{e:#}")),
        };

        let Some(raw) = response.text() else {
            return Extraction::Invalid("empty model output".to_string());
        };

        parse_and_validate(raw, domain, reference_date)
    }
}

/// Parse the model's JSON and enforce every profile invariant. Missing
/// identity fields are defaulted from the requested domain before
/// validation; anything else invalid rejects the whole profile.
fn parse_and_validate(raw: &str, domain: &str, reference_date: NaiveDate) -> Extraction {
    let mut profile: CompanyProfile = match serde_json::from_str(raw) {
        Ok(profile) => profile,
        Err(e) => return Extraction::Invalid(format!("schema violation: {e}")),
    };

    if profile.domain.trim().is_empty() {
        profile.domain = domain.to_string();
    }
    if profile.company_name.trim().is_empty() {
        profile.company_name = fallback_company_name(domain);
    }
    if profile.sources.is_empty() {
        profile.sources = vec![format!("https://{domain}")];
    }

    let today = reference_date.format("%Y-%m-%d").to_string();
    profile.first_seen.get_or_insert_with(|| today.clone());
    profile.last_seen.get_or_insert(today);

    if let Err(e) = profile.validate() {
        return Extraction::Invalid(e.to_string());
    }

    Extraction::Profile(profile)
}

/// Title-cased first label of the domain, e.g. "aqr.com" -> "Aqr".
fn fallback_company_name(domain: &str) -> String {
    let label = domain.split('.').next().unwrap_or(domain);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => domain.to_string(),
    }
}
