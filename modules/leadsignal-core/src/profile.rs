use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::LeadSignalError;

/// Column ordering for the companies sheet. Every appended row must match
/// this order and length exactly.
pub const SHEET_COLUMNS: [&str; 19] = [
    "company_name",
    "domain",
    "hq_country",
    "hq_city",
    "firm_type",
    "aum_estimate",
    "team_size",
    "revenue_model",
    "tech_orientation",
    "pain_points",
    "recent_activity",
    "summary",
    "fit_reasoning",
    "fit_score",
    "fit_class",
    "outreach_snippet",
    "sources",
    "first_seen",
    "last_seen",
];

/// Business category most closely describing a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FirmType {
    HedgeFund,
    PropTrading,
    AssetManager,
    FamilyOffice,
    CryptoFund,
    Broker,
    DataVendor,
    Other,
}

/// Categorical fit class derived from the fit score and ICP reasoning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FitClass {
    High,
    Medium,
    Low,
}

/// A structured sales-intelligence record for one company domain.
///
/// Optional fields are absent (null) when not verifiable, never fabricated.
/// The struct doubles as the response schema sent to the generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyProfile {
    /// Official company name as listed on their website or public filings.
    pub company_name: String,
    /// Primary company domain (e.g. "man.com", "aqr.com").
    pub domain: String,
    /// Country where the company's headquarters are located.
    pub hq_country: Option<String>,
    /// City of the company's headquarters, if available.
    pub hq_city: Option<String>,
    /// Type of firm or business category most closely describing the company.
    pub firm_type: Option<FirmType>,
    /// Approximate assets under management, if disclosed (e.g. "$5B").
    pub aum_estimate: Option<String>,
    /// Approximate size of the team or organization (e.g. "10-25 employees").
    pub team_size: Option<String>,
    /// Brief note on how the company generates revenue.
    pub revenue_model: Option<String>,
    /// Indication of how the company uses technology.
    pub tech_orientation: Option<String>,
    /// Potential technical or operational challenges the company faces.
    pub pain_points: Option<String>,
    /// Recent company news, launches, or hires (under 12 months old).
    pub recent_activity: Option<String>,
    /// 1-4 sentence overview of what the company does, where, and at what scale.
    pub summary: String,
    /// Concise reasoning for why this company fits (or does not fit) the ICP.
    pub fit_reasoning: String,
    /// Numeric score (0-100) expressing how well the company aligns with the ICP.
    pub fit_score: i64,
    /// Categorical fit class: High, Medium, or Low.
    pub fit_class: FitClass,
    /// 1-2 sentence personalised outreach message referencing recent activity.
    pub outreach_snippet: String,
    /// One or more source URLs used to validate the profile.
    pub sources: Vec<String>,
    /// Date (YYYY-MM-DD) when this company was first captured.
    pub first_seen: Option<String>,
    /// Most recent date (YYYY-MM-DD) the profile was verified.
    pub last_seen: Option<String>,
}

impl CompanyProfile {
    /// Canonical key used for duplicate detection: trimmed and lower-cased.
    pub fn normalized_domain(&self) -> String {
        normalize_domain(&self.domain)
    }

    /// Check every invariant the sheet relies on. A profile that fails here
    /// is rejected wholesale, never partially accepted.
    pub fn validate(&self) -> Result<(), LeadSignalError> {
        if self.company_name.trim().is_empty() {
            return Err(invalid("company_name must not be empty"));
        }
        if !self.domain.contains('.') {
            return Err(invalid(&format!("invalid domain: {:?}", self.domain)));
        }
        if self.summary.trim().is_empty() {
            return Err(invalid("summary must not be empty"));
        }
        if self.fit_reasoning.trim().is_empty() {
            return Err(invalid("fit_reasoning must not be empty"));
        }
        if self.outreach_snippet.trim().is_empty() {
            return Err(invalid("outreach_snippet must not be empty"));
        }
        if !(0..=100).contains(&self.fit_score) {
            return Err(invalid(&format!(
                "fit_score {} out of range 0-100",
                self.fit_score
            )));
        }
        if self.sources.is_empty() {
            return Err(invalid("sources must contain at least one URL"));
        }
        if let (Some(first), Some(last)) = (&self.first_seen, &self.last_seen) {
            let first = parse_date("first_seen", first)?;
            let last = parse_date("last_seen", last)?;
            if last < first {
                return Err(invalid(&format!(
                    "last_seen {last} is before first_seen {first}"
                )));
            }
        }
        Ok(())
    }

    /// Serialize into the fixed sheet column order. Sequence-valued fields
    /// (`sources`) become comma-separated text; absent fields become "".
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.company_name.clone(),
            self.domain.clone(),
            self.hq_country.clone().unwrap_or_default(),
            self.hq_city.clone().unwrap_or_default(),
            self.firm_type
                .map(|t| {
                    serde_json::to_value(t)
                        .ok()
                        .and_then(|v| v.as_str().map(String::from))
                        .unwrap_or_default()
                })
                .unwrap_or_default(),
            self.aum_estimate.clone().unwrap_or_default(),
            self.team_size.clone().unwrap_or_default(),
            self.revenue_model.clone().unwrap_or_default(),
            self.tech_orientation.clone().unwrap_or_default(),
            self.pain_points.clone().unwrap_or_default(),
            self.recent_activity.clone().unwrap_or_default(),
            self.summary.clone(),
            self.fit_reasoning.clone(),
            self.fit_score.to_string(),
            format!("{:?}", self.fit_class),
            self.outreach_snippet.clone(),
            self.sources.join(", "),
            self.first_seen.clone().unwrap_or_default(),
            self.last_seen.clone().unwrap_or_default(),
        ]
    }
}

/// Normalize a raw domain string to its canonical comparison form.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

fn invalid(msg: &str) -> LeadSignalError {
    LeadSignalError::Validation(msg.to_string())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, LeadSignalError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(&format!("{field} is not a YYYY-MM-DD date: {value:?}")))
}
