use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Ideal-customer-profile criteria used to judge fit.
///
/// Shipped defaults match the current discovery campaign; operators can
/// override them with a JSON file so criteria changes never touch code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcpCriteria {
    /// Firm types considered in scope.
    pub firm_types: Vec<String>,
    /// Target geographies.
    pub geographies: Vec<String>,
    /// Minimum size threshold, as prose (AUM or revenue).
    pub size_threshold: String,
    /// What the team should look like.
    pub team_profile: String,
    /// Pain points worth looking for.
    pub pain_points: Vec<String>,
    /// Technical-maturity signals that indicate a fit.
    pub tech_maturity: String,
}

impl Default for IcpCriteria {
    fn default() -> Self {
        Self {
            firm_types: vec![
                "hedge fund".to_string(),
                "prop trading firm".to_string(),
                "asset manager".to_string(),
                "crypto fund".to_string(),
                "family office".to_string(),
            ],
            geographies: vec![
                "US".to_string(),
                "UK".to_string(),
                "EU".to_string(),
                "Canada".to_string(),
            ],
            size_threshold: "typically > $10m AUM or > $1m annual revenue".to_string(),
            team_profile: "quant/data science/trading engineering present; lean infra \
                           (not massive internal platform teams)"
                .to_string(),
            pain_points: vec![
                "infra bottlenecks".to_string(),
                "tech debt".to_string(),
                "slow strategy deployment".to_string(),
                "fragmented systems".to_string(),
            ],
            tech_maturity: "using or trialing algorithmic trading/AI/quant platforms"
                .to_string(),
        }
    }
}

impl IcpCriteria {
    /// Load criteria from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ICP criteria from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid ICP criteria JSON in {}", path.display()))
    }

    /// Render the criteria as the prompt block handed to the model.
    pub fn render(&self) -> String {
        format!(
            "Ideal Customer Profile (ICP) summary:\n\
             - Firm types: {} in {}.\n\
             - Size: {}.\n\
             - Team: {}.\n\
             - Pain points to look for: {}.\n\
             - Tech maturity: {}.",
            self.firm_types.join(", "),
            self.geographies.join("/"),
            self.size_threshold,
            self.team_profile,
            self.pain_points.join(", "),
            self.tech_maturity,
        )
    }
}
