pub mod error;
pub mod types;

pub use error::{Result, SheetsError};
pub use types::{AppendResponse, UpdateSummary, ValueRange};

use std::time::Duration;

const BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Client for the Google Sheets values API, scoped to one spreadsheet.
///
/// Authentication is a pre-minted OAuth access token supplied out-of-band;
/// credential bootstrap is not this crate's concern.
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str, token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token: token.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Read all cell values in an A1-notation range (e.g. `companies!B2:B`).
    /// Cells come back as strings; empty trailing rows are omitted by the API.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        );

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value_range: ValueRange = resp.json().await?;
        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Append one row after the last data row of `range`, with raw (unparsed)
    /// cell values.
    pub async fn append_row(&self, range: &str, row: &[String]) -> Result<AppendResponse> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.base_url, self.spreadsheet_id, range
        );

        let body = ValueRange {
            range: None,
            major_dimension: None,
            values: vec![row
                .iter()
                .map(|v| serde_json::Value::String(v.clone()))
                .collect()],
        };

        tracing::debug!(range, cells = row.len(), "Appending sheet row");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
