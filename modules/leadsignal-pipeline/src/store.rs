//! Append-only persistence of company profiles into a spreadsheet tab.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use leadsignal_core::{normalize_domain, CompanyProfile, StoreError, SHEET_COLUMNS};
use sheets_client::{SheetsClient, SheetsError};
use tracing::{debug, info};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Normalized domains already present in the store.
    async fn seen_domains(&self) -> anyhow::Result<HashSet<String>>;

    /// Append one profile as a new row. Refuses to write a domain that is
    /// already present at write time.
    async fn append(&self, profile: &CompanyProfile) -> Result<(), StoreError>;
}

/// Store backed by one tab of a Google spreadsheet. Rows are only ever
/// appended; corrections happen out-of-band in the sheet itself.
pub struct SheetStore {
    client: SheetsClient,
    sheet_name: String,
    pacing: Duration,
}

impl SheetStore {
    pub fn new(client: SheetsClient, sheet_name: &str, pacing: Duration) -> Self {
        Self {
            client,
            sheet_name: sheet_name.to_string(),
            pacing,
        }
    }

    /// A1 range covering the domain column, below the header row.
    fn domain_range(&self) -> String {
        format!("{}!{col}2:{col}", self.sheet_name, col = column_letter("domain"))
    }

    /// A1 range covering the full row width.
    fn append_range(&self) -> String {
        let last = (b'A' + (SHEET_COLUMNS.len() - 1) as u8) as char;
        format!("{}!A:{last}", self.sheet_name)
    }
}

/// Sheet column letter for a named column. Columns past Z would need a
/// two-letter scheme; the schema is nowhere near that wide.
fn column_letter(name: &str) -> char {
    let index = SHEET_COLUMNS
        .iter()
        .position(|c| *c == name)
        .unwrap_or_default();
    (b'A' + index as u8) as char
}

#[async_trait]
impl ProfileStore for SheetStore {
    async fn seen_domains(&self) -> anyhow::Result<HashSet<String>> {
        let values = self.client.get_values(&self.domain_range()).await?;
        let seen: HashSet<String> = values
            .iter()
            .filter_map(|row| row.first())
            .map(|cell| normalize_domain(cell))
            .filter(|d| !d.is_empty())
            .collect();

        debug!(count = seen.len(), "Loaded seen domains from sheet");
        Ok(seen)
    }

    async fn append(&self, profile: &CompanyProfile) -> Result<(), StoreError> {
        let domain = profile.normalized_domain();

        // Re-read at write time so a duplicate appearing mid-run is still
        // caught. A concurrent writer between the read and the append can
        // still slip a row in; this store assumes a single writer.
        let seen = self
            .seen_domains()
            .await
            .map_err(|e| StoreError::Backend(format!("{e:#}")))?;
        if seen.contains(&domain) {
            return Err(StoreError::Duplicate { domain });
        }

        let response = self
            .client
            .append_row(&self.append_range(), &profile.to_row())
            .await
            .map_err(|e| StoreError::Backend(backend_message(e)))?;

        let range = response
            .updates
            .and_then(|u| u.updated_range)
            .unwrap_or_default();
        info!(domain, range, "Appended profile row");

        tokio::time::sleep(self.pacing).await;
        Ok(())
    }
}

fn backend_message(e: SheetsError) -> String {
    match e {
        SheetsError::Api { status, message } => format!("sheets API {status}: {message}"),
        other => other.to_string(),
    }
}
