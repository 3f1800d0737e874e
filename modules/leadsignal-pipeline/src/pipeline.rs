//! Sequential per-domain orchestration: fetch, extract, persist.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use leadsignal_core::{normalize_domain, StoreError};
use tracing::{error, info, warn};

use crate::extractor::{Extraction, ProfileExtractor};
use crate::fetcher::ContentFetcher;
use crate::store::ProfileStore;

/// Where in the per-domain sequence a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Persisting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Persisting => "persisting",
        };
        write!(f, "{name}")
    }
}

/// Terminal state of one domain within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    Stored,
    Skipped,
    Failed { stage: Stage, reason: String },
}

/// Counters for one enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub processed: usize,
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rendered_fallbacks: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Enrichment Run Complete ===")?;
        writeln!(f, "Domains processed:   {}", self.processed)?;
        writeln!(f, "Profiles stored:     {}", self.stored)?;
        writeln!(f, "Skipped (existing):  {}", self.skipped)?;
        writeln!(f, "Failed:              {}", self.failed)?;
        write!(f, "Rendered fallbacks:  {}", self.rendered_fallbacks)
    }
}

/// One-domain-at-a-time enrichment pipeline. Domains are processed strictly
/// in input order; a failure on one domain never aborts the rest.
pub struct Pipeline {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn ProfileExtractor>,
    store: Arc<dyn ProfileStore>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn ProfileExtractor>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
        }
    }

    pub async fn run(&self, domains: &[String]) -> Result<RunStats> {
        let seen = self
            .store
            .seen_domains()
            .await
            .context("Failed to load existing domains")?;

        info!(
            domains = domains.len(),
            existing = seen.len(),
            "Starting enrichment run"
        );

        let reference_date = Utc::now().date_naive();
        let mut stats = RunStats::default();

        for raw in domains {
            let domain = normalize_domain(raw);
            if domain.is_empty() {
                continue;
            }
            stats.processed += 1;

            if seen.contains(&domain) {
                info!(domain, "Already enriched, skipping");
                stats.skipped += 1;
                continue;
            }

            match self.process_domain(&domain, reference_date, &mut stats).await {
                DomainOutcome::Stored => stats.stored += 1,
                DomainOutcome::Skipped => stats.skipped += 1,
                DomainOutcome::Failed { stage, reason } => {
                    error!(domain, %stage, reason, "Domain failed");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Duplicates appearing mid-run are caught by the store's own write-time
    /// check, not by re-reading here.
    async fn process_domain(
        &self,
        domain: &str,
        reference_date: chrono::NaiveDate,
        stats: &mut RunStats,
    ) -> DomainOutcome {
        let fetched = self.fetcher.acquire(domain).await;
        if fetched.rendered {
            stats.rendered_fallbacks += 1;
        }
        if fetched.text.is_empty() {
            warn!(domain, "No page content acquired, extracting from domain alone");
        }

        let mut profile = match self
            .extractor
            .extract(domain, &fetched.text, reference_date)
            .await
        {
            Extraction::Profile(profile) => profile,
            Extraction::Invalid(reason) => {
                return DomainOutcome::Failed {
                    stage: Stage::Extracting,
                    reason,
                }
            }
            Extraction::Unavailable(reason) => {
                return DomainOutcome::Failed {
                    stage: Stage::Extracting,
                    reason,
                }
            }
        };

        if fetched.rendered {
            profile.summary.push_str(" [rendered]");
        }

        match self.store.append(&profile).await {
            Ok(()) => {
                info!(
                    domain,
                    score = profile.fit_score,
                    class = ?profile.fit_class,
                    "Stored profile"
                );
                DomainOutcome::Stored
            }
            Err(StoreError::Duplicate { domain }) => {
                info!(domain, "Row appeared mid-run, not writing twice");
                DomainOutcome::Failed {
                    stage: Stage::Persisting,
                    reason: "duplicate row".to_string(),
                }
            }
            Err(StoreError::Backend(reason)) => DomainOutcome::Failed {
                stage: Stage::Persisting,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchedContent;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use leadsignal_core::{CompanyProfile, FitClass};
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn profile_for(domain: &str) -> CompanyProfile {
        CompanyProfile {
            company_name: "Test Co".to_string(),
            domain: domain.to_string(),
            hq_country: None,
            hq_city: None,
            firm_type: None,
            aum_estimate: None,
            team_size: None,
            revenue_model: None,
            tech_orientation: None,
            pain_points: None,
            recent_activity: None,
            summary: "A test company.".to_string(),
            fit_reasoning: "Test reasoning.".to_string(),
            fit_score: 60,
            fit_class: FitClass::Medium,
            outreach_snippet: "Hello there.".to_string(),
            sources: vec![format!("https://{domain}")],
            first_seen: Some("2025-03-15".to_string()),
            last_seen: Some("2025-03-15".to_string()),
        }
    }

    struct FixedFetcher {
        text: String,
        rendered: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FixedFetcher {
        fn new(text: &str, rendered: bool) -> Self {
            Self {
                text: text.to_string(),
                rendered,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ContentFetcher for FixedFetcher {
        async fn acquire(&self, domain: &str) -> FetchedContent {
            self.calls.lock().unwrap().push(domain.to_string());
            FetchedContent {
                text: self.text.clone(),
                rendered: self.rendered,
            }
        }
    }

    /// Extractor that answers from a script and records what it was asked.
    struct StubExtractor {
        result: Box<dyn Fn(&str) -> Extraction + Send + Sync>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubExtractor {
        fn profiles() -> Self {
            Self {
                result: Box::new(|domain| Extraction::Profile(profile_for(domain))),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn always(result: Extraction) -> Self {
            Self {
                result: Box::new(move |_| result.clone()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProfileExtractor for StubExtractor {
        async fn extract(
            &self,
            domain: &str,
            page_text: &str,
            _reference_date: NaiveDate,
        ) -> Extraction {
            self.calls
                .lock()
                .unwrap()
                .push((domain.to_string(), page_text.to_string()));
            (self.result)(domain)
        }
    }

    /// In-memory store with the same write-time duplicate semantics as the
    /// sheet-backed one.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<CompanyProfile>>,
        preloaded: Vec<String>,
        fail_backend: bool,
    }

    impl MemoryStore {
        fn with_existing(domains: &[&str]) -> Self {
            Self {
                preloaded: domains.iter().map(|d| d.to_string()).collect(),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail_backend: true,
                ..Self::default()
            }
        }

        fn stored(&self) -> Vec<CompanyProfile> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn seen_domains(&self) -> anyhow::Result<HashSet<String>> {
            let mut seen: HashSet<String> =
                self.preloaded.iter().map(|d| normalize_domain(d)).collect();
            for row in self.rows.lock().unwrap().iter() {
                seen.insert(row.normalized_domain());
            }
            Ok(seen)
        }

        async fn append(&self, profile: &CompanyProfile) -> Result<(), StoreError> {
            if self.fail_backend {
                return Err(StoreError::Backend("sheets API 503".to_string()));
            }
            let domain = profile.normalized_domain();
            let seen = self.seen_domains().await.map_err(|e| {
                StoreError::Backend(e.to_string())
            })?;
            if seen.contains(&domain) {
                return Err(StoreError::Duplicate { domain });
            }
            self.rows.lock().unwrap().push(profile.clone());
            Ok(())
        }
    }

    fn pipeline(
        fetcher: &Arc<FixedFetcher>,
        extractor: &Arc<StubExtractor>,
        store: &Arc<MemoryStore>,
    ) -> Pipeline {
        Pipeline::new(
            Arc::clone(fetcher) as Arc<dyn ContentFetcher>,
            Arc::clone(extractor) as Arc<dyn ProfileExtractor>,
            Arc::clone(store) as Arc<dyn ProfileStore>,
        )
    }

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[tokio::test]
    async fn new_domain_flows_through_to_storage() {
        let fetcher = Arc::new(FixedFetcher::new("website body", false));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["newco.com"]))
            .await
            .unwrap();

        assert_eq!(stats.stored, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(store.stored().len(), 1);
        assert_eq!(
            extractor.calls.lock().unwrap()[0],
            ("newco.com".to_string(), "website body".to_string())
        );
    }

    #[tokio::test]
    async fn empty_page_text_still_reaches_the_extractor() {
        let fetcher = Arc::new(FixedFetcher::new("", true));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["quiet.com"]))
            .await
            .unwrap();

        assert_eq!(extractor.call_count(), 1);
        assert_eq!(stats.stored, 1);
    }

    #[tokio::test]
    async fn known_domain_is_skipped_without_any_work() {
        let fetcher = Arc::new(FixedFetcher::new("body", false));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::with_existing(&["known.com"]));

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["  Known.COM "]))
            .await
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.stored, 0);
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn unavailable_extraction_fails_without_writing() {
        let fetcher = Arc::new(FixedFetcher::new("body", false));
        let extractor = Arc::new(StubExtractor::always(Extraction::Unavailable(
            "quota exceeded".to_string(),
        )));
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["unlucky.com"]))
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.stored, 0);
        assert!(store.stored().is_empty());
    }

    #[tokio::test]
    async fn invalid_extraction_fails_without_writing() {
        let fetcher = Arc::new(FixedFetcher::new("body", false));
        let extractor = Arc::new(StubExtractor::always(Extraction::Invalid(
            "fit_score 150 out of range 0-100".to_string(),
        )));
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["overeager.com"]))
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert!(store.stored().is_empty());
    }

    #[tokio::test]
    async fn duplicate_within_one_batch_writes_exactly_one_row() {
        let fetcher = Arc::new(FixedFetcher::new("body", false));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["twice.com", "twice.com"]))
            .await
            .unwrap();

        assert_eq!(stats.stored, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(store.stored().len(), 1);
    }

    #[tokio::test]
    async fn rendered_content_marks_the_stored_summary() {
        let fetcher = Arc::new(FixedFetcher::new("body", true));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["spa-site.com"]))
            .await
            .unwrap();

        assert_eq!(stats.rendered_fallbacks, 1);
        assert!(store.stored()[0].summary.ends_with("[rendered]"));
    }

    #[tokio::test]
    async fn backend_failure_does_not_abort_the_batch() {
        let fetcher = Arc::new(FixedFetcher::new("body", false));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::failing());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["a.com", "b.com"]))
            .await
            .unwrap();

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(extractor.call_count(), 2);
    }

    #[tokio::test]
    async fn blank_entries_are_ignored() {
        let fetcher = Arc::new(FixedFetcher::new("body", false));
        let extractor = Arc::new(StubExtractor::profiles());
        let store = Arc::new(MemoryStore::default());

        let stats = pipeline(&fetcher, &extractor, &store)
            .run(&domains(&["  ", "real.com"]))
            .await
            .unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.stored, 1);
    }

    #[test]
    fn stats_display_reads_like_a_report() {
        let stats = RunStats {
            processed: 5,
            stored: 3,
            skipped: 1,
            failed: 1,
            rendered_fallbacks: 2,
        };
        let report = stats.to_string();
        assert!(report.contains("=== Enrichment Run Complete ==="));
        assert!(report.contains("Profiles stored:     3"));
        assert!(report.contains("Rendered fallbacks:  2"));
    }
}
