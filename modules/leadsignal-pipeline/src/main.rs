use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use browserless_client::ensure_session_state;
use leadsignal_core::{Config, IcpCriteria};
use leadsignal_pipeline::extractor::GeminiExtractor;
use leadsignal_pipeline::fetcher::{RenderedFetcher, StaticFetcher, TieredFetcher};
use leadsignal_pipeline::pipeline::Pipeline;
use leadsignal_pipeline::store::SheetStore;
use sheets_client::SheetsClient;

/// Enrich company domains into structured sales-intelligence rows.
#[derive(Parser, Debug)]
#[command(name = "leadsignal", version)]
struct Args {
    /// Company domains to process, in order (e.g. aqr.com man.com)
    #[arg(required = true)]
    domains: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("leadsignal=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    ensure_session_state(&config.session_state_path)
        .context("Failed to prepare session state file")?;

    let icp = match &config.icp_criteria_path {
        Some(path) => IcpCriteria::from_json_file(path)?,
        None => IcpCriteria::default(),
    };

    let fetcher = TieredFetcher::new(
        Box::new(StaticFetcher::new()),
        Box::new(RenderedFetcher::new(
            &config.browserless_url,
            config.browserless_token.as_deref(),
            &config.session_state_path,
        )),
    );

    let extractor = GeminiExtractor::new(&config.gemini_api_key, &config.gemini_model, icp);

    let store = SheetStore::new(
        SheetsClient::new(&config.spreadsheet_id, &config.sheets_access_token),
        &config.sheet_name,
        Duration::from_millis(config.sheet_pacing_ms),
    );

    let pipeline = Pipeline::new(Arc::new(fetcher), Arc::new(extractor), Arc::new(store));

    let stats = pipeline.run(&args.domains).await?;
    info!("{stats}");

    Ok(())
}
