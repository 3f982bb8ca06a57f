mod answers;
mod campaign;
mod config;
mod documents;
mod driver;
mod errors;
mod form;
mod llm_client;
mod models;
mod site;
mod wizard;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::answers::{AnswerResolver, AnswerStore};
use crate::campaign::{Campaign, CampaignSummary, OutcomeLog};
use crate::config::{Config, SearchConfig};
use crate::documents::{CoverLetterWriter, DocumentGenerator, DocumentPlanner};
use crate::driver::webdriver::WebDriverClient;
use crate::driver::PageDriver;
use crate::errors::AppError;
use crate::llm_client::usage::UsageLog;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::site::LiveSession;

#[derive(Debug, Parser)]
#[command(name = "autoapply", version, about = "Applies to quick-apply job listings")]
struct Cli {
    /// Application document to upload. Overrides `[uploads].resume`.
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let level = match cli.verbose {
        0 => config.rust_log.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting autoapply v{}", env!("CARGO_PKG_VERSION"));

    let mut search = SearchConfig::load(&config.search_config)
        .with_context(|| format!("loading {}", config.search_config.display()))?;

    let resume = cli
        .resume
        .clone()
        .or_else(|| search.uploads.resume.clone())
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                warn!("Resume {} does not exist, ignoring it", path.display());
            }
            exists
        });
    search.profile.load_resume_text(resume.as_deref());

    let llm: Arc<dyn TextGenerator> = Arc::new(
        LlmClient::new(config.anthropic_api_key.clone())
            .with_usage_log(UsageLog::new(config.llm_call_log.clone())),
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let store = AnswerStore::load(config.answers_file.clone())
        .with_context(|| format!("loading {}", config.answers_file.display()))?;
    let mut resolver = AnswerResolver::new(store, llm.clone(), search.profile.clone());

    let writer: Arc<dyn DocumentGenerator> = Arc::new(CoverLetterWriter::new(
        llm,
        search.profile.clone(),
        &config.output_dir,
    ));
    let documents = DocumentPlanner::new(Some(writer), resume, search.uploads.cover_letter.clone());

    let browser_profile = config.output_dir.join("chrome_profile");
    let driver: Arc<dyn PageDriver> = Arc::new(
        WebDriverClient::connect(&config.webdriver_url, config.headless, Some(&browser_profile))
            .await
            .with_context(|| format!("connecting to WebDriver at {}", config.webdriver_url))?,
    );

    let outcome = run(&config, &search, driver.clone(), &mut resolver, &documents).await;
    if let Err(e) = driver.quit().await {
        warn!("Closing the browser session failed: {}", e);
    }
    let summary = outcome?;
    info!(
        "Done: {} applied, {} failed ({} stuck on a step), {} skipped",
        summary.applied, summary.failed, summary.step_failures, summary.skipped
    );
    Ok(())
}

async fn run(
    config: &Config,
    search: &SearchConfig,
    driver: Arc<dyn PageDriver>,
    resolver: &mut AnswerResolver,
    documents: &DocumentPlanner,
) -> Result<CampaignSummary, AppError> {
    site::auth::login(driver.as_ref(), &config.email, &config.password).await?;
    let mut session = LiveSession::new(driver);
    Campaign::new(search, resolver, documents, OutcomeLog::new(&config.output_dir))
        .run(&mut session)
        .await
}
