//! The outer loop: search pairs, result pages, filtering and one wizard run per job.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::answers::AnswerResolver;
use crate::config::SearchConfig;
use crate::documents::DocumentPlanner;
use crate::errors::AppError;
use crate::models::Job;
use crate::wizard::{WizardController, WizardSurface};

pub mod blacklist;
pub mod outcomes;
pub mod search;

pub use blacklist::is_blacklisted;
pub use outcomes::{Outcome, OutcomeLog};

/// Minimum time spent on each result page.
pub const MIN_PAGE_DWELL: Duration = Duration::from_secs(9);
/// The site stops serving results after 1000 entries (40 pages of 25).
pub const MAX_PAGES_PER_SEARCH: u32 = 40;

/// A paginated job search as seen by the campaign.
#[async_trait]
pub trait JobBoard: Send {
    async fn open_results(&mut self, url: &str) -> Result<(), AppError>;

    /// Jobs listed on the open page. Empty means the search is exhausted.
    async fn jobs_on_page(&mut self) -> Result<Vec<Job>, AppError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CampaignSummary {
    pub pages: u32,
    pub applied: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Failed applications whose wizard step could not be completed.
    pub step_failures: u32,
}

pub struct Campaign<'a> {
    search: &'a SearchConfig,
    resolver: &'a mut AnswerResolver,
    documents: &'a DocumentPlanner,
    outcomes: OutcomeLog,
    seen_links: HashSet<String>,
    seen_ids: HashSet<String>,
    summary: CampaignSummary,
}

impl<'a> Campaign<'a> {
    pub fn new(
        search: &'a SearchConfig,
        resolver: &'a mut AnswerResolver,
        documents: &'a DocumentPlanner,
        outcomes: OutcomeLog,
    ) -> Self {
        Self {
            search,
            resolver,
            documents,
            outcomes,
            seen_links: HashSet::new(),
            seen_ids: HashSet::new(),
            summary: CampaignSummary::default(),
        }
    }

    /// Works through every (position, location) pair in random order. Only fatal
    /// errors end the run early.
    pub async fn run<S>(mut self, session: &mut S) -> Result<CampaignSummary, AppError>
    where
        S: JobBoard + WizardSurface + ?Sized,
    {
        let base = search::base_query(self.search);
        let mut pairs: Vec<(String, String)> = self
            .search
            .positions
            .iter()
            .filter(|p| !p.trim().is_empty())
            .flat_map(|position| {
                self.search
                    .locations
                    .iter()
                    .filter(|l| !l.trim().is_empty())
                    .map(move |location| (position.clone(), location.clone()))
            })
            .collect();
        pairs.shuffle(&mut rand::thread_rng());
        info!(
            "Starting campaign over {} search(es), outcomes in {}",
            pairs.len(),
            self.outcomes.dir().display()
        );

        for (position, location) in &pairs {
            info!("Searching '{}' in '{}'", position, location);
            for page in 0..MAX_PAGES_PER_SEARCH {
                let dwell_until = Instant::now() + MIN_PAGE_DWELL;
                let url = search::page_url(&base, position, location, page);
                match self.run_page(session, &url).await {
                    Ok(0) => {
                        info!("No more jobs for '{}' in '{}' (page {})", position, location, page);
                        break;
                    }
                    Ok(count) => debug!("Page {} had {} job(s)", page, count),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        error!("Error on page {} of '{}' in '{}': {}", page, position, location, e);
                        break;
                    }
                }
                tokio::time::sleep_until(dwell_until).await;
            }
        }

        info!(
            "Campaign finished: {} applied, {} failed, {} skipped over {} page(s)",
            self.summary.applied, self.summary.failed, self.summary.skipped, self.summary.pages
        );
        Ok(self.summary)
    }

    async fn run_page<S>(&mut self, session: &mut S, url: &str) -> Result<usize, AppError>
    where
        S: JobBoard + WizardSurface + ?Sized,
    {
        session.open_results(url).await?;
        let jobs = session.jobs_on_page().await?;
        self.summary.pages += 1;
        let count = jobs.len();
        for job in jobs {
            self.process(session, job).await?;
        }
        Ok(count)
    }

    async fn process<S>(&mut self, session: &mut S, mut job: Job) -> Result<(), AppError>
    where
        S: JobBoard + WizardSurface + ?Sized,
    {
        let fresh_link = self.seen_links.insert(job.link.clone());
        let fresh_id = self.seen_ids.insert(job.unique_identifier());
        if !(fresh_link && fresh_id) {
            debug!("Already seen {}, skipping", job);
            return Ok(());
        }

        if is_blacklisted(
            &job.title,
            &job.company,
            &self.search.title_blacklist,
            &self.search.company_blacklist,
        ) {
            warn!("Blacklisted {}, skipping", job);
            self.note(Outcome::Skipped, &job);
            return Ok(());
        }

        if !job.apply_method.is_automatable() {
            info!("{} uses apply method {}, skipping", job, job.apply_method.as_str());
            self.note(Outcome::Skipped, &job);
            return Ok(());
        }

        info!("Applying to {}", job);
        let result = WizardController::new(&mut *self.resolver, self.documents)
            .apply(session, &mut job)
            .await;
        match result {
            Ok(report) => {
                info!(
                    "Applied to {} ({} step(s), {} field(s) filled)",
                    job, report.steps, report.fields_handled
                );
                self.note(Outcome::Success, &job);
                Ok(())
            }
            Err(e) => {
                if e.is_step_failure() {
                    warn!("Gave up on {} ({}): {}", job, job.link, e);
                } else {
                    error!(
                        "Application failed for {} at {} ({}): {}",
                        job.title, job.company, job.link, e
                    );
                }
                self.note(Outcome::Failed, &job);
                self.summary.step_failures += u32::from(e.is_step_failure());
                if e.is_fatal() {
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    fn note(&mut self, outcome: Outcome, job: &Job) {
        match outcome {
            Outcome::Success => self.summary.applied += 1,
            Outcome::Failed => self.summary.failed += 1,
            Outcome::Skipped => self.summary.skipped += 1,
        }
        if let Err(e) = self.outcomes.record(outcome, job) {
            warn!("Could not record {:?} for {}: {}", outcome, job, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::answers::AnswerStore;
    use crate::form::fake::FakeForm;
    use crate::llm_client::fake::FakeGenerator;
    use crate::models::profile::sample_profile;
    use crate::models::ApplyMethod;
    use crate::wizard::fake::FakeWizard;

    const SEARCH: &str = r#"
positions = ["Rust Engineer"]
locations = ["Berlin"]
title_blacklist = ["recruiter"]
company_blacklist = ["Globex"]

[profile]
name = "Ada Lovelace"
email = "ada@example.com"
phone = "15123456789"
phone_country_code = "49"
city = "Berlin"
country = "Germany"
"#;

    fn job(id: u32, title: &str, company: &str, method: ApplyMethod) -> Job {
        Job::new(
            title,
            company,
            "Berlin",
            format!("https://www.linkedin.com/jobs/view/{id}/"),
            method,
        )
    }

    fn lines(log: &OutcomeLog, outcome: Outcome) -> Vec<String> {
        std::fs::read_to_string(log.path(outcome))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    async fn run(wizard: &mut FakeWizard, dir: &tempfile::TempDir) -> Result<CampaignSummary, AppError> {
        let search = SearchConfig::parse(SEARCH).unwrap();
        let store = AnswerStore::load(dir.path().join("old_questions.csv")).unwrap();
        let mut resolver = AnswerResolver::new(
            store,
            Arc::new(FakeGenerator::always("unused")),
            sample_profile(),
        );
        let documents = DocumentPlanner::new(None, None, None);
        Campaign::new(&search, &mut resolver, &documents, OutcomeLog::new(dir.path()))
            .run(wizard)
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_jobs_are_filtered_applied_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let page = vec![
            job(1, "Rust Engineer", "Acme", ApplyMethod::QuickApply),
            job(2, "Technical Recruiter", "Acme", ApplyMethod::QuickApply),
            job(3, "Platform Engineer", "Initech", ApplyMethod::External),
            job(1, "Rust Engineer", "Acme", ApplyMethod::QuickApply),
            job(4, "Backend Engineer", "Hooli", ApplyMethod::Unknown),
            job(5, "Site Reliability Engineer", "Globex", ApplyMethod::QuickApply),
        ];
        let mut wizard = FakeWizard::new(vec![(FakeForm::new(Vec::new()), "Submit application")])
            .with_result_pages(vec![page])
            .failing_open("https://www.linkedin.com/jobs/view/4/", false);

        let summary = run(&mut wizard, &dir).await.unwrap();
        assert_eq!(
            summary,
            CampaignSummary {
                pages: 2,
                applied: 1,
                failed: 1,
                skipped: 3,
                step_failures: 0,
            }
        );

        let log = OutcomeLog::new(dir.path());
        assert_eq!(
            lines(&log, Outcome::Success),
            vec!["Acme,Rust Engineer,https://www.linkedin.com/jobs/view/1/,Berlin"]
        );
        assert_eq!(lines(&log, Outcome::Skipped).len(), 3);
        assert_eq!(
            lines(&log, Outcome::Failed),
            vec!["Hooli,Backend Engineer,https://www.linkedin.com/jobs/view/4/,Berlin"]
        );

        let results: Vec<&String> = wizard
            .events()
            .iter()
            .filter(|e| e.starts_with("results:"))
            .collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].ends_with("&keywords=Rust+Engineer&location=Berlin&start=0"));
        assert!(results[1].ends_with("&start=25"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_stops_the_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let page = vec![
            job(1, "Rust Engineer", "Acme", ApplyMethod::QuickApply),
            job(2, "Backend Engineer", "Hooli", ApplyMethod::QuickApply),
        ];
        let mut wizard = FakeWizard::new(vec![(FakeForm::new(Vec::new()), "Submit application")])
            .with_result_pages(vec![page])
            .failing_open("https://www.linkedin.com/jobs/view/1/", true);

        let err = run(&mut wizard, &dir).await.unwrap_err();
        assert!(matches!(err, AppError::SecurityCheckpoint(_)));
        assert!(!wizard
            .events()
            .iter()
            .any(|e| e == "open:https://www.linkedin.com/jobs/view/2/"));
        assert_eq!(lines(&OutcomeLog::new(dir.path()), Outcome::Failed).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_wizard_counts_as_step_failure() {
        let dir = tempfile::tempdir().unwrap();
        let page = vec![job(1, "Rust Engineer", "Acme", ApplyMethod::QuickApply)];
        let form = FakeForm::new(Vec::new()).settle_errors(&["A resume is required"]);
        let mut wizard = FakeWizard::new(vec![(form, "Submit application")])
            .with_result_pages(vec![page]);

        let summary = run(&mut wizard, &dir).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.step_failures, 1);
        assert_eq!(lines(&OutcomeLog::new(dir.path()), Outcome::Failed).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_first_page_moves_on() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = FakeWizard::new(vec![(FakeForm::new(Vec::new()), "Submit application")]);
        let summary = run(&mut wizard, &dir).await.unwrap();
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.applied, 0);
    }
}
