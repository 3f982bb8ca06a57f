//! Per-outcome CSV logs (`company,title,link,location`), appended across runs.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::AppError;
use crate::models::Job;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn file_name(self) -> &'static str {
        match self {
            Outcome::Success => "success.csv",
            Outcome::Failed => "failed.csv",
            Outcome::Skipped => "skipped.csv",
        }
    }
}

pub struct OutcomeLog {
    dir: PathBuf,
}

impl OutcomeLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, outcome: Outcome) -> PathBuf {
        self.dir.join(outcome.file_name())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record(&self, outcome: Outcome, job: &Job) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(outcome);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            job.company.as_str(),
            job.title.as_str(),
            job.link.as_str(),
            job.location.as_str(),
        ])?;
        writer.flush()?;
        debug!("Recorded {} in {}", job, path.display());
        Ok(())
    }
}
