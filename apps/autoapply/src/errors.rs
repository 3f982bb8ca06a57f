use thiserror::Error;

use crate::driver::DriverError;
use crate::llm_client::LlmError;

/// Application-level error type.
///
/// Job-scoped failures are recorded and the campaign moves on; only the
/// variants reported by [`AppError::is_fatal`] stop the whole run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Page driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed answering or file upload: {0:?}")]
    Validation(Vec<String>),

    #[error("No selectable option for '{0}'")]
    OptionUnavailable(String),

    #[error("No primary action control found in the step footer")]
    NoPrimaryAction,

    #[error("Form step stalled after {passes} scan passes")]
    StalledStep { passes: u32 },

    #[error("Timed out waiting for the step to advance after clicking '{label}'")]
    TransitionTimeout { label: String },

    #[error("Wizard did not finish within {steps} steps")]
    StepLimit { steps: u32 },

    #[error("Security checkpoint not resolved: {0}")]
    SecurityCheckpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Errors that leave no way to make further automated progress in this run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::SecurityCheckpoint(_) | AppError::Config(_))
    }

    /// Errors that abort the current step (and with it the current job).
    pub fn is_step_failure(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NoPrimaryAction
                | AppError::StalledStep { .. }
                | AppError::TransitionTimeout { .. }
                | AppError::StepLimit { .. }
        )
    }
}
