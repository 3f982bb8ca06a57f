use std::time::Duration;

use async_trait::async_trait;

use crate::driver::ElementRef;
use crate::errors::AppError;
use crate::form::FormSurface;
use crate::wizard::actions::is_submit_label;

/// The step's primary action control (Next, Review or Submit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionControl {
    pub element: ElementRef,
    pub label: String,
}

impl ActionControl {
    pub fn is_submit(&self) -> bool {
        is_submit_label(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The clicked control went stale or invisible.
    ControlGone,
    /// A fresh primary action rendered.
    NextStep,
}

/// Wizard-level page operations on top of the per-step [`FormSurface`].
#[async_trait]
pub trait WizardSurface: FormSurface {
    /// Opens the job page, returns its description and starts the quick-apply flow.
    async fn open_application(&mut self, link: &str) -> Result<String, AppError>;

    async fn step_header(&mut self) -> Result<String, AppError>;

    async fn locate_primary_action(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<ActionControl>, AppError>;

    /// Unticks "follow company" when it is ticked. Returns whether it clicked.
    async fn unfollow_company(&mut self) -> Result<bool, AppError>;

    async fn click_action(&mut self, action: &ActionControl) -> Result<(), AppError>;

    /// `None` on timeout.
    async fn wait_transition(
        &mut self,
        clicked: &ActionControl,
        timeout: Duration,
    ) -> Result<Option<Transition>, AppError>;

    async fn modal_present(&mut self) -> Result<bool, AppError>;

    /// Closes an unrelated confirmation dialog if one shows up. Returns whether one did.
    async fn dismiss_post_submit_dialog(&mut self) -> Result<bool, AppError>;

    /// Cancels the in-progress application.
    async fn discard(&mut self) -> Result<(), AppError>;
}
