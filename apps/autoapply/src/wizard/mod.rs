//! Multi-step quick-apply wizard.
//!
//! `StepActive -> ActionLocate -> ActionClick -> TransitionWait`, back to
//! `StepActive` while steps follow, ending in `Submitted`. Any error on the
//! way triggers a best-effort discard before it is returned.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::answers::AnswerResolver;
use crate::documents::DocumentPlanner;
use crate::errors::AppError;
use crate::form::FormStepDriver;
use crate::models::Job;

pub mod actions;
pub mod surface;

#[cfg(test)]
pub mod fake;

pub use surface::{ActionControl, Transition, WizardSurface};

pub const MAX_STEPS: u32 = 12;
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(6);
pub const EXTENDED_ACTION_TIMEOUT: Duration = Duration::from_secs(18);
pub const TRANSITION_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WizardReport {
    pub steps: u32,
    pub fields_handled: usize,
}

enum WizardState {
    StepActive,
    ActionLocate,
    ActionClick(ActionControl),
    TransitionWait(ActionControl),
    Submitted,
}

pub struct WizardController<'a> {
    resolver: &'a mut AnswerResolver,
    documents: &'a DocumentPlanner,
}

impl<'a> WizardController<'a> {
    pub fn new(resolver: &'a mut AnswerResolver, documents: &'a DocumentPlanner) -> Self {
        Self {
            resolver,
            documents,
        }
    }

    pub async fn apply<S: WizardSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        job: &mut Job,
    ) -> Result<WizardReport, AppError> {
        match self.drive(surface, job).await {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!("Application to {} failed: {}", job, e);
                if let Err(discard_err) = surface.discard().await {
                    debug!("Discard after failure also failed: {}", discard_err);
                }
                Err(e)
            }
        }
    }

    async fn drive<S: WizardSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        job: &mut Job,
    ) -> Result<WizardReport, AppError> {
        let description = surface.open_application(&job.link).await?;
        job.set_description(description);
        self.resolver.begin_job(job);

        let mut report = WizardReport::default();
        let mut state = WizardState::StepActive;
        loop {
            state = match state {
                WizardState::StepActive => {
                    report.steps += 1;
                    if report.steps > MAX_STEPS {
                        return Err(AppError::StepLimit { steps: MAX_STEPS });
                    }
                    info!("Quick-apply step {} for {}", report.steps, job);
                    let step = FormStepDriver::new(&mut *self.resolver, self.documents, job)
                        .run(surface)
                        .await?;
                    report.fields_handled += step.handled;
                    WizardState::ActionLocate
                }
                WizardState::ActionLocate => {
                    let header = surface.step_header().await?;
                    let timeout = if actions::wants_extended_wait(&header) {
                        EXTENDED_ACTION_TIMEOUT
                    } else {
                        ACTION_TIMEOUT
                    };
                    match surface.locate_primary_action(timeout).await? {
                        Some(action) => WizardState::ActionClick(action),
                        None => return Err(AppError::NoPrimaryAction),
                    }
                }
                WizardState::ActionClick(action) => {
                    if action.is_submit() {
                        match surface.unfollow_company().await {
                            Ok(true) => debug!("Unfollowed {}", job.company),
                            Ok(false) => {}
                            Err(e) => debug!("Could not toggle follow for {}: {}", job.company, e),
                        }
                    }
                    surface.click_action(&action).await?;
                    info!("Clicked '{}'", action.label);
                    WizardState::TransitionWait(action)
                }
                WizardState::TransitionWait(action) => {
                    match surface.wait_transition(&action, TRANSITION_TIMEOUT).await? {
                        Some(_) => {
                            if surface.modal_present().await? {
                                WizardState::StepActive
                            } else {
                                WizardState::Submitted
                            }
                        }
                        None => {
                            let errors = surface.active_errors().await?;
                            if !errors.is_empty() {
                                return Err(AppError::Validation(errors));
                            }
                            return Err(AppError::TransitionTimeout {
                                label: action.label,
                            });
                        }
                    }
                }
                WizardState::Submitted => {
                    match surface.dismiss_post_submit_dialog().await {
                        Ok(true) => debug!("Dismissed post-submit dialog"),
                        Ok(false) => {}
                        Err(e) => debug!("Post-submit dialog handling failed: {}", e),
                    }
                    info!("Application submitted for {}", job);
                    return Ok(report);
                }
            };
        }
    }
}
