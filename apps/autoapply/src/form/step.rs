//! Fills one visible wizard step.
//!
//! `Scanning -> Answering -> Rescanning -> ... -> Settling -> Done`. Each pass
//! answers the containers not yet processed; the loop ends on the first pass
//! that handles nothing new, and is capped so a step that keeps producing
//! fresh fields fails as stalled instead of spinning.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::answers::numeric::clamp_numeric;
use crate::answers::AnswerResolver;
use crate::documents::DocumentPlanner;
use crate::errors::AppError;
use crate::form::classifier::{classify, stable_key, ControlKind, FieldDescriptor};
use crate::form::surface::{FieldAction, FormSurface};
use crate::form::view::FieldView;
use crate::models::Job;

pub const MAX_SCAN_PASSES: u32 = 25;
/// Transient driver failures tolerated per container before it is left to settling.
const MAX_FIELD_ATTEMPTS: u32 = 3;
const RANGE_CORRECTION_ATTEMPTS: u32 = 1;
const DATE_FORMAT: &str = "%m/%d/%y";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub passes: u32,
    pub handled: usize,
    pub already_answered: usize,
    pub unrecognized: usize,
}

enum StepState {
    Scanning,
    Answering(Vec<FieldView>),
    Rescanning,
    Settling,
    Done,
}

enum ContainerOutcome {
    Handled,
    AlreadyAnswered,
    /// Classified, but nothing to do (e.g. upload with no document).
    Skipped,
    Unrecognized,
    Retry,
}

#[derive(Default)]
struct PassProgress {
    handled: usize,
    retry_pending: bool,
}

/// One driver per step; the processed set dies with it.
pub struct FormStepDriver<'a> {
    resolver: &'a mut AnswerResolver,
    documents: &'a DocumentPlanner,
    job: &'a Job,
    processed: HashSet<String>,
    unrecognized: HashSet<String>,
    attempts: HashMap<String, u32>,
    report: StepReport,
}

impl<'a> FormStepDriver<'a> {
    pub fn new(resolver: &'a mut AnswerResolver, documents: &'a DocumentPlanner, job: &'a Job) -> Self {
        Self {
            resolver,
            documents,
            job,
            processed: HashSet::new(),
            unrecognized: HashSet::new(),
            attempts: HashMap::new(),
            report: StepReport::default(),
        }
    }

    pub async fn run<S: FormSurface + ?Sized>(mut self, surface: &mut S) -> Result<StepReport, AppError> {
        let mut state = StepState::Scanning;
        loop {
            state = match state {
                StepState::Scanning => {
                    self.report.passes += 1;
                    if self.report.passes > MAX_SCAN_PASSES {
                        warn!(
                            "Step for {} still producing fields after {} passes",
                            self.job, MAX_SCAN_PASSES
                        );
                        return Err(AppError::StalledStep {
                            passes: MAX_SCAN_PASSES,
                        });
                    }
                    let fresh: Vec<FieldView> = surface
                        .scan()
                        .await?
                        .into_iter()
                        .filter(|view| !self.processed.contains(&stable_key(view)))
                        .collect();
                    StepState::Answering(fresh)
                }
                StepState::Answering(views) => {
                    let progress = self.answer_pass(surface, views).await?;
                    debug!(
                        "Pass {} handled {} field(s) for {}",
                        self.report.passes, progress.handled, self.job
                    );
                    if progress.handled > 0 || progress.retry_pending {
                        StepState::Rescanning
                    } else {
                        StepState::Settling
                    }
                }
                StepState::Rescanning => {
                    surface.scroll_forward().await?;
                    StepState::Scanning
                }
                StepState::Settling => {
                    surface.settle().await?;
                    let errors = surface.active_errors().await?;
                    if !errors.is_empty() {
                        warn!(
                            "Step for {} left with validation errors: {}",
                            self.job,
                            errors.join(" | ")
                        );
                        return Err(AppError::Validation(errors));
                    }
                    StepState::Done
                }
                StepState::Done => return Ok(self.report),
            };
        }
    }

    async fn answer_pass<S: FormSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        views: Vec<FieldView>,
    ) -> Result<PassProgress, AppError> {
        let mut progress = PassProgress::default();
        for view in views {
            let key = stable_key(&view);
            if self.processed.contains(&key) {
                continue;
            }
            match self.handle_container(surface, &view, &key).await? {
                ContainerOutcome::Handled => {
                    self.processed.insert(key);
                    self.report.handled += 1;
                    progress.handled += 1;
                }
                ContainerOutcome::AlreadyAnswered => {
                    self.processed.insert(key);
                    self.report.already_answered += 1;
                }
                ContainerOutcome::Skipped => {
                    self.processed.insert(key);
                }
                ContainerOutcome::Unrecognized => {
                    if self.unrecognized.insert(key) {
                        self.report.unrecognized += 1;
                        debug!("No recognizable control in container: {}", view.outer_html);
                    }
                }
                ContainerOutcome::Retry => progress.retry_pending = true,
            }
        }
        Ok(progress)
    }

    async fn handle_container<S: FormSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        view: &FieldView,
        key: &str,
    ) -> Result<ContainerOutcome, AppError> {
        let descriptors = classify(view);
        if descriptors.is_empty() {
            return Ok(ContainerOutcome::Unrecognized);
        }

        let mut acted = false;
        let mut pending = false;
        for desc in descriptors.iter().filter(|d| !d.already_answered) {
            pending = true;
            match self.fill(surface, view, desc).await {
                Ok(did_act) => acted |= did_act,
                Err(AppError::Driver(e)) if e.is_transient() => {
                    let attempts = self.attempts.entry(key.to_string()).or_insert(0);
                    *attempts += 1;
                    if *attempts < MAX_FIELD_ATTEMPTS {
                        debug!(
                            "Transient failure on {:?} field '{}' (attempt {}): {}",
                            desc.kind, desc.question, attempts, e
                        );
                        return Ok(ContainerOutcome::Retry);
                    }
                    warn!(
                        "Giving up on {:?} field '{}' after {} attempts: {}",
                        desc.kind, desc.question, attempts, e
                    );
                }
                Err(AppError::OptionUnavailable(option)) => {
                    warn!(
                        "'{}' is not an option of '{}', leaving it for validation",
                        option, desc.question
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed to fill {:?} field '{}' for {}: {}",
                        desc.kind, desc.question, self.job, e
                    );
                    return Err(e);
                }
            }
        }

        Ok(match (pending, acted) {
            (false, _) => ContainerOutcome::AlreadyAnswered,
            (true, true) => ContainerOutcome::Handled,
            (true, false) => ContainerOutcome::Skipped,
        })
    }

    /// Returns whether a mutating action was performed.
    async fn fill<S: FormSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        view: &FieldView,
        desc: &FieldDescriptor,
    ) -> Result<bool, AppError> {
        match desc.kind {
            ControlKind::Upload => {
                let Some(path) = self.documents.document_for(&desc.control_id, self.job).await else {
                    debug!("No document for upload '{}', leaving it empty", desc.control_id);
                    return Ok(false);
                };
                surface
                    .apply(&FieldAction::Upload {
                        input: desc.control.clone(),
                        path,
                    })
                    .await?;
                Ok(true)
            }
            ControlKind::Consent => {
                info!("Accepting '{}'", desc.question);
                surface
                    .apply(&FieldAction::Click {
                        target: desc.control.clone(),
                    })
                    .await?;
                Ok(true)
            }
            ControlKind::DatePicker => {
                let today = chrono::Local::now().format(DATE_FORMAT).to_string();
                surface
                    .apply(&FieldAction::TypeDate {
                        control: desc.control.clone(),
                        text: today,
                    })
                    .await?;
                Ok(true)
            }
            _ => self.answer_question(surface, view, desc).await,
        }
    }

    async fn answer_question<S: FormSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        view: &FieldView,
        desc: &FieldDescriptor,
    ) -> Result<bool, AppError> {
        let Some(question_type) = desc.kind.question_type() else {
            return Ok(false);
        };
        let resolved = self
            .resolver
            .resolve(question_type, &desc.question, desc.options.as_deref())
            .await;
        info!(
            "{} question '{}' -> '{}' ({:?})",
            question_type, desc.question, resolved.answer, resolved.source
        );

        let control = desc.control.clone();
        let action = match desc.kind {
            ControlKind::Dropdown => FieldAction::Select {
                control,
                option: resolved.answer.clone(),
            },
            ControlKind::SingleChoice => {
                let choice = desc
                    .choices
                    .iter()
                    .find(|c| c.text.eq_ignore_ascii_case(resolved.answer.trim()))
                    .or_else(|| desc.choices.first());
                let Some(choice) = choice else {
                    return Ok(false);
                };
                FieldAction::Click {
                    target: choice.element.clone(),
                }
            }
            ControlKind::Typeahead => FieldAction::Typeahead {
                control,
                text: resolved.answer.clone(),
            },
            _ => FieldAction::Type {
                control,
                text: resolved.answer.clone(),
            },
        };
        surface.apply(&action).await?;

        let accepted = if desc.kind == ControlKind::Numeric {
            self.correct_numeric(surface, view, desc, &resolved.answer).await?
        } else {
            Some(resolved.answer.clone())
        };

        if let Some(answer) = accepted {
            if resolved.was_generated() && self.resolver.remember(question_type, &desc.question, &answer) {
                debug!("Stored answer for '{}'", desc.question);
            }
        }
        Ok(true)
    }

    /// Bounded range-correction loop. `None` means the field still reports an error.
    async fn correct_numeric<S: FormSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        view: &FieldView,
        desc: &FieldDescriptor,
        answer: &str,
    ) -> Result<Option<String>, AppError> {
        let mut current = answer.to_string();
        let mut attempts = 0;
        loop {
            let Some(error) = surface.field_error(&view.container).await? else {
                return Ok(Some(current));
            };
            if attempts >= RANGE_CORRECTION_ATTEMPTS {
                warn!(
                    "Numeric field '{}' still rejects '{}': {}",
                    desc.question, current, error
                );
                return Ok(None);
            }
            attempts += 1;

            let range = self.resolver.suggest_range(&desc.question, &current, &error).await;
            let corrected = clamp_numeric(&current, range);
            info!(
                "Correcting '{}' from '{}' to '{}' (range {}..={}, error: {})",
                desc.question, current, corrected, range.0, range.1, error
            );
            current = corrected;
            surface
                .apply(&FieldAction::Type {
                    control: desc.control.clone(),
                    text: current.clone(),
                })
                .await?;
        }
    }
}
