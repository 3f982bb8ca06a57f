//! Scripted multi-step wizard. Each step is a [`FakeForm`] plus the label of its
//! primary action; an empty label means no action control renders.
//!
//! Also serves scripted result pages so a whole campaign can run against it.
//! Every application replays the same steps.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;

use crate::campaign::JobBoard;
use crate::driver::{DriverError, ElementRef};
use crate::errors::AppError;
use crate::form::fake::FakeForm;
use crate::form::surface::{FieldAction, FormSurface};
use crate::form::view::FieldView;
use crate::models::Job;
use crate::wizard::surface::{ActionControl, Transition, WizardSurface};

pub struct FakeWizard {
    steps: Vec<(FakeForm, String)>,
    current: usize,
    description: String,
    following: bool,
    stuck_at: Option<usize>,
    modal_open: bool,
    post_submit_dialog: bool,
    discard_fails: bool,
    events: Vec<String>,
    result_pages: VecDeque<Vec<Job>>,
    /// Link -> whether opening it fails fatally.
    failing_opens: HashMap<String, bool>,
}

impl FakeWizard {
    pub fn new(steps: Vec<(FakeForm, &str)>) -> Self {
        Self {
            steps: steps
                .into_iter()
                .map(|(form, label)| (form, label.to_string()))
                .collect(),
            current: 0,
            description: String::new(),
            following: false,
            stuck_at: None,
            modal_open: true,
            post_submit_dialog: false,
            discard_fails: false,
            events: Vec::new(),
            result_pages: VecDeque::new(),
            failing_opens: HashMap::new(),
        }
    }

    /// Pages served by [`JobBoard::jobs_on_page`], in order; empty afterwards.
    pub fn with_result_pages(mut self, pages: Vec<Vec<Job>>) -> Self {
        self.result_pages = pages.into();
        self
    }

    /// Opening `link` fails: with a checkpoint error when `fatal`, else a missing button.
    pub fn failing_open(mut self, link: &str, fatal: bool) -> Self {
        self.failing_opens.insert(link.to_string(), fatal);
        self
    }

    pub fn following(mut self, following: bool) -> Self {
        self.following = following;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Clicking the action of step `index` never produces a transition.
    pub fn stuck_at(mut self, index: usize) -> Self {
        self.stuck_at = Some(index);
        self
    }

    pub fn post_submit_dialog(mut self) -> Self {
        self.post_submit_dialog = true;
        self
    }

    pub fn failing_discard(mut self) -> Self {
        self.discard_fails = true;
        self
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    fn form(&mut self) -> &mut FakeForm {
        &mut self.steps[self.current].0
    }
}

#[async_trait]
impl FormSurface for FakeWizard {
    async fn scan(&mut self) -> Result<Vec<FieldView>, AppError> {
        self.form().scan().await
    }

    async fn apply(&mut self, action: &FieldAction) -> Result<(), AppError> {
        self.form().apply(action).await
    }

    async fn field_error(&mut self, container: &ElementRef) -> Result<Option<String>, AppError> {
        self.form().field_error(container).await
    }

    async fn scroll_forward(&mut self) -> Result<(), AppError> {
        self.form().scroll_forward().await
    }

    async fn settle(&mut self) -> Result<(), AppError> {
        self.form().settle().await
    }

    async fn active_errors(&mut self) -> Result<Vec<String>, AppError> {
        self.form().active_errors().await
    }
}

#[async_trait]
impl WizardSurface for FakeWizard {
    async fn open_application(&mut self, link: &str) -> Result<String, AppError> {
        self.events.push(format!("open:{link}"));
        match self.failing_opens.get(link) {
            Some(true) => return Err(AppError::SecurityCheckpoint("challenge shown".into())),
            Some(false) => {
                return Err(DriverError::NoSuchElement("quick-apply button".into()).into())
            }
            None => {}
        }
        self.current = 0;
        self.modal_open = true;
        Ok(self.description.clone())
    }

    async fn step_header(&mut self) -> Result<String, AppError> {
        Ok(format!("Step {}", self.current + 1))
    }

    async fn locate_primary_action(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<ActionControl>, AppError> {
        let label = &self.steps[self.current].1;
        if label.is_empty() {
            return Ok(None);
        }
        Ok(Some(ActionControl {
            element: ElementRef::new(format!("action-{}", self.current)),
            label: label.clone(),
        }))
    }

    async fn unfollow_company(&mut self) -> Result<bool, AppError> {
        if !self.following {
            return Ok(false);
        }
        self.following = false;
        self.events.push("unfollow".to_string());
        Ok(true)
    }

    async fn click_action(&mut self, action: &ActionControl) -> Result<(), AppError> {
        self.events.push(format!("click:{}", action.label));
        Ok(())
    }

    async fn wait_transition(
        &mut self,
        _clicked: &ActionControl,
        _timeout: Duration,
    ) -> Result<Option<Transition>, AppError> {
        if self.stuck_at == Some(self.current) {
            return Ok(None);
        }
        if self.current + 1 == self.steps.len() {
            self.modal_open = false;
            return Ok(Some(Transition::ControlGone));
        }
        self.current += 1;
        Ok(Some(Transition::NextStep))
    }

    async fn modal_present(&mut self) -> Result<bool, AppError> {
        Ok(self.modal_open)
    }

    async fn dismiss_post_submit_dialog(&mut self) -> Result<bool, AppError> {
        if !self.post_submit_dialog {
            return Ok(false);
        }
        self.post_submit_dialog = false;
        self.events.push("dismiss".to_string());
        Ok(true)
    }

    async fn discard(&mut self) -> Result<(), AppError> {
        self.events.push("discard".to_string());
        if self.discard_fails {
            return Err(AppError::NoPrimaryAction);
        }
        Ok(())
    }
}

#[async_trait]
impl JobBoard for FakeWizard {
    async fn open_results(&mut self, url: &str) -> Result<(), AppError> {
        self.events.push(format!("results:{url}"));
        Ok(())
    }

    async fn jobs_on_page(&mut self) -> Result<Vec<Job>, AppError> {
        Ok(self.result_pages.pop_front().unwrap_or_default())
    }
}
