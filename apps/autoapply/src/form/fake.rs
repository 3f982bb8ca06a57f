//! Scripted in-memory form step. Applied actions are reflected back into the
//! views so later scans observe filled controls, as a live page would.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;

use crate::driver::{DriverError, ElementRef};
use crate::errors::AppError;
use crate::form::surface::{FieldAction, FormSurface};
use crate::form::view::{build, FieldView};

#[derive(Default)]
pub struct FakeForm {
    /// (reveal stage, view); a view is scanned once `revealed >= stage`.
    views: Vec<(usize, FieldView)>,
    revealed: usize,
    actions: Vec<FieldAction>,
    field_errors: HashMap<String, VecDeque<String>>,
    transient_failures: HashMap<String, u32>,
    unselectable: HashSet<String>,
    settle_errors: Vec<String>,
    mint_each_scan: bool,
    minted: usize,
    pub scans: usize,
    pub scrolls: usize,
    pub settles: usize,
}

impl FakeForm {
    pub fn new(views: Vec<FieldView>) -> Self {
        Self {
            views: views.into_iter().map(|v| (0, v)).collect(),
            ..Default::default()
        }
    }

    /// Adds a view that only renders after `stage` forward scrolls.
    pub fn reveal_after(mut self, stage: usize, view: FieldView) -> Self {
        self.views.push((stage, view));
        self
    }

    /// Queues validation messages for one container, returned one per check.
    pub fn field_error(mut self, container: &str, messages: &[&str]) -> Self {
        self.field_errors.insert(
            container.to_string(),
            messages.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// The next `times` actions on `control` fail with a stale reference.
    pub fn flaky(mut self, control: &str, times: u32) -> Self {
        self.transient_failures.insert(control.to_string(), times);
        self
    }

    /// Selecting any option on `control` finds no match.
    pub fn unselectable(mut self, control: &str) -> Self {
        self.unselectable.insert(control.to_string());
        self
    }

    pub fn settle_errors(mut self, messages: &[&str]) -> Self {
        self.settle_errors = messages.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Every scan renders one more never-seen field, so the step cannot converge.
    pub fn endless(mut self) -> Self {
        self.mint_each_scan = true;
        self
    }

    pub fn actions(&self) -> &[FieldAction] {
        &self.actions
    }

    pub fn view(&self, container: &str) -> Option<&FieldView> {
        self.views
            .iter()
            .map(|(_, v)| v)
            .find(|v| v.container.id == container)
    }

    fn target_of(action: &FieldAction) -> &ElementRef {
        match action {
            FieldAction::Type { control, .. }
            | FieldAction::TypeDate { control, .. }
            | FieldAction::Typeahead { control, .. }
            | FieldAction::Select { control, .. } => control,
            FieldAction::Click { target } => target,
            FieldAction::Upload { input, .. } => input,
        }
    }

    fn reflect(&mut self, action: &FieldAction) {
        for (_, view) in self.views.iter_mut() {
            match action {
                FieldAction::Type { control, text }
                | FieldAction::TypeDate { control, text }
                | FieldAction::Typeahead { control, text } => {
                    for field in view.inputs.iter_mut().chain(view.textareas.iter_mut()) {
                        if field.element == *control {
                            field.value = text.clone();
                        }
                    }
                }
                FieldAction::Select { control, option } => {
                    for select in view.selects.iter_mut() {
                        if select.element == *control {
                            select.selected = option.clone();
                        }
                    }
                }
                FieldAction::Click { target } => {
                    let Some(for_id) = view
                        .labels
                        .iter()
                        .find(|l| l.element == *target)
                        .and_then(|l| l.for_id.clone())
                    else {
                        continue;
                    };
                    let is_radio = view
                        .inputs
                        .iter()
                        .any(|i| i.id == for_id && i.is_type("radio"));
                    for input in view.inputs.iter_mut() {
                        if input.id == for_id {
                            input.checked = true;
                        } else if is_radio && input.is_type("radio") {
                            input.checked = false;
                        }
                    }
                }
                FieldAction::Upload { input, path } => {
                    for field in view.inputs.iter_mut() {
                        if field.element == *input {
                            field.value = path.display().to_string();
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl FormSurface for FakeForm {
    async fn scan(&mut self) -> Result<Vec<FieldView>, AppError> {
        self.scans += 1;
        if self.mint_each_scan {
            self.minted += 1;
            let key = format!("minted-{}", self.minted);
            self.views
                .push((0, build::text_field(&key, &format!("Question {}", self.minted), "")));
        }
        Ok(self
            .views
            .iter()
            .filter(|(stage, _)| *stage <= self.revealed)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn apply(&mut self, action: &FieldAction) -> Result<(), AppError> {
        let target = Self::target_of(action).id.clone();
        if let Some(left) = self.transient_failures.get_mut(&target) {
            if *left > 0 {
                *left -= 1;
                return Err(DriverError::StaleElement.into());
            }
        }
        if let FieldAction::Select { option, .. } = action {
            if self.unselectable.contains(&target) {
                return Err(AppError::OptionUnavailable(option.clone()));
            }
        }
        self.actions.push(action.clone());
        self.reflect(action);
        Ok(())
    }

    async fn field_error(&mut self, container: &ElementRef) -> Result<Option<String>, AppError> {
        Ok(self
            .field_errors
            .get_mut(&container.id)
            .and_then(|queue| queue.pop_front()))
    }

    async fn scroll_forward(&mut self) -> Result<(), AppError> {
        self.scrolls += 1;
        self.revealed += 1;
        Ok(())
    }

    async fn settle(&mut self) -> Result<(), AppError> {
        self.settles += 1;
        Ok(())
    }

    async fn active_errors(&mut self) -> Result<Vec<String>, AppError> {
        Ok(self.settle_errors.clone())
    }
}
