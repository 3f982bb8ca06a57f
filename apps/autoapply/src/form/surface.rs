use std::path::PathBuf;

use async_trait::async_trait;

use crate::driver::ElementRef;
use crate::errors::AppError;
use crate::form::view::FieldView;

/// A mutation of one live control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    /// Clear, type, then tab out so the page validates the field.
    Type { control: ElementRef, text: String },
    /// Clear, type, then Enter to close the calendar popup.
    TypeDate { control: ElementRef, text: String },
    /// Type and pick the first autocomplete suggestion.
    Typeahead { control: ElementRef, text: String },
    /// Select the option with this visible text, then fire change/blur.
    Select { control: ElementRef, option: String },
    /// Scroll-into-view and script click (choice labels, consent labels).
    Click { target: ElementRef },
    /// Send a file path to a file input, then fire change/blur.
    Upload { input: ElementRef, path: PathBuf },
}

impl FieldAction {
    pub fn describe(&self) -> String {
        match self {
            FieldAction::Type { text, .. } => format!("type '{text}'"),
            FieldAction::TypeDate { text, .. } => format!("date '{text}'"),
            FieldAction::Typeahead { text, .. } => format!("typeahead '{text}'"),
            FieldAction::Select { option, .. } => format!("select '{option}'"),
            FieldAction::Click { target } => format!("click {}", target.id),
            FieldAction::Upload { path, .. } => format!("upload {}", path.display()),
        }
    }
}

/// What the form-step driver needs from the page for one wizard step.
#[async_trait]
pub trait FormSurface: Send {
    /// Field containers currently rendered in the step, including bare upload blocks.
    async fn scan(&mut self) -> Result<Vec<FieldView>, AppError>;

    async fn apply(&mut self, action: &FieldAction) -> Result<(), AppError>;

    /// Active error message rendered inside `container`, if any.
    async fn field_error(&mut self, container: &ElementRef) -> Result<Option<String>, AppError>;

    /// Scrolls the step forward by one increment so virtualized fields render.
    async fn scroll_forward(&mut self) -> Result<(), AppError>;

    /// Scrolls to the end of the step and moves focus away to trigger validation.
    async fn settle(&mut self) -> Result<(), AppError>;

    /// Visible, non-empty validation messages anywhere in the step.
    async fn active_errors(&mut self) -> Result<Vec<String>, AppError>;
}
