pub mod classifier;
pub mod step;
pub mod surface;
pub mod typeahead;
pub mod view;

#[cfg(test)]
pub mod fake;

pub use classifier::{classify, ControlKind, FieldDescriptor};
pub use step::{FormStepDriver, StepReport};
pub use surface::{FieldAction, FormSurface};
