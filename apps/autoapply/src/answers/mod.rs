//! Answer cache and resolution chain for form questions.

pub mod heuristics;
pub mod numeric;
pub mod placeholder;
pub mod prompts;
pub mod resolver;
pub mod store;

pub use resolver::{AnswerResolver, AnswerSource, Resolved};
pub use store::AnswerStore;
