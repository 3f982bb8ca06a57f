pub mod answer;
pub mod job;
pub mod profile;

pub use answer::{AnsweredQuestion, QuestionType};
pub use job::{ApplyMethod, Job};
pub use profile::Profile;
