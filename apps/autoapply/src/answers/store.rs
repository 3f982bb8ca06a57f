//! Durable cache of previously given answers, backed by a headerless
//! three-column CSV (`question_type,question_text,answer`).
//!
//! Read fully at startup, appended to during the run. Single writer, no locking.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::answers::placeholder::is_non_answer;
use crate::errors::AppError;
use crate::models::answer::normalize_question;
use crate::models::{AnsweredQuestion, QuestionType};

pub struct AnswerStore {
    path: PathBuf,
    entries: Vec<AnsweredQuestion>,
    keys: HashSet<(QuestionType, String)>,
}

impl AnswerStore {
    /// Loads `path` if it exists. Rows with an unknown type, the wrong arity or a
    /// placeholder answer are skipped with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let mut store = Self {
            path,
            entries: Vec::new(),
            keys: HashSet::new(),
        };
        if !store.path.exists() {
            info!(
                "No answers file at {}, starting with an empty cache",
                store.path.display()
            );
            return Ok(store);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&store.path)?;

        for row in reader.records() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping unreadable answers row: {}", e);
                    continue;
                }
            };
            if row.len() != 3 {
                continue;
            }
            let Some(question_type) = parse_type(&row[0]) else {
                warn!("Skipping answer with unknown type '{}'", &row[0]);
                continue;
            };
            if is_non_answer(&row[2]) {
                warn!(
                    "Skipping invalid saved answer '{}' for '{}'",
                    &row[2], &row[1]
                );
                continue;
            }
            store.insert(AnsweredQuestion::new(question_type, &row[1], &row[2]));
        }

        info!(
            "Loaded {} saved answers from {}",
            store.entries.len(),
            store.path.display()
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finds a stored answer of the same type whose question text is contained in
    /// `question_text`. With `options`, the answer must be one of them; the option's
    /// own spelling is returned.
    pub fn lookup(
        &self,
        question_type: QuestionType,
        question_text: &str,
        options: Option<&[String]>,
    ) -> Option<String> {
        let incoming = normalize_question(question_text).to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.question_type == question_type)
            .filter(|e| !e.question_text.is_empty())
            .filter(|e| incoming.contains(&e.question_text.to_lowercase()))
            .find_map(|e| match options {
                None => Some(e.answer.clone()),
                Some(opts) => opts
                    .iter()
                    .find(|o| o.trim().eq_ignore_ascii_case(&e.answer))
                    .cloned(),
            })
    }

    /// Appends a new answer. Returns `Ok(false)` when the key already exists
    /// (first write wins) or the answer is a placeholder.
    pub fn record(&mut self, answered: AnsweredQuestion) -> Result<bool, AppError> {
        if is_non_answer(&answered.answer) {
            warn!(
                "Refusing to store placeholder answer '{}' for '{}'",
                answered.answer, answered.question_text
            );
            return Ok(false);
        }
        if self.keys.contains(&answered.key()) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            answered.question_type.as_str(),
            answered.question_text.as_str(),
            answered.answer.as_str(),
        ])?;
        writer.flush()?;

        debug!(
            "Stored {} answer for '{}': '{}'",
            answered.question_type, answered.question_text, answered.answer
        );
        self.insert(answered);
        Ok(true)
    }

    fn insert(&mut self, answered: AnsweredQuestion) {
        if self.keys.insert(answered.key()) {
            self.entries.push(answered);
        }
    }
}

fn parse_type(raw: &str) -> Option<QuestionType> {
    match raw.trim().to_lowercase().as_str() {
        "text" | "textbox" => Some(QuestionType::Text),
        "numeric" => Some(QuestionType::Numeric),
        "dropdown" => Some(QuestionType::Dropdown),
        "radio" => Some(QuestionType::Radio),
        _ => None,
    }
}
