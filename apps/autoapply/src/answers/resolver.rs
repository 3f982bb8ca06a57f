use std::sync::Arc;

use tracing::{debug, warn};

use crate::answers::heuristics::{context_heuristic, contains_word};
use crate::answers::numeric::{extract_number, parse_range};
use crate::answers::placeholder::{is_empty_answer, is_non_answer, is_placeholder_option};
use crate::answers::prompts::{
    option_list, NUMERIC_QUESTION_TEMPLATE, NUMERIC_RANGE_TEMPLATE, OPTIONS_QUESTION_TEMPLATE,
    TEXT_QUESTION_TEMPLATE,
};
use crate::answers::store::AnswerStore;
use crate::llm_client::prompts::{render, SHORT_ANSWER_INSTRUCTION};
use crate::llm_client::TextGenerator;
use crate::models::{AnsweredQuestion, Job, Profile, QuestionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Cache,
    Heuristic,
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub answer: String,
    pub source: AnswerSource,
}

impl Resolved {
    fn new(answer: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            answer: answer.into(),
            source,
        }
    }

    /// Only generated answers are candidates for the answer store.
    pub fn was_generated(&self) -> bool {
        self.source == AnswerSource::Generated
    }
}

/// Produces answers through the chain cache → profile heuristic → generator → static default.
pub struct AnswerResolver {
    store: AnswerStore,
    generator: Arc<dyn TextGenerator>,
    profile: Profile,
    job_context: String,
}

impl AnswerResolver {
    pub fn new(store: AnswerStore, generator: Arc<dyn TextGenerator>, profile: Profile) -> Self {
        Self {
            store,
            generator,
            profile,
            job_context: String::new(),
        }
    }

    /// Sets the job the following questions belong to.
    pub fn begin_job(&mut self, job: &Job) {
        self.job_context = job.formatted_information();
    }

    /// Never fails: generation errors fall through to the static default.
    pub async fn resolve(
        &mut self,
        question_type: QuestionType,
        question: &str,
        options: Option<&[String]>,
    ) -> Resolved {
        if let Some(answer) = self.store.lookup(question_type, question, options) {
            debug!("Cache hit for {} question '{}': '{}'", question_type, question, answer);
            return Resolved::new(answer, AnswerSource::Cache);
        }

        if question_type == QuestionType::Dropdown {
            if let Some(opts) = options {
                if let Some(answer) = context_heuristic(question, opts, &self.profile) {
                    debug!("Profile match for '{}': '{}'", question, answer);
                    return Resolved::new(answer, AnswerSource::Heuristic);
                }
            }
        }

        // Free text only has to say something; placeholder wording is filtered at persistence.
        let free_text =
            question_type != QuestionType::Numeric && options.map_or(true, |o| o.is_empty());
        let rejects = |answer: &str| {
            if free_text {
                is_empty_answer(answer)
            } else {
                is_non_answer(answer)
            }
        };

        match self.generate(question_type, question, options).await {
            Some(answer) if !rejects(&answer) => {
                debug!(
                    "Generated {} answer for '{}': '{}'",
                    question_type, question, answer
                );
                Resolved::new(answer, AnswerSource::Generated)
            }
            Some(rejected) => {
                warn!(
                    "Rejected non-answer '{}' for {} question '{}'",
                    rejected, question_type, question
                );
                Resolved::new(static_fallback(question_type, options), AnswerSource::Fallback)
            }
            None => Resolved::new(static_fallback(question_type, options), AnswerSource::Fallback),
        }
    }

    async fn generate(
        &self,
        question_type: QuestionType,
        question: &str,
        options: Option<&[String]>,
    ) -> Option<String> {
        let profile = self.profile.context_block();
        let prompt = match (question_type, options) {
            (QuestionType::Numeric, _) => render(
                NUMERIC_QUESTION_TEMPLATE,
                &[
                    ("profile", &profile),
                    ("question", question),
                    ("default", &self.profile.default_years_experience.to_string()),
                ],
            ),
            (_, Some(opts)) if !opts.is_empty() => render(
                OPTIONS_QUESTION_TEMPLATE,
                &[
                    ("profile", &profile),
                    ("job", &self.job_context),
                    ("question", question),
                    ("options", &option_list(&answerable(opts))),
                ],
            ),
            _ => render(
                TEXT_QUESTION_TEMPLATE,
                &[
                    ("profile", &profile),
                    ("job", &self.job_context),
                    ("question", question),
                    ("short", SHORT_ANSWER_INSTRUCTION),
                ],
            ),
        };

        let reply = match self.generator.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    "Text generation failed for {} question '{}': {}",
                    question_type, question, e
                );
                return None;
            }
        };

        match (question_type, options) {
            (QuestionType::Numeric, _) => Some(
                extract_number(&reply, self.profile.default_years_experience as i64).to_string(),
            ),
            (_, Some(opts)) if !opts.is_empty() => snap_to_option(&reply, &answerable(opts)),
            _ => Some(reply.trim().to_string()),
        }
    }

    /// Asks the generator which range a rejected numeric answer must fall into.
    /// The validation message itself is parsed when generation fails.
    pub async fn suggest_range(&self, question: &str, answer: &str, error: &str) -> (i64, i64) {
        let prompt = render(
            NUMERIC_RANGE_TEMPLATE,
            &[("question", question), ("answer", answer), ("error", error)],
        );
        match self.generator.complete(&prompt).await {
            Ok(reply) => parse_range(&reply),
            Err(e) => {
                warn!("Range suggestion failed for '{}': {}", question, e);
                parse_range(error)
            }
        }
    }

    /// Persists an accepted generated answer. Storage failures are logged, not raised.
    pub fn remember(&mut self, question_type: QuestionType, question: &str, answer: &str) -> bool {
        match self
            .store
            .record(AnsweredQuestion::new(question_type, question, answer))
        {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Could not persist answer for '{}': {}", question, e);
                false
            }
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &AnswerStore {
        &self.store
    }
}

/// Options minus placeholders; all options when nothing else is left.
fn answerable(options: &[String]) -> Vec<String> {
    let real: Vec<String> = options
        .iter()
        .filter(|o| !is_placeholder_option(o))
        .cloned()
        .collect();
    if real.is_empty() {
        options.to_vec()
    } else {
        real
    }
}

/// Maps free text onto the closest option: exact match, then a single contained
/// option, then smallest edit distance. Case-insensitive throughout.
pub fn snap_to_option(text: &str, options: &[String]) -> Option<String> {
    let needle = text.trim().to_lowercase();
    let lowered: Vec<String> = options.iter().map(|o| o.trim().to_lowercase()).collect();

    if let Some(idx) = lowered.iter().position(|o| *o == needle) {
        return Some(options[idx].clone());
    }

    let contained: Vec<usize> = lowered
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.is_empty() && contains_word(&needle, o))
        .map(|(i, _)| i)
        .collect();
    if let [only] = contained.as_slice() {
        return Some(options[*only].clone());
    }

    lowered
        .iter()
        .enumerate()
        .min_by_key(|(_, o)| strsim::levenshtein(&needle, o))
        .map(|(i, _)| options[i].clone())
}

fn static_fallback(question_type: QuestionType, options: Option<&[String]>) -> String {
    match (question_type, options) {
        (QuestionType::Numeric, _) => "0".to_string(),
        (_, Some(opts)) if !opts.is_empty() => opts
            .iter()
            .find(|o| !is_placeholder_option(o))
            .unwrap_or(&opts[0])
            .clone(),
        _ => "N/A".to_string(),
    }
}
