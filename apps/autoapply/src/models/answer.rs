use serde::{Deserialize, Serialize};

/// Question kinds that get cached answers. Stored lowercase in the answers file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Numeric,
    Dropdown,
    Radio,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Numeric => "numeric",
            QuestionType::Dropdown => "dropdown",
            QuestionType::Radio => "radio",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the answers file. Identity is `(question_type, lowercased question_text)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_type: QuestionType,
    pub question_text: String,
    pub answer: String,
}

impl AnsweredQuestion {
    pub fn new(question_type: QuestionType, question_text: &str, answer: &str) -> Self {
        Self {
            question_type,
            question_text: normalize_question(question_text),
            answer: answer.trim().to_string(),
        }
    }

    pub fn key(&self) -> (QuestionType, String) {
        (self.question_type, self.question_text.to_lowercase())
    }
}

/// Collapses whitespace and drops a trailing required-marker asterisk.
pub fn normalize_question(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches('*').trim_end().to_string()
}
