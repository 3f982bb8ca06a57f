//! Scripted [`TextGenerator`] for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{LlmError, TextGenerator};

/// Replies in order; once the script runs out, every call returns the fallback reply.
pub struct FakeGenerator {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            fallback: String::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: &str) -> Self {
        let mut fake = Self::new(&[]);
        fake.fallback = reply.to_string();
        fake
    }

    pub fn failing() -> Self {
        let fake = Self::new(&[]);
        fake.replies
            .lock()
            .unwrap()
            .push_back(Err(LlmError::EmptyContent));
        fake
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None if self.fallback.is_empty() => Err(LlmError::EmptyContent),
            None => Ok(self.fallback.clone()),
        }
    }
}
