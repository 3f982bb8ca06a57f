//! Append-only JSONL record of every completion: model, prompt, reply, tokens and cost.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::llm_client::Usage;

/// USD per input / output token for [`super::MODEL`].
const INPUT_TOKEN_COST: f64 = 0.000003;
const OUTPUT_TOKEN_COST: f64 = 0.000015;

#[derive(Debug, Serialize)]
pub struct CallRecord<'a> {
    pub model: &'a str,
    pub time: String,
    pub prompt: &'a str,
    pub reply: &'a str,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub total_cost: f64,
}

impl<'a> CallRecord<'a> {
    pub fn new(model: &'a str, prompt: &'a str, reply: &'a str, usage: &Usage) -> Self {
        let total_cost = usage.input_tokens as f64 * INPUT_TOKEN_COST
            + usage.output_tokens as f64 * OUTPUT_TOKEN_COST;
        Self {
            model,
            time: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            prompt,
            reply,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
            total_cost,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsageLog {
    path: PathBuf,
}

impl UsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write failures are logged and swallowed; the completion itself already succeeded.
    pub fn append(&self, record: &CallRecord<'_>) {
        if let Err(e) = self.try_append(record) {
            warn!(
                "Failed to append LLM call record to {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn try_append(&self, record: &CallRecord<'_>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
