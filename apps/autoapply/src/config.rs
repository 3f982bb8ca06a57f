use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Profile;

/// Runtime configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub email: String,
    pub password: String,
    pub webdriver_url: String,
    pub search_config: PathBuf,
    pub output_dir: PathBuf,
    pub answers_file: PathBuf,
    pub llm_call_log: PathBuf,
    pub headless: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let email = require("APPLY_EMAIL")?;
        if !is_valid_email(&email) {
            return Err(AppError::Config(format!("APPLY_EMAIL '{email}' is not a valid email")).into());
        }

        let output_dir = PathBuf::from(get("OUTPUT_DIR").unwrap_or_else(|| "data/output".to_string()));
        let headless = match get("HEADLESS") {
            None => false,
            Some(raw) => raw
                .trim()
                .to_lowercase()
                .parse::<bool>()
                .context("HEADLESS must be true or false")?,
        };

        Ok(Config {
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            password: require("APPLY_PASSWORD")?,
            email,
            webdriver_url: get("WEBDRIVER_URL")
                .unwrap_or_else(|| "http://localhost:9515".to_string()),
            search_config: PathBuf::from(
                get("SEARCH_CONFIG").unwrap_or_else(|| "data/search.toml".to_string()),
            ),
            answers_file: get("ANSWERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| output_dir.join("old_questions.csv")),
            llm_call_log: get("LLM_CALL_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| output_dir.join("llm_calls.jsonl")),
            output_dir,
            headless,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

const ALLOWED_DISTANCES: [u32; 6] = [0, 5, 10, 25, 50, 100];

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email) && !email.contains("..")
}

/// Experience-level filters, in the order the site numbers them (1-based).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExperienceLevels {
    pub internship: bool,
    pub entry: bool,
    pub associate: bool,
    pub mid_senior: bool,
    pub director: bool,
    pub executive: bool,
}

impl ExperienceLevels {
    pub fn enabled_codes(&self) -> Vec<String> {
        [
            self.internship,
            self.entry,
            self.associate,
            self.mid_senior,
            self.director,
            self.executive,
        ]
        .iter()
        .enumerate()
        .filter(|(_, on)| **on)
        .map(|(i, _)| (i + 1).to_string())
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobTypes {
    pub full_time: bool,
    pub contract: bool,
    pub part_time: bool,
    pub temporary: bool,
    pub internship: bool,
    pub other: bool,
    pub volunteer: bool,
}

impl JobTypes {
    /// The site keys job types by the upper-cased first letter of their name.
    pub fn enabled_codes(&self) -> Vec<String> {
        [
            ("full_time", self.full_time),
            ("contract", self.contract),
            ("part_time", self.part_time),
            ("temporary", self.temporary),
            ("internship", self.internship),
            ("other", self.other),
            ("volunteer", self.volunteer),
        ]
        .iter()
        .filter(|(_, on)| *on)
        .filter_map(|(name, _)| name.chars().next())
        .map(|c| c.to_ascii_uppercase().to_string())
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePosted {
    #[default]
    AllTime,
    Month,
    Week,
    Day,
}

impl DatePosted {
    /// Query suffix for the posting-date filter. Empty for `AllTime`.
    pub fn filter(self) -> &'static str {
        match self {
            DatePosted::AllTime => "",
            DatePosted::Month => "&f_TPR=r2592000",
            DatePosted::Week => "&f_TPR=r604800",
            DatePosted::Day => "&f_TPR=r86400",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Uploads {
    pub resume: Option<PathBuf>,
    pub cover_letter: Option<PathBuf>,
}

fn default_distance() -> u32 {
    25
}

/// Search parameters, applicant profile and static uploads (`search.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub remote: bool,
    #[serde(default = "default_distance")]
    pub distance: u32,
    #[serde(default)]
    pub experience_level: ExperienceLevels,
    #[serde(default)]
    pub job_types: JobTypes,
    #[serde(default)]
    pub date: DatePosted,
    pub positions: Vec<String>,
    pub locations: Vec<String>,
    #[serde(default)]
    pub company_blacklist: Vec<String>,
    #[serde(default)]
    pub title_blacklist: Vec<String>,
    pub profile: Profile,
    #[serde(default)]
    pub uploads: Uploads,
}

impl SearchConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read search config {}: {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let config: SearchConfig =
            toml::from_str(raw).map_err(|e| AppError::Config(format!("invalid search config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if !ALLOWED_DISTANCES.contains(&self.distance) {
            return Err(AppError::Config(format!(
                "distance must be one of {:?}, got {}",
                ALLOWED_DISTANCES, self.distance
            )));
        }
        if self.positions.iter().all(|p| p.trim().is_empty()) {
            return Err(AppError::Config("positions must not be empty".into()));
        }
        if self.locations.iter().all(|l| l.trim().is_empty()) {
            return Err(AppError::Config("locations must not be empty".into()));
        }
        if !is_valid_email(&self.profile.email) {
            return Err(AppError::Config(format!(
                "profile email '{}' is not valid",
                self.profile.email
            )));
        }
        Ok(())
    }
}
