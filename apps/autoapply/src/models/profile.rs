use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

fn default_years() -> u32 {
    3
}

/// The applicant, as read from the `[profile]` table of the search config.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Dialling prefix without the plus sign, e.g. `49`.
    pub phone_country_code: String,
    pub city: String,
    pub country: String,
    #[serde(default = "default_years")]
    pub default_years_experience: u32,
    #[serde(default)]
    pub summary: String,
    /// Inline resume text. When empty, filled from the resume document at startup.
    #[serde(default)]
    pub resume_text: String,
}

impl Profile {
    /// Fills `resume_text` from `path` unless it was given inline.
    /// Extraction failures leave it empty.
    pub fn load_resume_text(&mut self, path: Option<&Path>) {
        if !self.resume_text.trim().is_empty() {
            return;
        }
        let Some(path) = path else {
            warn!("No resume text or resume document configured; answers will rely on profile fields only");
            return;
        };

        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        let extracted = if is_pdf {
            pdf_extract::extract_text(path).map_err(|e| e.to_string())
        } else {
            std::fs::read_to_string(path).map_err(|e| e.to_string())
        };

        match extracted {
            Ok(text) => {
                info!(
                    "Loaded {} chars of resume text from {}",
                    text.len(),
                    path.display()
                );
                self.resume_text = text;
            }
            Err(e) => warn!("Could not extract resume text from {}: {}", path.display(), e),
        }
    }

    /// Profile rendered for prompts.
    pub fn context_block(&self) -> String {
        let mut block = format!(
            "# Applicant\n\
             - Name: {}\n\
             - Email: {}\n\
             - Phone: +{} {}\n\
             - Location: {}, {}\n\
             - Default years of experience: {}\n",
            self.name,
            self.email,
            self.phone_country_code,
            self.phone,
            self.city,
            self.country,
            self.default_years_experience
        );
        if !self.summary.trim().is_empty() {
            block.push_str(&format!("\n## Summary\n{}\n", self.summary.trim()));
        }
        if !self.resume_text.trim().is_empty() {
            block.push_str(&format!("\n## Resume\n{}\n", self.resume_text.trim()));
        }
        block
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> Profile {
    Profile {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "15123456789".into(),
        phone_country_code: "49".into(),
        city: "Berlin".into(),
        country: "Germany".into(),
        default_years_experience: 3,
        summary: "Backend engineer.".into(),
        resume_text: String::new(),
    }
}
