use serde::{Deserialize, Serialize};

/// How a listing says it can be applied to, read from the tile footer text.
/// Best-effort: footer wording drifts, so misclassification is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyMethod {
    QuickApply,
    External,
    Applied,
    Unknown,
}

impl ApplyMethod {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("easy apply") {
            ApplyMethod::QuickApply
        } else if label.starts_with("applied") {
            ApplyMethod::Applied
        } else if label == "apply" || label == "continue" {
            ApplyMethod::External
        } else {
            ApplyMethod::Unknown
        }
    }

    /// Unknown listings are attempted; the wizard skips them if no quick-apply button exists.
    pub fn is_automatable(self) -> bool {
        matches!(self, ApplyMethod::QuickApply | ApplyMethod::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplyMethod::QuickApply => "Easy Apply",
            ApplyMethod::External => "External",
            ApplyMethod::Applied => "Applied",
            ApplyMethod::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub apply_method: ApplyMethod,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_summary: String,
}

const SUMMARY_CHARS: usize = 100;

impl Job {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        link: impl Into<String>,
        apply_method: ApplyMethod,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            link: link.into(),
            apply_method,
            description: String::new(),
            description_summary: String::new(),
        }
    }

    /// Populated once the detail pane has been read.
    pub fn set_description(&mut self, description: String) {
        self.description_summary = description.chars().take(SUMMARY_CHARS).collect();
        self.description = description;
    }

    /// Fallback dedup key for listings whose link changes between pages.
    pub fn unique_identifier(&self) -> String {
        format!("{}_{}_{}", self.company, self.title, self.location)
            .replace(' ', "_")
            .to_lowercase()
    }

    /// Markdown block describing the job, used inside prompts.
    pub fn formatted_information(&self) -> String {
        let description = if self.description.is_empty() {
            "No description provided."
        } else {
            &self.description
        };
        format!(
            "# Job Description\n\
             ## Job Information\n\
             - Position: {}\n\
             - At: {}\n\
             - Location: {}\n\
             - Apply Method: {}\n\
             - URL: {}\n\n\
             ## Description\n{}",
            self.title,
            self.company,
            self.location,
            self.apply_method.as_str(),
            self.link,
            description
        )
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {} ({})", self.title, self.company, self.location)
    }
}
