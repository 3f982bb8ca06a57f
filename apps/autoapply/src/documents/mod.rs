//! Application documents for upload fields: generated cover letters, with the
//! configured static files as fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::render;
use crate::llm_client::TextGenerator;
use crate::models::{Job, Profile};

pub mod prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Upload inputs name what they want in their id.
    pub fn for_input(control_id: &str) -> Self {
        let id = control_id.to_lowercase();
        if id.contains("cover") || id.contains("motivation") {
            DocumentKind::CoverLetter
        } else {
            DocumentKind::Resume
        }
    }
}

#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn generate(&self, kind: DocumentKind, job: &Job) -> Result<PathBuf, AppError>;
}

/// Writes a generated cover letter to `<output_dir>/generated_documents/`.
pub struct CoverLetterWriter {
    generator: Arc<dyn TextGenerator>,
    profile: Profile,
    output_dir: PathBuf,
}

impl CoverLetterWriter {
    pub fn new(generator: Arc<dyn TextGenerator>, profile: Profile, output_dir: &Path) -> Self {
        Self {
            generator,
            profile,
            output_dir: output_dir.join("generated_documents"),
        }
    }
}

#[async_trait]
impl DocumentGenerator for CoverLetterWriter {
    async fn generate(&self, kind: DocumentKind, job: &Job) -> Result<PathBuf, AppError> {
        if kind != DocumentKind::CoverLetter {
            return Err(AppError::Internal(anyhow::anyhow!(
                "cover letter writer cannot produce {:?}",
                kind
            )));
        }

        let prompt = render(
            prompts::COVER_LETTER_TEMPLATE,
            &[
                ("profile", &self.profile.context_block()),
                ("job", &job.formatted_information()),
            ],
        );
        let letter = self.generator.complete(&prompt).await?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("cover_letter_{}.txt", Uuid::new_v4()));
        std::fs::write(&path, letter)?;
        info!("Generated cover letter for {} at {}", job, path.display());
        Ok(path)
    }
}

/// Decides which file an upload input receives.
pub struct DocumentPlanner {
    generator: Option<Arc<dyn DocumentGenerator>>,
    resume: Option<PathBuf>,
    cover_letter: Option<PathBuf>,
}

impl DocumentPlanner {
    pub fn new(
        generator: Option<Arc<dyn DocumentGenerator>>,
        resume: Option<PathBuf>,
        cover_letter: Option<PathBuf>,
    ) -> Self {
        Self {
            generator,
            resume,
            cover_letter,
        }
    }

    /// `None` leaves the upload untouched.
    pub async fn document_for(&self, control_id: &str, job: &Job) -> Option<PathBuf> {
        let kind = DocumentKind::for_input(control_id);
        if kind == DocumentKind::CoverLetter {
            if let Some(generator) = &self.generator {
                match generator.generate(kind, job).await {
                    Ok(path) => return Some(path),
                    Err(e) => warn!(
                        "Cover letter generation failed for {}, using static document: {}",
                        job, e
                    ),
                }
            }
        }
        match kind {
            DocumentKind::Resume => self.resume.clone(),
            DocumentKind::CoverLetter => self.cover_letter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::FakeGenerator;
    use crate::models::profile::sample_profile;
    use crate::models::ApplyMethod;

    fn job() -> Job {
        Job::new("Rust Engineer", "Acme", "Berlin", "https://example.com/1", ApplyMethod::QuickApply)
    }

    #[test]
    fn test_input_id_selects_document_kind() {
        assert_eq!(
            DocumentKind::for_input("jobs-document-upload-file-input-upload-cover-letter"),
            DocumentKind::CoverLetter
        );
        assert_eq!(DocumentKind::for_input("lettre-de-motivation"), DocumentKind::CoverLetter);
        assert_eq!(
            DocumentKind::for_input("jobs-document-upload-file-input-upload-resume"),
            DocumentKind::Resume
        );
    }

    #[tokio::test]
    async fn test_cover_letter_is_written_to_generated_documents() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenerator::new(&["Dear Acme team, ..."]));
        let writer = CoverLetterWriter::new(generator, sample_profile(), dir.path());

        let path = writer.generate(DocumentKind::CoverLetter, &job()).await.unwrap();
        assert!(path.starts_with(dir.path().join("generated_documents")));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("cover_letter_"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Dear Acme team, ...");
    }

    #[tokio::test]
    async fn test_planner_falls_back_to_static_document() {
        let dir = tempfile::tempdir().unwrap();
        let writer: Arc<dyn DocumentGenerator> = Arc::new(CoverLetterWriter::new(
            Arc::new(FakeGenerator::failing()),
            sample_profile(),
            dir.path(),
        ));
        let planner = DocumentPlanner::new(
            Some(writer),
            Some(PathBuf::from("/docs/resume.pdf")),
            Some(PathBuf::from("/docs/cover.pdf")),
        );

        assert_eq!(
            planner.document_for("upload-cover-letter", &job()).await,
            Some(PathBuf::from("/docs/cover.pdf"))
        );
        assert_eq!(
            planner.document_for("upload-resume", &job()).await,
            Some(PathBuf::from("/docs/resume.pdf"))
        );
    }

    #[tokio::test]
    async fn test_planner_without_documents_leaves_upload_alone() {
        let planner = DocumentPlanner::new(None, None, None);
        assert_eq!(planner.document_for("upload-resume", &job()).await, None);
    }
}
