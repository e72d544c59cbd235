//! Core trait definitions for the generation service and the profile store.
//!
//! These async traits are implemented by the `studyquiz-client` crate.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::model::AnswerMap;
use crate::profile::UserProfile;

// ---------------------------------------------------------------------------
// Generation service trait
// ---------------------------------------------------------------------------

/// Remote document-processing service that turns an uploaded document into
/// quiz text.
#[async_trait]
pub trait QuizService: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Upload a document for a conversation.
    async fn upload(&self, conversation_id: &str, document: &Document) -> anyhow::Result<()>;

    /// Ask the service to generate text for a conversation.
    ///
    /// Returns the raw `message` of a successful reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String>;

    /// Send the collected answers back to the service.
    async fn submit_answers(&self, request: &SubmitRequest) -> anyhow::Result<()>;
}

/// Default prompt used to ask for a quiz.
pub const DEFAULT_QUIZ_PROMPT: &str =
    "Generate a bunch of multiple-choice questions and their answers.";

/// Body of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Conversation identifier.
    pub id: String,
    /// Prompt text.
    pub message: String,
}

/// Body of an answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Conversation identifier.
    pub id: String,
    pub answers: AnswerMap,
}

/// Reply envelope shared by the generate and submit endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReply {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceReply {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// MIME type of the only accepted upload format.
pub const PDF_MIME: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A PDF document ready for upload.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name sent with the upload.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Build a document from bytes, rejecting anything that is not a PDF.
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Result<Self, ServiceError> {
        let has_pdf_extension = Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !has_pdf_extension {
            return Err(ServiceError::InvalidDocument(format!(
                "only PDF files are allowed: {file_name}"
            )));
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ServiceError::InvalidDocument(format!(
                "{file_name} does not look like a PDF"
            )));
        }
        Ok(Self {
            file_name: file_name.to_string(),
            bytes,
        })
    }

    /// Read and validate a PDF from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self::from_bytes(&file_name, bytes)?)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Format a byte count with two decimals and a binary unit.
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

// ---------------------------------------------------------------------------
// Profile store trait
// ---------------------------------------------------------------------------

/// Document store holding one [`UserProfile`] per user id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Backend name (e.g. "firestore").
    fn name(&self) -> &str;

    /// Fetch a profile, `None` if the user has no document yet.
    async fn get(&self, uid: &str) -> anyhow::Result<Option<UserProfile>>;

    /// Create or overwrite the profile document.
    async fn put(&self, profile: &UserProfile) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf() {
        let doc = Document::from_bytes("notes.PDF", b"%PDF-1.7\n...".to_vec()).unwrap();
        assert_eq!(doc.file_name, "notes.PDF");
        assert_eq!(doc.size(), 12);
    }

    #[test]
    fn rejects_wrong_extension() {
        let err = Document::from_bytes("notes.docx", b"%PDF-1.7".to_vec()).unwrap_err();
        assert!(err.to_string().contains("only PDF files are allowed"));
    }

    #[test]
    fn rejects_missing_magic() {
        let err = Document::from_bytes("fake.pdf", b"hello".to_vec()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidDocument(_)));
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0.00 bytes");
        assert_eq!(format_file_size(1023), "1023.00 bytes");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024u64.pow(5)), "3072.00 TB");
    }

    #[test]
    fn reply_success_flag() {
        let ok: ServiceReply =
            serde_json::from_str(r#"{"status":"success","message":"1. A?"}"#).unwrap();
        assert!(ok.is_success());
        let failed: ServiceReply = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert!(!failed.is_success());
        assert!(failed.message.is_empty());
    }

    #[test]
    fn submit_request_shape() {
        let mut answers = AnswerMap::new();
        answers.insert(1, "a) x".into());
        let body = SubmitRequest {
            id: "conv-1".into(),
            answers,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"id": "conv-1", "answers": {"1": "a) x"}})
        );
    }
}
