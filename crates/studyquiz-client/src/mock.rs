//! Mock generation service for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use studyquiz_core::error::ServiceError;
use studyquiz_core::traits::{Document, GenerateRequest, QuizService, SubmitRequest};

/// A mock service for driving sessions without a real backend.
///
/// Generation replies are chosen by conversation id, falling back to a
/// default reply.
pub struct MockQuizService {
    /// Map of conversation id → reply text.
    replies: HashMap<String, String>,
    default_reply: String,
    /// Conversation ids that have an uploaded document.
    uploads: Mutex<Vec<String>>,
    /// Number of generate calls made.
    generate_calls: AtomicU32,
    submissions: Mutex<Vec<SubmitRequest>>,
    require_upload: bool,
}

impl MockQuizService {
    pub fn new(replies: HashMap<String, String>) -> Self {
        Self {
            replies,
            default_reply: String::new(),
            uploads: Mutex::new(Vec::new()),
            generate_calls: AtomicU32::new(0),
            submissions: Mutex::new(Vec::new()),
            require_upload: false,
        }
    }

    /// Create a mock that always replies with the same text.
    pub fn with_fixed_reply(reply: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_reply = reply.to_string();
        mock
    }

    /// Fail generation for conversations without an uploaded document.
    pub fn requiring_upload(mut self) -> Self {
        self.require_upload = true;
        self
    }

    pub fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::Relaxed)
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizService for MockQuizService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, conversation_id: &str, _document: &Document) -> anyhow::Result<()> {
        self.uploads
            .lock()
            .unwrap()
            .push(conversation_id.to_string());
        Ok(())
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);

        if self.require_upload && !self.uploads.lock().unwrap().contains(&request.id) {
            return Err(ServiceError::GenerationFailed(format!(
                "no document uploaded for conversation {}",
                request.id
            ))
            .into());
        }

        Ok(self
            .replies
            .get(&request.id)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone()))
    }

    async fn submit_answers(&self, request: &SubmitRequest) -> anyhow::Result<()> {
        self.submissions.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use studyquiz_core::session::{QuizSession, UserContext};
    use studyquiz_core::traits::DEFAULT_QUIZ_PROMPT;

    const REPLY: &str = "1. What is 2+2?\na) 3\nb) 4\nc) 5\nCorrect: b) 4\n\n2. Pick a color\na) red\nb) blue\n";

    fn pdf() -> Document {
        Document::from_bytes("notes.pdf", b"%PDF-1.5".to_vec()).unwrap()
    }

    #[tokio::test]
    async fn replies_by_conversation() {
        let mut replies = HashMap::new();
        replies.insert("math".to_string(), "1. Math?\na) yes".to_string());
        let service = MockQuizService::new(replies);

        let reply = service
            .generate(&GenerateRequest {
                id: "math".into(),
                message: DEFAULT_QUIZ_PROMPT.into(),
            })
            .await
            .unwrap();
        assert!(reply.starts_with("1. Math?"));

        let other = service
            .generate(&GenerateRequest {
                id: "history".into(),
                message: DEFAULT_QUIZ_PROMPT.into(),
            })
            .await
            .unwrap();
        assert!(other.is_empty());
        assert_eq!(service.generate_calls(), 2);
    }

    #[tokio::test]
    async fn generation_requires_upload_when_configured() {
        let service = MockQuizService::with_fixed_reply(REPLY).requiring_upload();
        let request = GenerateRequest {
            id: "conv-1".into(),
            message: "x".into(),
        };
        assert!(service.generate(&request).await.is_err());

        service.upload("conv-1", &pdf()).await.unwrap();
        assert_eq!(service.generate(&request).await.unwrap(), REPLY);
    }

    #[tokio::test]
    async fn full_session_flow() {
        let service = Arc::new(MockQuizService::with_fixed_reply(REPLY).requiring_upload());
        let mut session = QuizSession::new(UserContext::new("uid-1", "tok"), "conv-1");

        let quiz_id = session
            .generate_from_document(service.clone(), None, &pdf(), DEFAULT_QUIZ_PROMPT)
            .await
            .unwrap()
            .id;
        assert_eq!(session.quiz().unwrap().questions.len(), 2);

        session.answer(quiz_id, 0, "b) 4").unwrap();
        session.answer(quiz_id, 1, "a) red").unwrap();
        let score = session.score().unwrap();
        assert_eq!(score.scoreable, 1);
        assert_eq!(score.percentage, 100.0);

        service
            .submit_answers(&session.submission().unwrap())
            .await
            .unwrap();
        assert_eq!(service.uploads(), vec!["conv-1"]);
        assert_eq!(service.submissions()[0].answers.len(), 2);
    }
}
