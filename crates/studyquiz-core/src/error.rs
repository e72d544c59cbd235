//! Error types shared across studyquiz crates.
//!
//! [`ServiceError`] lives here rather than in `studyquiz-client` so the
//! session can downcast failures from any [`QuizService`](crate::traits::QuizService)
//! implementation without string matching.

use thiserror::Error;

use crate::model::QuizId;

/// Errors raised by quiz state handling and scoring.
#[derive(Debug, Error)]
pub enum QuizError {
    /// No question in the quiz carries a correct answer.
    #[error("no scoreable questions")]
    NoScoreableQuestions,

    /// The answer sheet was created for a different quiz.
    #[error("answer sheet belongs to quiz {sheet}, current quiz is {quiz}")]
    StaleAnswers { sheet: QuizId, quiz: QuizId },

    #[error("question index {index} out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    /// A newer generation replaced this one before it completed.
    #[error("generation was superseded by a newer request")]
    Superseded,

    #[error("no quiz has been generated yet")]
    NoQuiz,

    /// No user id or ID token is available.
    #[error("not signed in: configure [user] uid and id_token, or set STUDYQUIZ_ID_TOKEN")]
    NotSignedIn,
}

/// Errors that can occur when talking to the generation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service rejected the ID token.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The service answered but reported a non-success status.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// The document is not an acceptable upload.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ServiceError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ServiceError::AuthenticationFailed(_) | ServiceError::InvalidDocument(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_classification() {
        assert!(ServiceError::AuthenticationFailed("bad token".into()).is_permanent());
        assert!(ServiceError::InvalidDocument("not a pdf".into()).is_permanent());
        assert!(!ServiceError::Timeout(30).is_permanent());
        assert!(!ServiceError::GenerationFailed("busy".into()).is_permanent());
    }

    #[test]
    fn no_scoreable_message() {
        assert_eq!(
            QuizError::NoScoreableQuestions.to_string(),
            "no scoreable questions"
        );
    }
}
