//! Quiz session state.
//!
//! A [`QuizSession`] owns everything one signed-in user works with: the
//! user context, the conversation id, the current quiz with its answer
//! sheet, and the single generation slot. Nothing here is global; callers
//! pass the session (and the service/store handles) explicitly.

use std::fmt;
use std::sync::{Arc, Weak};

use anyhow::Result;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::QuizError;
use crate::model::{AnswerSheet, Quiz, QuizId, Score};
use crate::parser::parse_quiz;
use crate::profile::increment_pdf_count;
use crate::scoring::score_sheet;
use crate::traits::{Document, GenerateRequest, ProfileStore, QuizService, SubmitRequest};

/// The signed-in user, as provided by the identity provider.
///
/// Note: Custom Debug impl masks the ID token.
#[derive(Clone)]
pub struct UserContext {
    pub uid: String,
    /// Bearer token sent with every service request.
    pub id_token: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl UserContext {
    pub fn new(uid: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            id_token: id_token.into(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("uid", &self.uid)
            .field("id_token", &"***")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Generation slot
// ---------------------------------------------------------------------------

/// Identifies one generation started in a [`GenerationSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    abort: AbortHandle,
    /// Alive while the owning [`PendingGeneration`] exists.
    claim: Weak<()>,
}

/// Holds at most one in-flight generation. Occupying the slot aborts
/// whatever was running in it.
#[derive(Debug, Default)]
pub struct GenerationSlot {
    issued: u64,
    in_flight: Option<InFlight>,
}

impl GenerationSlot {
    /// Put a new task in the slot, aborting the previous one. The slot
    /// counts as busy only while `claim` has a strong owner.
    pub fn occupy(&mut self, handle: AbortHandle, claim: &Arc<()>) -> Ticket {
        if let Some(previous) = self.in_flight.take() {
            tracing::debug!(ticket = previous.ticket.0, "superseding in-flight generation");
            previous.abort.abort();
        }
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.in_flight = Some(InFlight {
            ticket,
            abort: handle,
            claim: Arc::downgrade(claim),
        });
        ticket
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.live().is_some_and(|f| f.ticket == ticket)
    }

    fn live(&self) -> Option<&InFlight> {
        self.in_flight
            .as_ref()
            .filter(|f| f.claim.strong_count() > 0)
    }

    /// Empty the slot if `ticket` still owns it.
    pub fn release(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn is_busy(&self) -> bool {
        self.live().is_some()
    }

    /// Abort the in-flight generation, if any.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort.abort();
        }
    }
}

/// A generation started by [`QuizSession::start_generation`].
///
/// Dropping it without [`QuizSession::complete_generation`] aborts the task
/// and frees the session's slot.
#[derive(Debug)]
pub struct PendingGeneration {
    ticket: Ticket,
    handle: JoinHandle<Result<String>>,
    _claim: Arc<()>,
}

impl PendingGeneration {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

impl Drop for PendingGeneration {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's quiz workflow.
#[derive(Debug)]
pub struct QuizSession {
    user: UserContext,
    conversation_id: String,
    quiz: Option<Quiz>,
    sheet: Option<AnswerSheet>,
    slot: GenerationSlot,
}

impl QuizSession {
    pub fn new(user: UserContext, conversation_id: impl Into<String>) -> Self {
        Self {
            user,
            conversation_id: conversation_id.into(),
            quiz: None,
            sheet: None,
            slot: GenerationSlot::default(),
        }
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn answer_sheet(&self) -> Option<&AnswerSheet> {
        self.sheet.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.slot.is_busy()
    }

    /// Upload `document`, bump the user's PDF counter, and generate a quiz.
    ///
    /// A failing counter update is logged and does not stop the flow.
    pub async fn generate_from_document(
        &mut self,
        service: Arc<dyn QuizService>,
        store: Option<&dyn ProfileStore>,
        document: &Document,
        message: &str,
    ) -> Result<&Quiz> {
        service.upload(&self.conversation_id, document).await?;
        tracing::info!(
            conversation_id = %self.conversation_id,
            file = %document.file_name,
            "document uploaded"
        );

        if let Some(store) = store {
            match increment_pdf_count(store, &self.user.uid).await {
                Ok(Some(count)) => tracing::debug!(count, "pdf count incremented"),
                Ok(None) => tracing::debug!(uid = %self.user.uid, "no profile, pdf count skipped"),
                Err(e) => tracing::warn!("failed to increment pdf count: {e:#}"),
            }
        }

        let pending = self.start_generation(service, message);
        self.complete_generation(pending).await
    }

    /// Start a generation in the slot, superseding any in-flight one.
    pub fn start_generation(
        &mut self,
        service: Arc<dyn QuizService>,
        message: &str,
    ) -> PendingGeneration {
        let request = GenerateRequest {
            id: self.conversation_id.clone(),
            message: message.to_string(),
        };
        let handle = tokio::spawn(async move { service.generate(&request).await });
        let claim = Arc::new(());
        let ticket = self.slot.occupy(handle.abort_handle(), &claim);
        PendingGeneration {
            ticket,
            handle,
            _claim: claim,
        }
    }

    /// Wait for `pending` and install its quiz if it is still current.
    pub async fn complete_generation(&mut self, mut pending: PendingGeneration) -> Result<&Quiz> {
        let ticket = pending.ticket;

        let outcome = match (&mut pending.handle).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => return Err(QuizError::Superseded.into()),
            Err(e) => {
                self.slot.release(ticket);
                return Err(anyhow::anyhow!("generation task failed: {e}"));
            }
        };

        if !self.slot.release(ticket) {
            return Err(QuizError::Superseded.into());
        }

        let text = outcome?;
        Ok(self.install_reply(&text))
    }

    /// Parse a reply and replace the quiz and its answer sheet together.
    pub fn install_reply(&mut self, text: &str) -> &Quiz {
        let quiz = parse_quiz(text);
        if quiz.questions.is_empty() {
            tracing::warn!("generation reply contained no questions");
        }
        self.sheet = Some(quiz.answer_sheet());
        self.quiz.insert(quiz)
    }

    /// Record an answer for question `index` of quiz `quiz_id`.
    pub fn answer(&mut self, quiz_id: QuizId, index: usize, option: &str) -> Result<(), QuizError> {
        let (Some(quiz), Some(sheet)) = (self.quiz.as_ref(), self.sheet.as_mut()) else {
            return Err(QuizError::NoQuiz);
        };
        if quiz.id != quiz_id {
            return Err(QuizError::StaleAnswers {
                sheet: quiz_id,
                quiz: quiz.id,
            });
        }
        sheet.record(quiz, index, option)
    }

    pub fn score(&self) -> Result<Score, QuizError> {
        let (Some(quiz), Some(sheet)) = (self.quiz.as_ref(), self.sheet.as_ref()) else {
            return Err(QuizError::NoQuiz);
        };
        score_sheet(quiz, sheet)
    }

    /// Body for submitting the current answers to the service.
    pub fn submission(&self) -> Result<SubmitRequest, QuizError> {
        let sheet = self.sheet.as_ref().ok_or(QuizError::NoQuiz)?;
        Ok(SubmitRequest {
            id: self.conversation_id.clone(),
            answers: sheet.answers().clone(),
        })
    }

    /// Abort any in-flight generation.
    pub fn cancel_generation(&mut self) {
        self.slot.cancel();
    }
}
