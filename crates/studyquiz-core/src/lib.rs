//! studyquiz-core: Quiz parsing, scoring, and session state.
//!
//! This crate defines the data model, the reply parser and scorer, the
//! per-user profile counters, and the async traits that the
//! `studyquiz-client` crate implements.

pub mod error;
pub mod model;
pub mod parser;
pub mod profile;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::{QuizError, ServiceError};
pub use model::{AnswerMap, AnswerSheet, OptionMark, Question, Quiz, QuizId, Score};
pub use parser::{parse_questions, parse_quiz};
pub use scoring::{mark_options, score, score_sheet};
pub use session::{QuizSession, UserContext};
