//! Core data model types for studyquiz.
//!
//! A [`Quiz`] is the structured form of one generation reply. Answers are
//! collected in an [`AnswerSheet`] that is bound to the quiz it was created
//! for, so answers from an earlier generation can never be scored against
//! a newer question list.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;

/// A single multiple-choice question parsed from a generation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question prompt.
    pub text: String,
    /// Answer choices in source order, each keeping its label (e.g. `"b) 4"`).
    #[serde(default)]
    pub options: Vec<String>,
    /// Full text of the correct option, when the reply labeled one.
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl Question {
    /// Whether this question counts towards the score denominator.
    pub fn is_scoreable(&self) -> bool {
        self.correct_answer.is_some()
    }
}

/// Identifier of one parse pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(Uuid);

impl QuizId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuizId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered list of questions from one generation reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Fresh for every parse, even of identical text.
    pub id: QuizId,
    /// Question order is the index space for answers.
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            id: QuizId::new(),
            questions,
        }
    }

    /// Number of questions that carry a correct answer.
    pub fn scoreable_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_scoreable()).count()
    }

    /// Create an empty answer sheet bound to this quiz.
    pub fn answer_sheet(&self) -> AnswerSheet {
        AnswerSheet::new(self.id)
    }
}

/// Sparse map from question index to the selected option text.
pub type AnswerMap = BTreeMap<usize, String>;

/// Answers collected for exactly one [`Quiz`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    quiz_id: QuizId,
    answers: AnswerMap,
}

impl AnswerSheet {
    pub fn new(quiz_id: QuizId) -> Self {
        Self {
            quiz_id,
            answers: AnswerMap::new(),
        }
    }

    /// Build a sheet from an existing answer map (e.g. loaded from disk).
    pub fn with_answers(quiz_id: QuizId, answers: AnswerMap) -> Self {
        Self { quiz_id, answers }
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// Record (or replace) the answer for question `index` of `quiz`.
    pub fn record(&mut self, quiz: &Quiz, index: usize, option: &str) -> Result<(), QuizError> {
        self.ensure_belongs_to(quiz)?;
        if index >= quiz.questions.len() {
            return Err(QuizError::QuestionOutOfRange {
                index,
                len: quiz.questions.len(),
            });
        }
        self.answers.insert(index, option.to_string());
        Ok(())
    }

    /// Fail with [`QuizError::StaleAnswers`] unless this sheet was made for `quiz`.
    pub fn ensure_belongs_to(&self, quiz: &Quiz) -> Result<(), QuizError> {
        if self.quiz_id != quiz.id {
            return Err(QuizError::StaleAnswers {
                sheet: self.quiz_id,
                quiz: quiz.id,
            });
        }
        Ok(())
    }
}

/// Result of scoring an answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Answers that matched the correct option exactly.
    pub correct: usize,
    /// Questions with a correct answer (the denominator).
    pub scoreable: usize,
    /// `correct / scoreable * 100`, rounded to one decimal place.
    pub percentage: f64,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% ({}/{} correct)",
            self.percentage, self.correct, self.scoreable
        )
    }
}

/// How an option is rendered once answers are revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    /// The option matches the correct answer.
    Correct,
    /// The user picked this option and it is not the correct one.
    WronglySelected,
    Unmarked,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> Quiz {
        Quiz::new(vec![
            Question {
                text: "What is 2+2?".into(),
                options: vec!["a) 3".into(), "b) 4".into()],
                correct_answer: Some("b) 4".into()),
            },
            Question {
                text: "Pick one".into(),
                options: vec!["a) x".into()],
                correct_answer: None,
            },
        ])
    }

    #[test]
    fn quiz_ids_are_unique() {
        assert_ne!(Quiz::new(vec![]).id, Quiz::new(vec![]).id);
    }

    #[test]
    fn scoreable_count_skips_unlabeled_questions() {
        assert_eq!(sample_quiz().scoreable_count(), 1);
    }

    #[test]
    fn record_answer_on_matching_quiz() {
        let quiz = sample_quiz();
        let mut sheet = quiz.answer_sheet();
        sheet.record(&quiz, 0, "b) 4").unwrap();
        sheet.record(&quiz, 0, "a) 3").unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get(0), Some("a) 3"));
    }

    #[test]
    fn record_rejects_stale_sheet() {
        let old = sample_quiz();
        let new = sample_quiz();
        let mut sheet = old.answer_sheet();
        let err = sheet.record(&new, 0, "b) 4").unwrap_err();
        assert!(matches!(err, QuizError::StaleAnswers { .. }));
        assert!(sheet.is_empty());
    }

    #[test]
    fn record_rejects_out_of_range_index() {
        let quiz = sample_quiz();
        let mut sheet = quiz.answer_sheet();
        let err = sheet.record(&quiz, 5, "a) x").unwrap_err();
        assert!(matches!(
            err,
            QuizError::QuestionOutOfRange { index: 5, len: 2 }
        ));
    }

    #[test]
    fn answer_map_serializes_with_string_keys() {
        let mut answers = AnswerMap::new();
        answers.insert(0, "b) 4".into());
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"0":"b) 4"}"#);
        let back: AnswerMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }

    #[test]
    fn score_display() {
        let score = Score {
            correct: 1,
            scoreable: 3,
            percentage: 33.3,
        };
        assert_eq!(score.to_string(), "33.3% (1/3 correct)");
    }
}
