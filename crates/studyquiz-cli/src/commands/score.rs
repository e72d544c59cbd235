//! The `studyquiz score` command.

use std::path::PathBuf;

use anyhow::Result;

use studyquiz_core::error::QuizError;
use studyquiz_core::model::AnswerSheet;
use studyquiz_core::parser::parse_quiz;
use studyquiz_core::scoring::score_sheet;

use crate::render::{load_answers, print_no_scoreable, print_questions, print_score, read_text};

pub fn execute(input: PathBuf, answers_path: PathBuf, json: bool) -> Result<()> {
    let quiz = parse_quiz(&read_text(&input)?);
    let answers = load_answers(&answers_path)?;

    let out_of_range: Vec<usize> = answers
        .keys()
        .copied()
        .filter(|&i| i >= quiz.questions.len())
        .collect();
    if !out_of_range.is_empty() {
        tracing::warn!(
            ?out_of_range,
            questions = quiz.questions.len(),
            "ignoring answers for questions that do not exist"
        );
    }

    let sheet = AnswerSheet::with_answers(quiz.id, answers);
    let outcome = score_sheet(&quiz, &sheet);

    if json {
        let value = match outcome {
            Ok(score) => serde_json::to_value(score)?,
            Err(QuizError::NoScoreableQuestions) => {
                serde_json::json!({ "error": "no scoreable questions" })
            }
            Err(e) => return Err(e.into()),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_questions(&quiz.questions, sheet.answers(), true);

    match outcome {
        Ok(score) => print_score(&score, sheet.len(), quiz.questions.len()),
        Err(QuizError::NoScoreableQuestions) => print_no_scoreable(quiz.questions.len()),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
