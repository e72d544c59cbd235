//! Answer scoring and per-option correctness marks.

use crate::error::QuizError;
use crate::model::{AnswerMap, AnswerSheet, OptionMark, Question, Quiz, Score};

/// Score an answer map against a question list.
///
/// The denominator is the number of questions with a correct answer; an
/// answer counts when it equals that question's correct answer exactly.
/// Answers to unscoreable or missing questions are ignored.
pub fn score(questions: &[Question], answers: &AnswerMap) -> Result<Score, QuizError> {
    let scoreable = questions.iter().filter(|q| q.is_scoreable()).count();
    if scoreable == 0 {
        return Err(QuizError::NoScoreableQuestions);
    }

    let correct = answers
        .iter()
        .filter(|(index, answer)| {
            questions
                .get(**index)
                .and_then(|q| q.correct_answer.as_deref())
                .is_some_and(|expected| expected == answer.as_str())
        })
        .count();

    Ok(Score {
        correct,
        scoreable,
        percentage: round_one_decimal(correct as f64 / scoreable as f64 * 100.0),
    })
}

/// Score a sheet against the quiz it was created for.
pub fn score_sheet(quiz: &Quiz, sheet: &AnswerSheet) -> Result<Score, QuizError> {
    sheet.ensure_belongs_to(quiz)?;
    score(&quiz.questions, sheet.answers())
}

/// Mark every option of `question` given the user's selection.
pub fn mark_options<'a>(
    question: &'a Question,
    selected: Option<&str>,
) -> Vec<(&'a str, OptionMark)> {
    let expected = question.correct_answer.as_deref().map(str::trim);

    question
        .options
        .iter()
        .map(|option| {
            let is_correct = expected.is_some_and(|e| e == option.trim());
            let mark = if is_correct {
                OptionMark::Correct
            } else if selected == Some(option.as_str()) {
                OptionMark::WronglySelected
            } else {
                OptionMark::Unmarked
            };
            (option.as_str(), mark)
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_questions;

    const TWO_PLUS_TWO: &str = "1. What is 2+2?\na) 3\nb) 4\nc) 5\nCorrect: b) 4";

    fn answers(pairs: &[(usize, &str)]) -> AnswerMap {
        pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
    }

    #[test]
    fn correct_answer_scores_full_marks() {
        let questions = parse_questions(TWO_PLUS_TWO);
        let s = score(&questions, &answers(&[(0, "b) 4")])).unwrap();
        assert_eq!(s.percentage, 100.0);
        assert_eq!(s.correct, 1);
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let questions = parse_questions(TWO_PLUS_TWO);
        let s = score(&questions, &answers(&[(0, "a) 3")])).unwrap();
        assert_eq!(s.percentage, 0.0);
    }

    #[test]
    fn unscoreable_question_is_excluded_from_denominator() {
        let questions = parse_questions(
            "1. A?\na) x\nb) y\nCorrect: a) x\n2. B?\na) p\nb) q\n",
        );
        for second in ["a) p", "b) q"] {
            let s = score(&questions, &answers(&[(0, "a) x"), (1, second)])).unwrap();
            assert_eq!(s.scoreable, 1);
            assert_eq!(s.correct, 1);
            assert_eq!(s.percentage, 100.0);
        }
    }

    #[test]
    fn unanswered_questions_count_against() {
        let questions = parse_questions(
            "1. A?\na) x\nCorrect: a) x\n2. B?\na) y\nCorrect: a) y\n3. C?\na) z\nCorrect: a) z\n",
        );
        let s = score(&questions, &answers(&[(0, "a) x")])).unwrap();
        assert_eq!(s.scoreable, 3);
        assert_eq!(s.percentage, 33.3);
    }

    #[test]
    fn comparison_is_exact() {
        let questions = parse_questions(TWO_PLUS_TWO);
        for near_miss in ["4", "B) 4", "b) 4 ", "b)4"] {
            let s = score(&questions, &answers(&[(0, near_miss)])).unwrap();
            assert_eq!(s.correct, 0, "{near_miss:?} must not match");
        }
    }

    #[test]
    fn out_of_range_answers_are_ignored() {
        let questions = parse_questions(TWO_PLUS_TWO);
        let s = score(&questions, &answers(&[(0, "b) 4"), (9, "b) 4")])).unwrap();
        assert_eq!(s.correct, 1);
    }

    #[test]
    fn no_scoreable_questions_is_an_error() {
        let questions = parse_questions("1. A?\na) x\n");
        let err = score(&questions, &answers(&[(0, "a) x")])).unwrap_err();
        assert!(matches!(err, QuizError::NoScoreableQuestions));
        assert!(matches!(
            score(&[], &AnswerMap::new()),
            Err(QuizError::NoScoreableQuestions)
        ));
    }

    #[test]
    fn rounding_to_one_decimal() {
        assert_eq!(round_one_decimal(66.666_666), 66.7);
        assert_eq!(round_one_decimal(14.285_714), 14.3);
        assert_eq!(round_one_decimal(50.0), 50.0);
    }

    #[test]
    fn score_sheet_rejects_stale_sheet() {
        let quiz = crate::parser::parse_quiz(TWO_PLUS_TWO);
        let regenerated = crate::parser::parse_quiz(TWO_PLUS_TWO);
        let mut sheet = quiz.answer_sheet();
        sheet.record(&quiz, 0, "b) 4").unwrap();

        assert_eq!(score_sheet(&quiz, &sheet).unwrap().percentage, 100.0);
        assert!(matches!(
            score_sheet(&regenerated, &sheet),
            Err(QuizError::StaleAnswers { .. })
        ));
    }

    #[test]
    fn marks_correct_and_wrong_selection() {
        let q = &parse_questions(TWO_PLUS_TWO)[0];
        let marks = mark_options(q, Some("a) 3"));
        assert_eq!(
            marks,
            vec![
                ("a) 3", OptionMark::WronglySelected),
                ("b) 4", OptionMark::Correct),
                ("c) 5", OptionMark::Unmarked),
            ]
        );
    }

    #[test]
    fn selecting_the_correct_option_marks_only_correct() {
        let q = &parse_questions(TWO_PLUS_TWO)[0];
        let marks = mark_options(q, Some("b) 4"));
        assert!(!marks.iter().any(|(_, m)| *m == OptionMark::WronglySelected));
    }

    #[test]
    fn marks_compare_trimmed_correct_answer() {
        let q = Question {
            text: "Q".into(),
            options: vec!["a) x".into(), "b) y".into()],
            correct_answer: Some("  b) y ".into()),
        };
        let marks = mark_options(&q, None);
        assert_eq!(marks[1].1, OptionMark::Correct);
        assert_eq!(marks[0].1, OptionMark::Unmarked);
    }

    #[test]
    fn unscoreable_question_has_no_correct_mark() {
        let q = &parse_questions("1. A?\na) x\nb) y\n")[0];
        let marks = mark_options(q, Some("b) y"));
        assert_eq!(marks[1].1, OptionMark::WronglySelected);
        assert!(!marks.iter().any(|(_, m)| *m == OptionMark::Correct));
    }
}
