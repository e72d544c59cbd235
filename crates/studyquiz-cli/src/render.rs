//! Console rendering for questions and scores.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use studyquiz_core::model::{AnswerMap, OptionMark, Question, Score};
use studyquiz_core::scoring::mark_options;

/// Print a question with its options. With `reveal`, options are marked
/// against the correct answer.
pub fn print_question(index: usize, question: &Question, selected: Option<&str>, reveal: bool) {
    println!("{}. {}", index + 1, question.text);

    if question.options.is_empty() {
        println!("   (no options)");
    }

    if !reveal {
        for option in &question.options {
            let picked = if selected == Some(option.as_str()) { ">" } else { " " };
            println!(" {picked} {option}");
        }
        return;
    }

    for (option, mark) in mark_options(question, selected) {
        let picked = if selected == Some(option) { ">" } else { " " };
        let suffix = match mark {
            OptionMark::Correct => "  [correct]",
            OptionMark::WronglySelected => "  [wrong]",
            OptionMark::Unmarked => "",
        };
        println!(" {picked} {option}{suffix}");
    }

    if question.correct_answer.is_none() {
        println!("   (not scored: no correct answer given)");
    }
}

pub fn print_questions(questions: &[Question], answers: &AnswerMap, reveal: bool) {
    for (i, question) in questions.iter().enumerate() {
        print_question(i, question, answers.get(&i).map(String::as_str), reveal);
        println!();
    }
}

pub fn print_score(score: &Score, answered: usize, total: usize) {
    let mut table = Table::new();
    table.set_header(vec!["Score", "Correct", "Scoreable", "Answered", "Questions"]);
    table.add_row(vec![
        Cell::new(format!("{:.1}%", score.percentage)),
        Cell::new(score.correct),
        Cell::new(score.scoreable),
        Cell::new(answered),
        Cell::new(total),
    ]);
    println!("{table}");
}

pub fn print_no_scoreable(total: usize) {
    println!("No scoreable questions: none of the {total} question(s) has a correct answer.");
}

/// Load a JSON answer map such as `{"0": "b) 4"}`.
pub fn load_answers(path: &Path) -> Result<AnswerMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz text: {}", path.display()))
}
