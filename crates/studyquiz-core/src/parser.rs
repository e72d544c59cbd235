//! Quiz reply parser.
//!
//! Turns the free-text reply of a generation call into structured
//! [`Question`]s. The expected shape is:
//!
//! ```text
//! 1. What is 2+2?
//! a) 3
//! b) 4
//! c) 5
//! Correct: b) 4
//! ```
//!
//! Parsing is lenient: it never fails, and fragments that do not fit the
//! shape are dropped silently.

use crate::model::{Question, Quiz};

/// Prefixes that introduce the correct-answer line, longest first.
const ANSWER_MARKERS: &[&str] = &["correct answer:", "correct:", "answer:"];

/// Parse a reply into questions, in reply order.
///
/// Pure: identical input always yields an identical sequence.
pub fn parse_questions(text: &str) -> Vec<Question> {
    split_blocks(text)
        .iter()
        .map(|block| parse_block(block))
        .collect()
}

/// Parse a reply into a [`Quiz`] with a fresh id.
pub fn parse_quiz(text: &str) -> Quiz {
    let quiz = Quiz::new(parse_questions(text));
    tracing::debug!(
        quiz_id = %quiz.id,
        questions = quiz.questions.len(),
        scoreable = quiz.scoreable_count(),
        "parsed quiz reply"
    );
    quiz
}

/// Split the reply at numbered-entry markers, dropping the markers and any
/// blank blocks. Text before the first marker is not a block.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(rest) = strip_ordinal(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(rest.to_string());
            continue;
        }

        if let Some(block) = current.as_mut() {
            block.push('\n');
            block.push_str(line);
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    blocks.retain(|b| !b.trim().is_empty());
    blocks
}

fn parse_block(block: &str) -> Question {
    let (question_part, answer_part) = split_at_marker(block);

    let mut lines = question_part
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let text = lines
        .next()
        .map(|first| strip_ordinal(first).unwrap_or(first).trim().to_string())
        .unwrap_or_default();

    let options = lines
        .filter(|l| is_option_line(l))
        .map(str::to_string)
        .collect();

    let correct_answer = answer_part
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    Question {
        text,
        options,
        correct_answer,
    }
}

/// Split a block at its first marker line. The answer part is the rest of
/// that line, or the next non-blank line when the marker stands alone.
fn split_at_marker(block: &str) -> (&str, Option<&str>) {
    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        if let Some(answer) = strip_marker(line.trim()) {
            let answer = if answer.trim().is_empty() {
                block[offset + line.len()..]
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or(answer)
            } else {
                answer
            };
            return (&block[..offset], Some(answer));
        }
        offset += line.len();
    }
    (block, None)
}

fn strip_marker(line: &str) -> Option<&str> {
    ANSWER_MARKERS.iter().find_map(|marker| {
        let head = line.get(..marker.len())?;
        head.eq_ignore_ascii_case(marker)
            .then(|| &line[marker.len()..])
    })
}

/// Strip a leading `<digits>.` (after optional whitespace) and return the rest.
fn strip_ordinal(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    trimmed[digits..].strip_prefix('.')
}

/// `a)` through `d)` at the start of an already-trimmed line.
fn is_option_line(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('a'..='d'), Some(')'))
    )
}
