//! The `studyquiz parse` command.

use std::path::PathBuf;

use anyhow::Result;

use studyquiz_core::model::AnswerMap;
use studyquiz_core::parser::parse_questions;

use crate::render::{print_questions, read_text};

pub fn execute(input: PathBuf, json: bool) -> Result<()> {
    let text = read_text(&input)?;
    let questions = parse_questions(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    let scoreable = questions.iter().filter(|q| q.is_scoreable()).count();
    println!(
        "Parsed {} question(s), {} with a correct answer.\n",
        questions.len(),
        scoreable
    );
    print_questions(&questions, &AnswerMap::new(), false);

    Ok(())
}
