//! The `studyquiz quiz` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use studyquiz_client::config::{create_service, create_store, load_config_from};
use studyquiz_core::error::QuizError;
use studyquiz_core::model::{Question, QuizId};
use studyquiz_core::profile::{create_or_refresh_profile, record_daily_activity, record_quiz_result};
use studyquiz_core::session::QuizSession;
use studyquiz_core::traits::{format_file_size, Document, QuizService, PDF_MIME};

use crate::render::{load_answers, print_no_scoreable, print_question, print_questions, print_score};

pub async fn execute(
    pdf: PathBuf,
    conversation_id: String,
    prompt: Option<String>,
    answers_path: Option<PathBuf>,
    submit: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        !conversation_id.trim().is_empty(),
        "conversation ID must not be empty"
    );

    let config = load_config_from(config_path.as_deref())?;
    let user = config.user_context()?;

    let document = Document::load(&pdf)?;
    eprintln!("Name: {}", document.file_name);
    eprintln!("Type: {PDF_MIME}");
    eprintln!("Size: {}", format_file_size(document.size()));

    let service: Arc<dyn QuizService> = Arc::from(create_service(&config, &user));
    let store = create_store(&config, Some(&user));

    if let Some(store) = store.as_deref() {
        if let Err(e) = create_or_refresh_profile(store, &user, chrono::Utc::now()).await {
            tracing::warn!("failed to load user profile: {e:#}");
        }
    }

    let prompt = prompt.unwrap_or_else(|| config.default_prompt.clone());
    let mut session = QuizSession::new(user, conversation_id);

    eprintln!("\nUploading and generating questions...");
    let quiz = session
        .generate_from_document(service.clone(), store.as_deref(), &document, &prompt)
        .await
        .context("quiz generation failed")?;
    let quiz_id = quiz.id;
    let questions = quiz.questions.clone();
    eprintln!("Upload complete. {} question(s) generated.\n", questions.len());

    if questions.is_empty() {
        println!("The service did not return any questions.");
        return Ok(());
    }

    match &answers_path {
        Some(path) => {
            for (index, option) in load_answers(path)? {
                if let Err(e) = session.answer(quiz_id, index, &option) {
                    tracing::warn!("skipping answer {index}: {e}");
                }
            }
        }
        None => answer_interactively(&mut session, quiz_id, &questions).await?,
    }

    let answers = session
        .answer_sheet()
        .map(|s| s.answers().clone())
        .unwrap_or_default();

    println!("Results\n");
    print_questions(&questions, &answers, true);

    let today = chrono::Utc::now().date_naive();
    match session.score() {
        Ok(score) => {
            print_score(&score, answers.len(), questions.len());
            if let Some(store) = store.as_deref() {
                let uid = &session.user().uid;
                if let Err(e) = record_quiz_result(store, uid, &score, questions.len(), today).await
                {
                    tracing::warn!("failed to record quiz result: {e:#}");
                }
            }
        }
        Err(QuizError::NoScoreableQuestions) => {
            print_no_scoreable(questions.len());
            if let Some(store) = store.as_deref() {
                let uid = &session.user().uid;
                let answered = answers.len() as u32;
                if let Err(e) = record_daily_activity(store, uid, today, answered).await {
                    tracing::warn!("failed to record activity: {e:#}");
                }
            }
        }
        Err(e) => return Err(e.into()),
    }

    if submit {
        service
            .submit_answers(&session.submission()?)
            .await
            .context("submission failed")?;
        println!("Quiz submitted successfully!");
    }

    Ok(())
}

/// Ask each question on stdin. Accepts an option letter or the full option
/// text; a blank line skips the question.
async fn answer_interactively(
    session: &mut QuizSession,
    quiz_id: QuizId,
    questions: &[Question],
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    for (index, question) in questions.iter().enumerate() {
        print_question(index, question, None, false);
        if question.options.is_empty() {
            println!();
            continue;
        }

        loop {
            println!("Your answer (a-d, blank to skip):");
            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            let input = line.trim();
            if input.is_empty() {
                break;
            }
            match pick_option(question, input) {
                Some(option) => {
                    let option = option.to_string();
                    session.answer(quiz_id, index, &option)?;
                    break;
                }
                None => println!("No option matches {input:?}."),
            }
        }
        println!();
    }

    Ok(())
}

/// Resolve user input to one of the question's options, by label or full text.
fn pick_option<'a>(question: &'a Question, input: &str) -> Option<&'a str> {
    let label = input.trim_end_matches(')').to_ascii_lowercase();
    question
        .options
        .iter()
        .find(|option| {
            option.as_str() == input
                || (label.len() == 1 && option.starts_with(&format!("{label})")))
        })
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            text: "What is 2+2?".into(),
            options: vec!["a) 3".into(), "b) 4".into(), "c) 5".into()],
            correct_answer: Some("b) 4".into()),
        }
    }

    #[test]
    fn pick_by_label() {
        let q = question();
        assert_eq!(pick_option(&q, "b"), Some("b) 4"));
        assert_eq!(pick_option(&q, "B"), Some("b) 4"));
        assert_eq!(pick_option(&q, "c)"), Some("c) 5"));
    }

    #[test]
    fn pick_by_full_text() {
        assert_eq!(pick_option(&question(), "a) 3"), Some("a) 3"));
    }

    #[test]
    fn pick_unknown() {
        let q = question();
        assert_eq!(pick_option(&q, "d"), None);
        assert_eq!(pick_option(&q, "four"), None);
    }
}
