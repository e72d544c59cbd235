//! The `studyquiz profile` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Days, Utc};
use comfy_table::{Cell, Table};

use studyquiz_client::config::{create_store, load_config_from};
use studyquiz_core::profile::{add_assignment, create_or_refresh_profile, Assignment, UserProfile};

pub async fn execute(
    new_assignment: Option<String>,
    due: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let user = config.user_context()?;
    let Some(store) = create_store(&config, Some(&user)) else {
        anyhow::bail!("no profile store configured: add a [store] section to studyquiz.toml");
    };

    let mut profile = create_or_refresh_profile(store.as_ref(), &user, Utc::now()).await?;

    if let Some(name) = new_assignment {
        let assignment = Assignment {
            name,
            due: due.unwrap_or_default(),
        };
        if let Some(updated) = add_assignment(store.as_ref(), &user.uid, assignment).await? {
            profile = updated;
        }
        println!("Assignment added.\n");
    }

    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("{} <{}>\n", profile.display_name, profile.email);

    let mut table = Table::new();
    table.set_header(vec!["PDFs", "Streak", "Questions", "Accuracy", "Topics"]);
    table.add_row(vec![
        Cell::new(profile.pdf_count),
        Cell::new(format!("{} day(s)", profile.stats.learning_streak)),
        Cell::new(profile.stats.questions_asked),
        Cell::new(format!("{:.1}%", profile.stats.accuracy_rate)),
        Cell::new(profile.stats.topics_mastered),
    ]);
    println!("{table}");

    let today = Utc::now().date_naive();
    let mut activity = Table::new();
    activity.set_header(vec!["Day", "Questions"]);
    for offset in (0..7u64).rev() {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            continue;
        };
        let key = day.format("%Y-%m-%d").to_string();
        let count = profile.daily_activity.get(&key).copied().unwrap_or(0);
        activity.add_row(vec![Cell::new(key), Cell::new(count)]);
    }
    println!("\nLast 7 days\n{activity}");

    if !profile.subjects.is_empty() {
        let mut subjects = Table::new();
        subjects.set_header(vec!["Subject", "Score"]);
        for (name, score) in &profile.subjects {
            subjects.add_row(vec![Cell::new(name), Cell::new(score)]);
        }
        println!("\n{subjects}");
    }

    if !profile.assignments.is_empty() {
        let mut assignments = Table::new();
        assignments.set_header(vec!["Assignment", "Due"]);
        for a in &profile.assignments {
            assignments.add_row(vec![Cell::new(&a.name), Cell::new(&a.due)]);
        }
        println!("\n{assignments}");
    }
}
