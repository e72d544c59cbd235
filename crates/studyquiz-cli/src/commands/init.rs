//! The `studyquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("studyquiz.toml").exists() {
        println!("studyquiz.toml already exists, skipping.");
    } else {
        std::fs::write("studyquiz.toml", SAMPLE_CONFIG)?;
        println!("Created studyquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set STUDYQUIZ_UID and STUDYQUIZ_ID_TOKEN (or edit [user])");
    println!("  2. Point [api] base_url at your document service");
    println!("  3. Run: studyquiz quiz --pdf notes.pdf --conversation-id my-notes");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studyquiz configuration

default_prompt = "Generate a bunch of multiple-choice questions and their answers."

[api]
base_url = "http://127.0.0.1:8000"
timeout_secs = 120

[user]
uid = "${STUDYQUIZ_UID}"
id_token = "${STUDYQUIZ_ID_TOKEN}"

# Keep counters in Firestore:
# [store]
# type = "firestore"
# project_id = "my-project"
# api_key = "${FIREBASE_API_KEY}"

[store]
type = "file"
dir = "./studyquiz-profiles"
"#;
