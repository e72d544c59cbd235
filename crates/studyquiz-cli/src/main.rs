//! studyquiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "studyquiz", version, about = "Turn study PDFs into scored quizzes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a quiz reply and print its questions
    Parse {
        /// Text file holding the generation reply
        #[arg(long)]
        input: PathBuf,

        /// Print the questions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score an answer file against a quiz reply
    Score {
        /// Text file holding the generation reply
        #[arg(long)]
        input: PathBuf,

        /// JSON answer map, e.g. {"0": "b) 4"}
        #[arg(long)]
        answers: PathBuf,

        /// Print the score as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a PDF, generate a quiz, answer it, and record the result
    Quiz {
        /// PDF document to upload
        #[arg(long)]
        pdf: PathBuf,

        /// Conversation ID shared by upload, generation, and submission
        #[arg(long)]
        conversation_id: String,

        /// Prompt override (defaults to the configured prompt)
        #[arg(long)]
        prompt: Option<String>,

        /// Take answers from a JSON answer map instead of stdin
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Send the answers back to the service
        #[arg(long)]
        submit: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the signed-in user's counters
    Profile {
        /// Add an assignment with this name
        #[arg(long, requires = "due")]
        add_assignment: Option<String>,

        /// Due date for --add-assignment
        #[arg(long)]
        due: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studyquiz=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, json } => commands::parse::execute(input, json),
        Commands::Score {
            input,
            answers,
            json,
        } => commands::score::execute(input, answers, json),
        Commands::Quiz {
            pdf,
            conversation_id,
            prompt,
            answers,
            submit,
            config,
        } => {
            commands::quiz::execute(pdf, conversation_id, prompt, answers, submit, config).await
        }
        Commands::Profile {
            add_assignment,
            due,
            config,
        } => commands::profile::execute(add_assignment, due, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
