mod admin;
mod db;
mod error;
mod media;
mod models;
mod questions;
mod quiz;
mod session;
mod tui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use db::Database;
use error::Error;
use models::JsonOutput;
use session::SessionController;

const DEFAULT_DB_NAME: &str = "learnflow.db";
const DEFAULT_LOG_NAME: &str = "learnflow.log";

#[derive(Parser)]
#[command(name = "learnflow")]
#[command(about = "A guided learning flow: pre-test, video, post-test and results")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the session store
    Init,

    /// Launch the interactive learning flow
    Tui,

    /// Show the stored session
    Status,

    /// Inspect the question pool
    #[command(subcommand)]
    Questions(QuestionCommands),

    /// Clear identity and quiz progress, keeping question edits
    Logout,

    /// Clear everything, including question edits
    Reset,
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// List the working question pool
    List,

    /// Show one question with its options
    Show {
        /// Question ID
        id: i64,
    },
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("LEARNFLOW_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learnflow");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn get_log_path(db_path: &Path) -> PathBuf {
    if let Ok(path) = std::env::var("LEARNFLOW_LOG") {
        return PathBuf::from(path);
    }
    db_path.with_file_name(DEFAULT_LOG_NAME)
}

// The terminal belongs to the TUI, so logs go to a file
fn init_logging(path: &Path) -> Result<(), Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let db_path = get_db_path();
    init_logging(&get_log_path(&db_path))?;

    let db = Database::open(&db_path)?;
    db.init()?;

    if let Commands::Init = cli.command {
        if cli.json {
            println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
        } else {
            println!("Session store initialized at: {}", db_path.display());
        }
        return Ok(());
    }

    let mut controller = SessionController::hydrate(db);

    match cli.command {
        Commands::Init => {}

        Commands::Tui => {
            tui::run(controller)?;
        }

        Commands::Status => {
            let summary = controller.summary();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&summary))?);
            } else {
                println!("=== Session ===");
                println!("Step: {}", summary.step.label());
                if summary.username.is_empty() {
                    println!("User: -");
                } else {
                    println!("User: {} ({})", summary.username, summary.role.label());
                }
                println!("Pre-test: {}", describe_quiz(&summary.pre_test));
                println!(
                    "Video: {}",
                    if summary.video_completed {
                        "completed"
                    } else {
                        "not watched"
                    }
                );
                println!("Post-test: {}", describe_quiz(&summary.post_test));
                println!("Question pool: {} questions", summary.pool_size);
            }
        }

        Commands::Questions(question_cmd) => {
            let pool = &controller.session().question_pool;
            match question_cmd {
                QuestionCommands::List => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(pool))?);
                    } else if pool.is_empty() {
                        println!("No questions found.");
                    } else {
                        println!("{:<5} {:<50} ANSWER", "ID", "QUESTION");
                        println!("{}", "-".repeat(75));
                        for q in pool {
                            println!(
                                "{:<5} {:<50} {}",
                                q.id,
                                truncate(&q.text, 48),
                                q.correct_option()
                            );
                        }
                    }
                }

                QuestionCommands::Show { id } => match questions::find(pool, id) {
                    Some(q) => {
                        if cli.json {
                            println!("{}", serde_json::to_string(&JsonOutput::ok(q))?);
                        } else {
                            println!("Question {}: {}", q.id, q.text);
                            for (i, option) in q.options.iter().enumerate() {
                                let mark = if i == q.correct_answer { "  <- correct" } else { "" };
                                println!("  {}. {}{}", i + 1, option, mark);
                            }
                        }
                    }
                    None if cli.json => {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::<()>::err("Question not found"))?
                        );
                    }
                    None => println!("Question not found."),
                },
            }
        }

        Commands::Logout => {
            controller.logout();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Logged out. Question edits were kept.");
            }
        }

        Commands::Reset => {
            controller.reset();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Session reset. The default question pool is back.");
            }
        }
    }

    Ok(())
}

fn describe_quiz(quiz: &session::QuizSummary) -> String {
    match quiz.score {
        Some(score) => format!(
            "{}% ({} / {} correct)",
            score, quiz.correct, quiz.questions
        ),
        None if quiz.questions == 0 => "not started".to_string(),
        None => format!("{}/{} answered", quiz.answered, quiz.questions),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_empty_string() {
            assert_eq!(truncate("", 10), "");
        }
    }

    mod describe_tests {
        use super::*;
        use session::QuizSummary;

        fn summary(questions: usize, answered: usize, score: Option<u32>) -> QuizSummary {
            QuizSummary {
                questions,
                answered,
                correct: 2,
                score,
            }
        }

        #[test]
        fn not_started() {
            assert_eq!(describe_quiz(&summary(0, 0, None)), "not started");
        }

        #[test]
        fn in_progress() {
            assert_eq!(describe_quiz(&summary(3, 1, None)), "1/3 answered");
        }

        #[test]
        fn scored() {
            assert_eq!(describe_quiz(&summary(3, 3, Some(67))), "67% (2 / 3 correct)");
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["learnflow", "init"]).unwrap();
            assert!(!cli.json);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_status_with_json() {
            let cli = Cli::try_parse_from(["learnflow", "--json", "status"]).unwrap();
            assert!(cli.json);
            assert!(matches!(cli.command, Commands::Status));
        }

        #[test]
        fn parse_json_flag_after_subcommand() {
            let cli = Cli::try_parse_from(["learnflow", "reset", "--json"]).unwrap();
            assert!(cli.json);
            assert!(matches!(cli.command, Commands::Reset));
        }

        #[test]
        fn parse_questions_list() {
            let cli = Cli::try_parse_from(["learnflow", "questions", "list"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Questions(QuestionCommands::List)
            ));
        }

        #[test]
        fn parse_questions_show() {
            let cli = Cli::try_parse_from(["learnflow", "questions", "show", "7"]).unwrap();
            match cli.command {
                Commands::Questions(QuestionCommands::Show { id }) => assert_eq!(id, 7),
                _ => panic!("Expected Questions Show command"),
            }
        }

        #[test]
        fn parse_tui_and_logout() {
            assert!(matches!(
                Cli::try_parse_from(["learnflow", "tui"]).unwrap().command,
                Commands::Tui
            ));
            assert!(matches!(
                Cli::try_parse_from(["learnflow", "logout"]).unwrap().command,
                Commands::Logout
            ));
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["learnflow", "invalid"]).is_err());
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            assert!(Cli::try_parse_from(["learnflow", "questions", "show"]).is_err());
            assert!(Cli::try_parse_from(["learnflow"]).is_err());
        }
    }

    mod path_tests {
        use super::*;

        #[test]
        fn log_path_sits_next_to_db() {
            std::env::remove_var("LEARNFLOW_LOG");
            let path = get_log_path(Path::new("/tmp/somewhere/learnflow.db"));
            assert_eq!(path, PathBuf::from("/tmp/somewhere/learnflow.log"));
        }
    }
}
