//! Command-line front end for the portal
//!
//! Argument parsing, the command dispatcher and the plain-text formatting
//! used for console output.

use crate::backup::{self, MergeReport};
use crate::cloud::{CloudConfig, CloudSync, PingStatus};
use crate::error::{PortalError, Result};
use crate::models::{Quiz, Subject, User};
use crate::repository::{AdminSeed, Repository};
use crate::sync::{self, SyncReport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(about = "Class portal - local-first data with optional cloud sync")]
pub struct Args {
    /// Data directory for the local store (default: ~/.classportal)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Remote backend URL; cloud sync is disabled without it
    #[arg(long)]
    pub remote_url: Option<String>,

    /// API key sent to the remote backend
    #[arg(long, default_value = "")]
    pub api_key: String,

    /// Timeout for each remote call, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Username of the administrator seeded on first run
    #[arg(long, default_value = "admin")]
    pub admin_username: String,

    /// Password of the administrator seeded on first run
    #[arg(long, default_value = "admin")]
    pub admin_password: String,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Write a snapshot of the local store to a file or stdout
    Export { output: Option<PathBuf> },
    /// Load a snapshot, replacing local data unless --merge is given
    Import {
        file: PathBuf,
        #[arg(long)]
        merge: bool,
    },
    /// Push every local collection to the remote
    SyncUp,
    /// Replace local collections with their remote contents
    SyncDown,
    /// Remote row counts per table
    Status,
    /// Check that the remote backend answers
    Ping,
    /// Check credentials against the remote backend
    Login { username: String, password: String },
    /// Import questions from a PERGUNTA/CORRETA text file
    ImportText {
        file: PathBuf,
        /// Add to an existing quiz instead of creating one
        #[arg(long, conflicts_with = "title")]
        quiz: Option<String>,
        /// Title of the quiz to create
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "")]
        grade: String,
        #[arg(long, default_value = "math", value_parser = parse_subject)]
        subject: Subject,
    },
    /// Register a student account
    Register {
        name: String,
        username: String,
        password: String,
        grade: String,
    },
    /// List users
    Users,
    /// List quizzes with their question counts
    Quizzes,
}

fn parse_subject(s: &str) -> std::result::Result<Subject, String> {
    match s.to_ascii_lowercase().as_str() {
        "math" => Ok(Subject::Math),
        "chem" => Ok(Subject::Chem),
        other => Err(format!("unknown subject '{}' (expected math or chem)", other)),
    }
}

impl Args {
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| PortalError::Config("Failed to get home directory".to_string()))?;
        Ok(base_dirs.home_dir().join(".classportal"))
    }

    /// Remote configuration, or `None` when no URL was given
    pub fn cloud_config(&self) -> Result<Option<CloudConfig>> {
        match &self.remote_url {
            Some(url) => Ok(Some(
                CloudConfig::new(url, &self.api_key)?
                    .with_timeout(Duration::from_secs(self.timeout_secs)),
            )),
            None => Ok(None),
        }
    }

    pub fn admin_seed(&self) -> AdminSeed {
        AdminSeed {
            username: self.admin_username.clone(),
            password: self.admin_password.clone(),
        }
    }
}

/// Execute one command against the repository and cloud client
pub async fn run(command: Command, repo: &Repository, cloud: &CloudSync) -> Result<()> {
    match command {
        Command::Export { output } => {
            let snapshot = backup::export_snapshot(repo.store())?;
            match output {
                Some(path) => std::fs::write(&path, snapshot)?,
                None => println!("{}", snapshot),
            }
        }
        Command::Import { file, merge } => {
            let blob = std::fs::read_to_string(&file)?;
            if merge {
                let report = backup::import_merge(repo.store(), &blob)?;
                println!("{}", format_merge(&report));
            } else {
                backup::import_overwrite(repo.store(), &blob)?;
                println!("Local data replaced from {}", file.display());
            }
        }
        Command::SyncUp => {
            let report = sync::sync_up(repo.store(), cloud).await;
            println!("{}", format_sync("sync up", &report));
        }
        Command::SyncDown => {
            let report = sync::sync_down(repo.store(), cloud).await;
            println!("{}", format_sync("sync down", &report));
        }
        Command::Status => {
            if !cloud.enabled() {
                println!("{}", PingStatus::NotConfigured);
                return Ok(());
            }
            for (table, count) in cloud.status().await {
                println!("{:<14}{}", table, count);
            }
            if let Some(error) = cloud.last_error() {
                println!("last error: {}", error);
            }
        }
        Command::Ping => println!("{}", cloud.ping().await),
        Command::Login { username, password } => match cloud.login(&username, &password).await {
            Some(user) => println!("Logged in as {} ({})", user.name, user.role),
            None => {
                let reason = cloud.last_error().unwrap_or_default();
                println!("Login failed: {}", reason);
            }
        },
        Command::ImportText {
            file,
            quiz,
            title,
            grade,
            subject,
        } => {
            let text = std::fs::read_to_string(&file)?;
            match (quiz, title) {
                (Some(quiz_id), _) => {
                    if repo.get::<Quiz>(&quiz_id)?.is_none() {
                        return Err(PortalError::Validation(format!("No quiz with id {}", quiz_id)));
                    }
                    let count = repo.import_questions(&quiz_id, &text)?;
                    println!("Imported {} questions", count);
                }
                (None, Some(title)) => match repo.import_quiz(&title, &grade, subject, &text)? {
                    Some((quiz, count)) => println!("Created quiz {} with {} questions", quiz.id, count),
                    None => println!("No questions recognized; nothing created"),
                },
                (None, None) => {
                    return Err(PortalError::Validation(
                        "either --quiz or --title is required".to_string(),
                    ))
                }
            }
        }
        Command::Register {
            name,
            username,
            password,
            grade,
        } => {
            let user = repo.register_student(&name, &username, &password, &grade)?;
            println!("Registered {}", format_user(&user));
        }
        Command::Users => {
            for user in repo.list::<User>()? {
                println!("{}", format_user(&user));
            }
        }
        Command::Quizzes => {
            for quiz in repo.list::<Quiz>()? {
                let questions = repo.questions_for_quiz(&quiz.id)?.len();
                println!("{}", format_quiz(&quiz, questions));
            }
        }
    }
    Ok(())
}

pub fn format_user(user: &User) -> String {
    let mut line = format!("{} <{}> {:?}", user.name, user.username, user.role);
    if let Some(grade) = &user.grade {
        line.push_str(&format!(" [{}]", grade));
    }
    if user.blocked {
        line.push_str(" (blocked)");
    }
    line
}

pub fn format_quiz(quiz: &Quiz, questions: usize) -> String {
    format!(
        "{} {} [{} {:?}] {} questions",
        quiz.id, quiz.title, quiz.grade, quiz.subject, questions
    )
}

pub fn format_sync(label: &str, report: &SyncReport) -> String {
    let mut lines = vec![format!("{} ({} failed)", label, report.failures())];
    for (collection, outcome) in &report.outcomes {
        lines.push(format!("  {:<14}{}", collection, outcome));
    }
    lines.join("\n")
}

pub fn format_merge(report: &MergeReport) -> String {
    let mut lines = vec!["merge import".to_string()];
    for (collection, counts) in &report.collections {
        lines.push(format!(
            "  {:<14}{} added, {} replaced, {} skipped",
            collection, counts.added, counts.replaced, counts.skipped
        ));
    }
    lines.join("\n")
}
