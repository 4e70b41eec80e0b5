use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use core_types::{DocumentId, UserPrompt};
use tokio::io::{BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

/// Stdin, shared between the REPL and confirmation questions.
pub type InputLines = Arc<Mutex<Lines<BufReader<Stdin>>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Send(String),
    Upload(PathBuf),
    Drop(Vec<PathBuf>),
    Delete(DocumentId),
    Docs,
    Refresh,
    Status,
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
  <text>              send a message
  /upload <path>      upload a PDF
  /drop <path>...     drop files (only the first is uploaded)
  /delete <id>        delete a document
  /docs               list documents
  /refresh            reload the document list
  /status             check the backend
  /help               show this help
  /quit               exit";

pub fn parse_command(line: &str) -> Command {
    if line.trim().is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let (name, args) = rest
        .split_once(char::is_whitespace)
        .map(|(name, args)| (name, args.trim()))
        .unwrap_or((rest.trim(), ""));
    match name {
        "upload" if !args.is_empty() => Command::Upload(PathBuf::from(args)),
        "drop" if !args.is_empty() => {
            Command::Drop(args.split_whitespace().map(PathBuf::from).collect())
        }
        "delete" => args
            .parse()
            .map(Command::Delete)
            .unwrap_or_else(|_| Command::Invalid(line.trim().to_string())),
        "docs" => Command::Docs,
        "refresh" => Command::Refresh,
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Invalid(line.trim().to_string()),
    }
}

/// Asks `y/N` questions on the terminal. End of input counts as no.
pub struct StdinPrompt {
    lines: InputLines,
}

impl StdinPrompt {
    pub fn new(lines: InputLines) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl UserPrompt for StdinPrompt {
    async fn confirm(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if let Err(err) = std::io::stdout().flush() {
            warn!(error = %err, "failed to flush prompt");
        }
        let answer = self.lines.lock().await.next_line().await;
        match answer {
            Ok(Some(answer)) => confirm_answer(&answer),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}

fn confirm_answer(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "是" | "确定"
    )
}
