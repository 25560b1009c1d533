//! Interactive chat loop.
//!
//! A line-oriented REPL over stdin: plain lines are queries, `/` lines are
//! session commands. Every failure path prints a message and returns to
//! the prompt; nothing terminates the session process.

use anyhow::{Context, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::engine::AnswerEngine;
use crate::history;
use crate::inference::create_backend;
use crate::models::UploadedDocument;
use crate::ocr::create_provider;
use crate::session::Session;
use crate::validate::mime_for_name;

/// Read a local file into an [`UploadedDocument`], guessing the MIME type
/// from the extension.
pub fn load_document(path: &Path) -> Result<UploadedDocument> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_for_name(&name);
    Ok(UploadedDocument::new(name, mime, bytes))
}

/// Run the interactive chat session.
pub async fn run_chat(config: &Config, files: &[PathBuf]) -> Result<()> {
    let backend = create_backend(&config.models)?;
    let ocr = create_provider(&config.ocr)?;
    let engine = AnswerEngine::new(backend, config.chunking.clone());

    let mut session = Session::new();
    session.transcript = history::load_transcript(&config.history.path)?;

    if !files.is_empty() {
        ingest_paths(&mut session, ocr.as_ref(), files).await;
    }

    if let Some(greeting) = session.greeting() {
        println!("{greeting}");
    }
    println!("Commands: /load <files...>, /new, /history, /old, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            match handle_command(&mut session, config, ocr.as_ref(), command).await {
                CommandOutcome::Continue => continue,
                CommandOutcome::Quit => break,
            }
        }

        match session.handle_query(line, &engine).await {
            Ok((reply, _intent)) => {
                println!("{reply}");
                if let Err(e) = history::save_transcript(&config.history.path, &session.transcript)
                {
                    eprintln!("error: failed to persist transcript: {e}");
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
            }
        }
    }

    history::save_transcript(&config.history.path, &session.transcript)?;
    Ok(())
}

/// One-shot mode: ingest the given files, ask one question, print the reply.
pub async fn run_ask(config: &Config, files: &[PathBuf], question: &str) -> Result<()> {
    let backend = create_backend(&config.models)?;
    let ocr = create_provider(&config.ocr)?;
    let engine = AnswerEngine::new(backend, config.chunking.clone());

    let docs = files
        .iter()
        .map(|p| load_document(p))
        .collect::<Result<Vec<_>>>()?;

    let mut session = Session::new();
    session
        .ingest(&docs, ocr.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let (reply, intent) = session
        .handle_query(question, &engine)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(?intent, "query answered");
    println!("{reply}");
    Ok(())
}

enum CommandOutcome {
    Continue,
    Quit,
}

/// Execute one `/` command. Infallible on purpose: every failure is
/// reported to the user and the loop continues.
async fn handle_command(
    session: &mut Session,
    config: &Config,
    ocr: &dyn crate::ocr::OcrProvider,
    command: &str,
) -> CommandOutcome {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("exit") => return CommandOutcome::Quit,
        Some("load") => {
            let paths: Vec<PathBuf> = parts.map(PathBuf::from).collect();
            if paths.is_empty() {
                println!("usage: /load <files...>");
                return CommandOutcome::Continue;
            }
            ingest_paths(session, ocr, &paths).await;
        }
        Some("new") => {
            if let Err(e) = history::rotate(&config.history.path, &session.transcript) {
                eprintln!("error: {e}");
                return CommandOutcome::Continue;
            }
            session.start_new_chat();
            println!("New chat started. Old chat history stored!");
        }
        Some("history") => {
            for entry in &session.transcript {
                println!("{:?}: {}", entry.role, entry.content);
            }
        }
        Some("old") => {
            let archive = history::archive_path(&config.history.path);
            match history::load_transcript(&archive) {
                Ok(transcript) => {
                    session.transcript = transcript;
                    println!("Old chat history restored!");
                }
                Err(e) => eprintln!("error: {e}"),
            }
        }
        other => {
            println!("unknown command: /{}", other.unwrap_or_default());
        }
    }
    CommandOutcome::Continue
}

async fn ingest_paths(session: &mut Session, ocr: &dyn crate::ocr::OcrProvider, paths: &[PathBuf]) {
    let docs: Result<Vec<_>> = paths.iter().map(|p| load_document(p)).collect();
    match docs {
        Ok(docs) => match session.ingest(&docs, ocr).await {
            Ok(()) => println!("Documents processed successfully!"),
            Err(e) => eprintln!("error: {e}"),
        },
        Err(e) => eprintln!("error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TranscriptEntry};
    use crate::ocr::DisabledOcr;

    fn config_with_history_path(path: PathBuf) -> Config {
        let mut config = Config::default();
        config.history.path = path;
        config
    }

    #[tokio::test]
    async fn new_command_keeps_session_when_rotation_fails() {
        // The history path's parent is a regular file, so archiving fails.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let config = config_with_history_path(blocker.path().join("sub/history.json"));

        let mut session = Session::new();
        session
            .transcript
            .push(TranscriptEntry::now(Role::User, "keep me"));

        let outcome = handle_command(&mut session, &config, &DisabledOcr, "new").await;
        assert!(matches!(outcome, CommandOutcome::Continue));
        assert_eq!(session.transcript.len(), 1);
    }

    #[tokio::test]
    async fn old_command_keeps_transcript_when_archive_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(history::archive_path(&path), "not json").unwrap();
        let config = config_with_history_path(path);

        let mut session = Session::new();
        session
            .transcript
            .push(TranscriptEntry::now(Role::User, "current turn"));

        let outcome = handle_command(&mut session, &config, &DisabledOcr, "old").await;
        assert!(matches!(outcome, CommandOutcome::Continue));
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].content, "current turn");
    }

    #[tokio::test]
    async fn quit_and_exit_end_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_history_path(dir.path().join("history.json"));
        let mut session = Session::new();

        let quit = handle_command(&mut session, &config, &DisabledOcr, "quit").await;
        assert!(matches!(quit, CommandOutcome::Quit));
        let exit = handle_command(&mut session, &config, &DisabledOcr, "exit").await;
        assert!(matches!(exit, CommandOutcome::Quit));
    }
}
