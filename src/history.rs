//! Transcript persistence.
//!
//! The transcript is stored as a JSON array of entries. "Start new chat"
//! archives the current file to a sibling path before clearing, so the
//! previous conversation can be restored later.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::TranscriptEntry;

/// Load a transcript. A missing file is an empty transcript, not an error.
pub fn load_transcript(path: &Path) -> Result<Vec<TranscriptEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file: {}", path.display()))
}

pub fn save_transcript(path: &Path, entries: &[TranscriptEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write history file: {}", path.display()))
}

/// Sibling path holding the archived previous conversation.
pub fn archive_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docchat_history.json".to_string());
    path.with_file_name(format!("old_{file_name}"))
}

/// Archive the current transcript, then persist the (now empty) one.
pub fn rotate(path: &Path, entries: &[TranscriptEntry]) -> Result<()> {
    save_transcript(&archive_path(path), entries)?;
    save_transcript(path, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TranscriptEntry};

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let entries = load_transcript(&dir.path().join("none.json")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let entries = vec![
            TranscriptEntry::now(Role::User, "hello"),
            TranscriptEntry::now(Role::Assistant, "Hi."),
        ];
        save_transcript(&path, &entries).unwrap();
        let loaded = load_transcript(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].role, Role::User);
        assert_eq!(loaded[1].content, "Hi.");
    }

    #[test]
    fn rotate_archives_then_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let entries = vec![TranscriptEntry::now(Role::User, "old message")];
        rotate(&path, &entries).unwrap();

        assert!(load_transcript(&path).unwrap().is_empty());
        let archived = load_transcript(&archive_path(&path)).unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].content, "old message");
    }

    #[test]
    fn archive_path_prefixes_the_file_name() {
        let p = archive_path(Path::new("/tmp/history.json"));
        assert_eq!(p, Path::new("/tmp/old_history.json"));
    }
}
