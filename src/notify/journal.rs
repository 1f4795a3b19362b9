//! Append-only error journal, one JSON object per line.
//!
//! The file is rotated to `<path>.1` once it reaches its size cap, so at most
//! two generations exist. Reads start from the end of the file.

use super::types::JournalEntry;
use crate::error::JournalError;
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Size at which the journal is rotated.
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

/// First chunk read from the end of the file when listing recent entries.
const TAIL_WINDOW: u64 = 64 * 1024;

/// Persistent record of reported failures.
#[async_trait]
pub trait ErrorJournal: Send + Sync {
    /// Append one entry.
    async fn record(&self, entry: &JournalEntry) -> Result<(), JournalError>;

    /// The most recent `limit` entries, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>, JournalError>;
}

/// Journal stored in a JSON-lines file.
#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
    max_bytes: u64,
}

impl FileJournal {
    pub fn new(path: PathBuf) -> Self {
        Self::with_max_bytes(path, DEFAULT_MAX_BYTES)
    }

    pub fn with_max_bytes(path: PathBuf, max_bytes: u64) -> Self {
        Self { path, max_bytes }
    }

    /// Path of the previous generation.
    pub fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    async fn rotate_if_full(&self) -> Result<(), JournalError> {
        match fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() && meta.len() >= self.max_bytes => {
                fs::rename(&self.path, self.rotated_path()).await?;
                tracing::debug!(path = %self.path.display(), "Rotated error journal");
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Parse the last `limit` entries of a journal file, widening the window
/// from the end until enough complete lines are found.
async fn read_tail(path: &Path, limit: usize) -> Result<Vec<JournalEntry>, JournalError> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata().await?.len();
    let mut window = TAIL_WINDOW;

    loop {
        let start = len.saturating_sub(window);
        file.seek(SeekFrom::Start(start)).await?;
        let mut buf = Vec::with_capacity((len - start) as usize);
        file.read_to_end(&mut buf).await?;

        let text = String::from_utf8_lossy(&buf);
        let mut lines = text.lines();
        if start > 0 {
            // Partial line.
            lines.next();
        }

        // Skip lines that fail to parse (e.g. a write cut short by a crash).
        let entries: Vec<JournalEntry> = lines
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        if entries.len() >= limit || start == 0 {
            let skip = entries.len().saturating_sub(limit);
            return Ok(entries.into_iter().skip(skip).collect());
        }
        window = window.saturating_mul(2);
    }
}

#[async_trait]
impl ErrorJournal for FileJournal {
    async fn record(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        self.rotate_if_full().await?;

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>, JournalError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut entries = read_tail(&self.path, limit).await?;
        if entries.len() < limit {
            let mut older = read_tail(&self.rotated_path(), limit - entries.len()).await?;
            older.append(&mut entries);
            entries = older;
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::FailureKind;
    use tempfile::tempdir;

    fn entry(id: &str) -> JournalEntry {
        JournalEntry {
            incident_id: id.to_string(),
            timestamp: 1_700_000_000,
            kind: FailureKind::Command,
            context: Some("https://x.com/v".to_string()),
            details: Some("yt-dlp exited with status 1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("nested").join("errors.jsonl"));

        journal.record(&entry("aaaa0001")).await.unwrap();
        journal.record(&entry("aaaa0002")).await.unwrap();

        let entries = journal.recent(10).await.unwrap();
        assert_eq!(entries, vec![entry("aaaa0001"), entry("aaaa0002")]);
    }

    #[tokio::test]
    async fn test_recent_limits_to_newest() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("errors.jsonl"));

        for i in 0..5 {
            journal.record(&entry(&format!("id{}", i))).await.unwrap();
        }

        let ids: Vec<String> = journal
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.incident_id)
            .collect();
        assert_eq!(ids, vec!["id3", "id4"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("errors.jsonl"));
        assert!(journal.recent(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skips_corrupt_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");
        let journal = FileJournal::new(path.clone());

        journal.record(&entry("good0001")).await.unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, b"{\"incident_id\":\n"))
            .unwrap();

        let entries = journal.recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].incident_id, "good0001");
    }

    #[tokio::test]
    async fn test_record_into_directory_fails() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::new(dir.path().to_path_buf());
        assert!(journal.record(&entry("x")).await.is_err());
    }

    fn line_len(entry: &JournalEntry) -> u64 {
        serde_json::to_string(entry).unwrap().len() as u64 + 1
    }

    fn ids(entries: Vec<JournalEntry>) -> Vec<String> {
        entries.into_iter().map(|e| e.incident_id).collect()
    }

    #[tokio::test]
    async fn test_rotates_when_full() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");
        let journal = FileJournal::with_max_bytes(path.clone(), 1);

        journal.record(&entry("gen00001")).await.unwrap();
        journal.record(&entry("gen00002")).await.unwrap();
        journal.record(&entry("gen00003")).await.unwrap();

        // Only one older generation is kept.
        let current = std::fs::read_to_string(&path).unwrap();
        let rotated = std::fs::read_to_string(journal.rotated_path()).unwrap();
        assert!(current.contains("gen00003") && !current.contains("gen00002"));
        assert!(rotated.contains("gen00002") && !rotated.contains("gen00001"));

        assert_eq!(ids(journal.recent(10).await.unwrap()), vec!["gen00002", "gen00003"]);
    }

    #[tokio::test]
    async fn test_recent_spans_rotated_file() {
        let dir = tempdir().unwrap();
        let cap = line_len(&entry("span0001")) * 2;
        let journal = FileJournal::with_max_bytes(dir.path().join("errors.jsonl"), cap);

        for id in ["span0001", "span0002", "span0003"] {
            journal.record(&entry(id)).await.unwrap();
        }
        assert!(journal.rotated_path().exists());

        assert_eq!(
            ids(journal.recent(3).await.unwrap()),
            vec!["span0001", "span0002", "span0003"]
        );
        assert_eq!(ids(journal.recent(1).await.unwrap()), vec!["span0003"]);
    }

    #[tokio::test]
    async fn test_recent_reads_entries_larger_than_window() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("errors.jsonl"));

        let big = "x".repeat(40 * 1024);
        for i in 0..5 {
            let mut e = entry(&format!("big{}", i));
            e.details = Some(big.clone());
            journal.record(&e).await.unwrap();
        }

        let entries = journal.recent(3).await.unwrap();
        assert_eq!(ids(entries), vec!["big2", "big3", "big4"]);
    }

    #[tokio::test]
    async fn test_recent_zero() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("errors.jsonl"));
        journal.record(&entry("zero0001")).await.unwrap();
        assert!(journal.recent(0).await.unwrap().is_empty());
    }
}
