//! Per-user memory: stored session summaries and weak-spot counts.
//!
//! Each user owns one pretty-printed JSON file, `<storage_dir>/<user_id>_memory.json`.
//! A missing file is an empty history. Stored sessions are decoded one by one
//! and unreadable entries are skipped; before such a file is rewritten it is
//! moved to `<file>.corrupt`. Writes replace the whole file through a temp
//! file in the same directory, so a crash never leaves a session appended
//! without its weak-spot counts.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::{MemoryRecord, SessionSummary, StoredSession};
use crate::weak_spots::{aggregate_weak_spots, rank_weak_spots, top_weak_spots};

const MAX_USER_ID_LEN: usize = 128;

/// A decoded record, and whether anything on disk had to be discarded.
struct LoadedRecord {
    record: MemoryRecord,
    damaged: bool,
}

impl LoadedRecord {
    fn intact(record: MemoryRecord) -> Self {
        Self {
            record,
            damaged: false,
        }
    }

    fn damaged(record: MemoryRecord) -> Self {
        Self {
            record,
            damaged: true,
        }
    }
}

/// Reject user ids that could escape the storage directory.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    anyhow::ensure!(!user_id.is_empty(), "user id must not be empty");
    anyhow::ensure!(
        user_id.len() <= MAX_USER_ID_LEN,
        "user id must be at most {MAX_USER_ID_LEN} characters"
    );
    anyhow::ensure!(
        user_id != "." && user_id != "..",
        "user id must not be '.' or '..'"
    );
    anyhow::ensure!(
        user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')),
        "user id '{user_id}' may only contain ASCII letters, digits, '-', '_' and '.'"
    );
    Ok(())
}

/// File-backed memory for a single user.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    user_id: String,
    path: PathBuf,
}

impl MemoryStore {
    /// Open (without reading) the memory file for `user_id` under `storage_dir`,
    /// creating the directory if needed.
    pub fn open(storage_dir: &Path, user_id: &str) -> Result<Self> {
        validate_user_id(user_id)?;
        std::fs::create_dir_all(storage_dir).with_context(|| {
            format!("failed to create storage directory: {}", storage_dir.display())
        })?;
        Ok(Self {
            user_id: user_id.to_string(),
            path: storage_dir.join(format!("{user_id}_memory.json")),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current record. Never fails: absent or corrupt storage reads as empty.
    ///
    /// Sessions are decoded one at a time, so a damaged entry costs only
    /// itself. `weak_spots` is always recomputed from `sessions`.
    pub fn load(&self) -> MemoryRecord {
        self.read_record().record
    }

    fn read_record(&self) -> LoadedRecord {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(user_id = %self.user_id, "no memory file yet");
                return LoadedRecord::intact(MemoryRecord::empty(&self.user_id));
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "failed to read memory file, starting empty: {e}"
                );
                return LoadedRecord::damaged(MemoryRecord::empty(&self.user_id));
            }
        };

        let entries = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(mut object)) => match object.remove("sessions") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(entries)) => entries,
                Some(other) => {
                    warn!(
                        path = %self.path.display(),
                        kind = json_kind(&other),
                        "memory file sessions is not an array, starting empty"
                    );
                    return LoadedRecord::damaged(MemoryRecord::empty(&self.user_id));
                }
            },
            Ok(_) => {
                warn!(
                    path = %self.path.display(),
                    "memory file is not a JSON object, starting empty"
                );
                return LoadedRecord::damaged(MemoryRecord::empty(&self.user_id));
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "corrupt memory file, starting empty: {e}"
                );
                return LoadedRecord::damaged(MemoryRecord::empty(&self.user_id));
            }
        };

        let mut damaged = false;
        let mut record = MemoryRecord::empty(&self.user_id);
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<StoredSession>(entry) {
                Ok(session) => record.sessions.push(session),
                Err(e) => {
                    warn!(
                        user_id = %self.user_id,
                        index,
                        "dropping unreadable stored session: {e}"
                    );
                    damaged = true;
                }
            }
        }
        record.weak_spots = aggregate_weak_spots(record.sessions.iter().map(|s| &s.summary));
        LoadedRecord { record, damaged }
    }

    /// Where a damaged memory file is moved before it is rewritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Move the current file aside so a rewrite cannot destroy what failed
    /// to parse.
    fn quarantine(&self) -> Result<()> {
        let backup = self.backup_path();
        std::fs::rename(&self.path, &backup).with_context(|| {
            format!("failed to back up damaged memory file to {}", backup.display())
        })?;
        warn!(backup = %backup.display(), "damaged memory file backed up before rewrite");
        Ok(())
    }

    fn save(&self, record: &MemoryRecord) -> Result<()> {
        let json =
            serde_json::to_string_pretty(record).context("failed to serialize memory record")?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .context("failed to write memory record")?;
        tmp.as_file().sync_all().context("failed to sync memory record")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to write memory file {}", self.path.display()))?;
        Ok(())
    }

    /// Append a timestamped copy of `summary` and recompute weak spots over
    /// the whole history.
    pub fn add_session_summary(&self, summary: &SessionSummary) -> Result<StoredSession> {
        let LoadedRecord {
            mut record,
            damaged,
        } = self.read_record();
        if damaged && self.path.exists() {
            self.quarantine()?;
        }
        let stored = StoredSession {
            timestamp: Utc::now(),
            summary: summary.clone(),
        };
        record.sessions.push(stored.clone());
        record.weak_spots = aggregate_weak_spots(record.sessions.iter().map(|s| &s.summary));
        self.save(&record)?;
        info!(
            user_id = %self.user_id,
            sessions = record.sessions.len(),
            topics = record.weak_spots.len(),
            "session summary stored"
        );
        Ok(stored)
    }

    /// Up to `top_k` weak-spot topics, most frequent first, ties by topic.
    pub fn get_weak_spots(&self, top_k: usize) -> Vec<String> {
        top_weak_spots(&self.load().weak_spots, top_k)
    }

    /// Every weak-spot topic with its count, ranked.
    pub fn weak_spot_counts(&self) -> Vec<(String, u32)> {
        rank_weak_spots(&self.load().weak_spots)
    }

    /// The most recently appended session, if any.
    pub fn get_latest_session(&self) -> Option<StoredSession> {
        self.load().sessions.pop()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Evaluation, Scores};

    fn summary(user: &str, topics: &[&str]) -> SessionSummary {
        SessionSummary {
            user_id: user.into(),
            role: "Software Engineer".into(),
            summary_text: "Solid session.".into(),
            weak_spot_topics: topics.iter().map(|t| t.to_string()).collect(),
            strength_topics: vec!["ownership".into()],
            evaluations: vec![Evaluation {
                question: "Describe a rate limiter.".into(),
                answer: "Token bucket.".into(),
                scores: Scores::uniform(7),
                weak_spots: vec!["system_design".into()],
                strengths: vec![],
                comments: "Good.".into(),
            }],
        }
    }

    #[test]
    fn add_then_latest_round_trips_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "alice").unwrap();
        let s = summary("alice", &["system_design"]);

        let before = Utc::now();
        store.add_session_summary(&s).unwrap();
        let latest = store.get_latest_session().unwrap();

        assert_eq!(latest.summary, s);
        assert!(latest.timestamp >= before);
    }

    #[test]
    fn latest_is_none_without_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "nobody").unwrap();
        assert!(store.get_latest_session().is_none());
        assert!(store.get_weak_spots(5).is_empty());
    }

    #[test]
    fn latest_is_the_last_appended() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "bob").unwrap();
        store.add_session_summary(&summary("bob", &["a"])).unwrap();
        store.add_session_summary(&summary("bob", &["b"])).unwrap();
        let latest = store.get_latest_session().unwrap();
        assert_eq!(latest.summary.weak_spot_topics, vec!["b"]);
    }

    #[test]
    fn weak_spots_are_recomputed_on_every_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "carol").unwrap();
        let history: [&[&str]; 5] = [
            &["a", "b"],
            &["a", "c"],
            &["a", "b", "c"],
            &["a", "d"],
            &["a", "b", "c"],
        ];
        for topics in history {
            store.add_session_summary(&summary("carol", topics)).unwrap();
        }
        // a:5 b:3 c:3 d:1
        assert_eq!(store.get_weak_spots(2), vec!["a", "b"]);
        assert_eq!(
            store.weak_spot_counts(),
            vec![
                ("a".to_string(), 5),
                ("b".to_string(), 3),
                ("c".to_string(), 3),
                ("d".to_string(), 1)
            ]
        );

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk["weak_spots"]["a"], 5);
        assert_eq!(on_disk["user_id"], "carol");
        assert_eq!(on_disk["sessions"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn corrupt_file_is_treated_as_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "dave").unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().sessions.is_empty());
        store.add_session_summary(&summary("dave", &["x"])).unwrap();
        assert_eq!(store.load().sessions.len(), 1);
        assert_eq!(store.get_weak_spots(1), vec!["x"]);
        let backup = std::fs::read_to_string(store.backup_path()).unwrap();
        assert_eq!(backup, "{ not json");
    }

    #[test]
    fn edited_counts_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "erin").unwrap();
        store.add_session_summary(&summary("erin", &["x"])).unwrap();

        let mut record: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        record["weak_spots"] = serde_json::json!({"x": 40, "ghost": 99});
        std::fs::write(store.path(), record.to_string()).unwrap();

        assert_eq!(store.weak_spot_counts(), vec![("x".to_string(), 1)]);
    }

    #[test]
    fn mistyped_counts_do_not_discard_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "finn").unwrap();
        store.add_session_summary(&summary("finn", &["a"])).unwrap();
        store.add_session_summary(&summary("finn", &["a", "b"])).unwrap();

        let mut record: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        record["weak_spots"] = serde_json::json!({"a": "1"});
        std::fs::write(store.path(), record.to_string()).unwrap();

        assert_eq!(store.load().sessions.len(), 2);
        store.add_session_summary(&summary("finn", &["b"])).unwrap();
        assert_eq!(store.load().sessions.len(), 3);
        assert_eq!(
            store.weak_spot_counts(),
            vec![("a".to_string(), 2), ("b".to_string(), 2)]
        );
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn unreadable_session_is_dropped_and_file_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "gwen").unwrap();
        store.add_session_summary(&summary("gwen", &["a"])).unwrap();
        store.add_session_summary(&summary("gwen", &["b"])).unwrap();

        let mut record: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        record["sessions"][0]["timestamp"] = serde_json::json!("yesterday");
        let edited = record.to_string();
        std::fs::write(store.path(), &edited).unwrap();

        assert_eq!(store.load().sessions.len(), 1);
        assert_eq!(store.get_weak_spots(5), vec!["b"]);

        store.add_session_summary(&summary("gwen", &["c"])).unwrap();
        assert_eq!(store.load().sessions.len(), 2);
        assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), edited);
    }

    #[test]
    fn intact_history_is_not_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "hugo").unwrap();
        store.add_session_summary(&summary("hugo", &["a"])).unwrap();
        store.add_session_summary(&summary("hugo", &["a"])).unwrap();
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn users_do_not_share_storage() {
        let dir = tempfile::tempdir().unwrap();
        let a = MemoryStore::open(dir.path(), "user-a").unwrap();
        let b = MemoryStore::open(dir.path(), "user-b").unwrap();
        a.add_session_summary(&summary("user-a", &["x"])).unwrap();
        assert!(b.get_latest_session().is_none());
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn open_creates_missing_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("storage");
        let store = MemoryStore::open(&nested, "frank").unwrap();
        store.add_session_summary(&summary("frank", &[])).unwrap();
        assert!(nested.join("frank_memory.json").exists());
    }

    #[test]
    fn rejects_path_like_user_ids() {
        let dir = tempfile::tempdir().unwrap();
        for bad in ["", "..", "../etc", "a/b", "a b"] {
            assert!(MemoryStore::open(dir.path(), bad).is_err(), "accepted {bad:?}");
        }
        assert!(MemoryStore::open(dir.path(), "jane.doe_42-x").is_ok());
    }
}
