//! Audit log for processed media events.
//!
//! Every successfully synthesized media event produces one log entry. The
//! session core only knows the [`RecordSink`] trait; the concrete store is
//! injected at startup so session logic never depends on a storage backend.
//! Writes are best-effort: the session fires them off and logs failures
//! without ever surfacing them to the connected client.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

/// One processed-media audit record
#[derive(Debug, Clone, Serialize)]
pub struct AudioLogEntry {
    /// Event label, e.g. `media_processed`
    pub event: String,
    /// Text that was synthesized
    pub response_text: String,
    /// Approximate audio size metric (byte length / 1000)
    pub audio_length: f64,
    /// Originating network address, when known
    pub ip_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl AudioLogEntry {
    pub fn new(
        event: impl Into<String>,
        response_text: impl Into<String>,
        audio_length: f64,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            event: event.into(),
            response_text: response_text.into(),
            audio_length,
            ip_address,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Error raised by a record sink write
#[derive(Debug, Error)]
#[error("audio log write failed: {0}")]
pub struct SinkError(pub String);

/// Destination for audit records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append one entry. Failures are reported, never raised past the
    /// session boundary.
    async fn append(&self, entry: AudioLogEntry) -> Result<(), SinkError>;

    /// Most recent entries, newest first, up to `limit`.
    fn recent(&self, limit: usize) -> Vec<AudioLogEntry>;
}

/// In-memory record sink with a bounded capacity.
///
/// Oldest entries are evicted once the capacity is reached. Suitable for a
/// single-process deployment; a database-backed sink implements the same
/// trait.
pub struct MemoryAudioLog {
    capacity: usize,
    entries: RwLock<VecDeque<AudioLogEntry>>,
}

impl MemoryAudioLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(VecDeque::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl RecordSink for MemoryAudioLog {
    async fn append(&self, entry: AudioLogEntry) -> Result<(), SinkError> {
        let mut entries = self.entries.write();
        entries.push_front(entry);
        entries.truncate(self.capacity);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Vec<AudioLogEntry> {
        self.entries.read().iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_recent_newest_first() {
        let log = MemoryAudioLog::new(10);
        for i in 0..3 {
            log.append(AudioLogEntry::new(
                "media_processed",
                format!("reply {i}"),
                1.0,
                None,
            ))
            .await
            .unwrap();
        }

        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].response_text, "reply 2");
        assert_eq!(recent[2].response_text, "reply 0");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let log = MemoryAudioLog::new(2);
        for i in 0..5 {
            log.append(AudioLogEntry::new("media_processed", format!("{i}"), 0.5, None))
                .await
                .unwrap();
        }

        assert_eq!(log.len(), 2);
        let recent = log.recent(10);
        assert_eq!(recent[0].response_text, "4");
        assert_eq!(recent[1].response_text, "3");
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let log = MemoryAudioLog::new(100);
        for _ in 0..10 {
            log.append(AudioLogEntry::new("media_processed", "x", 0.1, None))
                .await
                .unwrap();
        }
        assert_eq!(log.recent(4).len(), 4);
    }

    #[test]
    fn test_entry_serializes_rfc3339_timestamp() {
        let entry = AudioLogEntry::new("media_processed", "hi", 1.25, Some("10.0.0.1".into()));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"], "media_processed");
        assert_eq!(json["audio_length"], 1.25);
        assert_eq!(json["ip_address"], "10.0.0.1");
        // RFC 3339 timestamps contain a 'T' separator
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }
}
