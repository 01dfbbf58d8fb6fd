//! In-memory store for telephony call records.
//!
//! Call records are created by the incoming-call webhook and read/updated by
//! the administrative REST endpoints. Keyed by the provider's unique call
//! identifier. Persistence beyond process lifetime is out of scope.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Lifecycle status of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Received,
    Ringing,
    InProgress,
    Completed,
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Ringing => "ringing",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Strict parse of the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "received" => Some(Self::Received),
            "ringing" => Some(Self::Ringing),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One telephony call
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub call_sid: String,
    pub from_number: String,
    pub to_number: String,
    pub status: CallStatus,
    /// Call duration in seconds
    pub duration: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CallRecord {
    /// New record for a just-received call.
    pub fn new(
        call_sid: impl Into<String>,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            call_sid: call_sid.into(),
            from_number: from_number.into(),
            to_number: to_number.into(),
            status: CallStatus::Received,
            duration: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Error returned when inserting a call that already exists
#[derive(Debug, Error)]
#[error("call {0} already exists")]
pub struct DuplicateCall(pub String);

/// Concurrent call record store keyed by call SID.
#[derive(Debug, Default)]
pub struct CallStore {
    calls: DashMap<String, CallRecord>,
}

impl CallStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new call record; rejects duplicate call SIDs.
    pub fn insert(&self, record: CallRecord) -> Result<(), DuplicateCall> {
        use dashmap::mapref::entry::Entry;
        match self.calls.entry(record.call_sid.clone()) {
            Entry::Occupied(_) => Err(DuplicateCall(record.call_sid)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// All calls, optionally filtered by status, newest first.
    pub fn list(&self, status: Option<CallStatus>) -> Vec<CallRecord> {
        let mut calls: Vec<CallRecord> = self
            .calls
            .iter()
            .filter(|entry| status.is_none_or(|s| entry.value().status == s))
            .map(|entry| entry.value().clone())
            .collect();
        calls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        calls
    }

    pub fn get(&self, call_sid: &str) -> Option<CallRecord> {
        self.calls.get(call_sid).map(|entry| entry.value().clone())
    }

    /// Partial update of status and/or duration. Returns the updated record,
    /// or `None` when the call is unknown.
    pub fn update(
        &self,
        call_sid: &str,
        status: Option<CallStatus>,
        duration: Option<u64>,
    ) -> Option<CallRecord> {
        self.calls.get_mut(call_sid).map(|mut record| {
            if let Some(status) = status {
                record.status = status;
            }
            if let Some(duration) = duration {
                record.duration = duration;
            }
            record.updated_at = OffsetDateTime::now_utc();
            record.value().clone()
        })
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
