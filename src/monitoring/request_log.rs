//! Bounded in-memory log of served HTTP requests.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// One served request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub ip: String,
    pub user_agent: String,
    pub status_code: u16,
    /// Milliseconds from first byte in to response out.
    pub response_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregates over the entries currently held.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub timestamp: DateTime<Utc>,
    pub total_requests: usize,
    pub requests_by_method: BTreeMap<String, usize>,
    /// Keyed by status class, e.g. `"2xx"`.
    pub requests_by_status: BTreeMap<String, usize>,
    pub average_response_time: u64,
    /// Share of responses with status >= 400, rounded to two decimals.
    pub error_rate: f64,
}

/// Ring buffer of the most recent `capacity` entries. Oldest entries are evicted first.
pub struct RequestLog {
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl RequestLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The newest `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn stats(&self) -> RequestStats {
        let entries = self.entries.lock();
        let total = entries.len();

        let mut by_method = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        let mut total_time = 0u64;
        let mut errors = 0usize;

        for entry in entries.iter() {
            *by_method.entry(entry.method.clone()).or_insert(0) += 1;
            *by_status
                .entry(format!("{}xx", entry.status_code / 100))
                .or_insert(0) += 1;
            total_time += entry.response_time;
            if entry.status_code >= 400 {
                errors += 1;
            }
        }

        let (average_response_time, error_rate) = if total == 0 {
            (0, 0.0)
        } else {
            let avg = (total_time as f64 / total as f64).round() as u64;
            let rate = ((errors as f64 / total as f64) * 100.0).round() / 100.0;
            (avg, rate)
        };

        RequestStats {
            timestamp: Utc::now(),
            total_requests: total,
            requests_by_method: by_method,
            requests_by_status: by_status,
            average_response_time,
            error_rate,
        }
    }
}
