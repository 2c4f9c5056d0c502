//! Request history tracking for debugging and diagnostics.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Put,
}

/// A recorded request to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub method: RequestMethod,
    /// Resource address with the `/api/<username>` prefix stripped
    pub address: String,
    pub body: Option<Value>,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Tracks the most recent requests sent to the bridge.
#[derive(Debug, Clone)]
pub struct RequestHistory {
    counts: HashMap<RequestMethod, usize>,
    last_error: Option<String>,
    start_time: Instant,
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            last_error: None,
            start_time: Instant::now(),
            entries: VecDeque::new(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::new()
        }
    }

    pub fn record(&mut self, method: RequestMethod, address: &str, body: Option<&Value>) {
        *self.counts.entry(method).or_default() += 1;

        self.entries.push_back(HistoryEntry {
            method,
            address: strip_username(address),
            body: body.cloned(),
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn record_error(&mut self, error: &str) {
        self.last_error = Some(error.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.entries.clear();
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        let count = |m: RequestMethod| self.counts.get(&m).copied().unwrap_or(0);
        HistorySummary {
            get_count: count(RequestMethod::Get),
            put_count: count(RequestMethod::Put),
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of request history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub get_count: usize,
    pub put_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}

/// `/api/<username>/lights/1/state` becomes `/lights/1/state`.
fn strip_username(address: &str) -> String {
    let Some(rest) = address.strip_prefix("/api/") else {
        return address.to_string();
    };
    match rest.find('/') {
        Some(idx) => rest[idx..].to_string(),
        None => "/".to_string(),
    }
}
