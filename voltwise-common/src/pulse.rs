//! The rolling operator event stream.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format;
use crate::tail_risk::TailRiskSummary;

/// Number of entries the operator view retains.
pub const PULSE_CAPACITY: usize = 16;

/// Background messages cycled through by [`LogEntry::synthetic`].
pub const SYNTHETIC_EVENTS: [&str; 3] = [
    "BESS State-of-Charge within safety envelope (88%)",
    "PJM East DAM grounding successful",
    "Simulation integrity verified: 100k paths",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    /// Derived from a completed analysis.
    #[serde(rename = "SIM_DONE")]
    SimDone,
    /// Synthetic background chatter.
    #[serde(rename = "SYS_LOG")]
    SysLog,
    /// Posted by an external source.
    #[serde(rename = "STATUS")]
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub kind: LogKind,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, kind: LogKind, message: impl Into<String>) -> Self {
        Self { timestamp: timestamp.into(), kind, message: message.into() }
    }

    /// `Analysis Complete. Risk Ratio: 1.80x. Mean: ₹5.00L`
    pub fn analysis_complete(timestamp: impl Into<String>, summary: &TailRiskSummary) -> Self {
        Self::new(
            timestamp,
            LogKind::SimDone,
            format!(
                "Analysis Complete. Risk Ratio: {}. Mean: {}",
                summary.ratio,
                format::lakh(summary.expected, 2)
            ),
        )
    }

    /// The `seq`-th synthetic background message (round-robin).
    pub fn synthetic(timestamp: impl Into<String>, seq: u64) -> Self {
        let idx = (seq % SYNTHETIC_EVENTS.len() as u64) as usize;
        Self::new(timestamp, LogKind::SysLog, SYNTHETIC_EVENTS[idx])
    }

    pub fn status(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(timestamp, LogKind::Status, message)
    }
}

/// Bounded FIFO of [`LogEntry`]: appending at capacity evicts the oldest entry.
///
/// Appending is the only mutation. Iteration runs oldest to newest.
#[derive(Debug, Clone)]
pub struct RollingLogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl RollingLogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(PULSE_CAPACITY)
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append `entry`, returning the entry evicted to make room, if any.
    pub fn append(&mut self, entry: LogEntry) -> Option<LogEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            debug!(kind = ?old.kind, timestamp = %old.timestamp, "pulse entry evicted");
        }
        self.entries.push_back(entry);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Owned copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for RollingLogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a RollingLogBuffer {
    type Item = &'a LogEntry;
    type IntoIter = std::collections::vec_deque::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
