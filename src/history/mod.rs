/**
 * Rolling Code Aggregator
 *
 * Bounded FIFO of recent canonical codes plus rendering of the delimited
 * transmission window consumed by the serial sender. The buffer has
 * exactly one writer (the producer loop); the rendered window is what
 * gets shared with the sender thread.
 */

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::code::CanonicalCode;

/// Delimiter joining codes in the transmission string, with one trailing
/// occurrence after the final code.
pub const WINDOW_DELIMITER: char = '7';

/// Number of most recent results rendered into the transmission string.
/// Also the warm-up threshold the producer gates on.
pub const WINDOW_LEN: usize = 6;

/// Rendered placeholder for a frame the detector produced no output for.
pub const ERROR_ENTRY: &str = "error";

/// One aggregated result: a canonical code, or the explicit error
/// placeholder used by the mixed-policy deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Code(CanonicalCode),
    Error,
}

impl HistoryEntry {
    pub fn render(&self) -> String {
        match self {
            HistoryEntry::Code(code) => code.to_string(),
            HistoryEntry::Error => ERROR_ENTRY.to_string(),
        }
    }

    fn parse(line: &str) -> Option<Self> {
        if line == ERROR_ENTRY {
            return Some(HistoryEntry::Error);
        }
        CanonicalCode::from_code_str(line).map(HistoryEntry::Code)
    }
}

/// Insertion-ordered bounded history of results, oldest evicted first.
pub struct CodeHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl CodeHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= WINDOW_LEN, "capacity must cover one window");
        CodeHistory {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a result, evicting the oldest entry once full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
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

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Warm-up completes once a full window of results has been
    /// collected. The surrounding system observes this transition and
    /// only starts publishing afterwards.
    pub fn warmed_up(&self) -> bool {
        self.entries.len() >= WINDOW_LEN
    }

    /// Render the most recent window: up to the last six results joined
    /// with '7' plus one trailing '7'. None while the buffer is empty.
    pub fn render_window(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let skip = self.entries.len().saturating_sub(WINDOW_LEN);
        let mut out = String::new();
        for entry in self.entries.iter().skip(skip) {
            out.push_str(&entry.render());
            out.push(WINDOW_DELIMITER);
        }
        Some(out)
    }

    /// Re-serialize the whole buffer, one entry per line, oldest first.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.render());
            out.push('\n');
        }
        fs::write(path, out)
    }

    /// Pre-load a buffer written by `save`. A missing file yields an
    /// empty history; blank or garbled lines are skipped; only the most
    /// recent `capacity` entries are kept.
    pub fn load(path: &Path, capacity: usize) -> std::io::Result<Self> {
        let mut history = CodeHistory::new(capacity);
        if !path.exists() {
            return Ok(history);
        }
        let text = fs::read_to_string(path)?;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match HistoryEntry::parse(line) {
                Some(entry) => history.push(entry),
                None => warn!("skipping garbled history line: {:?}", line),
            }
        }
        info!("loaded {} saved results from {}", history.len(), path.display());
        Ok(history)
    }
}
