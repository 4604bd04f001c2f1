//! Order-block extraction from free-form chat text.
//!
//! Scans message text for "Customer Information" blocks and pulls a customer
//! name and order due date out of each. Best-effort: a block missing either
//! field is dropped silently, never reported as an error.

use regex::Regex;

/// One extracted order record. Transient — serialized into the outgoing
/// report and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    /// Customer name, trimmed.
    pub customer: String,
    /// Due date as written. Pattern-checked, never semantically validated.
    pub due: String,
}

/// Extracts order entries from raw message text.
///
/// Regexes are compiled once at construction; `extract` is synchronous,
/// stateless, and does no I/O.
pub struct OrderBlockExtractor {
    /// Block marker; doubles as the cheap short-circuit probe.
    marker: Regex,
    /// First `Name : <value>` line within a block.
    name_line: Regex,
    /// First `Order Due Date : <value>` line; accepts D/D/YYYY or YYYY-MM-DD.
    due_line: Regex,
}

impl OrderBlockExtractor {
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"(?i)customer information").unwrap(),
            name_line: Regex::new(r"(?im)^\s*name\s*:\s*(.+?)\s*$").unwrap(),
            due_line: Regex::new(
                r"(?im)^\s*order\s+due\s+date\s*:\s*((?:\d{1,2}/\d{1,2}/\d{4})|(?:\d{4}-\d{2}-\d{2}))\s*$",
            )
            .unwrap(),
        }
    }

    /// Extract all order entries from `raw`, in document order.
    ///
    /// The text is split into blocks, each starting at an occurrence of the
    /// "Customer Information" marker. A block yields one entry when it
    /// contains both a name line and a due-date line; partial blocks yield
    /// nothing.
    pub fn extract(&self, raw: &str) -> Vec<OrderEntry> {
        if raw.is_empty() || !self.marker.is_match(raw) {
            return Vec::new();
        }

        // The regex crate has no lookahead, so the lookahead-style split is
        // done by slicing between consecutive marker offsets. Any preamble
        // before the first marker contains no marker and is skipped.
        let starts: Vec<usize> = self.marker.find_iter(raw).map(|m| m.start()).collect();

        let mut entries = Vec::new();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(raw.len());
            let block = &raw[start..end];

            let customer = self
                .name_line
                .captures(block)
                .map(|caps| caps[1].trim().to_string());
            let due = self
                .due_line
                .captures(block)
                .map(|caps| caps[1].trim().to_string());

            // Both lines required — no partial entries.
            if let (Some(customer), Some(due)) = (customer, due) {
                entries.push(OrderEntry { customer, due });
            }
        }

        entries
    }
}

impl Default for OrderBlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}
