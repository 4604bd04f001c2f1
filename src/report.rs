//! CSV report building for extracted order entries.

use crate::extract::OrderEntry;

/// Report header row.
pub const REPORT_HEADER: &str = "Sales Rep,Customer Name,Order Due Date";

/// GroupMe keeps bot posts under roughly 1000 characters; stay safely below.
pub const MAX_REPORT_LEN: usize = 900;

/// Where an oversized report is cut before the marker is appended.
const TRUNCATE_AT: usize = 850;

/// Appended to a report that was cut.
const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Build the CSV report for one message's extracted entries: header plus one
/// row per entry, with the posting rep's display name in the first column.
pub fn build_report(poster: &str, entries: &[OrderEntry]) -> String {
    let mut csv = format!("{REPORT_HEADER}\n");
    for entry in entries {
        csv.push_str(&format!("{},{},{}\n", poster, entry.customer, entry.due));
    }
    truncate_report(csv)
}

/// Cap an oversized report, backing the cut off to a UTF-8 char boundary.
fn truncate_report(mut report: String) -> String {
    if report.len() <= MAX_REPORT_LEN {
        return report;
    }

    let mut cut = TRUNCATE_AT;
    while !report.is_char_boundary(cut) {
        cut -= 1;
    }
    report.truncate(cut);
    report.push_str(TRUNCATION_MARKER);
    report
}
