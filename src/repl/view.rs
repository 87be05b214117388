// ABOUTME: Plain-text rendering of chat entries, notices, and field errors for the REPL.
// ABOUTME: Continuation lines of multi-line text are indented under the label.

use crate::history::ChatEntry;

const CONTINUATION_INDENT: &str = "      ";

/// Render one entry under its persisted label, e.g. `Bot: Hello` or `Error timeout`.
pub fn format_entry(entry: &ChatEntry) -> String {
    let mut lines = entry.text().lines();
    let first = lines.next().unwrap_or("");
    let mut out = format!("{} {}", entry.role().label(), first);
    for line in lines {
        out.push('\n');
        out.push_str(CONTINUATION_INDENT);
        out.push_str(line);
    }
    out
}

/// Render a transient notice.
pub fn format_notice(text: &str) -> String {
    format!("! {}", text)
}

/// Render an inline error for the prompt field.
pub fn format_field_error(text: &str) -> String {
    format!("  ^ {}", text)
}
