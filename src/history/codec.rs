// ABOUTME: Flat-string encoding of chat history — `role||text##` records, delimiter-stripped.
// ABOUTME: Decoding tolerates malformed records by dropping them; encoding never emits them.

use tracing::debug;

use super::entry::{ChatEntry, ChatHistory, Role};

/// Separates the role label from the text within one record.
pub const FIELD_DELIMITER: &str = "||";
/// Terminates one record.
pub const RECORD_DELIMITER: &str = "##";

/// Remove every delimiter occurrence from a field value.
///
/// Deleting a delimiter can join its neighbours into a new one (`#|##|#`),
/// so stripping repeats until the value is stable.
pub fn sanitize(value: &str) -> String {
    let mut out = value.to_string();
    while out.contains(FIELD_DELIMITER) || out.contains(RECORD_DELIMITER) {
        out = out.replace(FIELD_DELIMITER, "").replace(RECORD_DELIMITER, "");
    }
    out
}

/// Encode a history into the persisted string form.
pub fn encode(history: &ChatHistory) -> String {
    let mut out = String::new();
    for entry in history {
        out.push_str(&sanitize(entry.role().label()));
        out.push_str(FIELD_DELIMITER);
        out.push_str(&sanitize(entry.text()));
        out.push_str(RECORD_DELIMITER);
    }
    out
}

/// Decode a persisted string. Records that are blank, do not have exactly two
/// fields, or carry an unknown role label are skipped. Dropping well-formed
/// records with an unrecognised label is stricter than the storage format,
/// which only rejects records with the wrong number of fields.
pub fn decode(data: &str) -> ChatHistory {
    split_records(data)
        .into_iter()
        .filter(|record| !record.trim().is_empty())
        .filter_map(decode_record)
        .collect()
}

fn decode_record(record: &str) -> Option<ChatEntry> {
    let fields: Vec<&str> = record.split(FIELD_DELIMITER).collect();
    let [label, text] = fields.as_slice() else {
        debug!(record, "dropping malformed history record");
        return None;
    };
    match Role::from_label(label) {
        Some(role) => Some(ChatEntry::new(role, *text)),
        None => {
            debug!(label, "dropping history record with unknown role label");
            None
        }
    }
}

/// Split on the record delimiter, taking the rightmost `##` of a run of `#`.
///
/// Sanitized text may still end in a single `#`, which sits directly in front
/// of the delimiter. For stored data without such a run this matches a plain
/// split on `##`.
fn split_records(data: &str) -> Vec<&str> {
    let bytes = data.as_bytes();
    let mut records = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'#' && bytes[i + 1] == b'#' && bytes.get(i + 2) != Some(&b'#') {
            records.push(&data[start..i]);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    records.push(&data[start..]);
    records
}
