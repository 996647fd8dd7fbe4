//! Case-insensitive, delimiter-aware merging of free-text association fields.
//!
//! Association columns hold zero, one or many values joined by `,` and/or `;`. The merger folds
//! any number of such fields into one accumulator: order is first-seen order and casing is the
//! casing of the first occurrence.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// What `merge_all` does when it meets a null or zero-length row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRowPolicy {
    /// Stop merging the whole batch at the first null or empty row.
    ///
    /// This is the historical behaviour of the PharmGKB lookup tool and is kept as the default:
    /// rows after an empty one are never seen, even when they carry values.
    #[default]
    Stop,
    /// Skip the empty row and keep merging the rest of the batch.
    Skip,
}

impl EmptyRowPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stop" => Some(Self::Stop),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Skip => "skip",
        }
    }
}

/// Splits one raw field into its logical values.
///
/// The delimiter found first in precedence order (`,` then `;`) is split on first; any piece
/// still holding the other delimiter is split again. Pieces are trimmed and empty pieces dropped.
pub fn decompose(raw: &str) -> Vec<String> {
    let (primary, secondary) = if raw.contains(',') {
        (',', ';')
    } else if raw.contains(';') {
        (';', ',')
    } else {
        return trimmed_piece(raw).into_iter().collect();
    };

    let first_pass: Vec<&str> = raw.split(primary).collect();

    let mut pieces = Vec::with_capacity(first_pass.len());
    for piece in &first_pass {
        if piece.contains(secondary) {
            pieces.extend(piece.split(secondary).filter_map(trimmed_piece));
        } else {
            pieces.extend(trimmed_piece(piece));
        }
    }
    pieces
}

fn trimmed_piece(piece: &str) -> Option<String> {
    let piece = piece.trim();
    if piece.is_empty() {
        None
    } else {
        Some(piece.to_string())
    }
}

fn fold_key(value: &str) -> String {
    value.to_lowercase()
}

/// Merges one raw field into `acc`, returning how many new values were appended.
///
/// `None` and empty fields contribute nothing.
pub fn merge(raw: Option<&str>, acc: &mut Vec<String>) -> usize {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return 0;
    };

    let mut seen: HashSet<String> = acc.iter().map(|value| fold_key(value)).collect();
    let before = acc.len();
    for piece in decompose(raw) {
        if seen.insert(fold_key(&piece)) {
            acc.push(piece);
        }
    }
    acc.len() - before
}

/// Merges a whole result set into `acc`, in row order.
///
/// Under [`EmptyRowPolicy::Stop`] the first null or zero-length row ends the batch; rows after it
/// are not merged.
pub fn merge_all<I, S>(rows: I, acc: &mut Vec<String>, policy: EmptyRowPolicy) -> usize
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut added = 0;
    for row in rows {
        let value: Option<&str> = row.as_ref().map(|v| v.as_ref()).filter(|v| !v.is_empty());
        match (value, policy) {
            (Some(value), _) => added += merge(Some(value), acc),
            (None, EmptyRowPolicy::Stop) => break,
            (None, EmptyRowPolicy::Skip) => continue,
        }
    }
    added
}

/// Appends `value` unless an identical string is already present.
pub fn push_distinct(acc: &mut Vec<String>, value: String) {
    if !acc.contains(&value) {
        acc.push(value);
    }
}
