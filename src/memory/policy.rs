//! Reconciliation rules for the listing view, as pure functions.
//!
//! No I/O happens here: the engine gathers what each tier returned and hands it
//! to [`resolve_listing`], which decides what the user sees.

use std::collections::HashMap;

use super::types::{date_sort_key, DiaryEntry};
use crate::remote::RemoteError;

/// Where the entries of a [`Listing`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    /// The remote is not configured; only the local store was read.
    LocalOnly,
    /// Remote and local entries were merged.
    Merged { remote_count: usize },
    /// The remote was configured but its listing failed; local entries only.
    RemoteUnavailable(String),
}

/// The deduplicated, newest-first view of all known entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub entries: Vec<DiaryEntry>,
    pub source: ListingSource,
}

/// Combine remote and local entries, one per `id`.
///
/// Remote entries go in first and local ones second, so a local entry replaces
/// a remote entry with the same id. Remote entries with no local counterpart
/// are always kept, including ones deleted only locally. Output order follows
/// first appearance of each id.
pub fn merge_by_id(remote: Vec<DiaryEntry>, local: Vec<DiaryEntry>) -> Vec<DiaryEntry> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<DiaryEntry> = Vec::with_capacity(remote.len() + local.len());

    for entry in remote.into_iter().chain(local) {
        match slots.get(&entry.id) {
            Some(&slot) => merged[slot] = entry,
            None => {
                slots.insert(entry.id.clone(), merged.len());
                merged.push(entry);
            }
        }
    }
    merged
}

/// Order entries by `date`, most recent first.
///
/// Dates that fail to parse have no position in time; they sort after every
/// dated entry and keep their relative order among themselves.
pub fn sort_newest_first(entries: &mut [DiaryEntry]) {
    entries.sort_by_cached_key(|entry| std::cmp::Reverse(date_sort_key(&entry.date)));
}

/// Build the user-facing listing from what each tier produced.
///
/// `remote` is `None` when the remote is not configured.
pub fn resolve_listing(
    local: Vec<DiaryEntry>,
    remote: Option<Result<Vec<DiaryEntry>, RemoteError>>,
) -> Listing {
    let (mut entries, source) = match remote {
        None => (local, ListingSource::LocalOnly),
        Some(Ok(remote)) => {
            let remote_count = remote.len();
            (
                merge_by_id(remote, local),
                ListingSource::Merged { remote_count },
            )
        }
        Some(Err(e)) => (local, ListingSource::RemoteUnavailable(e.to_string())),
    };
    sort_newest_first(&mut entries);
    Listing { entries, source }
}
