//! Page rendering for the generated site and vault.
//!
//! Renderers are pure: they take entries and aggregation groups and return
//! page text. Writing files is left to [`crate::services`].

pub mod site;
pub mod vault;

use crate::models::JournalEntry;

/// Number of recent sessions listed in navigation.
pub const MAX_RECENT_SESSIONS: usize = 20;

/// Group index file name.
pub const INDEX_FILE: &str = "index.md";

/// Groups entries by `YYYY-MM`, months in order of first appearance.
///
/// Entries arrive newest first, so months come out newest first as well.
/// Entries without a usable date are grouped under their raw date.
#[must_use]
pub fn group_by_month<'a>(entries: &'a [JournalEntry]) -> Vec<(&'a str, Vec<&'a JournalEntry>)> {
    let mut months: Vec<(&str, Vec<&JournalEntry>)> = Vec::new();

    for entry in entries {
        let month = entry.month().unwrap_or(entry.date.as_str());
        match months.iter_mut().find(|(m, _)| *m == month) {
            Some((_, members)) => members.push(entry),
            None => months.push((month, vec![entry])),
        }
    }

    months
}

/// `1 session`, `3 sessions`.
#[must_use]
pub fn session_count(n: usize) -> String {
    if n == 1 {
        "1 session".to_string()
    } else {
        format!("{n} sessions")
    }
}

/// Number of distinct entries across groups.
pub(crate) fn distinct_sessions<'a, I>(members: I) -> usize
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    let mut names: Vec<&str> = members.into_iter().map(|e| e.filename.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}
