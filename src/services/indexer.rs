//! Aggregation indexer.
//!
//! Groups regular entries by topic, key file and session type. Groups come
//! back ordered by member count (descending) then key, and carry a
//! `popular` flag once they reach [`POPULARITY_THRESHOLD`] members.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{JournalEntry, KeyFileGroup, POPULARITY_THRESHOLD, TopicGroup, TypeGroup};

/// Maximum "See also" links in a related-sessions footer.
pub const MAX_RELATED: usize = 5;

/// Entries that belong in listings: no suggestions, no continuation parts.
#[must_use]
pub fn filter_regular(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    entries.iter().filter(|e| e.is_regular()).cloned().collect()
}

/// Regular entries with at least one topic.
#[must_use]
pub fn filter_with_topics(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    entries
        .iter()
        .filter(|e| e.is_regular() && !e.topics.is_empty())
        .cloned()
        .collect()
}

/// Regular entries with at least one key file.
#[must_use]
pub fn filter_with_key_files(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    entries
        .iter()
        .filter(|e| e.is_regular() && !e.key_files.is_empty())
        .cloned()
        .collect()
}

/// Regular entries with a session type.
#[must_use]
pub fn filter_with_type(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    entries
        .iter()
        .filter(|e| e.is_regular() && !e.entry_type.is_empty())
        .cloned()
        .collect()
}

/// Groups entries under every key `keys_of` yields, keeping entry order.
///
/// An entry listing the same key twice is counted once.
fn group_by<'a, F>(entries: &'a [JournalEntry], keys_of: F) -> Vec<(String, Vec<JournalEntry>)>
where
    F: Fn(&'a JournalEntry) -> Vec<&'a str>,
{
    let mut groups: BTreeMap<&str, Vec<JournalEntry>> = BTreeMap::new();

    for entry in entries {
        let mut keys = keys_of(entry);
        keys.sort_unstable();
        keys.dedup();
        for key in keys.into_iter().filter(|k| !k.is_empty()) {
            groups.entry(key).or_default().push(entry.clone());
        }
    }

    let mut grouped: Vec<(String, Vec<JournalEntry>)> = groups
        .into_iter()
        .map(|(key, members)| (key.to_string(), members))
        .collect();
    // Stable sort keeps the BTreeMap's key order among equal counts.
    grouped.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    grouped
}

const fn is_popular(members: &[JournalEntry]) -> bool {
    members.len() >= POPULARITY_THRESHOLD
}

/// Builds topic groups.
#[must_use]
pub fn build_topic_index(entries: &[JournalEntry]) -> Vec<TopicGroup> {
    group_by(entries, |e| e.topics.iter().map(String::as_str).collect())
        .into_iter()
        .map(|(name, entries)| TopicGroup {
            popular: is_popular(&entries),
            name,
            entries,
        })
        .collect()
}

/// Builds key file groups.
#[must_use]
pub fn build_key_file_index(entries: &[JournalEntry]) -> Vec<KeyFileGroup> {
    group_by(entries, |e| e.key_files.iter().map(String::as_str).collect())
        .into_iter()
        .map(|(path, entries)| KeyFileGroup {
            popular: is_popular(&entries),
            path,
            entries,
        })
        .collect()
}

/// Builds session type groups.
#[must_use]
pub fn build_type_index(entries: &[JournalEntry]) -> Vec<TypeGroup> {
    group_by(entries, |e| vec![e.entry_type.as_str()])
        .into_iter()
        .map(|(name, entries)| TypeGroup {
            popular: is_popular(&entries),
            name,
            entries,
        })
        .collect()
}

fn distinct_topics(entry: &JournalEntry) -> BTreeSet<&str> {
    entry.topics.iter().map(String::as_str).collect()
}

/// Maps each topic to the entries carrying it.
///
/// An entry appears at most once under a topic.
#[must_use]
pub fn build_topic_lookup(entries: &[JournalEntry]) -> HashMap<String, Vec<JournalEntry>> {
    let mut lookup: HashMap<String, Vec<JournalEntry>> = HashMap::new();
    for entry in entries {
        for topic in distinct_topics(entry) {
            lookup.entry(topic.to_string()).or_default().push(entry.clone());
        }
    }
    lookup
}

/// Other entries sharing topics with `entry`, best matches first.
///
/// Ordered by distinct shared-topic count (descending) then filename. The
/// entry itself is never included and at most `max` entries are returned.
#[must_use]
pub fn collect_related(
    entry: &JournalEntry,
    lookup: &HashMap<String, Vec<JournalEntry>>,
    max: usize,
) -> Vec<JournalEntry> {
    let mut scores: HashMap<&str, (usize, &JournalEntry)> = HashMap::new();

    for topic in distinct_topics(entry) {
        let Some(members) = lookup.get(topic) else {
            continue;
        };
        for other in members.iter().filter(|o| o.filename != entry.filename) {
            scores.entry(other.filename.as_str()).or_insert((0, other)).0 += 1;
        }
    }

    let mut ranked: Vec<(usize, &JournalEntry)> = scores.into_values().collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.filename.cmp(&b.1.filename)));

    ranked
        .into_iter()
        .take(max)
        .map(|(_, e)| e.clone())
        .collect()
}
