use clap::ValueEnum;
use lexicon::LanguagePairRecord;
use std::collections::HashMap;

/// How records sharing a `source_word` collapse into one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DedupPolicy {
    /// Keep the first record and append other meanings, comma separated
    #[default]
    Merge,
    /// Keep only the last record seen for each key
    LastWriteWins,
}

/// Collapse duplicate keys. Output keeps the first-seen order of keys.
pub fn dedup(records: Vec<LanguagePairRecord>, policy: DedupPolicy) -> Vec<LanguagePairRecord> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut kept: Vec<LanguagePairRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&record.source_word) {
            None => {
                index.insert(record.source_word.clone(), kept.len());
                kept.push(record);
            }
            Some(&i) => match policy {
                DedupPolicy::Merge => {
                    merge_meaning(&mut kept[i].target_meaning, &record.target_meaning)
                }
                DedupPolicy::LastWriteWins => kept[i] = record,
            },
        }
    }

    kept
}

/// Append `incoming` unless the accumulated text already contains it.
///
/// Containment is a substring test, so "water" is not appended to
/// "saltwater"; existing tables were built with this rule.
fn merge_meaning(accumulated: &mut String, incoming: &str) {
    if accumulated.contains(incoming) {
        return;
    }
    accumulated.push_str(", ");
    accumulated.push_str(incoming);
}
