use lexicon::{DictionaryEntry, Language, LanguagePairRecord};

/// Aggregate counts for one transform pass; individual drops are not logged
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformStats {
    pub input: usize,
    pub emitted: usize,
    pub dropped: usize,
}

#[derive(Debug, Default)]
pub struct Transformed {
    pub records: Vec<LanguagePairRecord>,
    pub stats: TransformStats,
}

fn transform_each<T>(
    items: &[T],
    f: impl Fn(&T) -> Option<LanguagePairRecord>,
) -> Transformed {
    let mut out = Transformed::default();
    for item in items {
        out.stats.input += 1;
        match f(item) {
            Some(record) => {
                out.stats.emitted += 1;
                out.records.push(record);
            }
            None => out.stats.dropped += 1,
        }
    }
    out
}

/// An optional field counts as present only if it has non-blank text.
/// Present values are copied as they are.
fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// Trim the key and the meaning, dropping the record if either ends up empty
pub fn finalize(mut record: LanguagePairRecord) -> Option<LanguagePairRecord> {
    let source_word = record.source_word.trim();
    let target_meaning = record.target_meaning.trim();
    if source_word.is_empty() || target_meaning.is_empty() {
        return None;
    }
    record.source_word = source_word.to_string();
    record.target_meaning = target_meaning.to_string();
    Some(record)
}

fn with_extras(
    entry: &DictionaryEntry,
    source_word: &str,
    target_meaning: &str,
) -> LanguagePairRecord {
    LanguagePairRecord {
        source_word: source_word.to_string(),
        target_meaning: target_meaning.to_string(),
        pronunciation: present(&entry.pronunciation),
        reading_aid: present(&entry.reading_aid),
        entry_type: present(&entry.entry_type),
        level: present(&entry.level),
        example: present(&entry.example),
        synonyms: present(&entry.synonyms),
    }
}

/// Same-direction mapping used when importing files: word → source, meaning → target
pub fn from_entry(entry: &DictionaryEntry) -> Option<LanguagePairRecord> {
    finalize(with_extras(entry, &entry.word, &entry.meaning))
}

/// Build the record for the reverse table: the meaning becomes the key.
///
/// Optional fields are copied only when present, so an absent reading aid
/// never clears a richer value already stored in the reverse table.
pub fn swap_direction(record: &LanguagePairRecord) -> Option<LanguagePairRecord> {
    finalize(LanguagePairRecord {
        source_word: record.target_meaning.clone(),
        target_meaning: record.source_word.clone(),
        pronunciation: present(&record.pronunciation),
        reading_aid: present(&record.reading_aid),
        entry_type: present(&record.entry_type),
        level: present(&record.level),
        example: present(&record.example),
        synonyms: present(&record.synonyms),
    })
}

/// Record for the `target` table from an enriched entry's secondary meaning
pub fn split_entry(entry: &DictionaryEntry, target: Language) -> Option<LanguagePairRecord> {
    let meaning = entry.secondary_meaning(target)?;
    finalize(with_extras(entry, &entry.word, meaning))
}

pub fn map_entries(entries: &[DictionaryEntry]) -> Transformed {
    transform_each(entries, from_entry)
}

pub fn swap_all(records: &[LanguagePairRecord]) -> Transformed {
    transform_each(records, swap_direction)
}

pub fn split_all(entries: &[DictionaryEntry], target: Language) -> Transformed {
    transform_each(entries, |entry| split_entry(entry, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_direction_scenario() {
        let mut record = LanguagePairRecord::new("水", "물");
        record.pronunciation = Some("すい".to_string());

        let swapped = swap_direction(&record).unwrap();
        let mut expected = LanguagePairRecord::new("물", "水");
        expected.pronunciation = Some("すい".to_string());
        assert_eq!(swapped, expected);
    }

    #[test]
    fn test_swap_direction_leaves_absent_fields_absent() {
        let mut record = LanguagePairRecord::new("水", "물");
        record.reading_aid = Some("  ".to_string());
        record.entry_type = Some("kanji".to_string());

        let swapped = swap_direction(&record).unwrap();
        assert_eq!(swapped.reading_aid, None);
        assert_eq!(swapped.synonyms, None);
        assert_eq!(swapped.entry_type.as_deref(), Some("kanji"));
    }

    #[test]
    fn test_present_fields_keep_their_text() {
        let mut entry = DictionaryEntry::new("水", "물");
        entry.example = Some(" 水を飲む\n".to_string());
        entry.synonyms = Some("water,  H2O ".to_string());

        let record = from_entry(&entry).unwrap();
        assert_eq!(record.example.as_deref(), Some(" 水を飲む\n"));
        assert_eq!(record.synonyms.as_deref(), Some("water,  H2O "));
    }

    #[test]
    fn test_split_scenario() {
        let entry = DictionaryEntry::new("affect", "영향을 주다")
            .with_secondary_meaning(Language::Zh, "影响")
            .with_secondary_meaning(Language::Ja, "");

        let zh = split_all(std::slice::from_ref(&entry), Language::Zh);
        assert_eq!(zh.records, vec![LanguagePairRecord::new("affect", "影响")]);

        let ja = split_all(std::slice::from_ref(&entry), Language::Ja);
        assert!(ja.records.is_empty());
        assert_eq!(ja.stats.dropped, 1);

        // Missing altogether behaves like empty
        assert!(split_entry(&entry, Language::Ko).is_none());
    }

    #[test]
    fn test_trims_key_and_meaning() {
        let entry = DictionaryEntry::new("  水 ", "\t물\n");
        let record = from_entry(&entry).unwrap();
        assert_eq!(record.source_word, "水");
        assert_eq!(record.target_meaning, "물");
    }

    #[test]
    fn test_drops_blank_key_or_meaning() {
        let entries = vec![
            DictionaryEntry::new("水", "물"),
            DictionaryEntry::new("   ", "불"),
            DictionaryEntry::new("木", ""),
        ];

        let out = map_entries(&entries);
        assert_eq!(
            out.stats,
            TransformStats {
                input: 3,
                emitted: 1,
                dropped: 2
            }
        );
        assert!(out
            .records
            .iter()
            .all(|r| !r.source_word.trim().is_empty() && !r.target_meaning.trim().is_empty()));
    }

    #[test]
    fn test_from_entry_carries_extras() {
        let mut entry = DictionaryEntry::new("学校", "학교");
        entry.reading_aid = Some("がっこう".to_string());
        entry.level = Some("N5".to_string());
        entry.example = Some("学校に行く".to_string());

        let record = from_entry(&entry).unwrap();
        assert_eq!(record.reading_aid.as_deref(), Some("がっこう"));
        assert_eq!(record.level.as_deref(), Some("N5"));
        assert_eq!(record.example.as_deref(), Some("学校に行く"));
        assert_eq!(record.pronunciation, None);
    }
}
