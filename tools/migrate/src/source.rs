use lexicon::{DictionaryEntry, Language, LanguagePairRecord, PairStore, PairTable, StoreError};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot query {table}: {source}")]
    Store { table: String, source: StoreError },
}

/// Where a batch of dictionary entries comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    /// JSON document with a top-level `words` array
    File(PathBuf),
    /// Rows of the `words` table tagged with a language
    Words(Language),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "file {}", path.display()),
            Origin::Words(language) => write!(f, "words[language={language}]"),
        }
    }
}

#[derive(Deserialize)]
struct WordsFile {
    words: Vec<DictionaryEntry>,
}

/// Parse a dictionary file of the form `{"words": [...]}`
pub fn read_file(path: &Path) -> Result<Vec<DictionaryEntry>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: WordsFile =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(parsed.words)
}

pub async fn read_words<S: PairStore>(
    store: &S,
    language: Language,
) -> Result<Vec<DictionaryEntry>, SourceError> {
    store
        .fetch_words(language)
        .await
        .map_err(|source| SourceError::Store {
            table: "words".to_string(),
            source,
        })
}

pub async fn read_pair_table<S: PairStore>(
    store: &S,
    pair: PairTable,
) -> Result<Vec<LanguagePairRecord>, SourceError> {
    store
        .fetch_pairs(pair)
        .await
        .map_err(|source| SourceError::Store {
            table: pair.name(),
            source,
        })
}

/// Read one origin; a failed origin is logged and contributes no entries
pub async fn load<S: PairStore>(store: &S, origin: &Origin) -> Vec<DictionaryEntry> {
    let result = match origin {
        Origin::File(path) => read_file(path),
        Origin::Words(language) => read_words(store, *language).await,
    };
    or_empty(result, origin)
}

/// Read every origin in order and concatenate what succeeded
pub async fn load_all<S: PairStore>(store: &S, origins: &[Origin]) -> Vec<DictionaryEntry> {
    let mut entries = Vec::new();
    for origin in origins {
        entries.extend(load(store, origin).await);
    }
    entries
}

/// Rows of an existing pair table, empty if the table cannot be read
pub async fn load_pairs<S: PairStore>(store: &S, pair: PairTable) -> Vec<LanguagePairRecord> {
    or_empty(read_pair_table(store, pair).await, &pair)
}

fn or_empty<T>(result: Result<Vec<T>, SourceError>, origin: &dyn fmt::Display) -> Vec<T> {
    match result {
        Ok(items) => {
            info!(origin = %origin, count = items.len(), "Read origin");
            items
        }
        Err(e) => {
            warn!(origin = %origin, error = %e, "Origin failed, continuing without it");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::map_entries;
    use lexicon::SqliteStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_file_words_array() {
        let file = write_json(
            r#"{"words": [
                {"word": "水", "meaning": "물", "hiragana": "みず"},
                {"word": "火", "meaning": "불"}
            ]}"#,
        );

        let entries = read_file(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].reading_aid.as_deref(), Some("みず"));
        assert_eq!(entries[1].word, "火");
    }

    #[test]
    fn test_read_file_missing() {
        let err = read_file(Path::new("/nonexistent/words.json")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_read_file_malformed() {
        let file = write_json(r#"{"words": [ {"word": "水" "#);
        assert!(matches!(
            read_file(file.path()),
            Err(SourceError::Parse { .. })
        ));

        let file = write_json(r#"{"entries": []}"#);
        assert!(matches!(
            read_file(file.path()),
            Err(SourceError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_entries_missing_fields_do_not_sink_the_file() {
        let store = SqliteStore::connect(":memory:").await.unwrap();
        let file = write_json(
            r#"{"words": [
                {"word": "水", "meaning": "물"},
                {"word": "火"},
                {"word": "木", "meaning": null}
            ]}"#,
        );

        let entries = load_all(&store, &[Origin::File(file.path().to_path_buf())]).await;
        assert_eq!(entries.len(), 3);

        let out = map_entries(&entries);
        assert_eq!(out.records, vec![LanguagePairRecord::new("水", "물")]);
        assert_eq!(out.stats.dropped, 2);
    }

    #[tokio::test]
    async fn test_failed_origin_does_not_stop_others() {
        let store = SqliteStore::connect(":memory:").await.unwrap();
        let good = write_json(r#"{"words": [{"word": "水", "meaning": "물"}]}"#);
        let origins = vec![
            Origin::File(PathBuf::from("/nonexistent/words.json")),
            Origin::File(good.path().to_path_buf()),
        ];

        let entries = load_all(&store, &origins).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].meaning, "물");
    }
}
