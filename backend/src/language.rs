use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("unknown language code: {0}")]
    Unknown(String),

    #[error("a pair table needs two different languages, got {0} twice")]
    SameLanguage(Language),

    #[error("malformed pair table name: {0}")]
    Malformed(String),
}

/// A language the lexicon has tables for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ja,
    Ko,
    Zh,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ja, Language::Ko, Language::Zh];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Zh => "zh",
        }
    }

    /// Column of the `words` table holding a gloss in this language
    pub fn meaning_column(self) -> &'static str {
        match self {
            Language::En => "english_meaning",
            Language::Ja => "japanese_meaning",
            Language::Ko => "korean_meaning",
            Language::Zh => "chinese_meaning",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ja" => Ok(Language::Ja),
            "ko" => Ok(Language::Ko),
            "zh" => Ok(Language::Zh),
            _ => Err(LanguageError::Unknown(s.to_string())),
        }
    }
}

/// A directed language pair, backed by a table named `{source}_{target}`.
///
/// Construction guarantees the two languages differ, so the table name is
/// always one of the fixed identifiers created by the migrations and can be
/// spliced into SQL safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairTable {
    source: Language,
    target: Language,
}

impl PairTable {
    pub fn new(source: Language, target: Language) -> Result<Self, LanguageError> {
        if source == target {
            return Err(LanguageError::SameLanguage(source));
        }
        Ok(Self { source, target })
    }

    pub fn source(&self) -> Language {
        self.source
    }

    pub fn target(&self) -> Language {
        self.target
    }

    pub fn name(&self) -> String {
        format!("{}_{}", self.source, self.target)
    }

    pub fn reversed(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }

    /// Every ordered pair of supported languages
    pub fn all() -> Vec<Self> {
        Language::ALL
            .iter()
            .flat_map(|&source| {
                Language::ALL
                    .iter()
                    .filter_map(move |&target| Self::new(source, target).ok())
            })
            .collect()
    }
}

impl fmt::Display for PairTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.source, self.target)
    }
}

impl FromStr for PairTable {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s
            .split_once(['_', '-'])
            .ok_or_else(|| LanguageError::Malformed(s.to_string()))?;
        Self::new(source.parse()?, target.parse()?)
    }
}

/// Any table the pipeline reads from or counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Words,
    Pair(PairTable),
}

impl Table {
    pub fn name(&self) -> String {
        match self {
            Table::Words => "words".to_string(),
            Table::Pair(pair) => pair.name(),
        }
    }
}

impl From<PairTable> for Table {
    fn from(pair: PairTable) -> Self {
        Table::Pair(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_table_name_and_reverse() {
        let pair = PairTable::new(Language::Ja, Language::Ko).unwrap();
        assert_eq!(pair.name(), "ja_ko");
        assert_eq!(pair.reversed().name(), "ko_ja");
        assert_eq!(pair.reversed().reversed(), pair);
    }

    #[test]
    fn test_pair_table_rejects_same_language() {
        assert_eq!(
            PairTable::new(Language::En, Language::En),
            Err(LanguageError::SameLanguage(Language::En))
        );
        assert!("zh_zh".parse::<PairTable>().is_err());
    }

    #[test]
    fn test_parse_pair_table() {
        let pair: PairTable = "en_zh".parse().unwrap();
        assert_eq!(pair.source(), Language::En);
        assert_eq!(pair.target(), Language::Zh);
        assert_eq!("ko-ja".parse::<PairTable>().unwrap().name(), "ko_ja");
        assert!(matches!(
            "enzh".parse::<PairTable>(),
            Err(LanguageError::Malformed(_))
        ));
        assert!(matches!(
            "en_fr".parse::<PairTable>(),
            Err(LanguageError::Unknown(_))
        ));
    }

    #[test]
    fn test_all_pairs() {
        let all = PairTable::all();
        assert_eq!(all.len(), 12);
        assert!(all.iter().all(|p| p.source() != p.target()));
    }
}
