use crate::language::Language;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A raw dictionary entry, read from a JSON file or the `words` table.
///
/// JSON files use camelCase keys; rows coming back from the hosted store use
/// the snake_case column names, so both spellings are accepted. A missing or
/// null `word`/`meaning` decodes as empty so the entry is dropped later
/// instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    #[serde(default, deserialize_with = "required_text")]
    pub word: String,
    #[serde(default, deserialize_with = "required_text")]
    pub meaning: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default, alias = "reading_aid", alias = "hiragana", alias = "furigana")]
    pub reading_aid: Option<String>,
    #[serde(default, alias = "entry_type", alias = "type")]
    pub entry_type: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub level: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default, deserialize_with = "synonym_text")]
    pub synonyms: Option<String>,
    #[serde(default, alias = "english_meaning")]
    pub english_meaning: Option<String>,
    #[serde(default, alias = "japanese_meaning")]
    pub japanese_meaning: Option<String>,
    #[serde(default, alias = "korean_meaning")]
    pub korean_meaning: Option<String>,
    #[serde(default, alias = "chinese_meaning")]
    pub chinese_meaning: Option<String>,
}

impl DictionaryEntry {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            ..Self::default()
        }
    }

    /// Secondary gloss attached to this entry for `language`
    pub fn secondary_meaning(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => self.english_meaning.as_deref(),
            Language::Ja => self.japanese_meaning.as_deref(),
            Language::Ko => self.korean_meaning.as_deref(),
            Language::Zh => self.chinese_meaning.as_deref(),
        }
    }

    pub fn with_secondary_meaning(
        mut self,
        language: Language,
        meaning: impl Into<String>,
    ) -> Self {
        let slot = match language {
            Language::En => &mut self.english_meaning,
            Language::Ja => &mut self.japanese_meaning,
            Language::Ko => &mut self.korean_meaning,
            Language::Zh => &mut self.chinese_meaning,
        };
        *slot = Some(meaning.into());
        self
    }
}

/// One row of a language pair table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LanguagePairRecord {
    pub source_word: String,
    pub target_meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_aid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
}

impl LanguagePairRecord {
    pub fn new(source_word: impl Into<String>, target_meaning: impl Into<String>) -> Self {
        Self {
            source_word: source_word.into(),
            target_meaning: target_meaning.into(),
            ..Self::default()
        }
    }
}

/// Accepts a string or a number (levels are sometimes written as `3`)
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(deserializer)?.unwrap_or_default())
}

/// Synonyms are stored as one comma-joined string; files carry either form
fn synonym_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    })
}
