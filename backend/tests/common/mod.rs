use lexicon::{DictionaryEntry, SqliteStore};

pub async fn memory_store() -> SqliteStore {
    SqliteStore::connect(":memory:").await.unwrap()
}

/// Insert a row into the enriched `words` table
pub async fn insert_word(store: &SqliteStore, language: &str, entry: &DictionaryEntry) {
    sqlx::query(
        "INSERT INTO words (word, meaning, language, pronunciation, reading_aid, entry_type, \
         level, example, synonyms, english_meaning, japanese_meaning, korean_meaning, \
         chinese_meaning) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.word)
    .bind(&entry.meaning)
    .bind(language)
    .bind(&entry.pronunciation)
    .bind(&entry.reading_aid)
    .bind(&entry.entry_type)
    .bind(&entry.level)
    .bind(&entry.example)
    .bind(&entry.synonyms)
    .bind(&entry.english_meaning)
    .bind(&entry.japanese_meaning)
    .bind(&entry.korean_meaning)
    .bind(&entry.chinese_meaning)
    .execute(store.pool())
    .await
    .unwrap();
}
