use super::{PairStore, StoreError};
use crate::language::{Language, PairTable, Table};
use crate::model::{DictionaryEntry, LanguagePairRecord};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

const PAIR_COLUMNS: &str =
    "source_word, target_meaning, pronunciation, reading_aid, entry_type, level, example, synonyms";

/// Optional columns that keep their stored value when the incoming one is absent
const OPTIONAL_COLUMNS: [&str; 6] = [
    "pronunciation",
    "reading_aid",
    "entry_type",
    "level",
    "example",
    "synonyms",
];

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(url).await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn upsert_clause(table: &str) -> String {
    let mut clause = String::from(
        " ON CONFLICT(source_word) DO UPDATE SET target_meaning = excluded.target_meaning",
    );
    for column in OPTIONAL_COLUMNS {
        clause.push_str(&format!(
            ", {column} = COALESCE(excluded.{column}, {table}.{column})"
        ));
    }
    clause
}

impl PairStore for SqliteStore {
    async fn fetch_words(&self, language: Language) -> Result<Vec<DictionaryEntry>, StoreError> {
        let entries = sqlx::query_as::<_, DictionaryEntry>(
            "SELECT word, meaning, language, pronunciation, reading_aid, entry_type, level, \
             example, synonyms, english_meaning, japanese_meaning, korean_meaning, chinese_meaning \
             FROM words WHERE language = ? ORDER BY id",
        )
        .bind(language.code())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn fetch_pairs(&self, pair: PairTable) -> Result<Vec<LanguagePairRecord>, StoreError> {
        let query = format!("SELECT {PAIR_COLUMNS} FROM {} ORDER BY id", pair.name());
        let records = sqlx::query_as::<_, LanguagePairRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn upsert_pairs(
        &self,
        pair: PairTable,
        records: &[LanguagePairRecord],
    ) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let table = pair.name();
        let mut qb = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {table} ({PAIR_COLUMNS}) "));
        qb.push_values(records, |mut b, record| {
            b.push_bind(record.source_word.as_str())
                .push_bind(record.target_meaning.as_str())
                .push_bind(record.pronunciation.as_deref())
                .push_bind(record.reading_aid.as_deref())
                .push_bind(record.entry_type.as_deref())
                .push_bind(record.level.as_deref())
                .push_bind(record.example.as_deref())
                .push_bind(record.synonyms.as_deref());
        });
        qb.push(upsert_clause(&table));

        let result = qb.build().execute(&self.pool).await?;
        debug!(table = %table, rows = result.rows_affected(), "Upserted batch");
        Ok(result.rows_affected())
    }

    async fn count_rows(&self, table: Table) -> Result<i64, StoreError> {
        let query = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: (i64,) = sqlx::query_as(&query).fetch_one(&self.pool).await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_clause_keeps_existing_optionals() {
        let clause = upsert_clause("ja_ko");
        assert!(clause.starts_with(" ON CONFLICT(source_word) DO UPDATE SET"));
        assert!(clause.contains("target_meaning = excluded.target_meaning"));
        assert!(clause.contains("reading_aid = COALESCE(excluded.reading_aid, ja_ko.reading_aid)"));
        assert!(!clause.contains("DO NOTHING"));
    }
}
