mod rest;
mod sqlite;

pub use rest::RestStore;
pub use sqlite::SqliteStore;

use crate::config::StoreConfig;
use crate::language::{Language, PairTable, Table};
use crate::model::{DictionaryEntry, LanguagePairRecord};

/// Coarse classification of a store failure, recorded per failed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The row violated a table constraint (unique, check, not null)
    Constraint,
    /// The store understood the request and refused it
    Rejected,
    /// The store could not be reached or the connection dropped
    Network,
    /// The store answered with something we could not read
    Decode,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => ErrorKind::Constraint,
                _ => ErrorKind::Rejected,
            },
            StoreError::Database(
                sqlx::Error::Io(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed,
            ) => ErrorKind::Network,
            StoreError::Database(
                sqlx::Error::ColumnDecode { .. }
                | sqlx::Error::Decode(_)
                | sqlx::Error::ColumnNotFound(_)
                | sqlx::Error::TypeNotFound { .. },
            ) => ErrorKind::Decode,
            StoreError::Database(_) | StoreError::Migrate(_) => ErrorKind::Other,
            StoreError::Http(e) if e.is_connect() || e.is_timeout() => ErrorKind::Network,
            StoreError::Http(e) if e.is_decode() => ErrorKind::Decode,
            StoreError::Http(_) => ErrorKind::Other,
            StoreError::Rejected { status, message } => {
                if rest::is_constraint_violation(*status, message) {
                    ErrorKind::Constraint
                } else {
                    ErrorKind::Rejected
                }
            }
            StoreError::Decode(_) => ErrorKind::Decode,
        }
    }
}

/// Destination and table origin for the migration jobs.
///
/// One handle is constructed per job invocation and passed to every stage.
#[allow(async_fn_in_trait)]
pub trait PairStore {
    /// All `words` rows tagged with `language`
    async fn fetch_words(&self, language: Language) -> Result<Vec<DictionaryEntry>, StoreError>;

    /// All rows of a pair table
    async fn fetch_pairs(&self, pair: PairTable) -> Result<Vec<LanguagePairRecord>, StoreError>;

    /// Insert-or-update `records` keyed on `source_word` in one call.
    ///
    /// Incoming values always win for the required columns; an absent optional
    /// column keeps whatever the existing row holds.
    async fn upsert_pairs(
        &self,
        pair: PairTable,
        records: &[LanguagePairRecord],
    ) -> Result<u64, StoreError>;

    async fn count_rows(&self, table: Table) -> Result<i64, StoreError>;
}

/// The store selected by configuration
#[derive(Clone)]
pub enum Store {
    Sqlite(SqliteStore),
    Rest(RestStore),
}

impl Store {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::Sqlite { url } => Ok(Store::Sqlite(SqliteStore::connect(url).await?)),
            StoreConfig::Rest { url, api_key } => {
                Ok(Store::Rest(RestStore::new(url.clone(), api_key.clone())))
            }
        }
    }
}

impl PairStore for Store {
    async fn fetch_words(&self, language: Language) -> Result<Vec<DictionaryEntry>, StoreError> {
        match self {
            Store::Sqlite(store) => store.fetch_words(language).await,
            Store::Rest(store) => store.fetch_words(language).await,
        }
    }

    async fn fetch_pairs(&self, pair: PairTable) -> Result<Vec<LanguagePairRecord>, StoreError> {
        match self {
            Store::Sqlite(store) => store.fetch_pairs(pair).await,
            Store::Rest(store) => store.fetch_pairs(pair).await,
        }
    }

    async fn upsert_pairs(
        &self,
        pair: PairTable,
        records: &[LanguagePairRecord],
    ) -> Result<u64, StoreError> {
        match self {
            Store::Sqlite(store) => store.upsert_pairs(pair, records).await,
            Store::Rest(store) => store.upsert_pairs(pair, records).await,
        }
    }

    async fn count_rows(&self, table: Table) -> Result<i64, StoreError> {
        match self {
            Store::Sqlite(store) => store.count_rows(table).await,
            Store::Rest(store) => store.count_rows(table).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_constraint_kind() {
        let err = StoreError::Rejected {
            status: 409,
            message: r#"{"code":"23505","message":"duplicate key"}"#.to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Constraint);

        let err = StoreError::Rejected {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Rejected);
    }

    #[test]
    fn test_decode_kind() {
        assert_eq!(
            StoreError::Decode("missing Content-Range".into()).kind(),
            ErrorKind::Decode
        );
    }
}
