//! Dictionary store for the vocabulary app: language pair tables, the
//! enriched `words` table, and the clients that read and upsert them.

mod config;
mod language;
mod model;
mod repository;

pub use config::{Config, ConfigError, DEFAULT_DATABASE_URL, StoreConfig};
pub use language::{Language, LanguageError, PairTable, Table};
pub use model::{DictionaryEntry, LanguagePairRecord};
pub use repository::{ErrorKind, PairStore, RestStore, SqliteStore, Store, StoreError};
