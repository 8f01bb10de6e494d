use lexicon::{PairStore, Table};
use std::fmt;
use tracing::warn;

/// Row count for one table, or why it could not be counted
#[derive(Debug, Clone, PartialEq)]
pub struct TableCount {
    pub table: String,
    pub rows: Result<i64, String>,
}

impl fmt::Display for TableCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rows {
            Ok(rows) => write!(f, "{}: {} rows", self.table, rows),
            Err(e) => write!(f, "{}: unavailable ({})", self.table, e),
        }
    }
}

pub async fn row_counts<S: PairStore>(store: &S, tables: &[Table]) -> Vec<TableCount> {
    let mut counts = Vec::with_capacity(tables.len());
    for &table in tables {
        let rows = store.count_rows(table).await.map_err(|e| {
            warn!(table = %table.name(), error = %e, "Could not count rows");
            e.to_string()
        });
        counts.push(TableCount {
            table: table.name(),
            rows,
        });
    }
    counts
}
