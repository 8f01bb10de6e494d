use crate::job::JobPhase;
use lexicon::{ErrorKind, LanguagePairRecord, PairStore, PairTable};
use std::num::NonZeroUsize;
use tracing::{error, info, warn};

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();

/// A record that could not be written even on its own
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub key: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of writing one deduplicated sequence to one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertReport {
    pub table: String,
    pub attempted: usize,
    pub succeeded: usize,
    /// Batch upsert calls issued
    pub batches: usize,
    /// Batches that failed and were retried record by record
    pub fallback_batches: usize,
    pub failures: Vec<RecordFailure>,
}

impl UpsertReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Write `records` in batches keyed on `source_word`.
///
/// A failed batch is retried one record at a time so a single bad row costs
/// only itself. Never returns an error: failures end up in the report.
pub async fn upsert_records<S: PairStore>(
    store: &S,
    pair: PairTable,
    records: &[LanguagePairRecord],
    batch_size: usize,
) -> UpsertReport {
    let table = pair.name();
    let batch_size = batch_size.max(1);
    let total = records.len().div_ceil(batch_size);
    let mut report = UpsertReport {
        table: table.clone(),
        attempted: records.len(),
        ..UpsertReport::default()
    };

    for (i, batch) in records.chunks(batch_size).enumerate() {
        let phase = JobPhase::Writing {
            batch: i + 1,
            of: total,
        };
        report.batches += 1;

        match store.upsert_pairs(pair, batch).await {
            Ok(_) => {
                report.succeeded += batch.len();
                info!(
                    %phase,
                    table = %table,
                    records = batch.len(),
                    succeeded = report.succeeded,
                    "Batch written"
                );
            }
            Err(e) => {
                warn!(
                    %phase,
                    table = %table,
                    error = %e,
                    "Batch failed, retrying records individually"
                );
                report.fallback_batches += 1;
                write_one_by_one(store, pair, batch, &mut report).await;
            }
        }
    }

    report
}

async fn write_one_by_one<S: PairStore>(
    store: &S,
    pair: PairTable,
    batch: &[LanguagePairRecord],
    report: &mut UpsertReport,
) {
    for record in batch {
        match store.upsert_pairs(pair, std::slice::from_ref(record)).await {
            Ok(_) => report.succeeded += 1,
            Err(e) => {
                error!(
                    table = %report.table,
                    key = %record.source_word,
                    kind = ?e.kind(),
                    error = %e,
                    "Record failed"
                );
                report.failures.push(RecordFailure {
                    key: record.source_word.clone(),
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }
}
