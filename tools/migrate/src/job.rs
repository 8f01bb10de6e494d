use crate::dedup::{DedupPolicy, dedup};
use crate::report::{TableCount, row_counts};
use crate::source::{self, Origin};
use crate::transform::{self, TransformStats, Transformed};
use crate::upsert::{UpsertReport, upsert_records};
use lexicon::{DictionaryEntry, Language, PairStore, PairTable, Table};
use std::fmt;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Where a job currently is. Jobs only ever move forward through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Reading,
    Transforming,
    Deduplicating,
    Writing { batch: usize, of: usize },
    Reporting,
    Done,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Idle => f.write_str("idle"),
            JobPhase::Reading => f.write_str("reading"),
            JobPhase::Transforming => f.write_str("transforming"),
            JobPhase::Deduplicating => f.write_str("deduplicating"),
            JobPhase::Writing { batch, of } => write!(f, "writing {batch}/{of}"),
            JobPhase::Reporting => f.write_str("reporting"),
            JobPhase::Done => f.write_str("done"),
        }
    }
}

/// One batch job, mirroring the manual migration scripts
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Dictionary files into one pair table, word → source
    Import { origins: Vec<Origin>, pair: PairTable },
    /// Pair table AB into BA with word and meaning swapped
    Reverse { pair: PairTable },
    /// `words` rows of one language into one pair table per target language
    Split {
        language: Language,
        targets: Vec<Language>,
    },
    /// Row counts only
    Report { tables: Vec<Table> },
}

impl Job {
    pub fn name(&self) -> String {
        match self {
            Job::Import { pair, .. } => format!("import {pair}"),
            Job::Reverse { pair } => format!("reverse {pair} -> {}", pair.reversed()),
            Job::Split { language, .. } => format!("split words[{language}]"),
            Job::Report { .. } => "report".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSettings {
    pub batch_size: usize,
    pub policy: DedupPolicy,
}

/// Result of transforming, deduplicating and writing into one table
#[derive(Debug, Clone, PartialEq)]
pub struct WriteStep {
    pub pair: PairTable,
    pub transform: TransformStats,
    pub deduplicated: usize,
    pub upsert: UpsertReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub name: String,
    pub run_id: Uuid,
    pub read: usize,
    pub steps: Vec<WriteStep>,
    pub counts: Vec<TableCount>,
}

impl JobSummary {
    pub fn failed_records(&self) -> usize {
        self.steps.iter().map(|s| s.upsert.failed()).sum()
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Job {} complete (run {}):", self.name, self.run_id)?;
        if !self.steps.is_empty() {
            writeln!(f, "  Read from origins:            {}", self.read)?;
        }
        for step in &self.steps {
            let t = step.transform;
            let u = &step.upsert;
            writeln!(f, "  {}:", step.pair)?;
            writeln!(
                f,
                "    Transformed:                {} in, {} out, {} dropped",
                t.input, t.emitted, t.dropped
            )?;
            writeln!(f, "    After deduplication:        {}", step.deduplicated)?;
            writeln!(
                f,
                "    Written:                    {}/{} ({} batches, {} retried)",
                u.succeeded, u.attempted, u.batches, u.fallback_batches
            )?;
            for failure in &u.failures {
                writeln!(
                    f,
                    "    Failed {} ({:?}): {}",
                    failure.key, failure.kind, failure.message
                )?;
            }
        }
        writeln!(f, "  Row counts:")?;
        for count in &self.counts {
            writeln!(f, "    {count}")?;
        }
        Ok(())
    }
}

struct Runner<'a, S> {
    store: &'a S,
    settings: JobSettings,
    phase: JobPhase,
}

impl<'a, S: PairStore> Runner<'a, S> {
    fn enter(&mut self, phase: JobPhase) {
        info!(from = %self.phase, to = %phase, "Phase");
        self.phase = phase;
    }

    /// Transform, deduplicate and write one destination table
    async fn write_step<T>(
        &mut self,
        items: &[T],
        pair: PairTable,
        transform: impl Fn(&[T]) -> Transformed,
    ) -> WriteStep {
        self.enter(JobPhase::Transforming);
        let transformed = transform(items);
        info!(
            table = %pair,
            input = transformed.stats.input,
            emitted = transformed.stats.emitted,
            dropped = transformed.stats.dropped,
            "Transformed"
        );

        self.enter(JobPhase::Deduplicating);
        let records = dedup(transformed.records, self.settings.policy);
        info!(
            table = %pair,
            policy = ?self.settings.policy,
            kept = records.len(),
            "Deduplicated"
        );

        if records.is_empty() {
            info!(table = %pair, "Nothing to write");
        } else {
            let of = records.len().div_ceil(self.settings.batch_size.max(1));
            self.enter(JobPhase::Writing { batch: 1, of });
        }
        let upsert = upsert_records(self.store, pair, &records, self.settings.batch_size).await;

        WriteStep {
            pair,
            transform: transformed.stats,
            deduplicated: records.len(),
            upsert,
        }
    }

    async fn run(&mut self, job: &Job) -> (usize, Vec<WriteStep>, Vec<Table>) {
        match job {
            Job::Import { origins, pair } => {
                self.enter(JobPhase::Reading);
                let entries = source::load_all(self.store, origins).await;
                let step = self
                    .write_step(&entries, *pair, transform::map_entries)
                    .await;
                (entries.len(), vec![step], vec![Table::Pair(*pair)])
            }
            Job::Reverse { pair } => {
                self.enter(JobPhase::Reading);
                let records = source::load_pairs(self.store, *pair).await;
                let target = pair.reversed();
                let step = self.write_step(&records, target, transform::swap_all).await;
                (
                    records.len(),
                    vec![step],
                    vec![Table::Pair(*pair), Table::Pair(target)],
                )
            }
            Job::Split { language, targets } => {
                self.enter(JobPhase::Reading);
                let entries: Vec<DictionaryEntry> =
                    source::load(self.store, &Origin::Words(*language)).await;

                let mut steps = Vec::new();
                let mut tables = vec![Table::Words];
                for &target in targets {
                    let Ok(pair) = PairTable::new(*language, target) else {
                        warn!(%language, "Skipping split into the entries' own language");
                        continue;
                    };
                    let step = self
                        .write_step(&entries, pair, |items| transform::split_all(items, target))
                        .await;
                    steps.push(step);
                    tables.push(Table::Pair(pair));
                }
                (entries.len(), steps, tables)
            }
            Job::Report { tables } => (0, Vec::new(), tables.clone()),
        }
    }
}

/// Run one job to completion. Failures inside the job are reported, not raised.
pub async fn run_job<S: PairStore>(store: &S, job: &Job, settings: JobSettings) -> JobSummary {
    let run_id = Uuid::new_v4();
    let name = job.name();
    let span = info_span!("job", name = %name, %run_id);

    async move {
        let mut runner = Runner {
            store,
            settings,
            phase: JobPhase::Idle,
        };

        let (read, steps, tables) = runner.run(job).await;

        runner.enter(JobPhase::Reporting);
        let counts = row_counts(store, &tables).await;

        runner.enter(JobPhase::Done);
        JobSummary {
            name,
            run_id,
            read,
            steps,
            counts,
        }
    }
    .instrument(span)
    .await
}
