mod dedup;
mod job;
mod report;
mod source;
mod transform;
mod upsert;

use clap::{Parser, Subcommand};
use dedup::DedupPolicy;
use job::{Job, JobSettings, run_job};
use lexicon::{Config, Language, PairTable, Store, Table};
use source::Origin;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "migrate", about = "Load and reshape dictionary data in the language pair tables")]
struct Args {
    /// Records per upsert call
    #[arg(long, env = "LEXICON_BATCH_SIZE", default_value_t = upsert::DEFAULT_BATCH_SIZE)]
    batch_size: NonZeroUsize,

    /// How records with the same source word are collapsed
    #[arg(long, env = "LEXICON_DEDUP_POLICY", value_enum, default_value_t = DedupPolicy::Merge)]
    policy: DedupPolicy,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import dictionary JSON files (`{"words": [...]}`) into a pair table
    Import {
        /// Destination pair table, e.g. ja_ko
        #[arg(short, long)]
        pair: PairTable,

        /// Dictionary files, read in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Build reverse tables: ja_ko fills ko_ja with word and meaning swapped
    Reverse {
        /// Source pair tables, processed in the order given
        #[arg(required = true)]
        pairs: Vec<PairTable>,
    },

    /// Split enriched `words` rows into one pair table per target language
    Split {
        /// Language tag of the rows to read
        #[arg(short, long)]
        language: Language,

        /// Target languages, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        targets: Vec<Language>,
    },

    /// Print row counts for the words table and every pair table
    Report,
}

impl Command {
    fn into_jobs(self) -> Vec<Job> {
        match self {
            Command::Import { pair, files } => vec![Job::Import {
                origins: files.into_iter().map(Origin::File).collect(),
                pair,
            }],
            Command::Reverse { pairs } => pairs
                .into_iter()
                .map(|pair| Job::Reverse { pair })
                .collect(),
            Command::Split { language, targets } => vec![Job::Split { language, targets }],
            Command::Report => {
                let mut tables = vec![Table::Words];
                tables.extend(PairTable::all().into_iter().map(Table::Pair));
                vec![Job::Report { tables }]
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    info!(store = %config.describe(), "Connecting to store");
    let store = Store::connect(&config.store).await?;

    let settings = JobSettings {
        batch_size: args.batch_size.get(),
        policy: args.policy,
    };

    let mut failed = 0;
    for job in args.command.into_jobs() {
        let summary = run_job(&store, &job, settings).await;
        println!();
        print!("{summary}");
        failed += summary.failed_records();
    }

    if failed > 0 {
        println!();
        println!("{failed} records could not be written");
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_split_command() {
        let args = Args::try_parse_from([
            "migrate",
            "--policy",
            "last-write-wins",
            "split",
            "--language",
            "en",
            "--targets",
            "zh,ja",
        ])
        .unwrap();

        assert_eq!(args.policy, DedupPolicy::LastWriteWins);
        assert_eq!(args.batch_size.get(), 100);
        assert_eq!(
            args.command.into_jobs(),
            vec![Job::Split {
                language: Language::En,
                targets: vec![Language::Zh, Language::Ja],
            }]
        );
    }

    #[test]
    fn test_reverse_keeps_given_order() {
        let args = Args::try_parse_from(["migrate", "reverse", "ja_ko", "en_zh"]).unwrap();
        let jobs = args.command.into_jobs();
        assert_eq!(
            jobs,
            vec![
                Job::Reverse {
                    pair: "ja_ko".parse().unwrap()
                },
                Job::Reverse {
                    pair: "en_zh".parse().unwrap()
                },
            ]
        );
    }

    #[test]
    fn test_rejects_zero_batch_size_and_bad_pair() {
        assert!(Args::try_parse_from(["migrate", "--batch-size", "0", "report"]).is_err());
        assert!(Args::try_parse_from(["migrate", "reverse", "ja_ja"]).is_err());
    }

    #[test]
    fn test_report_covers_all_tables() {
        let jobs = Command::Report.into_jobs();
        let Job::Report { tables } = &jobs[0] else {
            panic!("expected report job");
        };
        assert_eq!(tables.len(), 13);
    }
}
