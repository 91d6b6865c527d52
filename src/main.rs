//! sdgcount CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sdgcount::{
    commands::{cmd_analyze, cmd_build_corpus, print_report, AnalysisReport, AnalyzeOptions},
    config::{debug_from_env, Config},
    error::Result,
    keywords::{load_keyword_dir, Category},
    progress::LogWriterFactory,
    store::{
        validate_collection, validate_year, CorpusFilter, DateRange, DocColumn, ItemType, PgStore,
    },
};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sdgcount")]
#[command(version, about = "Count repository abstracts matching SDG keyword phrases", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true, env = "SDGCOUNT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output the report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the docs table from repository metadata, then count SDG matches
    Corpus {
        /// Directory containing the sdg<N> keyword files
        #[arg(short = 'd', long = "dir")]
        dir: PathBuf,

        /// Only include items owned by this collection
        #[arg(short = 'c', long, value_parser = parse_collection)]
        collection_uuid: Option<String>,

        /// Only include items of this type: Article or Thesis
        #[arg(short = 'i', long, value_parser = parse_item_type)]
        item_type: Option<ItemType>,

        /// Print each query and per-query hits; the value must be "details"
        #[arg(short = 'e', long, value_parser = parse_details)]
        details: Option<bool>,

        /// Earliest issue date, inclusive (YYYY)
        #[arg(short = 'f', long, value_parser = parse_year, requires = "to_date")]
        from_date: Option<String>,

        /// Latest issue date, exclusive (YYYY)
        #[arg(short = 't', long, value_parser = parse_year, requires = "from_date")]
        to_date: Option<String>,
    },

    /// Count SDG matches against an existing docs table
    Scan {
        /// Directory containing the sdg<N> keyword files
        dir: PathBuf,

        /// Only analyze this SDG
        #[arg(value_parser = parse_category)]
        sdg: Option<Category>,

        /// Print each query and per-query hits; the value must be "details"
        #[arg(value_parser = parse_details)]
        details: Option<bool>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_collection(value: &str) -> std::result::Result<String, String> {
    validate_collection(value).map_err(|e| e.to_string())
}

fn parse_item_type(value: &str) -> std::result::Result<ItemType, String> {
    value.parse().map_err(|e: sdgcount::Error| e.to_string())
}

fn parse_year(value: &str) -> std::result::Result<String, String> {
    validate_year(value).map_err(|e| e.to_string())
}

fn parse_category(value: &str) -> std::result::Result<Category, String> {
    value.parse().map_err(|e: sdgcount::Error| e.to_string())
}

fn parse_details(value: &str) -> std::result::Result<bool, String> {
    if value == "details" {
        Ok(true)
    } else {
        Err(format!("expected \"details\", got '{}'", value))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose || debug_from_env() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug,sqlx=warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "sdgcount", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::resolve(cli.config.as_deref())?;
    let options = AnalyzeOptions {
        print_queries: false,
        progress: std::io::stderr().is_terminal(),
    };

    let (report, details) = match cli.command {
        Commands::Corpus {
            dir,
            collection_uuid,
            item_type,
            details,
            from_date,
            to_date,
        } => {
            let keywords = load_keyword_dir(&dir, None)?;
            let dates = match (from_date, to_date) {
                (Some(from), Some(to)) => DateRange::new(&from, &to)?,
                _ => DateRange::default(),
            };
            let filter = CorpusFilter {
                collection: collection_uuid,
                dates,
                item_type,
            };
            let details = details.unwrap_or(false);

            let store = PgStore::connect(&config, DocColumn::Abstract).await?;
            let stats = cmd_build_corpus(&store, &filter).await?;

            let options = AnalyzeOptions {
                print_queries: details && !cli.json,
                ..options
            };
            let report =
                cmd_analyze(&store, &keywords, Some(stats.document_count), &options).await?;
            (report, details)
        }

        Commands::Scan { dir, sdg, details } => {
            let keywords = load_keyword_dir(&dir, sdg)?;
            let details = details.unwrap_or(false);

            let store = PgStore::connect(&config, DocColumn::Doc).await?;

            let options = AnalyzeOptions {
                print_queries: details && !cli.json,
                ..options
            };
            let report = cmd_analyze(&store, &keywords, None, &options).await?;
            (report, details)
        }

        Commands::Completions { .. } => unreachable!(),
    };

    emit(&report, details, cli.json)
}

fn emit(report: &AnalysisReport, details: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(report, details);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sdgcount").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_corpus_full_arguments() {
        let cli = parse(&[
            "corpus", "-d", "kwds", "-c", "abc-123", "-i", "Thesis", "-e", "details", "-f",
            "2015", "-t", "2020",
        ])
        .unwrap();

        match cli.command {
            Commands::Corpus {
                dir,
                collection_uuid,
                item_type,
                details,
                from_date,
                to_date,
            } => {
                assert_eq!(dir, PathBuf::from("kwds"));
                assert_eq!(collection_uuid.as_deref(), Some("abc-123"));
                assert_eq!(item_type, Some(ItemType::Thesis));
                assert_eq!(details, Some(true));
                assert_eq!(from_date.as_deref(), Some("2015"));
                assert_eq!(to_date.as_deref(), Some("2020"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_corpus_requires_dir() {
        let err = parse(&["corpus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_invalid_item_type_is_rejected_at_parse_time() {
        let err = parse(&["corpus", "-d", "kwds", "-i", "Report"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_from_date_requires_to_date() {
        let err = parse(&["corpus", "-d", "kwds", "-f", "2015"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["corpus", "-d", "kwds", "-t", "2020"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_bad_argument_values() {
        for args in [
            &["corpus", "-d", "kwds", "-c", "abc'--"][..],
            &["corpus", "-d", "kwds", "-e", "verbose"][..],
            &["corpus", "-d", "kwds", "-f", "15", "-t", "2020"][..],
            &["scan", "kwds", "thirteen"][..],
            &["scan", "kwds", "13", "everything"][..],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "args: {:?}", args);
        }
    }

    #[test]
    fn test_scan_positionals() {
        let cli = parse(&["scan", "kwds", "13", "details", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Scan { dir, sdg, details } => {
                assert_eq!(dir, PathBuf::from("kwds"));
                assert_eq!(sdg, Some(Category(13)));
                assert_eq!(details, Some(true));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = parse(&["scan", "kwds"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Scan {
                sdg: None,
                details: None,
                ..
            }
        ));
    }
}
