//! Command-line interface for the waygraph ingestion tooling.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod ingest;

pub use error::CliError;
pub use ingest::{ConsoleProgress, IngestArgs, IngestSummary, run_ingest};

/// Run the waygraph CLI with the current process arguments.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => {
            let summary = run_ingest(&args, &mut ConsoleProgress)?;
            println!(
                "Done: {} edges and {} vertices added from {} ways \
                 ({} skipped, {} duplicates dropped)",
                summary.edges_added,
                summary.vertices_added,
                summary.ways_read,
                summary.ways_skipped,
                summary.duplicates_removed
            );
            if summary.failed_chunks > 0 {
                eprintln!("{} chunk(s) rolled back; see messages above", summary.failed_chunks);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "waygraph",
    about = "Convert road-way records into a routable vertex/edge graph",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ingest way records from JSON into the graph store.
    Ingest(IngestArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_an_ingest_invocation() {
        let cli = Cli::try_parse_from([
            "waygraph",
            "ingest",
            "--db",
            "graph.db",
            "--ways",
            "ways.json",
            "--config",
            "config.json",
            "--chunk-size",
            "500",
            "--prefix",
            "osm_",
        ])
        .expect("parse");
        let Command::Ingest(args) = cli.command;
        assert_eq!(args.chunk_size, 500);
        assert_eq!(args.prefix, "osm_");
        assert_eq!(args.suffix, "");
        assert!(!args.clean);
    }

    #[rstest]
    fn requires_the_input_paths() {
        let result = Cli::try_parse_from(["waygraph", "ingest", "--db", "graph.db"]);
        assert!(result.is_err());
    }
}
