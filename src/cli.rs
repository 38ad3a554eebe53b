//! Command-line interface definitions.
//!
//! Flags override the optional YAML config file; see [`crate::config`].

use crate::models::Mode;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one scraping run.
///
/// # Examples
///
/// ```sh
/// # Fetch metadata for the 2010 archive and keep the bodies on disk
/// bp_sentiment --mode all-metadata --start 9901 --end 12658 --persist-bodies
///
/// # Score the stored bodies afterwards
/// bp_sentiment --mode sentiment --start 9901 --end 12658
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Which pipeline steps to run
    #[arg(short, long, value_enum)]
    pub mode: Mode,

    /// First article id (inclusive)
    #[arg(short, long)]
    pub start: u32,

    /// Last article id (inclusive)
    #[arg(short, long)]
    pub end: u32,

    /// Write fetched article bodies to disk
    #[arg(short, long)]
    pub persist_bodies: bool,

    /// Root directory holding ScrapedFiles/ and the summaries
    #[arg(short, long, env = "BP_ROOT_DIR")]
    pub root_dir: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "BP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kill the annotator if it runs longer than this many seconds
    #[arg(long)]
    pub annotator_timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "bp_sentiment",
            "--mode",
            "all-metadata",
            "--start",
            "9901",
            "--end",
            "10000",
            "--persist-bodies",
        ]);

        assert_eq!(cli.mode, Mode::AllMetadata);
        assert_eq!(cli.start, 9901);
        assert_eq!(cli.end, 10000);
        assert!(cli.persist_bodies);
        assert!(cli.annotator_timeout_secs.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "bp_sentiment",
            "-m",
            "sentiment",
            "-s",
            "1",
            "-e",
            "2",
            "-r",
            "/tmp/sentiment",
        ]);

        assert_eq!(cli.mode, Mode::Sentiment);
        assert!(!cli.persist_bodies);
        assert_eq!(cli.root_dir, Some(PathBuf::from("/tmp/sentiment")));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let res = Cli::try_parse_from(["bp_sentiment", "-m", "metadata", "-s", "1", "-e", "2"]);
        assert!(res.is_err());
    }
}
