//! Data models for scraped articles and their per-run results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleId`]: The externally assigned numeric key of one article
//! - [`Mode`]: Which part of the pipeline a run executes
//! - [`ArticleMetadata`]: Date, title and author pulled from the print page
//! - [`SentimentScore`]: Aggregate of the annotator's per-sentence scores
//! - [`ArticleRecord`]: The mode-tagged result for one identifier
//!
//! A record is built fresh for every identifier, consumed once when the summary
//! row is assembled, and then dropped.

use crate::sentiment::SentimentError;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

/// Numeric identifier of one archived article.
///
/// Identifiers are assigned by the archive; this system never generates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArticleId(pub u32);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing mode of a run.
///
/// Fetching and sentiment are deliberately separate runs: a metadata run
/// leaves bodies on disk that a later sentiment run picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Only measure bodies already stored by an earlier run.
    OfflineMetadata,
    /// Fetch, extract metadata, optionally store the body, then measure it.
    AllMetadata,
    /// Run the sentiment annotator over stored bodies.
    Sentiment,
}

impl Mode {
    /// CSV header columns for this mode.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Mode::OfflineMetadata => &["Id", "Length"],
            Mode::AllMetadata => &["Id", "Date", "Title", "Author", "Length"],
            Mode::Sentiment => &["Id", "Sentiment", "Sentences"],
        }
    }

    /// File name prefix of the summary CSV for this mode.
    pub fn summary_prefix(self) -> &'static str {
        match self {
            Mode::OfflineMetadata => "OFFLINEMETADATASUMMARY",
            Mode::AllMetadata => "METADATASUMMARY",
            Mode::Sentiment => "SENTIMENTSUMMARY",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::OfflineMetadata => "offline-metadata",
            Mode::AllMetadata => "all-metadata",
            Mode::Sentiment => "sentiment",
        };
        f.write_str(name)
    }
}

/// Header fields extracted from an article's print page.
///
/// Each field is `None` when its region was missing from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleMetadata {
    /// Publication date with commas stripped, e.g. `August 25 2010`.
    pub date: Option<String>,
    /// Headline text, verbatim.
    pub title: Option<String>,
    /// Byline with a leading `by ` removed.
    pub author: Option<String>,
}

impl ArticleMetadata {
    /// True when none of the header regions were found.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.title.is_none() && self.author.is_none()
    }
}

/// Aggregate of the annotator's per-sentence sentiment values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    /// Sum of every usable `sentimentValue`.
    pub total: f64,
    /// Number of `sentence` elements, usable or not.
    pub sentences: usize,
}

impl SentimentScore {
    /// The legacy "sentiment unavailable" pair. Only used for logging; failed
    /// runs are carried as `Err` in [`SentimentOutcome`].
    pub const SENTINEL: SentimentScore = SentimentScore {
        total: -1.0,
        sentences: 0,
    };

    /// Mean score per sentence, `0.0` when the artifact had no sentences.
    pub fn average(&self) -> f64 {
        if self.sentences == 0 {
            0.0
        } else {
            self.total / self.sentences as f64
        }
    }
}

/// Result of one sentiment invocation.
pub type SentimentOutcome = Result<SentimentScore, SentimentError>;

/// How the sentiment column of the summary is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentReport {
    /// The summed score.
    #[default]
    Total,
    /// The per-sentence mean.
    Average,
}

/// The result of processing one identifier, shaped by the run's mode.
#[derive(Debug)]
pub enum ArticleRecord {
    /// [`Mode::OfflineMetadata`]: character count of the stored body.
    Length { length: usize },
    /// [`Mode::AllMetadata`]: extracted header fields plus stored body length.
    Metadata {
        metadata: ArticleMetadata,
        length: usize,
    },
    /// [`Mode::Sentiment`]: the annotator outcome.
    Sentiment(SentimentOutcome),
}

impl ArticleRecord {
    /// Summary row values after the `Id` column, or `None` when a field the
    /// mode requires is missing.
    pub fn row_fields(&self, report: SentimentReport) -> Option<Vec<String>> {
        match self {
            ArticleRecord::Length { length } => Some(vec![length.to_string()]),
            ArticleRecord::Metadata { metadata, length } => Some(vec![
                metadata.date.clone()?,
                metadata.title.clone()?,
                metadata.author.clone()?,
                length.to_string(),
            ]),
            ArticleRecord::Sentiment(Ok(score)) => {
                let value = match report {
                    SentimentReport::Total => score.total,
                    SentimentReport::Average => score.average(),
                };
                Some(vec![value.to_string(), score.sentences.to_string()])
            }
            ArticleRecord::Sentiment(Err(_)) => None,
        }
    }
}
