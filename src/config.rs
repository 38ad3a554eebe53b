//! Run configuration: YAML file defaults merged with command-line overrides.
//!
//! Every run is described by one immutable [`RunConfig`] built in `main` and
//! passed down into the pipeline. A config file is optional; every key has a
//! default.
//!
//! ```yaml
//! root_dir: /data/sentiment
//! selector_scope: document
//! sentiment_report: total
//! abort_on_fetch_error: false
//! annotator:
//!   program: java
//!   classpath: "*"
//!   heap: 2g
//!   timeout_secs: 600
//! ```

use crate::cli::Cli;
use crate::models::{ArticleId, Mode, SentimentReport};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Default print-page URL. `{id}` is replaced with the article id.
pub const DEFAULT_URL_TEMPLATE: &str =
    "http://www.baseballprospectus.com/article.php?articleid={id}&mode=print&nocache=1494995156";

/// Errors raised while building a [`RunConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid id range {start}..={end}: ids start at 1 and start must not exceed end")]
    Range { start: u32, end: u32 },

    #[error("url_template must contain an {{id}} placeholder: {0}")]
    UrlTemplate(String),
}

/// Which part of the document the region selectors search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorScope {
    /// Search from the document root; the first match anywhere wins.
    #[default]
    Document,
    /// Search only inside the isolated article region.
    Article,
}

/// `annotator:` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnotatorFileConfig {
    pub program: Option<String>,
    pub classpath: Option<String>,
    pub heap: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// On-disk shape of the YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub root_dir: Option<PathBuf>,
    pub url_template: Option<String>,
    pub selector_scope: SelectorScope,
    pub sentiment_report: SentimentReport,
    pub abort_on_fetch_error: bool,
    pub persist_bodies: bool,
    pub annotator: AnnotatorFileConfig,
}

impl FileConfig {
    /// Load and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Settings for the external CoreNLP annotator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorConfig {
    pub program: String,
    pub classpath: String,
    pub heap: String,
    pub working_dir: PathBuf,
    pub timeout: Option<Duration>,
}

/// Immutable settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub start: ArticleId,
    pub end: ArticleId,
    pub persist_bodies: bool,
    pub root_dir: PathBuf,
    pub url_template: String,
    pub selector_scope: SelectorScope,
    pub sentiment_report: SentimentReport,
    pub abort_on_fetch_error: bool,
    pub annotator: AnnotatorConfig,
}

impl RunConfig {
    /// Build the run configuration from the CLI, reading `--config` if given.
    #[instrument(level = "debug", skip_all)]
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        debug!(?file, "Loaded file configuration");
        Self::merge(cli, file)
    }

    /// Merge file values with CLI overrides and validate the result.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        if cli.start == 0 || cli.start > cli.end {
            return Err(ConfigError::Range {
                start: cli.start,
                end: cli.end,
            });
        }

        let url_template = file
            .url_template
            .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string());
        if !url_template.contains("{id}") {
            return Err(ConfigError::UrlTemplate(url_template));
        }

        let root_dir = cli
            .root_dir
            .clone()
            .or(file.root_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let annotator = AnnotatorConfig {
            program: file.annotator.program.unwrap_or_else(|| "java".to_string()),
            classpath: file.annotator.classpath.unwrap_or_else(|| "*".to_string()),
            heap: file.annotator.heap.unwrap_or_else(|| "2g".to_string()),
            working_dir: file
                .annotator
                .working_dir
                .unwrap_or_else(|| root_dir.join("StanfordCoreNLP")),
            timeout: cli
                .annotator_timeout_secs
                .or(file.annotator.timeout_secs)
                .map(Duration::from_secs),
        };

        Ok(Self {
            mode: cli.mode,
            start: ArticleId(cli.start),
            end: ArticleId(cli.end),
            persist_bodies: cli.persist_bodies || file.persist_bodies,
            root_dir,
            url_template,
            selector_scope: file.selector_scope,
            sentiment_report: file.sentiment_report,
            abort_on_fetch_error: file.abort_on_fetch_error,
            annotator,
        })
    }

    /// Every id in the configured range, ascending.
    pub fn ids(&self) -> impl Iterator<Item = ArticleId> + use<> {
        (self.start.0..=self.end.0).map(ArticleId)
    }
}
