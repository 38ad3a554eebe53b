//! Per-article orchestration and range aggregation.
//!
//! [`Pipeline::process_article`] runs the steps a mode enables for one id:
//!
//! | Mode | Steps |
//! |------|-------|
//! | `offline-metadata` | stored body length |
//! | `all-metadata` | fetch → extract → store body (if enabled) → stored body length |
//! | `sentiment` | annotate → relocate → parse |
//!
//! [`Pipeline::run`] walks the configured range one id at a time, in ascending
//! order, then writes the summary CSV unless it already exists.

use crate::config::RunConfig;
use crate::models::{ArticleId, ArticleMetadata, ArticleRecord, Mode};
use crate::outputs::csv::{self, SummaryOutcome};
use crate::scrapers::{archive, DocumentSource, FetchError};
use crate::sentiment::{self, annotator::Annotator};
use crate::store::ArticleStore;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::error::Error;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Everything one run needs, wired together.
pub struct Pipeline<'a, S, A> {
    config: &'a RunConfig,
    store: ArticleStore,
    source: S,
    annotator: A,
}

impl<'a, S, A> Pipeline<'a, S, A>
where
    S: DocumentSource,
    A: Annotator,
{
    pub fn new(config: &'a RunConfig, source: S, annotator: A) -> Self {
        Self {
            config,
            store: ArticleStore::new(&config.root_dir, &config.annotator.working_dir),
            source,
            annotator,
        }
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    /// Build the record for one id.
    ///
    /// Only a fetch failure with `abort_on_fetch_error` set is returned as an
    /// error; every other problem degrades to missing fields.
    #[instrument(level = "info", skip_all, fields(%id, mode = %self.config.mode))]
    pub async fn process_article(&self, id: ArticleId) -> Result<ArticleRecord, FetchError> {
        match self.config.mode {
            Mode::OfflineMetadata => Ok(ArticleRecord::Length {
                length: self.store.read_length(id).await,
            }),
            Mode::AllMetadata => {
                let metadata = self.fetch_metadata(id).await?;
                Ok(ArticleRecord::Metadata {
                    metadata,
                    length: self.store.read_length(id).await,
                })
            }
            Mode::Sentiment => Ok(ArticleRecord::Sentiment(
                sentiment::invoke(&self.store, &self.annotator, id).await,
            )),
        }
    }

    async fn fetch_metadata(&self, id: ArticleId) -> Result<ArticleMetadata, FetchError> {
        let raw = match self.source.fetch(id).await {
            Ok(raw) => raw,
            Err(e) if self.config.abort_on_fetch_error => {
                error!(error = %e, "Fetch failed; aborting run");
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed; continuing without metadata");
                return Ok(ArticleMetadata::default());
            }
        };

        let extraction = archive::extract(&raw, self.config.selector_scope);
        if extraction.metadata.is_empty() {
            warn!("No metadata extracted");
        }
        if self.config.persist_bodies {
            match &extraction.body {
                Some(body) => {
                    if let Err(e) = self.store.write(id, body).await {
                        warn!(error = %e, "Failed to store article body");
                    }
                }
                None => warn!("No article body to store"),
            }
        }
        Ok(extraction.metadata)
    }

    /// Process every id in the range, then write the summary.
    #[instrument(level = "info", skip_all, fields(mode = %self.config.mode, start = %self.config.start, end = %self.config.end))]
    pub async fn run(&self) -> Result<SummaryOutcome, Box<dyn Error>> {
        let t0 = Instant::now();

        let records: Vec<(ArticleId, ArticleRecord)> = stream::iter(self.config.ids())
            .then(|id| async move {
                info!(%id, "Processing article");
                self.process_article(id).await.map(|record| (id, record))
            })
            .try_collect()
            .await?;

        let path = self
            .store
            .summary_path(self.config.mode, self.config.start, self.config.end);
        let outcome = csv::write_summary(
            &path,
            self.config.mode,
            self.config.sentiment_report,
            &records,
        )
        .await?;

        let elapsed = t0.elapsed();
        info!(
            processed = records.len(),
            ?outcome,
            ?elapsed,
            "Run complete"
        );
        Ok(outcome)
    }
}
