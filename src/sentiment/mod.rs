//! Sentiment scoring of stored article bodies.
//!
//! One invocation runs the annotator over the canonical body file, moves the
//! artifact it leaves in its working directory into `ScrapedFiles/`, then
//! parses it into a [`SentimentScore`].
//!
//! # Artifact shape
//!
//! CoreNLP emits one element per sentence:
//!
//! ```xml
//! <sentence id="1" sentimentValue="1" sentiment="Positive">...</sentence>
//! ```
//!
//! A sentence contributes its value only when it has exactly three attributes,
//! the second is `sentimentValue`, and the value is an integer. This is a
//! positional contract with CoreNLP's current output; if the attribute order
//! changes every sentence scores zero. Every sentence is counted regardless.

pub mod annotator;

use crate::models::{ArticleId, SentimentOutcome, SentimentScore};
use crate::store::{ArticleStore, Artifact, Location};
use annotator::Annotator;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Name of the per-sentence score attribute.
pub const SENTIMENT_ATTRIBUTE: &[u8] = b"sentimentValue";

/// Reasons a sentiment score could not be produced.
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("annotation artifact unreadable: {0}")]
    Io(#[from] io::Error),

    #[error("annotation artifact is not well-formed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("annotation artifact has a malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("annotation artifact has no root element")]
    MissingRoot,

    #[error("annotation artifact has more than one root element")]
    MultipleRoots,

    #[error("annotation artifact ends inside an open element")]
    Unclosed,

    #[error("annotation artifact has text outside the root element")]
    TextOutsideRoot,
}

/// Score one stored article.
///
/// Never fails outright: annotator and relocation problems are logged, and
/// whatever ends up at the canonical artifact path is parsed. An unusable
/// artifact yields `Err`.
#[instrument(level = "info", skip_all, fields(%id))]
pub async fn invoke<A: Annotator>(store: &ArticleStore, annotator: &A, id: ArticleId) -> SentimentOutcome {
    let body = store.body_path(id);
    if !store.exists(id).await {
        warn!(body = %body.display(), "No stored body; annotator has nothing to read");
    }
    if let Err(e) = annotator.annotate(&body).await {
        error!(error = %e, body = %body.display(), "Annotator run failed");
    }

    let staging = store.path(id, Artifact::Annotation, Location::Staging);
    let canonical = store.path(id, Artifact::Annotation, Location::Canonical);
    match relocate(&staging, &canonical).await {
        Ok(()) => info!(
            from = %staging.display(),
            to = %canonical.display(),
            "Moved annotation artifact"
        ),
        Err(e) => warn!(
            from = %staging.display(),
            to = %canonical.display(),
            error = %e,
            "Failed to move annotation artifact"
        ),
    }

    let outcome = match fs::read_to_string(&canonical).await {
        Ok(xml) => parse_annotation(&xml),
        Err(e) => Err(SentimentError::Io(e)),
    };
    match &outcome {
        Ok(score) => info!(total = score.total, sentences = score.sentences, "Scored article"),
        Err(e) => warn!(
            error = %e,
            sentinel_total = SentimentScore::SENTINEL.total,
            "Sentiment unavailable"
        ),
    }
    outcome
}

/// Move the annotator's artifact from `staging` to `canonical`.
///
/// An empty placeholder is created when the annotator left nothing, and any
/// stale canonical artifact is removed first.
pub async fn relocate(staging: &Path, canonical: &Path) -> io::Result<()> {
    if !fs::try_exists(staging).await? {
        fs::File::create(staging).await?;
    }
    if fs::try_exists(canonical).await? {
        fs::remove_file(canonical).await?;
    }
    if let Some(parent) = canonical.parent() {
        fs::create_dir_all(parent).await?;
    }
    if fs::rename(staging, canonical).await.is_err() {
        // Staging and canonical may sit on different filesystems.
        fs::copy(staging, canonical).await?;
        fs::remove_file(staging).await?;
    }
    Ok(())
}

/// Sum the usable per-sentence scores of an annotation artifact.
pub fn parse_annotation(xml: &str) -> Result<SentimentScore, SentimentError> {
    let mut reader = Reader::from_str(xml);
    let mut score = SentimentScore {
        total: 0.0,
        sentences: 0,
    };
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open_element(&mut depth, &mut seen_root, false)?;
                tally_sentence(&e, &mut score)?;
            }
            Event::Empty(e) => {
                open_element(&mut depth, &mut seen_root, true)?;
                tally_sentence(&e, &mut score)?;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(text) if depth == 0 && text.iter().any(|b| !b.is_ascii_whitespace()) => {
                return Err(SentimentError::TextOutsideRoot);
            }
            Event::CData(_) if depth == 0 => return Err(SentimentError::TextOutsideRoot),
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(SentimentError::MissingRoot);
    }
    if depth != 0 {
        return Err(SentimentError::Unclosed);
    }
    Ok(score)
}

fn open_element(depth: &mut usize, seen_root: &mut bool, empty: bool) -> Result<(), SentimentError> {
    if *depth == 0 {
        if *seen_root {
            return Err(SentimentError::MultipleRoots);
        }
        *seen_root = true;
    }
    if !empty {
        *depth += 1;
    }
    Ok(())
}

fn tally_sentence(element: &BytesStart<'_>, score: &mut SentimentScore) -> Result<(), SentimentError> {
    if element.name().as_ref() != b"sentence" {
        return Ok(());
    }
    score.sentences += 1;

    let attributes = element.attributes().collect::<Result<Vec<_>, _>>()?;
    if attributes.len() != 3 || attributes[1].key.as_ref() != SENTIMENT_ATTRIBUTE {
        return Ok(());
    }
    let value = std::str::from_utf8(&attributes[1].value)
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok());
    if let Some(value) = value {
        score.total += value as f64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sentence(value: &str) -> String {
        format!(r#"<sentence id="1" sentimentValue="{value}" sentiment="Neutral"><tokens/></sentence>"#)
    }

    fn document(sentences: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet href="CoreNLP-to-HTML.xsl" type="text/xsl"?>
<root><document><sentences>{}</sentences></document></root>"#,
            sentences.concat()
        )
    }

    #[test]
    fn test_sums_sentence_values() {
        let xml = document(&[sentence("1"), sentence("-2"), sentence("0")]);
        let score = parse_annotation(&xml).unwrap();
        assert_eq!(score.total, -1.0);
        assert_eq!(score.sentences, 3);
    }

    #[test]
    fn test_wrong_attribute_shape_counts_but_scores_zero() {
        let xml = document(&[
            sentence("3"),
            r#"<sentence id="2" sentimentValue="4"></sentence>"#.to_string(),
            r#"<sentence sentimentValue="4" id="3" sentiment="Positive"/>"#.to_string(),
            r#"<sentence id="4" sentimentValue="x" sentiment="Positive"/>"#.to_string(),
        ]);
        let score = parse_annotation(&xml).unwrap();
        assert_eq!(score.total, 3.0);
        assert_eq!(score.sentences, 4);
    }

    #[test]
    fn test_no_sentences() {
        let score = parse_annotation("<root/>").unwrap();
        assert_eq!(score.total, 0.0);
        assert_eq!(score.sentences, 0);
    }

    #[test]
    fn test_malformed_artifacts() {
        assert!(matches!(parse_annotation(""), Err(SentimentError::MissingRoot)));
        assert!(matches!(
            parse_annotation("<root><sentence>"),
            Err(SentimentError::Unclosed) | Err(SentimentError::Xml(_))
        ));
        assert!(matches!(
            parse_annotation("<root></other>"),
            Err(SentimentError::Xml(_))
        ));
        assert!(matches!(
            parse_annotation("<a/><b/>"),
            Err(SentimentError::MultipleRoots)
        ));
        assert!(parse_annotation(r#"<sentence id="1" id="2"/>"#).is_err());
        assert!(matches!(
            parse_annotation("<root/>trailing junk"),
            Err(SentimentError::TextOutsideRoot)
        ));
        assert!(matches!(
            parse_annotation("leading junk<root/>"),
            Err(SentimentError::TextOutsideRoot)
        ));
    }

    #[test]
    fn test_whitespace_around_root_is_allowed() {
        let score = parse_annotation("\n  <root><sentence id=\"1\" sentimentValue=\"2\" sentiment=\"Positive\"/></root>\n").unwrap();
        assert_eq!(score, SentimentScore { total: 2.0, sentences: 1 });
    }

    /// Writes a fixed artifact into the staging directory, like CoreNLP would.
    struct FakeAnnotator {
        staging: PathBuf,
        artifact: Option<String>,
    }

    impl Annotator for FakeAnnotator {
        async fn annotate(&self, _input: &Path) -> Result<(), annotator::AnnotatorError> {
            match &self.artifact {
                Some(xml) => {
                    fs::write(&self.staging, xml).await?;
                    Ok(())
                }
                None => Err(io::Error::new(io::ErrorKind::NotFound, "java").into()),
            }
        }
    }

    fn store(tmp: &Path) -> ArticleStore {
        let staging = tmp.join("StanfordCoreNLP");
        std::fs::create_dir_all(&staging).unwrap();
        ArticleStore::new(tmp, &staging)
    }

    #[tokio::test]
    async fn test_invoke_relocates_and_scores() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let id = ArticleId(11839);
        let annotator = FakeAnnotator {
            staging: store.path(id, Artifact::Annotation, Location::Staging),
            artifact: Some(document(&[sentence("1"), sentence("-2"), sentence("0")])),
        };

        let score = invoke(&store, &annotator, id).await.unwrap();
        assert_eq!(score, SentimentScore { total: -1.0, sentences: 3 });
        assert!(!store.path(id, Artifact::Annotation, Location::Staging).exists());
        assert!(store.path(id, Artifact::Annotation, Location::Canonical).exists());
    }

    #[tokio::test]
    async fn test_invoke_replaces_stale_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let id = ArticleId(3);
        let canonical = store.path(id, Artifact::Annotation, Location::Canonical);
        std::fs::create_dir_all(canonical.parent().unwrap()).unwrap();
        std::fs::write(&canonical, document(&[sentence("4")])).unwrap();

        let annotator = FakeAnnotator {
            staging: store.path(id, Artifact::Annotation, Location::Staging),
            artifact: Some(document(&[sentence("-1"), sentence("-1")])),
        };
        let score = invoke(&store, &annotator, id).await.unwrap();
        assert_eq!(score, SentimentScore { total: -2.0, sentences: 2 });
    }

    #[tokio::test]
    async fn test_failed_launch_falls_through_to_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let id = ArticleId(7);
        let annotator = FakeAnnotator {
            staging: store.path(id, Artifact::Annotation, Location::Staging),
            artifact: None,
        };

        let outcome = invoke(&store, &annotator, id).await;
        assert!(matches!(outcome, Err(SentimentError::MissingRoot)));
        // The empty placeholder was still moved into place.
        let canonical = store.path(id, Artifact::Annotation, Location::Canonical);
        assert_eq!(std::fs::read_to_string(canonical).unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_staging_dir_is_io_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(tmp.path(), &tmp.path().join("absent"));
        let annotator = FakeAnnotator {
            staging: tmp.path().join("unused.xml"),
            artifact: None,
        };

        let outcome = invoke(&store, &annotator, ArticleId(8)).await;
        assert!(matches!(outcome, Err(SentimentError::Io(_))));
    }
}
