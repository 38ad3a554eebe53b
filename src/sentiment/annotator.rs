//! External sentiment annotator invocation.
//!
//! The annotator is Stanford CoreNLP, run as a blocking batch job over one
//! body file:
//!
//! ```text
//! java -cp * -Xmx2g edu.stanford.nlp.pipeline.StanfordCoreNLP \
//!     -annotators tokenize,ssplit,pos,parse,sentiment -file <body>
//! ```
//!
//! CoreNLP writes `<basename>.xml` into its working directory. Exit status and
//! stdout are logged, never interpreted; only the artifact matters.

use crate::config::AnnotatorConfig;
use crate::utils::truncate_for_log;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// CoreNLP pipeline entry point.
pub const CORENLP_MAIN_CLASS: &str = "edu.stanford.nlp.pipeline.StanfordCoreNLP";

/// Annotation stages, in pipeline order.
pub const ANNOTATORS: &[&str] = &["tokenize", "ssplit", "pos", "parse", "sentiment"];

/// Errors raised while running the annotator process.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("failed to run annotator: {0}")]
    Launch(#[from] std::io::Error),

    #[error("annotator did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Something that produces a sentence-annotated artifact for a body file.
pub trait Annotator {
    /// Annotate `input`, returning once the annotator has exited.
    async fn annotate(&self, input: &Path) -> Result<(), AnnotatorError>;
}

/// Stanford CoreNLP run through the JVM.
#[derive(Debug, Clone)]
pub struct CoreNlp {
    program: String,
    classpath: String,
    heap: String,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl CoreNlp {
    pub fn new(config: &AnnotatorConfig) -> Self {
        Self {
            program: config.program.clone(),
            classpath: config.classpath.clone(),
            heap: config.heap.clone(),
            working_dir: config.working_dir.clone(),
            timeout: config.timeout,
        }
    }

    /// Build the batch command for one input file.
    pub fn command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.working_dir)
            .arg("-cp")
            .arg(&self.classpath)
            .arg(format!("-Xmx{}", self.heap))
            .arg(CORENLP_MAIN_CLASS)
            .arg("-annotators")
            .arg(ANNOTATORS.join(","))
            .arg("-file")
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Annotator for CoreNlp {
    #[instrument(level = "info", skip_all, fields(input = %input.display()))]
    async fn annotate(&self, input: &Path) -> Result<(), AnnotatorError> {
        let t0 = Instant::now();
        let mut cmd = self.command(input);

        // kill_on_drop reaps the child when the timeout drops the future.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| AnnotatorError::TimedOut(limit))??,
            None => cmd.output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(stdout = %truncate_for_log(&stdout, 300), "Annotator stdout");
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                status = %output.status,
                stderr = %truncate_for_log(&stderr, 300),
                "Annotator exited unsuccessfully"
            );
        }
        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            status = %output.status,
            "Annotator finished"
        );
        Ok(())
    }
}
