//! Output generation for run summaries.
//!
//! # Submodules
//!
//! - [`csv`]: Writes one summary CSV per mode and id range
//!
//! # Output Structure
//!
//! ```text
//! root_dir/ScrapedFiles/Summary/
//! ├── OFFLINEMETADATASUMMARY_9901_12658.csv   # Id,Length
//! ├── METADATASUMMARY_9901_12658.csv          # Id,Date,Title,Author,Length
//! └── SENTIMENTSUMMARY_9901_12658.csv         # Id,Sentiment,Sentences
//! ```
//!
//! Summaries are write-once: an existing file is never touched again.

pub mod csv;
