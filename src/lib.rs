//! bioasq-meta: PubMed citation metadata extraction for passage corpora
//!
//! This crate turns PubMed-style citation XML, delivered one JSON record per line,
//! into per-identifier bibliographic metadata and hands it to one of two sinks:
//!
//! 1. **Load** -- Read `{"id", "xml"}` lines, repair the upstream quote mangling and
//!    build an ordered identifier -> XML mapping (last duplicate wins)
//! 2. **Extract** -- Parse each fragment into a small element tree, dispatch on the
//!    citation schema (journal article, then book) and resolve authors, year,
//!    page count, country, MeSH keywords and publication types
//! 3. **Export** -- Write flattened records to CSV, or merge structured records into
//!    a line-delimited JSON corpus keyed by `id`
//!
//! # Fault Handling
//!
//! Citation data is messy, so extraction never fails a run:
//!
//! - **Field faults** -- A missing node or unparsable number falls back to that
//!   field's default and is reported through [`diagnostics::Diagnostics`]
//! - **Record faults** -- Unreadable XML or an unknown schema yields an empty record
//! - **Load faults** -- A malformed input line aborts the load
//!
//! # Key Modules
//!
//! - [`loader`] -- Line-delimited source reader and quote repair
//! - [`parser`] -- Citation tree built from quick-xml events with path lookup
//! - [`extract`] -- Schema dispatch and per-field resolution
//! - [`pages`] -- Page-count policy for supplement, article-number and ordinary pagination
//! - [`export`] -- CSV writer
//! - [`merge`] -- Corpus merge by identifier
//! - [`models`] -- Record types and the structured/flattened output modes
//! - [`fault`] -- Field fault taxonomy
//! - [`diagnostics`] -- Fault reporting sinks
//! - [`stats`] -- Thread-safe counters for a run
//! - [`config`] -- Constants and versioned extraction strategies
//!
//! # Example Usage
//!
//! ```bash
//! # Flattened metadata as CSV
//! bioasq-meta extract --source-path pubmed.jsonl --save-path metadata.csv
//!
//! # Structured metadata merged into a corpus
//! bioasq-meta merge --source-path pubmed.jsonl --corpus passages.jsonl --output merged.jsonl
//! ```

pub mod config;
pub mod diagnostics;
pub mod export;
pub mod extract;
pub mod fault;
pub mod loader;
pub mod merge;
pub mod models;
pub mod pages;
pub mod parser;
pub mod stats;
