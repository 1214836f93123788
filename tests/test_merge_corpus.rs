//! Tests for merging structured metadata into a passage corpus.
//!
//! The corpus is line-delimited JSON where every example carries an `id`. The
//! merge overwrites each metadata field on the matching example and leaves
//! examples without metadata untouched, preserving corpus order.

use anyhow::Result;
use bioasq_meta::config::ExtractorConfig;
use bioasq_meta::diagnostics::CollectingDiagnostics;
use bioasq_meta::extract::{run_extraction, Extractor};
use bioasq_meta::loader;
use bioasq_meta::merge::{merge_corpus, MergeSummary};
use bioasq_meta::models::OutputMode;
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const ARTICLE: &str = "<PubmedArticleSet><PubmedArticle><MedlineCitation><Article><AuthorList><Author><ForeName>John</ForeName><LastName>Doe</LastName></Author></AuthorList><Journal><JournalIssue><PubDate><Year>2020</Year></PubDate></JournalIssue></Journal></Article><Pagination><StartPage>10</StartPage><EndPage>15</EndPage></Pagination><MedlineJournalInfo><Country>USA</Country></MedlineJournalInfo></MedlineCitation></PubmedArticle></PubmedArticleSet>";

const BOOK: &str = "<PubmedArticleSet><PubmedBookArticle><BookDocument><Book><PubDate><Year>2001</Year></PubDate><Publisher><PublisherLocation>Bethesda (MD)</PublisherLocation></Publisher></Book></BookDocument></PubmedBookArticle></PubmedArticleSet>";

/// Helper to write a JSONL file from already-built values.
fn write_jsonl(path: &Path, rows: &[Value]) -> Result<()> {
    let mut file = File::create(path)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}

fn read_jsonl(path: &Path) -> Result<Vec<Value>> {
    fs::read_to_string(path)?
        .lines()
        .map(|l| serde_json::from_str(l).map_err(anyhow::Error::from))
        .collect()
}

fn run_pipeline(dir: &Path, corpus: &[Value]) -> Result<(MergeSummary, Vec<Value>)> {
    let source = dir.join("source.jsonl");
    write_jsonl(
        &source,
        &[
            serde_json::json!({"id": "1", "xml": ARTICLE}),
            serde_json::json!({"id": "2", "xml": BOOK}),
        ],
    )?;
    let corpus_path = dir.join("corpus.jsonl");
    write_jsonl(&corpus_path, corpus)?;
    let output = dir.join("merged.jsonl");

    let records = loader::load(&source)?;
    let diag = CollectingDiagnostics::new();
    let extractor = Extractor::new(ExtractorConfig::default(), &diag);
    let metadata = run_extraction(&records, &extractor, OutputMode::Structured);

    let summary = merge_corpus(&corpus_path, &output, &metadata)?;
    Ok((summary, read_jsonl(&output)?))
}

#[test]
fn test_merge_adds_structured_fields() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let corpus = vec![
        serde_json::json!({"id": "1", "passage": "Alpha"}),
        serde_json::json!({"id": "2", "passage": "Beta"}),
    ];
    let (summary, merged) = run_pipeline(temp_dir.path(), &corpus)?;

    assert_eq!(summary.examples, 2);
    assert_eq!(summary.merged, 2);

    assert_eq!(merged[0]["passage"], "Alpha");
    assert_eq!(merged[0]["authors"], serde_json::json!(["John.Doe"]));
    assert_eq!(merged[0]["publish_year"], 2020);
    assert_eq!(merged[0]["no_pages"], 5);
    assert_eq!(merged[0]["country"], "USA");
    assert_eq!(merged[0]["publish_type"], serde_json::json!([]));
    assert!(merged[0]["keywords"].is_null());

    assert_eq!(merged[1]["publish_type"], serde_json::json!(["Book"]));
    assert_eq!(merged[1]["no_pages"], 125);
    assert_eq!(merged[1]["keywords"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_merge_preserves_corpus_order_and_unmatched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let corpus = vec![
        serde_json::json!({"id": "9", "passage": "Unmatched"}),
        serde_json::json!({"id": "2", "passage": "Beta"}),
    ];
    let (summary, merged) = run_pipeline(temp_dir.path(), &corpus)?;

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.without_metadata, 1);
    assert_eq!(merged[0], serde_json::json!({"id": "9", "passage": "Unmatched"}));
    assert_eq!(merged[1]["id"], "2");
    Ok(())
}

#[test]
fn test_merge_missing_corpus_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let result = merge_corpus(
        temp_dir.path().join("absent.jsonl"),
        temp_dir.path().join("out.jsonl"),
        &[],
    );
    assert!(result.is_err());
    Ok(())
}
