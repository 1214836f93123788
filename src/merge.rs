use crate::config::WRITE_BUFFER_SIZE;
use crate::models::MetadataRecord;
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts from merging metadata into a corpus
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub examples: u64,
    pub merged: u64,
    pub without_metadata: u64,
    pub non_positive_pages: u64,
}

/// Merges metadata into every corpus example whose `id` has a record and writes
/// the result as a new line-delimited JSON file.
pub fn merge_corpus(
    corpus_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    metadata: &[(String, MetadataRecord)],
) -> Result<MergeSummary> {
    let corpus_path = corpus_path.as_ref();
    let output_path = output_path.as_ref();

    let reader = BufReader::new(
        File::open(corpus_path)
            .with_context(|| format!("Failed to open corpus: {}", corpus_path.display()))?,
    );
    let writer = BufWriter::with_capacity(
        WRITE_BUFFER_SIZE,
        File::create(output_path)
            .with_context(|| format!("Failed to create output: {}", output_path.display()))?,
    );

    let summary = merge_corpus_from(reader, writer, metadata)
        .with_context(|| format!("Failed to merge corpus: {}", corpus_path.display()))?;

    info!(
        examples = summary.examples,
        merged = summary.merged,
        without_metadata = summary.without_metadata,
        "Corpus merged"
    );
    Ok(summary)
}

pub fn merge_corpus_from<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    metadata: &[(String, MetadataRecord)],
) -> Result<MergeSummary> {
    let lookup: FxHashMap<&str, &MetadataRecord> = metadata
        .iter()
        .map(|(id, record)| (id.as_str(), record))
        .collect();
    let mut summary = MergeSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read corpus line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let mut example: Value = serde_json::from_str(&line)
            .with_context(|| format!("Malformed JSON on corpus line {}", line_no))?;
        let id = match example.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => bail!("Corpus line {} has no `id`", line_no),
        };
        summary.examples += 1;

        match lookup.get(id.as_str()) {
            Some(record) => {
                merge_fields(&mut example, record)
                    .with_context(|| format!("Failed to merge example {}", id))?;
                summary.merged += 1;

                if record.no_pages() <= 0 {
                    warn!(id = %id, no_pages = record.no_pages(), "Non-positive page count");
                    summary.non_positive_pages += 1;
                }
            }
            None => {
                debug!(id = %id, "No metadata for example");
                summary.without_metadata += 1;
            }
        }

        serde_json::to_writer(&mut writer, &example)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(summary)
}

/// Field-level overwrite: every metadata field replaces the example's value.
fn merge_fields(example: &mut Value, record: &MetadataRecord) -> Result<()> {
    let Value::Object(target) = example else {
        bail!("Corpus example is not a JSON object");
    };
    let Value::Object(fields) = serde_json::to_value(record)? else {
        bail!("Metadata record did not serialize to an object");
    };
    target.extend(fields);
    Ok(())
}
