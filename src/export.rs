use crate::config::{CSV_HEADER, WRITE_BUFFER_SIZE};
use crate::models::MetadataRecord;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes one CSV row per identifier, flattening structured records on the way.
/// Returns the number of data rows written.
pub fn write_csv(path: impl AsRef<Path>, records: &[(String, MetadataRecord)]) -> Result<u64> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let rows = write_csv_to(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file), records)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    info!(rows, path = %path.display(), "CSV written");
    Ok(rows)
}

pub fn write_csv_to<W: Write>(writer: W, records: &[(String, MetadataRecord)]) -> Result<u64> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0u64;
    for (identifier, record) in records {
        let flat = record.to_flat();
        let year = flat.publish_year.to_string();
        let pages = flat.no_pages.to_string();
        writer.write_record([
            identifier.as_str(),
            flat.publish_type.as_str(),
            year.as_str(),
            pages.as_str(),
            flat.country.as_str(),
            flat.authors.as_str(),
            flat.keywords.as_str(),
        ])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
