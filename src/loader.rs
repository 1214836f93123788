use crate::models::{RecordSet, SourceLine};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Loads the line-delimited source file into an identifier -> XML mapping.
///
/// A malformed line aborts the whole load.
pub fn load(path: impl AsRef<Path>) -> Result<RecordSet> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open source file: {}", path.display()))?;
    let records = load_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load records from: {}", path.display()))?;

    info!(records = records.len(), path = %path.display(), "Loaded XML records");
    Ok(records)
}

pub fn load_from_reader<R: BufRead>(reader: R) -> Result<RecordSet> {
    let mut records = RecordSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: SourceLine = serde_json::from_str(&line)
            .with_context(|| format!("Malformed JSON on line {}", line_no))?;

        if records.insert(parsed.id.clone(), normalize_quotes(&parsed.xml)) {
            debug!(id = %parsed.id, line = line_no, "Duplicate id replaced earlier record");
        }
    }

    Ok(records)
}

/// Undoes the upstream quote mangling: drops single quotes, turns double quotes
/// into single quotes, then trims.
pub fn normalize_quotes(xml: &str) -> String {
    xml.replace('\'', "").replace('"', "'").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn normalize_drops_single_then_converts_double() {
        let raw = r#"  <DescriptorName UI="D1">Alzheimer's Disease</DescriptorName> "#;
        assert_eq!(
            normalize_quotes(raw),
            "<DescriptorName UI='D1'>Alzheimers Disease</DescriptorName>"
        );
    }

    #[test]
    fn loads_lines_in_order() -> Result<()> {
        let input = "{\"id\":\"1\",\"xml\":\"<a/>\"}\n{\"id\":\"2\",\"xml\":\" <b/> \"}\n";
        let records = load_from_reader(Cursor::new(input))?;

        let ids: Vec<_> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(records.get("2"), Some("<b/>"));
        Ok(())
    }

    #[test]
    fn duplicate_id_last_line_wins() -> Result<()> {
        let input = "{\"id\":\"1\",\"xml\":\"<old/>\"}\n{\"id\":\"1\",\"xml\":\"<new/>\"}\n";
        let records = load_from_reader(Cursor::new(input))?;
        assert_eq!(records.len(), 1);
        assert_eq!(records.get("1"), Some("<new/>"));
        Ok(())
    }

    #[test]
    fn blank_lines_are_skipped() -> Result<()> {
        let input = "\n{\"id\":\"1\",\"xml\":\"<a/>\"}\n   \n";
        let records = load_from_reader(Cursor::new(input))?;
        assert_eq!(records.len(), 1);
        Ok(())
    }

    #[test]
    fn malformed_line_is_fatal() {
        let input = "{\"id\":\"1\",\"xml\":\"<a/>\"}\nnot json\n";
        let err = load_from_reader(Cursor::new(input)).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn missing_xml_field_is_fatal() {
        let input = "{\"id\":\"1\"}\n";
        assert!(load_from_reader(Cursor::new(input)).is_err());
    }
}
