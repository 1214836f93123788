use thiserror::Error;

/// The part of a record a fault was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Record,
    PublishYear,
    NoPages,
    Country,
}

/// Recoverable extraction faults. Each one is mapped to a field fallback by the
/// extractor and never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldFault {
    #[error("missing node `{0}`")]
    MissingNode(&'static str),

    #[error("node `{0}` has no text")]
    EmptyText(&'static str),

    #[error("not an integer: {0:?}")]
    NotNumeric(String),

    #[error("year out of range: {0}")]
    YearOutOfRange(i64),

    #[error("malformed page range: {0:?}")]
    MalformedRange(String),

    #[error("page span {end} - {start} overflows")]
    PageOverflow { start: i64, end: i64 },

    #[error("invalid XML: {0}")]
    InvalidXml(String),

    #[error("no known citation schema matched")]
    UnrecognizedSchema,
}

/// Parses an integer the way citation text needs it: surrounding whitespace is ignored.
pub fn parse_int(text: &str) -> Result<i64, FieldFault> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| FieldFault::NotNumeric(text.to_string()))
}
