use clap::ValueEnum;

/// Separator used when joining list fields into a single CSV cell
pub const FIELD_SEPARATOR: &str = "| ";

/// Page count assigned to book citations, which carry no pagination
pub const BOOK_PAGE_COUNT: i64 = 125;

/// Upper bound for reversed page ranges under [`PagePolicy::Capped`]
pub const REVERSED_PAGE_CAP: i64 = 100;

/// Page count used when pagination cannot be resolved at all
pub const FAULT_PAGE_COUNT: i64 = 1;

/// Synthetic publication type for book citations
pub const BOOK_PUBLISH_TYPE: &str = "Book";

/// Column layout of the tabular export
pub const CSV_HEADER: [&str; 7] = [
    "passage_id",
    "pubType",
    "pubYear",
    "noPages",
    "country",
    "authors",
    "keywords",
];

/// Buffer size for CSV and JSONL writers
pub const WRITE_BUFFER_SIZE: usize = 128 * 1024;

/// How reversed ordinary page ranges (`end < start`) are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PagePolicy {
    /// Reversed ranges become `min(end, 100)`
    #[default]
    Capped,
    /// Reversed ranges keep `end - start`, which may be negative
    Uncapped,
}

/// Which citation schemas are tried, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SchemaDispatch {
    /// Journal articles first, then books
    #[default]
    ArticleThenBook,
    /// Journal articles only; anything else becomes an empty record
    ArticleOnly,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractorConfig {
    pub page_policy: PagePolicy,
    pub dispatch: SchemaDispatch,
}
