use crate::config::FIELD_SEPARATOR;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One line of the source file.
#[derive(Debug, Deserialize)]
pub struct SourceLine {
    pub id: String,
    pub xml: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub identifier: String,
    pub xml_text: String,
}

/// Identifier -> XML mapping that remembers first-appearance order.
///
/// Inserting an identifier twice replaces the XML but keeps the original position.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<RawRecord>,
    positions: FxHashMap<String, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an earlier record with the same identifier was replaced.
    pub fn insert(&mut self, identifier: String, xml_text: String) -> bool {
        if let Some(&pos) = self.positions.get(&identifier) {
            self.records[pos].xml_text = xml_text;
            return true;
        }
        self.positions.insert(identifier.clone(), self.records.len());
        self.records.push(RawRecord {
            identifier,
            xml_text,
        });
        false
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.positions
            .get(identifier)
            .map(|&pos| self.records[pos].xml_text.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[RawRecord] {
        &self.records
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationKind {
    Article,
    Book,
    #[default]
    Unrecognized,
}

/// Mode-independent extraction result for one identifier.
///
/// `keywords` is tri-state: `None` when an article carries no MeSH descriptors,
/// `Some(vec![])` for schemas without MeSH headings, populated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Citation {
    pub kind: CitationKind,
    pub authors: Vec<String>,
    pub publish_year: i32,
    pub no_pages: i64,
    pub keywords: Option<Vec<String>>,
    pub country: Option<String>,
    pub publish_type: Vec<String>,
}

impl Citation {
    /// Record used when neither schema matches or the XML is unreadable.
    pub fn empty() -> Self {
        Self {
            keywords: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn render(self, mode: OutputMode) -> MetadataRecord {
        match mode {
            OutputMode::Structured => MetadataRecord::Structured(self.into_structured()),
            OutputMode::Flattened => MetadataRecord::Flattened(self.into_flat()),
        }
    }

    pub fn into_structured(self) -> StructuredRecord {
        StructuredRecord {
            authors: self.authors,
            publish_year: self.publish_year,
            no_pages: self.no_pages,
            keywords: self.keywords,
            country: self.country,
            publish_type: self.publish_type,
        }
    }

    pub fn into_flat(self) -> FlatRecord {
        self.into_structured().to_flat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Lists stay lists, for merging into typed columns
    Structured,
    /// Lists joined with [`FIELD_SEPARATOR`], for tabular export
    Flattened,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredRecord {
    pub authors: Vec<String>,
    pub publish_year: i32,
    pub no_pages: i64,
    pub keywords: Option<Vec<String>>,
    pub country: Option<String>,
    pub publish_type: Vec<String>,
}

impl StructuredRecord {
    pub fn to_flat(&self) -> FlatRecord {
        FlatRecord {
            authors: self.authors.join(FIELD_SEPARATOR),
            publish_year: self.publish_year,
            no_pages: self.no_pages,
            keywords: self
                .keywords
                .as_ref()
                .map(|k| k.join(FIELD_SEPARATOR))
                .unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
            publish_type: self.publish_type.join(FIELD_SEPARATOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    pub authors: String,
    pub publish_year: i32,
    pub no_pages: i64,
    pub keywords: String,
    pub country: String,
    pub publish_type: String,
}

/// A record in one of the two output modes. Serializes as the inner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataRecord {
    Structured(StructuredRecord),
    Flattened(FlatRecord),
}

impl MetadataRecord {
    pub fn as_structured(&self) -> Option<&StructuredRecord> {
        match self {
            Self::Structured(r) => Some(r),
            Self::Flattened(_) => None,
        }
    }

    pub fn as_flat(&self) -> Option<&FlatRecord> {
        match self {
            Self::Flattened(r) => Some(r),
            Self::Structured(_) => None,
        }
    }

    pub fn to_flat(&self) -> FlatRecord {
        match self {
            Self::Flattened(r) => r.clone(),
            Self::Structured(r) => r.to_flat(),
        }
    }

    pub fn no_pages(&self) -> i64 {
        match self {
            Self::Flattened(r) => r.no_pages,
            Self::Structured(r) => r.no_pages,
        }
    }
}
