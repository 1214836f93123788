use crate::config::{
    ExtractorConfig, SchemaDispatch, BOOK_PAGE_COUNT, BOOK_PUBLISH_TYPE, FAULT_PAGE_COUNT,
};
use crate::diagnostics::Diagnostics;
use crate::fault::{parse_int, Field, FieldFault};
use crate::models::{Citation, CitationKind, MetadataRecord, OutputMode, RecordSet};
use crate::pages::{page_count, PaginationText};
use crate::parser::{CitationTree, Element};
use crate::stats::ExtractionStats;
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info};

const ARTICLE_PATH: &str = "PubmedArticle/MedlineCitation";
const BOOK_PATH: &str = "PubmedBookArticle/BookDocument/Book";

// Relative to MedlineCitation
const ARTICLE_FORENAMES: &str = "Article/AuthorList/Author/ForeName";
const ARTICLE_LASTNAMES: &str = "Article/AuthorList/Author/LastName";
const ARTICLE_PUB_DATE: &str = "Article/Journal/JournalIssue/PubDate";
const ARTICLE_PUBLISH_TYPES: &str = "Article/PublicationTypeList/PublicationType";
const MESH_DESCRIPTORS: &str = "MeshHeadingList/MeshHeading/DescriptorName";
const JOURNAL_COUNTRY: &str = "MedlineJournalInfo/Country";

// Relative to Book
const BOOK_FORENAMES: &str = "AuthorList/Author/ForeName";
const BOOK_LASTNAMES: &str = "AuthorList/Author/LastName";
const BOOK_YEAR: &str = "PubDate/Year";
const BOOK_COUNTRY: &str = "Publisher/PublisherLocation";

/// Turns citation XML into metadata records.
///
/// Field faults never escape: each one is reported to the injected
/// [`Diagnostics`] and replaced by that field's fallback value.
pub struct Extractor<'a> {
    config: ExtractorConfig,
    diagnostics: &'a dyn Diagnostics,
    stats: Option<&'a ExtractionStats>,
}

impl<'a> Extractor<'a> {
    pub fn new(config: ExtractorConfig, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: &'a ExtractionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn extract(&self, identifier: &str, xml_text: &str, mode: OutputMode) -> MetadataRecord {
        self.extract_citation(identifier, xml_text).render(mode)
    }

    pub fn extract_citation(&self, identifier: &str, xml_text: &str) -> Citation {
        let citation = self.dispatch(identifier, xml_text);
        if let Some(stats) = self.stats {
            stats.record(citation.kind);
        }
        citation
    }

    fn dispatch(&self, identifier: &str, xml_text: &str) -> Citation {
        let tree = match CitationTree::parse(xml_text) {
            Ok(tree) => tree,
            Err(fault) => {
                self.fallback(identifier, Field::Record, &fault);
                return Citation::empty();
            }
        };
        let root = tree.root();

        let citations = root.find_all(ARTICLE_PATH);
        if let Some(citation) = citations.first() {
            if citations.len() > 1 {
                debug!(
                    id = identifier,
                    matches = citations.len(),
                    "Multiple citations in record, using the first"
                );
            }
            return self.article(identifier, citation);
        }

        if self.config.dispatch == SchemaDispatch::ArticleThenBook {
            if let Some(book) = root.find(BOOK_PATH) {
                return self.book(identifier, book);
            }
        }

        self.fallback(identifier, Field::Record, &FieldFault::UnrecognizedSchema);
        Citation::empty()
    }

    fn article(&self, identifier: &str, citation: &Element) -> Citation {
        let publish_year = article_year(citation)
            .unwrap_or_else(|fault| self.fallback_value(identifier, Field::PublishYear, fault, 0));

        let no_pages = page_count(pagination_text(citation), self.config.page_policy)
            .unwrap_or_else(|fault| {
                self.fallback_value(identifier, Field::NoPages, fault, FAULT_PAGE_COUNT)
            });

        let country = node_text(citation, JOURNAL_COUNTRY, "Country")
            .map_err(|fault| self.fallback(identifier, Field::Country, &fault))
            .ok();

        let keywords = citation.texts(MESH_DESCRIPTORS);

        Citation {
            kind: CitationKind::Article,
            authors: pair_authors(
                citation.texts(ARTICLE_FORENAMES),
                citation.texts(ARTICLE_LASTNAMES),
            ),
            publish_year,
            no_pages,
            keywords: if keywords.is_empty() {
                None
            } else {
                Some(keywords)
            },
            country,
            publish_type: citation.texts(ARTICLE_PUBLISH_TYPES),
        }
    }

    fn book(&self, identifier: &str, book: &Element) -> Citation {
        let publish_year = book_year(book)
            .unwrap_or_else(|fault| self.fallback_value(identifier, Field::PublishYear, fault, 0));

        let country = node_text(book, BOOK_COUNTRY, "PublisherLocation")
            .map_err(|fault| self.fallback(identifier, Field::Country, &fault))
            .ok();

        Citation {
            kind: CitationKind::Book,
            authors: pair_authors(book.texts(BOOK_FORENAMES), book.texts(BOOK_LASTNAMES)),
            publish_year,
            no_pages: BOOK_PAGE_COUNT,
            keywords: Some(Vec::new()),
            country,
            publish_type: vec![BOOK_PUBLISH_TYPE.to_string()],
        }
    }

    fn fallback(&self, identifier: &str, field: Field, fault: &FieldFault) {
        self.diagnostics.report(identifier, field, fault);
        if let Some(stats) = self.stats {
            stats.add_fallbacks(1);
        }
    }

    fn fallback_value<T>(&self, identifier: &str, field: Field, fault: FieldFault, value: T) -> T {
        self.fallback(identifier, field, &fault);
        value
    }
}

/// Extracts every record, preserving the input order.
pub fn run_extraction(
    records: &RecordSet,
    extractor: &Extractor<'_>,
    mode: OutputMode,
) -> Vec<(String, MetadataRecord)> {
    info!(records = records.len(), mode = ?mode, "Extracting metadata");
    let pb = ProgressBar::new(records.len() as u64);

    let results: Vec<_> = records
        .as_slice()
        .par_iter()
        .map(|record| {
            let metadata = extractor.extract(&record.identifier, &record.xml_text, mode);
            pb.inc(1);
            (record.identifier.clone(), metadata)
        })
        .collect();

    pb.finish_and_clear();
    results
}

/// Joins forenames and lastnames by position; the longer list is truncated.
pub fn pair_authors(forenames: Vec<String>, lastnames: Vec<String>) -> Vec<String> {
    forenames
        .into_iter()
        .zip(lastnames)
        .map(|(first, last)| format!("{}.{}", first, last))
        .collect()
}

fn article_year(citation: &Element) -> Result<i32, FieldFault> {
    let pub_date = citation
        .find(ARTICLE_PUB_DATE)
        .ok_or(FieldFault::MissingNode("PubDate"))?;

    if let Some(year) = pub_date.find("Year") {
        let text = year.text().ok_or(FieldFault::EmptyText("Year"))?;
        return to_year(parse_int(text)?);
    }

    let medline_date = pub_date
        .find("MedlineDate")
        .and_then(Element::text)
        .ok_or(FieldFault::MissingNode("MedlineDate"))?;
    let token = medline_date
        .split(' ')
        .next()
        .and_then(|t| t.split('-').next())
        .unwrap_or_default();
    to_year(parse_int(token)?)
}

fn book_year(book: &Element) -> Result<i32, FieldFault> {
    let text = node_text(book, BOOK_YEAR, "Year")?;
    to_year(parse_int(&text)?)
}

fn to_year(value: i64) -> Result<i32, FieldFault> {
    match i32::try_from(value) {
        Ok(year) if year > 0 => Ok(year),
        _ => Err(FieldFault::YearOutOfRange(value)),
    }
}

fn node_text(parent: &Element, path: &str, node: &'static str) -> Result<String, FieldFault> {
    parent
        .find(path)
        .ok_or(FieldFault::MissingNode(node))?
        .text()
        .map(str::to_string)
        .ok_or(FieldFault::EmptyText(node))
}

/// Pagination lives under `Article`, but some exports place it directly
/// under `MedlineCitation`.
fn pagination_text(citation: &Element) -> PaginationText<'_> {
    let pagination = citation
        .find("Article/Pagination")
        .or_else(|| citation.find("Pagination"));

    let field = |name: &str| {
        pagination
            .and_then(|p| p.find(name))
            .map(|el| el.text().unwrap_or_default())
    };

    PaginationText {
        start_page: field("StartPage"),
        end_page: field("EndPage"),
        medline_pgn: field("MedlinePgn"),
    }
}
