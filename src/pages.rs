//! Page-count resolution for journal pagination.
//!
//! Pagination in citation records comes in several notations:
//!
//! - **Supplement** -- `S45`..`S7`, where the end page is truncated to its last digits
//! - **Article number** -- `e1234`, the real range only survives in `MedlinePgn`
//! - **Ordinary** -- `117`..`126`, occasionally reversed in the source data
//!
//! [`page_count`] resolves all of them; any fault falls back to
//! [`FAULT_PAGE_COUNT`](crate::config::FAULT_PAGE_COUNT) in the extractor.

use crate::config::{PagePolicy, REVERSED_PAGE_CAP};
use crate::fault::{parse_int, FieldFault};
use once_cell::sync::Lazy;
use regex::Regex;

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]").unwrap());

/// Raw text of a `Pagination` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationText<'a> {
    pub start_page: Option<&'a str>,
    pub end_page: Option<&'a str>,
    pub medline_pgn: Option<&'a str>,
}

pub fn page_count(pagination: PaginationText<'_>, policy: PagePolicy) -> Result<i64, FieldFault> {
    let end_raw = pagination
        .end_page
        .ok_or(FieldFault::MissingNode("EndPage"))?;
    let start_raw = pagination
        .start_page
        .ok_or(FieldFault::MissingNode("StartPage"))?;

    let start_core = strip_alpha(start_raw);
    let end_core = strip_alpha(end_raw);

    let end = parse_int(&end_core)?;
    let start = parse_int(&start_core)?;

    if start_raw.contains('S') && end_raw.contains('S') {
        let width = end_core.chars().count();
        let truncated_start = parse_int(&trailing_chars(&start_core, width))?;
        return span(truncated_start, end);
    }

    if end_raw.contains('e') {
        let pgn = pagination
            .medline_pgn
            .ok_or(FieldFault::MissingNode("MedlinePgn"))?;
        let (first, last) = first_range(pgn)?;
        return Ok(span(first, last)?.max(1));
    }

    if end < start {
        return match policy {
            PagePolicy::Capped => Ok(end.min(REVERSED_PAGE_CAP)),
            PagePolicy::Uncapped => span(start, end),
        };
    }

    span(start, end)
}

fn span(start: i64, end: i64) -> Result<i64, FieldFault> {
    end.checked_sub(start)
        .ok_or(FieldFault::PageOverflow { start, end })
}

fn strip_alpha(text: &str) -> String {
    ALPHA_REGEX.replace_all(text, "").into_owned()
}

/// Last `n` characters of `text`, or all of it when shorter.
fn trailing_chars(text: &str, n: usize) -> String {
    let skip = text.chars().count().saturating_sub(n);
    text.chars().skip(skip).collect()
}

/// First `start-end` range of a `MedlinePgn` value such as `"e12-e19; 31-40"`.
fn first_range(pgn: &str) -> Result<(i64, i64), FieldFault> {
    let token = pgn
        .split(';')
        .next()
        .and_then(|t| t.split(',').next())
        .unwrap_or_default();

    let mut bounds = token.split('-');
    let first = bounds.next().unwrap_or_default();
    let last = bounds
        .next()
        .ok_or_else(|| FieldFault::MalformedRange(pgn.to_string()))?;

    Ok((parse_int(first)?, parse_int(last)?))
}
