use crate::models::CitationKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected during an extraction run
#[derive(Default)]
pub struct ExtractionStats {
    pub records_processed: AtomicU64,
    pub articles_found: AtomicU64,
    pub books_found: AtomicU64,
    pub unrecognized_records: AtomicU64,
    pub field_fallbacks: AtomicU64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: CitationKind) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
        let counter = match kind {
            CitationKind::Article => &self.articles_found,
            CitationKind::Book => &self.books_found,
            CitationKind::Unrecognized => &self.unrecognized_records,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_fallbacks(&self, count: u64) {
        self.field_fallbacks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn records(&self) -> u64 {
        self.records_processed.load(Ordering::Relaxed)
    }

    pub fn articles(&self) -> u64 {
        self.articles_found.load(Ordering::Relaxed)
    }

    pub fn books(&self) -> u64 {
        self.books_found.load(Ordering::Relaxed)
    }

    pub fn unrecognized(&self) -> u64 {
        self.unrecognized_records.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.field_fallbacks.load(Ordering::Relaxed)
    }
}
