use crate::fault::{Field, FieldFault};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Receives faults the extractor recovered from.
///
/// Implementations must be shareable across worker threads.
pub trait Diagnostics: Sync {
    fn report(&self, identifier: &str, field: Field, fault: &FieldFault);
}

/// Emits every fault as a `warn!` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, identifier: &str, field: Field, fault: &FieldFault) {
        warn!(id = identifier, field = ?field, error = %fault, "Field fell back to default");
    }
}

/// Keeps faults in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    entries: Mutex<Vec<(String, Field, FieldFault)>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    // A worker that panicked mid-report leaves the list intact
    fn guard(&self) -> MutexGuard<'_, Vec<(String, Field, FieldFault)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entries(&self) -> Vec<(String, Field, FieldFault)> {
        self.guard().clone()
    }

    pub fn fields_for(&self, identifier: &str) -> Vec<Field> {
        self.entries()
            .into_iter()
            .filter(|(id, _, _)| id == identifier)
            .map(|(_, field, _)| field)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, identifier: &str, field: Field, fault: &FieldFault) {
        self.guard()
            .push((identifier.to_string(), field, fault.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_records_in_order() {
        let diag = CollectingDiagnostics::new();
        diag.report("1", Field::NoPages, &FieldFault::MissingNode("EndPage"));
        diag.report("2", Field::PublishYear, &FieldFault::EmptyText("Year"));

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.fields_for("1"), vec![Field::NoPages]);
        assert_eq!(diag.entries()[1].2, FieldFault::EmptyText("Year"));
    }

    #[test]
    fn collecting_survives_poisoned_lock() {
        let diag = CollectingDiagnostics::new();
        diag.report("1", Field::Country, &FieldFault::MissingNode("Country"));

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = diag.entries.lock().unwrap();
            panic!("worker panicked while holding the lock");
        }));
        assert!(poisoned.is_err());
        assert!(diag.entries.is_poisoned());

        diag.report("2", Field::NoPages, &FieldFault::MissingNode("EndPage"));
        assert_eq!(diag.len(), 2);
        assert_eq!(diag.fields_for("2"), vec![Field::NoPages]);
    }

    #[test]
    fn tracing_diagnostics_does_not_panic_without_subscriber() {
        TracingDiagnostics.report("1", Field::Record, &FieldFault::UnrecognizedSchema);
    }
}
