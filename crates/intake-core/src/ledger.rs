//! Append-only list of accepted uploads, in settle order.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::LedgerEntry;

/// Process-scoped ledger. Clones share the same sequence.
#[derive(Clone, Default)]
pub struct UploadLedger {
    entries: Arc<Mutex<Vec<LedgerEntry>>>,
}

impl UploadLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Duplicates are kept.
    pub fn append(&self, entry: LedgerEntry) {
        self.lock().push(entry);
    }

    /// Ordered copy of every entry.
    #[must_use]
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.lock().clone()
    }

    /// Number of accepted uploads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of accepted sizes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.lock()
            .iter()
            .fold(0_u64, |acc, entry| acc.saturating_add(entry.byte_size))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LedgerEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, size: u64) -> LedgerEntry {
        LedgerEntry {
            filename: name.into(),
            byte_size: size,
            content_type: "image/png".into(),
        }
    }

    #[test]
    fn append_preserves_order_and_duplicates() {
        let ledger = UploadLedger::new();
        assert!(ledger.is_empty());

        ledger.append(entry("a.png", 1));
        ledger.append(entry("b.png", 2));
        ledger.append(entry("a.png", 1));

        let names: Vec<_> = ledger.entries().into_iter().map(|e| e.filename).collect();
        assert_eq!(names, vec!["a.png", "b.png", "a.png"]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.total_bytes(), 4);
    }

    #[test]
    fn clones_share_the_sequence() {
        let ledger = UploadLedger::new();
        let view = ledger.clone();
        ledger.append(entry("a.png", 1));
        assert_eq!(view.len(), 1);
    }
}
