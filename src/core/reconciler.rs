use crate::core::normalize::normalize;
use crate::domain::model::{ImportItem, ItemStatus};
use crate::domain::ports::ProcessLookup;
use crate::utils::error::{ImportError, Result};

pub const MSG_INVALID_NUMBER: &str = "número de processo inválido";
pub const MSG_NOT_FOUND: &str = "processo não encontrado";
pub const MSG_LOOKUP_FAILED: &str = "falha ao consultar o processo, tente novamente";

/// Resolves raw identifiers into tri-state preview items and applies
/// user-triggered corrections.
pub struct PreviewReconciler<L: ProcessLookup> {
    lookup: L,
}

impl<L: ProcessLookup> PreviewReconciler<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Normalizes and looks up each id in input order, one at a time.
    ///
    /// Each id enters the list as a `pending` item and leaves resolved:
    /// invalid numbers become `error` items without touching the network,
    /// the rest end up `ready`, `not_found` or `error` depending on the
    /// lookup result. Duplicate ids are resolved independently.
    pub async fn ingest(&self, raw_ids: Vec<String>) -> Vec<ImportItem> {
        let mut items = Vec::with_capacity(raw_ids.len());
        for raw in raw_ids {
            items.push(self.resolve(ImportItem::pending(raw)).await);
        }
        items
    }

    async fn resolve(&self, item: ImportItem) -> ImportItem {
        let normalized = match normalize(&item.raw) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::debug!("rejected identifier '{}': {}", item.raw, e);
                return ImportItem::error(item.raw, None, MSG_INVALID_NUMBER);
            }
        };

        match self.lookup.fetch_summary(&normalized.digits).await {
            Ok(Some(summary)) => ImportItem::ready(item.raw, normalized, summary),
            Ok(None) => ImportItem::not_found(item.raw, normalized, MSG_NOT_FOUND),
            Err(e) => {
                tracing::warn!("lookup failed for {}: {}", normalized.masked, e);
                ImportItem::error(item.raw, Some(normalized), MSG_LOOKUP_FAILED)
            }
        }
    }

    /// Re-resolves a corrected id. On success the item keyed by `old_raw`
    /// is removed and a fresh `ready` item for `new_raw` is appended, so a
    /// corrected entry changes both identity and list position. On any
    /// failure the list is left untouched and the error is surfaced.
    pub async fn retry(
        &self,
        items: &mut Vec<ImportItem>,
        old_raw: &str,
        new_raw: &str,
    ) -> Result<()> {
        let position = items
            .iter()
            .position(|item| item.raw == old_raw)
            .ok_or_else(|| ImportError::UnknownItem {
                raw: old_raw.to_string(),
            })?;

        let normalized = normalize(new_raw)?;
        match self.lookup.fetch_summary(&normalized.digits).await? {
            Some(summary) => {
                items.remove(position);
                items.push(ImportItem::ready(new_raw, normalized, summary));
                Ok(())
            }
            None => Err(ImportError::LookupFailed {
                message: format!("{}: {}", normalized.masked, MSG_NOT_FOUND),
            }),
        }
    }
}

/// Items resolvable into records; populates the success tab in validation.
pub fn ready_items(items: &[ImportItem]) -> Vec<&ImportItem> {
    items.iter().filter(|item| item.is_ready()).collect()
}

/// Items needing correction (not found or errored); the error tab.
pub fn failed_items(items: &[ImportItem]) -> Vec<&ImportItem> {
    items
        .iter()
        .filter(|item| matches!(item.status, ItemStatus::NotFound | ItemStatus::Error))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ProcessDetail, ProcessSummary};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MockLookup {
        summaries: HashMap<String, ProcessSummary>,
        failing: Vec<String>,
        calls: Arc<AtomicUsize>,
    }

    impl MockLookup {
        fn new() -> Self {
            Self {
                summaries: HashMap::new(),
                failing: Vec::new(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with_summary(mut self, digits: &str) -> Self {
            self.summaries.insert(
                digits.to_string(),
                ProcessSummary {
                    classe: Some("Procedimento Comum Cível".to_string()),
                    tribunal: Some("TJTO".to_string()),
                    ..Default::default()
                },
            );
            self
        }

        fn with_failure(mut self, digits: &str) -> Self {
            self.failing.push(digits.to_string());
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProcessLookup for MockLookup {
        async fn fetch_summary(&self, digits: &str) -> crate::Result<Option<ProcessSummary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|d| d == digits) {
                return Err(ImportError::LookupFailed {
                    message: "connection reset".to_string(),
                });
            }
            Ok(self.summaries.get(digits).cloned())
        }

        async fn fetch_detail(&self, _digits: &str) -> crate::Result<Option<ProcessDetail>> {
            unimplemented!("preview never fetches details")
        }
    }

    const VALID: &str = "1234567-89.2020.8.27.2729";
    const VALID_DIGITS: &str = "12345678920208272729";

    #[tokio::test]
    async fn test_ingest_invalid_number_skips_network() {
        let lookup = MockLookup::new().with_summary(VALID_DIGITS);
        let reconciler = PreviewReconciler::new(lookup);

        let items = reconciler
            .ingest(vec![VALID.to_string(), "not-a-number".to_string()])
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].status, ItemStatus::Ready);
        assert!(items[0].summary.is_some());
        assert_eq!(items[1].status, ItemStatus::Error);
        assert_eq!(items[1].message.as_deref(), Some(MSG_INVALID_NUMBER));
        // only the valid id hit the lookup client
        assert_eq!(reconciler.lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ingest_distinguishes_not_found_from_transient_error() {
        let lookup = MockLookup::new().with_failure("11111112920218272729");
        let reconciler = PreviewReconciler::new(lookup);

        let items = reconciler
            .ingest(vec![
                "7654321-98.2021.8.27.2729".to_string(),
                "1111111-29.2021.8.27.2729".to_string(),
            ])
            .await;

        assert_eq!(items[0].status, ItemStatus::NotFound);
        assert_eq!(items[0].message.as_deref(), Some(MSG_NOT_FOUND));
        assert_eq!(items[1].status, ItemStatus::Error);
        assert_eq!(items[1].message.as_deref(), Some(MSG_LOOKUP_FAILED));
    }

    #[test]
    fn test_pending_item_starts_unresolved() {
        let item = ImportItem::pending(VALID);
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.normalized.is_none());
        assert!(item.summary.is_none());
        assert!(item.message.is_none());
    }

    #[tokio::test]
    async fn test_ingest_leaves_no_pending_items() {
        let lookup = MockLookup::new().with_summary(VALID_DIGITS);
        let reconciler = PreviewReconciler::new(lookup);

        let items = reconciler
            .ingest(vec![VALID.to_string(), "bogus".to_string()])
            .await;

        assert!(items
            .iter()
            .all(|item| item.status != ItemStatus::Pending));
    }

    #[tokio::test]
    async fn test_ingest_keeps_duplicates_in_order() {
        let lookup = MockLookup::new().with_summary(VALID_DIGITS);
        let reconciler = PreviewReconciler::new(lookup);

        let items = reconciler
            .ingest(vec![VALID.to_string(), VALID.to_string()])
            .await;

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.is_ready()));
        assert_eq!(reconciler.lookup.call_count(), 2);
    }

    #[tokio::test]
    async fn test_retry_replaces_and_appends() {
        let lookup = MockLookup::new().with_summary(VALID_DIGITS);
        let reconciler = PreviewReconciler::new(lookup);

        let mut items = reconciler
            .ingest(vec!["bogus".to_string(), "also-bogus".to_string()])
            .await;
        assert_eq!(failed_items(&items).len(), 2);

        reconciler.retry(&mut items, "bogus", VALID).await.unwrap();

        // count unchanged: one removed, one appended at the end
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].raw, "also-bogus");
        assert_eq!(items[1].raw, VALID);
        assert!(items[1].is_ready());
    }

    #[tokio::test]
    async fn test_retry_failure_leaves_list_untouched() {
        let lookup = MockLookup::new();
        let reconciler = PreviewReconciler::new(lookup);

        let mut items = reconciler.ingest(vec!["bogus".to_string()]).await;
        let before = items.clone();

        // still invalid
        let err = reconciler
            .retry(&mut items, "bogus", "still-bogus")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidNumber { .. }));
        assert_eq!(items, before);

        // valid shape but no hit
        let err = reconciler.retry(&mut items, "bogus", VALID).await.unwrap_err();
        assert!(matches!(err, ImportError::LookupFailed { .. }));
        assert_eq!(items, before);
    }

    #[tokio::test]
    async fn test_retry_unknown_item() {
        let lookup = MockLookup::new().with_summary(VALID_DIGITS);
        let reconciler = PreviewReconciler::new(lookup);

        let mut items = Vec::new();
        let err = reconciler
            .retry(&mut items, "missing", VALID)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnknownItem { .. }));
    }

    #[test]
    fn test_partition_views() {
        let valid = crate::core::normalize::normalize(VALID).unwrap();
        let items = vec![
            ImportItem::ready(VALID, valid.clone(), ProcessSummary::default()),
            ImportItem::not_found("222", valid.clone(), MSG_NOT_FOUND),
            ImportItem::error("333", None, MSG_INVALID_NUMBER),
        ];

        assert_eq!(ready_items(&items).len(), 1);
        let failed = failed_items(&items);
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].raw, "222");
        assert_eq!(failed[1].raw, "333");
    }
}
