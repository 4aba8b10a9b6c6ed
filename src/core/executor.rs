use crate::domain::model::{ImportItem, ImportOutcome, InsertOutcome};
use crate::domain::ports::{ProcessLookup, ProcessStore, ProgressSink};
use crate::utils::error::{ImportError, Result};

/// Publishes progress through the tracing pipeline; the CLI default.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn publish(&self, percent: u8) {
        tracing::info!("⏳ Import progress: {}%", percent);
    }
}

/// Persists the resolvable subset of a batch, one item at a time.
///
/// Failures are isolated per item: a failed insert is logged and the loop
/// moves on, with no rollback and no abort. There is no cancellation once a
/// run starts.
pub struct ImportExecutor<L: ProcessLookup, S: ProcessStore, P: ProgressSink> {
    lookup: L,
    store: S,
    progress: P,
}

impl<L: ProcessLookup, S: ProcessStore, P: ProgressSink> ImportExecutor<L, S, P> {
    pub fn new(lookup: L, store: S, progress: P) -> Self {
        Self {
            lookup,
            store,
            progress,
        }
    }

    pub async fn run(&self, items: &[ImportItem]) -> ImportOutcome {
        let total = items.len();
        let mut outcome = ImportOutcome::default();

        if total == 0 {
            self.progress.publish(100);
            return outcome;
        }

        for item in items {
            if let Err(e) = self.import_one(item, &mut outcome).await {
                tracing::warn!("⚠️ import failed for '{}': {}", item.raw, e);
            }

            let done = outcome.imported + outcome.already_imported;
            let percent = ((done as f64 / total as f64) * 100.0).round() as u8;
            self.progress.publish(percent);
        }

        tracing::info!(
            "Import run finished: {} imported, {} already existed, {} total",
            outcome.imported,
            outcome.already_imported,
            total
        );
        outcome
    }

    async fn import_one(&self, item: &ImportItem, outcome: &mut ImportOutcome) -> Result<()> {
        let normalized =
            item.normalized
                .as_ref()
                .ok_or_else(|| ImportError::InvalidNumber {
                    raw: item.raw.clone(),
                    reason: "item was never normalized".to_string(),
                })?;

        if self.store.find_by_number(&normalized.digits).await?.is_some() {
            tracing::debug!("{} already exists, skipping insert", normalized.masked);
            outcome.already_imported += 1;
            return Ok(());
        }

        // Full detail is fetched here rather than reusing the preview
        // summary; the preview payload carries no movements or parties.
        let detail = self
            .lookup
            .fetch_detail(&normalized.digits)
            .await?
            .ok_or_else(|| ImportError::LookupFailed {
                message: format!("{} returned no hit at import time", normalized.masked),
            })?;

        match self.store.insert(&normalized.digits, &detail).await? {
            InsertOutcome::Inserted => outcome.imported += 1,
            InsertOutcome::AlreadyExists => outcome.already_imported += 1,
        }
        Ok(())
    }
}
