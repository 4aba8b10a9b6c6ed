use crate::domain::model::{InsertOutcome, PersistedProcess, ProcessDetail, ProcessSummary};
use crate::utils::error::Result;
use async_trait::async_trait;

/// External judicial-data search API, queried one process number at a time.
///
/// `Ok(None)` means the number resolved to no hit (not found); `Err` means a
/// transport or decoding failure that the caller may surface as retryable.
#[async_trait]
pub trait ProcessLookup: Send + Sync {
    async fn fetch_summary(&self, digits: &str) -> Result<Option<ProcessSummary>>;
    async fn fetch_detail(&self, digits: &str) -> Result<Option<ProcessDetail>>;
}

/// Backend persistence for process records, keyed by the digits-only number.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    async fn find_by_number(&self, digits: &str) -> Result<Option<PersistedProcess>>;
    async fn insert(&self, digits: &str, detail: &ProcessDetail) -> Result<InsertOutcome>;
}

/// Receives the import progress percentage after each processed item.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, percent: u8);
}

pub trait ConfigProvider: Send + Sync {
    fn search_url(&self) -> &str;
    fn backend_url(&self) -> &str;
    fn tribunal(&self) -> &str;
    fn lookup_api_key(&self) -> Option<&str>;
    fn backend_api_key(&self) -> Option<&str>;
    fn hit_size(&self) -> usize;
}
