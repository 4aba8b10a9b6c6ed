pub mod executor;
pub mod normalize;
pub mod parser;
pub mod reconciler;
pub mod wizard;

pub use crate::domain::model::{ImportItem, ImportOutcome, ItemStatus, NormalizedId};
pub use crate::domain::ports::{ConfigProvider, ProcessLookup, ProcessStore, ProgressSink};
pub use crate::utils::error::Result;
