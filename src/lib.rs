pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::datajud::DatajudClient;
pub use adapters::store::RestStore;
pub use config::{CliConfig, ImportConfig};
pub use core::executor::{ImportExecutor, TracingProgress};
pub use core::normalize::normalize;
pub use core::parser::{parse_identifiers, sniff_format, InputFormat};
pub use core::reconciler::{failed_items, ready_items, PreviewReconciler};
pub use core::wizard::{ImportSession, SessionProgress, WizardStep};
pub use domain::model::{ImportItem, ImportOutcome, ItemStatus};
pub use utils::error::{ImportError, Result};
