use crate::core::reconciler::ready_items;
use crate::domain::model::{ImportItem, ImportOutcome};
use crate::domain::ports::ProgressSink;
use crate::utils::error::{ImportError, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Upload,
    Validation,
    Confirmation,
    Import,
    Complete,
}

impl WizardStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Validation => "validation",
            Self::Confirmation => "confirmation",
            Self::Import => "import",
            Self::Complete => "complete",
        }
    }
}

/// Linear wizard state for one import batch.
///
/// Transitions only move forward when their guard holds; a rejected
/// transition returns `StepRejected` and leaves the session unchanged.
/// There is no way back out of `import` or `complete` short of a full
/// `reset`.
#[derive(Debug, Clone)]
pub struct ImportSession {
    step: WizardStep,
    items: Vec<ImportItem>,
    outcome: ImportOutcome,
    progress: u8,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Upload,
            items: Vec::new(),
            outcome: ImportOutcome::default(),
            progress: 0,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn items(&self) -> &[ImportItem] {
        &self.items
    }

    /// Mutable access for the validation step's edit-and-retry affordance.
    pub fn items_mut(&mut self) -> &mut Vec<ImportItem> {
        &mut self.items
    }

    pub fn outcome(&self) -> ImportOutcome {
        self.outcome
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn ready_count(&self) -> usize {
        ready_items(&self.items).len()
    }

    /// `upload → validation`: requires at least one parsed item, of any
    /// status.
    pub fn upload(&mut self, items: Vec<ImportItem>) -> Result<()> {
        self.expect(WizardStep::Upload)?;
        if items.is_empty() {
            return Err(ImportError::StepRejected {
                from: WizardStep::Upload.as_str(),
                reason: "no process numbers were parsed from the file".to_string(),
            });
        }
        self.items = items;
        self.step = WizardStep::Validation;
        Ok(())
    }

    /// `validation → confirmation`: requires at least one `ready` item.
    pub fn confirm(&mut self) -> Result<()> {
        self.expect(WizardStep::Validation)?;
        if self.ready_count() == 0 {
            return Err(ImportError::StepRejected {
                from: WizardStep::Validation.as_str(),
                reason: "at least one resolvable process is required".to_string(),
            });
        }
        self.step = WizardStep::Confirmation;
        Ok(())
    }

    /// `confirmation → import`: unconditional.
    pub fn begin_import(&mut self) -> Result<()> {
        self.expect(WizardStep::Confirmation)?;
        self.step = WizardStep::Import;
        self.progress = 0;
        Ok(())
    }

    /// `import → complete`: invoked when the executor resolves; records the
    /// outcome and pins progress to 100.
    pub fn complete(&mut self, outcome: ImportOutcome) -> Result<()> {
        self.expect(WizardStep::Import)?;
        self.outcome = outcome;
        self.progress = 100;
        self.step = WizardStep::Complete;
        Ok(())
    }

    /// Progress updates are only accepted during `import` and never move
    /// backwards.
    pub fn set_progress(&mut self, percent: u8) {
        if self.step == WizardStep::Import && percent > self.progress {
            self.progress = percent.min(100);
        }
    }

    /// One step back; only validation and confirmation allow it.
    pub fn back(&mut self) -> Result<()> {
        match self.step {
            WizardStep::Validation => {
                self.step = WizardStep::Upload;
                Ok(())
            }
            WizardStep::Confirmation => {
                self.step = WizardStep::Validation;
                Ok(())
            }
            step => Err(ImportError::StepRejected {
                from: step.as_str(),
                reason: "no backward transition from this step".to_string(),
            }),
        }
    }

    /// Full reset to a fresh session; the only exit from `complete`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn expect(&self, step: WizardStep) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(ImportError::StepRejected {
                from: self.step.as_str(),
                reason: format!("transition requires step '{}'", step.as_str()),
            })
        }
    }
}

/// Progress sink that forwards executor percentages into a shared session,
/// so `ImportSession::progress` tracks the run as it happens.
pub struct SessionProgress {
    session: Arc<Mutex<ImportSession>>,
}

impl SessionProgress {
    pub fn new(session: Arc<Mutex<ImportSession>>) -> Self {
        Self { session }
    }
}

impl ProgressSink for SessionProgress {
    fn publish(&self, percent: u8) {
        tracing::info!("⏳ Import progress: {}%", percent);
        if let Ok(mut session) = self.session.lock() {
            session.set_progress(percent);
        }
    }
}
