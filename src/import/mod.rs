//! # Import Orchestrator
//!
//! Replays a normalized [`Export`](crate::domain::Export) against Vikunja.
//!
//! ## Order
//!
//! ```text
//! project ─► [purge] ─► buckets ─► labels ─► tasks
//!                                              └─► labels, assignee, comments, checklists ─► items
//! ```
//!
//! Local IDs are resolved to remote IDs as entities are created. Buckets and
//! labels are matched against existing ones by case-insensitive title; tasks
//! are never deduplicated, so re-running without a purge duplicates them.
//!
//! ## Failure policy
//!
//! Each remote step yields a [`Step`]. With `continue_on_error` a failing step
//! is reported as a warning and its dependent steps are skipped; without it the
//! first failure aborts the run. Precondition errors always abort.

mod options;
mod orchestrator;
mod report;
mod step;

use thiserror::Error;

use crate::remote::RemoteError;

pub use options::{ImportOptions, PURGE_CONFIRMATION};
pub use orchestrator::Importer;
pub use report::{ImportReport, Tally};
pub use step::Step;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Refusing to purge project without --purge-confirm YES.")]
    PurgeNotConfirmed,

    #[error("No project view found; cannot purge tasks.")]
    NoPurgeView,

    #[error("Failed to create {what} (no id returned).")]
    MissingId { what: &'static str },
}

impl ImportError {
    /// Errors that abort the run even with `continue_on_error`
    pub fn is_precondition(&self) -> bool {
        matches!(self, ImportError::PurgeNotConfirmed | ImportError::NoPurgeView)
    }
}
