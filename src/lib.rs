//! mt-vikunja - Import Meistertask exports into Vikunja
//!
//! Reads a Meistertask export (zip, JSON or CSV), normalizes it into one
//! canonical model and replays it against the Vikunja REST API: project,
//! kanban buckets, labels, tasks, comments, assignees and checklists.

pub mod cli;
pub mod config;
pub mod domain;
pub mod import;
pub mod remote;
pub mod source;

pub use domain::{Export, LocalId, RemoteId};
pub use import::{ImportError, ImportOptions, ImportReport, Importer};
