//! Canonical model of an export
//!
//! Contains the format-independent schema every source is normalized into,
//! plus the small pure helpers (splitting, timestamps, colors) both sides use.
//! No I/O happens here.

mod color;
mod export;
mod id;
mod text;
mod timestamp;

pub use color::{color_from_title, label_color, normalize_color};
pub use export::{
    sorted_by_sequence, Checklist, ChecklistItem, Export, ExportSummary, Label, Project, Section,
    Sequenced, Task, TaskLabel, CHECKLIST_ITEM_DONE, TASK_STATUS_DONE, TASK_STATUS_OPEN,
};
pub use id::{LocalId, RemoteId};
pub use text::{split_list, split_on};
pub use timestamp::{from_epoch_millis, parse_timestamp};
