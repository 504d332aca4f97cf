//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `import` | Replay an export against a Vikunja server (or `--dry-run` it) |
//! | `assignee-map` | Write a `{name: user_id}` template from a CSV export |
//! | `inspect` | Show what an export contains, offline |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Progress lines and a human-readable summary
//! - `json` - Only the final result, machine-parseable
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output; `import --debug-http` turns it
//! on for HTTP traffic:
//! ```bash
//! mt-vikunja import --input export.zip --debug-http
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod assignee_cmd;
mod import_cmd;
mod inspect_cmd;
mod output;

pub use app::{run, Cli, Commands};
pub use import_cmd::ImportArgs;
pub use output::{Output, OutputFormat};
