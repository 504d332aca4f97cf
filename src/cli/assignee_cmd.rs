//! `assignee-map` command

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::source::write_assignee_template;

pub fn run(output: &Output, input: &Path, path: &Path) -> Result<()> {
    let count = write_assignee_template(input, path)
        .with_context(|| format!("Failed to write assignee map template from {}", input.display()))?;
    output.verbose_ctx("assignee-map", &format!("{} distinct assignees", count));

    if output.is_json() {
        output.data(&serde_json::json!({
            "output": path.display().to_string(),
            "assignees": count,
        }));
    } else {
        output.success(&format!("Wrote assignee map template to {}", path.display()));
    }

    Ok(())
}
