//! Assignee name → Vikunja user ID mapping
//!
//! Exports only carry assignee display names. Operators generate a template
//! from a CSV export, fill in user IDs, and pass it back to the import.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::{read_rows, ExportError, SourceFormat, TabularRow};

/// Assignee display name → Vikunja user ID
pub type AssigneeMap = HashMap<String, i64>;

/// Loads a `{name: user_id}` JSON object
///
/// `null` values (unfilled template slots) are skipped.
pub fn load_assignee_map(path: &Path) -> Result<AssigneeMap, ExportError> {
    let content = fs::read_to_string(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: serde_json::Value = serde_json::from_str(&content)?;
    let object = raw.as_object().ok_or(ExportError::InvalidAssigneeMap)?;

    let mut map = AssigneeMap::new();
    for (name, value) in object {
        let user_id = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        map.insert(
            name.clone(),
            user_id.ok_or(ExportError::InvalidAssigneeMap)?,
        );
    }

    Ok(map)
}

/// Distinct trimmed assignee names, each mapped to an empty slot
pub fn assignee_template(rows: &[TabularRow]) -> BTreeMap<String, Option<i64>> {
    rows.iter()
        .filter_map(|row| row.get("assignee"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| (name.to_string(), None))
        .collect()
}

/// Writes an assignee map template for a CSV export; returns the number of names
pub fn write_assignee_template(input: &Path, output: &Path) -> Result<usize, ExportError> {
    if SourceFormat::detect(input) != SourceFormat::Tabular {
        return Err(ExportError::TemplateNeedsCsv(input.to_path_buf()));
    }

    let template = assignee_template(&read_rows(input)?);
    let json = serde_json::to_string_pretty(&template)?;

    fs::write(output, json).map_err(|source| ExportError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(template.len())
}
