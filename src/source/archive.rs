//! Zipped JSON exports

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use super::{parse_document, ExportError};
use crate::domain::Export;

/// Reads the first `.json` member of a zip export
pub fn read_archive(path: &Path) -> Result<Export, ExportError> {
    let read_error = |source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let mut archive = ZipArchive::new(file)?;

    for index in 0..archive.len() {
        let mut member = archive.by_index(index)?;
        if member.is_dir() || !member.name().to_ascii_lowercase().ends_with(".json") {
            continue;
        }

        let mut content = String::new();
        member.read_to_string(&mut content).map_err(read_error)?;
        return parse_document(&content);
    }

    Err(ExportError::NoDocument(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn reads_first_json_member() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.zip");
        write_zip(
            &path,
            &[
                ("readme.txt", "not the export"),
                ("export/project.JSON", r#"{"project": {"name": "First"}}"#),
                ("other.json", r#"{"project": {"name": "Second"}}"#),
            ],
        );

        let export = read_archive(&path).unwrap();
        assert_eq!(export.project.name, "First");
    }

    #[test]
    fn archive_without_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.zip");
        write_zip(&path, &[("notes.txt", "hello")]);

        assert!(matches!(read_archive(&path), Err(ExportError::NoDocument(_))));
    }

    #[test]
    fn not_a_zip_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.zip");
        std::fs::write(&path, "plain text").unwrap();

        assert!(matches!(read_archive(&path), Err(ExportError::Archive(_))));
    }
}
