#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::Path;

use crate::model::Entry;

/// Enumerates the immediate children of a directory. Order is unspecified;
/// the snapshot builder sorts.
pub trait DirectoryReader {
    fn list(&self, dir: &Path) -> io::Result<Vec<Entry>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalReader;

impl DirectoryReader for LocalReader {
    fn list(&self, dir: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for item in fs::read_dir(dir)? {
            let item = item?;
            let path = item.path();
            // Follow symlinks so linked directories stay navigable; a dangling
            // link still shows up with its own metadata.
            let metadata = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(_) => item.metadata()?,
            };
            entries.push(Entry {
                name: item.file_name().to_string_lossy().to_string(),
                path,
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn lists_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        let mut file = File::create(tmp.path().join("notes.txt")).unwrap();
        file.write_all(b"hello").unwrap();

        let mut entries = LocalReader.list(tmp.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "docs");
        assert!(entries[0].is_dir);
        assert_eq!(entries[1].name, "notes.txt");
        assert_eq!(entries[1].size, 5);
        assert_eq!(entries[1].path, tmp.path().join("notes.txt"));
        assert!(entries[1].modified.is_some());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(LocalReader.list(&tmp.path().join("gone")).is_err());
    }
}
