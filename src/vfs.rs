#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::model::Entry;

/// Entries directly under `prefix` inside the archive. Directories that only
/// exist implicitly (as part of a member name) are synthesized once.
pub fn read_zip_entries(archive_path: &Path, prefix: &str) -> io::Result<Vec<Entry>> {
    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;
    let base = member_path(archive_path, prefix);
    let mut entries = Vec::new();
    let mut seen_dirs: HashSet<String> = HashSet::new();
    for i in 0..archive.len() {
        let member = archive.by_index(i)?;
        let name = member.name().to_string();
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() > 1 {
            let dir_name = parts[0].to_string();
            if !dir_name.is_empty() && seen_dirs.insert(dir_name.clone()) {
                entries.push(Entry {
                    path: base.join(&dir_name),
                    name: dir_name,
                    is_dir: true,
                    size: 0,
                    modified: None,
                });
            }
            continue;
        }
        let file_name = parts[0].to_string();
        if file_name.is_empty() {
            continue;
        }
        entries.push(Entry {
            path: base.join(&file_name),
            name: file_name,
            is_dir: member.is_dir(),
            size: member.size(),
            modified: None,
        });
    }
    Ok(entries)
}

/// Identity of the archive directory `prefix`.
pub fn member_path(archive_path: &Path, prefix: &str) -> PathBuf {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        archive_path.to_path_buf()
    } else {
        archive_path.join(trimmed)
    }
}

/// `None` once the archive root is reached.
pub fn zip_parent_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('/') {
        Some((parent, _)) => Some(format!("{parent}/")),
        None => Some(String::new()),
    }
}

pub fn zip_child_prefix(prefix: &str, child_name: &str) -> String {
    format!("{prefix}{child_name}/")
}
