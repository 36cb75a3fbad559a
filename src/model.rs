#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One file-system object shown in a pane. `path` is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Entry {
    pub fn identity(&self) -> &Path {
        &self.path
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn is_archive(&self) -> bool {
        !self.is_dir && self.name.to_lowercase().ends_with(".zip")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Left,
    Right,
}

impl PaneId {
    pub fn opposite(self) -> Self {
        match self {
            PaneId::Left => PaneId::Right,
            PaneId::Right => PaneId::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaneId::Left => "left",
            PaneId::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    NameAsc,
    NameDesc,
    ExtAsc,
    ExtDesc,
    TimeAsc,
    TimeDesc,
    SizeAsc,
    SizeDesc,
    Unsorted,
}

impl SortMode {
    /// Next mode in the Ctrl-S rotation.
    pub fn cycle(self) -> Self {
        match self {
            SortMode::NameAsc => SortMode::NameDesc,
            SortMode::NameDesc => SortMode::ExtAsc,
            SortMode::ExtAsc => SortMode::ExtDesc,
            SortMode::ExtDesc => SortMode::TimeAsc,
            SortMode::TimeAsc => SortMode::TimeDesc,
            SortMode::TimeDesc => SortMode::SizeAsc,
            SortMode::SizeAsc => SortMode::SizeDesc,
            SortMode::SizeDesc => SortMode::Unsorted,
            SortMode::Unsorted => SortMode::NameAsc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::NameAsc => "Name ↑",
            SortMode::NameDesc => "Name ↓",
            SortMode::ExtAsc => "Ext ↑",
            SortMode::ExtDesc => "Ext ↓",
            SortMode::TimeAsc => "Time ↑",
            SortMode::TimeDesc => "Time ↓",
            SortMode::SizeAsc => "Size ↑",
            SortMode::SizeDesc => "Size ↓",
            SortMode::Unsorted => "Unsorted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up,
    Down,
    PageUp(usize),
    PageDown(usize),
    First,
    Last,
}

/// Where a pane is looking: a local directory or a prefix inside a zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Archive { archive: PathBuf, prefix: String },
}

impl Location {
    /// Directory that relative paths typed into this pane are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        match self {
            Location::Local(dir) => dir.clone(),
            Location::Archive { archive, .. } => archive
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/")),
        }
    }

    pub fn local_dir(&self) -> Option<&Path> {
        match self {
            Location::Local(dir) => Some(dir),
            Location::Archive { .. } => None,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Location::Archive { .. })
    }

    pub fn display(&self) -> String {
        match self {
            Location::Local(dir) => dir.display().to_string(),
            Location::Archive { archive, prefix } => {
                format!("{}/{}", archive.display(), prefix.trim_end_matches('/'))
                    .trim_end_matches('/')
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_pane_is_an_involution() {
        assert_eq!(PaneId::Left.opposite(), PaneId::Right);
        assert_eq!(PaneId::Right.opposite(), PaneId::Left);
        assert_eq!(PaneId::Left.opposite().opposite(), PaneId::Left);
    }

    #[test]
    fn sort_cycle_visits_every_mode() {
        let mut mode = SortMode::NameAsc;
        let mut seen = vec![mode];
        loop {
            mode = mode.cycle();
            if mode == SortMode::NameAsc {
                break;
            }
            seen.push(mode);
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn archive_location_resolves_against_archive_dir() {
        let loc = Location::Archive {
            archive: PathBuf::from("/data/bundle.zip"),
            prefix: "docs/".to_string(),
        };
        assert_eq!(loc.base_dir(), PathBuf::from("/data"));
        assert_eq!(loc.display(), "/data/bundle.zip/docs");
        assert!(loc.local_dir().is_none());
    }

    #[test]
    fn zip_entries_are_archives() {
        let entry = Entry {
            name: "Backup.ZIP".to_string(),
            path: PathBuf::from("/tmp/Backup.ZIP"),
            is_dir: false,
            size: 1,
            modified: None,
        };
        assert!(entry.is_archive());
        assert!(!entry.is_hidden());
    }
}
