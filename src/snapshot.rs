#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{PaneError, PaneResult};
use crate::model::{Entry, Location, SortMode};
use crate::reader::DirectoryReader;
use crate::vfs::read_zip_entries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingOptions {
    pub sort_mode: SortMode,
    pub dirs_first: bool,
    pub show_hidden: bool,
}

/// The ordered entries of one location, as read by one navigation.
#[derive(Debug, Clone)]
pub struct ListingSnapshot {
    location: Location,
    entries: Vec<Entry>,
    positions: HashMap<PathBuf, usize>,
}

impl ListingSnapshot {
    pub fn empty(location: Location) -> Self {
        Self {
            location,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn from_entries(
        location: Location,
        raw: Vec<Entry>,
        options: &ListingOptions,
        filter: Option<&str>,
    ) -> Self {
        let needle = filter
            .map(str::to_lowercase)
            .filter(|needle| !needle.is_empty());
        let mut entries: Vec<Entry> = raw
            .into_iter()
            .filter(|e| options.show_hidden || !e.is_hidden())
            .filter(|e| match &needle {
                Some(needle) => e.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();

        sort_entries(&mut entries, options.sort_mode, options.dirs_first);

        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.path.clone()));

        let positions = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.path.clone(), idx))
            .collect();
        Self {
            location,
            entries,
            positions,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Entry> {
        self.entries.get(idx)
    }

    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn position(&self, identity: &Path) -> Option<usize> {
        self.positions.get(identity).copied()
    }

    pub fn contains(&self, identity: &Path) -> bool {
        self.positions.contains_key(identity)
    }

    pub fn entry(&self, identity: &Path) -> Option<&Entry> {
        self.position(identity).and_then(|idx| self.entries.get(idx))
    }
}

/// Read `location` and produce its snapshot.
pub fn build(
    reader: &dyn DirectoryReader,
    location: &Location,
    options: &ListingOptions,
    filter: Option<&str>,
) -> PaneResult<ListingSnapshot> {
    let raw = match location {
        Location::Local(dir) => reader.list(dir).map_err(|source| PaneError::Unreadable {
            path: dir.clone(),
            source,
        })?,
        Location::Archive { archive, prefix } => {
            read_zip_entries(archive, prefix).map_err(|source| PaneError::Unreadable {
                path: archive.clone(),
                source,
            })?
        }
    };
    Ok(ListingSnapshot::from_entries(
        location.clone(),
        raw,
        options,
        filter,
    ))
}

pub fn sort_entries(entries: &mut [Entry], sort_mode: SortMode, dirs_first: bool) {
    entries.sort_by(|a, b| {
        if dirs_first && a.is_dir != b.is_dir {
            return if a.is_dir { Ordering::Less } else { Ordering::Greater };
        }
        match sort_mode {
            SortMode::NameAsc => cmp_name(a, b),
            SortMode::NameDesc => cmp_name(b, a),
            SortMode::ExtAsc => cmp_ext(a, b).then_with(|| cmp_name(a, b)),
            SortMode::ExtDesc => cmp_ext(b, a).then_with(|| cmp_name(a, b)),
            SortMode::TimeAsc => cmp_time(a, b).then_with(|| cmp_name(a, b)),
            SortMode::TimeDesc => cmp_time(b, a).then_with(|| cmp_name(a, b)),
            SortMode::SizeAsc => cmp_size(a, b).then_with(|| cmp_name(a, b)),
            SortMode::SizeDesc => cmp_size(b, a).then_with(|| cmp_name(a, b)),
            SortMode::Unsorted => Ordering::Equal,
        }
    });
}

/// Case-insensitive, with the exact name as tie-break so the order is total.
pub fn cmp_name(a: &Entry, b: &Entry) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

pub fn cmp_ext(a: &Entry, b: &Entry) -> Ordering {
    extension(a).cmp(&extension(b))
}

pub fn cmp_time(a: &Entry, b: &Entry) -> Ordering {
    let a_time = a.modified.unwrap_or(SystemTime::UNIX_EPOCH);
    let b_time = b.modified.unwrap_or(SystemTime::UNIX_EPOCH);
    a_time.cmp(&b_time)
}

pub fn cmp_size(a: &Entry, b: &Entry) -> Ordering {
    a.size.cmp(&b.size)
}

fn extension(entry: &Entry) -> String {
    match entry.name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}
