#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// File-system side effects of pane commands.
pub trait FileOps {
    /// Copy `src` into `dest_dir`, returning the created path.
    fn copy(&self, src: &Path, dest_dir: &Path) -> io::Result<PathBuf>;
    /// Move `src` into `dest_dir`, returning the new path.
    fn move_to(&self, src: &Path, dest_dir: &Path) -> io::Result<PathBuf>;
    fn delete(&self, path: &Path) -> io::Result<()>;
    fn make_directory(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileOps;

impl FileOps for LocalFileOps {
    fn copy(&self, src: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        let target = target_in(src, dest_dir)?;
        if src.is_dir() && target.starts_with(src) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot copy a directory into itself",
            ));
        }
        copy_entry(src, &target)?;
        Ok(target)
    }

    fn move_to(&self, src: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        let target = target_in(src, dest_dir)?;
        if src.is_dir() && target.starts_with(src) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot move a directory into itself",
            ));
        }
        move_entry(src, &target)?;
        Ok(target)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        remove_path(path)
    }

    fn make_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

/// Per-item outcome of a batch operation.
#[derive(Debug, Default)]
pub struct OpReport {
    pub done: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl OpReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human readable summary, e.g. `Copied 2 item(s), 1 failed: x: denied`.
    pub fn summary(&self, verb: &str) -> String {
        let mut text = format!("{verb} {} item(s)", self.done.len());
        if let Some((path, err)) = self.failed.first() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            text.push_str(&format!(", {} failed: {name}: {err}", self.failed.len()));
        }
        text
    }
}

pub fn copy_all(ops: &dyn FileOps, sources: &[PathBuf], dest_dir: &Path) -> OpReport {
    run_batch(sources, |src| ops.copy(src, dest_dir).map(|_| ()))
}

pub fn move_all(ops: &dyn FileOps, sources: &[PathBuf], dest_dir: &Path) -> OpReport {
    run_batch(sources, |src| ops.move_to(src, dest_dir).map(|_| ()))
}

pub fn delete_all(ops: &dyn FileOps, paths: &[PathBuf]) -> OpReport {
    run_batch(paths, |path| ops.delete(path))
}

fn run_batch(items: &[PathBuf], mut op: impl FnMut(&Path) -> io::Result<()>) -> OpReport {
    let mut report = OpReport::default();
    for item in items {
        match op(item) {
            Ok(()) => {
                debug!(path = %item.display(), "file op done");
                report.done.push(item.clone());
            }
            Err(err) => {
                debug!(path = %item.display(), "file op failed: {err}");
                report.failed.push((item.clone(), err));
            }
        }
    }
    report
}

fn target_in(src: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let Some(name) = src.file_name() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"));
    };
    let target = dest_dir.join(name);
    if target.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }
    Ok(target)
}

pub fn copy_entry(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;
        Ok(())
    }
}

pub fn move_entry(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        // Cross-device: fall back to copy + remove.
        Err(_) => {
            copy_entry(src, dest)?;
            remove_path(src)
        }
    }
}

pub fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

pub fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if !dest.exists() {
        fs::create_dir_all(dest)?;
    }
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else {
            fs::copy(&path, &target)?;
        }
    }
    Ok(())
}
