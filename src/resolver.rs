#![forbid(unsafe_code)]

//! Path validation for navigation and action targets.

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{PaneError, PaneResult};

/// Lexically normalize `raw` against `base`: expand `~`, make absolute,
/// fold `.` and `..`. Does not touch the file system.
pub fn normalize(raw: &str, base: &Path) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() {
        return fold_components(base);
    }
    normalize_path(Path::new(raw), base)
}

/// Same as [`normalize`] for a path that is not necessarily UTF-8.
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_home(path);
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    fold_components(&joined)
}

/// Resolve a navigation target: must exist and be a directory.
pub fn resolve_dir(raw: &str, base: &Path) -> PaneResult<PathBuf> {
    existing_dir(normalize(raw, base))
}

pub fn resolve_dir_path(path: &Path, base: &Path) -> PaneResult<PathBuf> {
    existing_dir(normalize_path(path, base))
}

/// Resolve an action target: file or directory, as long as it exists.
pub fn resolve_target(raw: &str, base: &Path) -> PaneResult<PathBuf> {
    let path = normalize(raw, base);
    if fs::symlink_metadata(&path).is_ok() {
        Ok(path)
    } else {
        Err(PaneError::NotFound(path))
    }
}

fn existing_dir(path: PathBuf) -> PaneResult<PathBuf> {
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(path),
        Ok(_) => Err(PaneError::NotADirectory(path)),
        Err(_) => Err(PaneError::NotFound(path)),
    }
}

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    if components.next() == Some(Component::Normal(OsStr::new("~"))) {
        if let Some(home) = home_dir() {
            return home.join(components.as_path());
        }
    }
    path.to_path_buf()
}

fn fold_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn folds_dots_lexically() {
        let base = Path::new("/home/user");
        assert_eq!(normalize("docs/./a/../b", base), PathBuf::from("/home/user/docs/b"));
        assert_eq!(normalize("..", base), PathBuf::from("/home"));
        assert_eq!(normalize("/../../etc", base), PathBuf::from("/etc"));
    }

    #[test]
    fn empty_input_means_base() {
        assert_eq!(normalize("  ", Path::new("/srv/./x")), PathBuf::from("/srv/x"));
    }

    #[test]
    fn absolute_input_ignores_base() {
        assert_eq!(normalize("/var/log/", Path::new("/home")), PathBuf::from("/var/log"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = home_dir() else { return };
        assert_eq!(normalize("~", Path::new("/")), fold_components(&home));
        assert_eq!(normalize("~/notes", Path::new("/")), fold_components(&home.join("notes")));
    }

    #[test]
    fn resolve_dir_checks_existence_and_kind() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        File::create(tmp.path().join("file.txt")).unwrap();

        let ok = resolve_dir("sub", tmp.path()).unwrap();
        assert_eq!(ok, tmp.path().join("sub"));

        assert!(matches!(
            resolve_dir("missing", tmp.path()),
            Err(PaneError::NotFound(_))
        ));
        assert!(matches!(
            resolve_dir("file.txt", tmp.path()),
            Err(PaneError::NotADirectory(_))
        ));
    }

    #[test]
    fn path_inputs_resolve_like_text() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let dotted = tmp.path().join("sub").join("..").join("sub");
        assert_eq!(resolve_dir_path(&dotted, Path::new("/")).unwrap(), tmp.path().join("sub"));
        assert_eq!(
            resolve_dir_path(Path::new("sub/."), tmp.path()).unwrap(),
            tmp.path().join("sub")
        );
    }

    #[test]
    fn resolve_target_accepts_files() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("file.txt")).unwrap();
        assert!(resolve_target("file.txt", tmp.path()).is_ok());
        assert!(matches!(
            resolve_target("nope.txt", tmp.path()),
            Err(PaneError::NotFound(_))
        ));
    }
}
