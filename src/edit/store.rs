//! Byte-level storage behind the editor.
//!
//! The editor never touches the filesystem directly: it reads once and
//! writes at most once through a [`SourceStore`]. [`FsStore`] checks the
//! allow-list before every access and replaces files atomically.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use super::error::EditError;

/// Raw read/write collaborator.
pub trait SourceStore: Send + Sync {
    /// Read the whole file.
    fn read(&self, path: &Path) -> Result<Vec<u8>, EditError>;

    /// Replace the whole file. Must never leave a partially written file.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), EditError>;
}

/// Allow-list of directory roots. An empty list allows every path.
#[derive(Debug, Clone, Default)]
pub struct PathGuard {
    roots: Vec<PathBuf>,
}

impl PathGuard {
    /// Guard that only admits paths under `roots`.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            roots: roots.into_iter().map(|r| normalize(r.as_ref())).collect(),
        }
    }

    /// Guard that admits everything.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether `path` lies under one of the allowed roots.
    pub fn is_allowed_path(&self, path: &Path) -> bool {
        if self.roots.is_empty() {
            return true;
        }
        let path = normalize(path);
        self.roots.iter().any(|root| path.starts_with(root))
    }

    fn check(&self, path: &Path) -> Result<(), EditError> {
        if self.is_allowed_path(path) {
            Ok(())
        } else {
            Err(EditError::AccessDenied(path.to_path_buf()))
        }
    }
}

/// Absolute path with `.`/`..` resolved lexically and the deepest existing
/// ancestor canonicalized, so symlinked roots compare equal.
fn normalize(path: &Path) -> PathBuf {
    let absolute = lexical_absolute(path);
    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(mut out) = existing.canonicalize() {
            for part in rest.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Filesystem store with allow-list enforcement and atomic replacement.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    guard: PathGuard,
}

impl FsStore {
    pub fn new(guard: PathGuard) -> Self {
        Self { guard }
    }
}

impl SourceStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>, EditError> {
        self.guard.check(path)?;
        fs::read(path).map_err(|source| EditError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), EditError> {
        self.guard.check(path)?;
        let write_err = |source: std::io::Error| EditError::Write {
            path: path.to_path_buf(),
            source,
        };

        // Rename onto the resolved file, never over a symlink that points at it.
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        // Temp file in the target's directory so the rename stays on one filesystem.
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        if let Ok(meta) = fs::metadata(&target) {
            fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_err)?;
        }

        tmp.persist(&target).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.go");
        fs::write(&file, "package main\n").unwrap();

        let store = FsStore::default();
        assert_eq!(store.read(&file).unwrap(), b"package main\n");

        store.write(&file, b"package other\n").unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"package other\n");

        // No temp files left behind
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_through_symlink_updates_target() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real.go");
        let link = temp.path().join("link.go");
        fs::write(&real, "package p\n\nfunc A() {}\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let store = FsStore::new(PathGuard::new([temp.path()]));
        store.write(&link, b"package p\n\nfunc A() { return }\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"package p\n\nfunc A() { return }\n");
        assert_eq!(store.read(&link).unwrap(), fs::read(&real).unwrap());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_guard_blocks_outside_paths() {
        let allowed = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let file = outside.path().join("main.go");
        fs::write(&file, "package main\n").unwrap();

        let store = FsStore::new(PathGuard::new([allowed.path()]));
        assert!(matches!(store.read(&file), Err(EditError::AccessDenied(_))));
        assert!(matches!(
            store.write(&file, b"package x\n"),
            Err(EditError::AccessDenied(_))
        ));
        assert_eq!(fs::read(&file).unwrap(), b"package main\n");
    }

    #[test]
    fn test_guard_resolves_parent_components() {
        let allowed = TempDir::new().unwrap();
        let guard = PathGuard::new([allowed.path()]);

        assert!(guard.is_allowed_path(&allowed.path().join("pkg/a.go")));
        assert!(!guard.is_allowed_path(&allowed.path().join("../escape.go")));
        assert!(PathGuard::allow_all().is_allowed_path(Path::new("/anywhere")));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let store = FsStore::default();
        let err = store.read(&temp.path().join("nope.go")).unwrap_err();
        assert!(matches!(err, EditError::Read { .. }));
    }
}
