//! Plain directory provider.

use crate::error::{VfsError, VfsResult};
use crate::path::LogicalPath;
use crate::provider::ArchiveProvider;
use crate::stream::{DocStream, FileStream, TempFileStream};
use std::fs;
use std::path::{Path, PathBuf};

/// A provider backed by a directory on disk.
///
/// Logical paths map segment-for-segment onto paths under the root. Writes
/// create parent directories as needed and go through a
/// [`TempFileStream`], so an interrupted save leaves any existing file
/// untouched.
#[derive(Debug)]
pub struct FolderProvider {
    label: String,
    root: PathBuf,
}

impl FolderProvider {
    /// Creates a provider rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or is not a directory.
    pub fn new(label: impl Into<String>, root: &Path) -> VfsResult<Self> {
        if !root.is_dir() {
            return Err(VfsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("folder root does not exist: {}", root.display()),
            )));
        }
        Ok(Self {
            label: label.into(),
            root: root.to_path_buf(),
        })
    }

    /// Returns the directory this provider is rooted at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn disk_path(&self, path: &LogicalPath) -> PathBuf {
        let mut disk = self.root.clone();
        for component in path.components() {
            disk.push(component);
        }
        disk
    }

    fn walk(&self, dir: &Path, prefix: &LogicalPath, out: &mut Vec<LogicalPath>) {
        let Ok(read_dir) = fs::read_dir(dir) else {
            return;
        };
        let mut children: Vec<_> = read_dir.flatten().collect();
        children.sort_by_key(std::fs::DirEntry::file_name);

        for child in children {
            let name = child.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Ok(logical) = prefix.join(name) else {
                continue;
            };
            let child_path = child.path();
            if child_path.is_dir() {
                self.walk(&child_path, &logical, out);
            } else {
                out.push(logical);
            }
        }
    }
}

impl ArchiveProvider for FolderProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, path: &LogicalPath) -> bool {
        !path.is_root() && self.disk_path(path).is_file()
    }

    fn entries(&self) -> Vec<LogicalPath> {
        let mut out = Vec::new();
        self.walk(&self.root, &LogicalPath::root(), &mut out);
        out
    }

    fn open_read(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        let disk = self.disk_path(path);
        match FileStream::open(&disk) {
            Ok(stream) => Ok(Box::new(stream)),
            Err(VfsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VfsError::not_found(path.as_str()))
            }
            Err(e) => Err(e),
        }
    }

    fn open_write(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        let disk = self.disk_path(path);
        if let Some(parent) = disk.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Box::new(TempFileStream::create(&disk)?))
    }

    fn writable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture() -> (tempfile::TempDir, FolderProvider) {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("maps")).unwrap();
        fs::write(dir.path().join("maps/level1.scene"), b"level one").unwrap();
        fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
        let provider = FolderProvider::new("project", dir.path()).unwrap();
        (dir, provider)
    }

    #[test]
    fn missing_root_rejected() {
        let result = FolderProvider::new("x", Path::new("/definitely/not/here"));
        assert!(result.is_err());
    }

    #[test]
    fn contains_and_read() {
        let (_dir, provider) = fixture();
        let path = LogicalPath::parse("maps/level1.scene").unwrap();
        assert!(provider.contains(&path));

        let mut stream = provider.open_read(&path).unwrap();
        assert_eq!(stream.read_to_vec().unwrap(), b"level one");
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_dir, provider) = fixture();
        let path = LogicalPath::parse("maps/ghost.scene").unwrap();
        assert!(!provider.contains(&path));
        assert!(matches!(
            provider.open_read(&path),
            Err(VfsError::NotFound { .. })
        ));
    }

    #[test]
    fn entries_walk_recursively() {
        let (_dir, provider) = fixture();
        let entries = provider.entries();
        let names: Vec<_> = entries.iter().map(LogicalPath::as_str).collect();
        assert_eq!(names, vec!["maps/level1.scene", "readme.txt"]);
    }

    #[test]
    fn write_creates_parents_and_commits() {
        let (dir, provider) = fixture();
        let path = LogicalPath::parse("new/nested/out.scene").unwrap();

        let mut stream = provider.open_write(&path).unwrap();
        stream.write_all_buf(b"fresh").unwrap();
        stream.close().unwrap();

        assert_eq!(
            fs::read(dir.path().join("new/nested/out.scene")).unwrap(),
            b"fresh"
        );
    }

    #[test]
    fn abandoned_write_leaves_existing_file() {
        let (dir, provider) = fixture();
        let path = LogicalPath::parse("readme.txt").unwrap();

        {
            let mut stream = provider.open_write(&path).unwrap();
            stream.write_all_buf(b"broken half-save").unwrap();
        }

        assert_eq!(fs::read(dir.path().join("readme.txt")).unwrap(), b"hello");
    }
}
