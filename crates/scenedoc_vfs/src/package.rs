//! Package archive provider.

use crate::error::{VfsError, VfsResult};
use crate::path::LogicalPath;
use crate::provider::ArchiveProvider;
use crate::stream::{DocStream, MemoryStream};
use parking_lot::{Mutex, RwLock};
use scenedoc_pack::{PackArchive, PackBuilder};
use std::fs::File;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A provider backed by an opened package archive.
///
/// Mounting parses the index eagerly, so a corrupt header fails at mount
/// time; members decompress lazily when opened for reading. Writing a
/// member rebuilds the whole package: unchanged members are carried over,
/// a same-named member is replaced, and the rebuilt archive swaps in
/// atomically when the write stream is closed. Reads are shared; writes are
/// exclusive per archive.
pub struct PackageProvider {
    label: String,
    state: Arc<PackageState>,
}

struct PackageState {
    path: PathBuf,
    archive: RwLock<PackArchive<File>>,
    write_lock: Mutex<()>,
}

impl PackageProvider {
    /// Opens a package file and mounts it under `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its header or index
    /// is corrupt.
    pub fn open(label: impl Into<String>, path: &Path) -> VfsResult<Self> {
        let archive = PackArchive::open_path(path)?;
        Ok(Self {
            label: label.into(),
            state: Arc::new(PackageState {
                path: path.to_path_buf(),
                archive: RwLock::new(archive),
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Returns the on-disk path of the package file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.state.path
    }

    /// Returns member names that collided when the index was parsed
    /// (duplicates tolerated, last occurrence kept).
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<String> {
        self.state.archive.read().duplicate_names().to_vec()
    }

    /// Finds the stored spelling of a member matching `path`.
    fn stored_name(&self, path: &LogicalPath) -> Option<String> {
        let archive = self.state.archive.read();
        archive
            .member_names()
            .iter()
            .find(|name| matches!(LogicalPath::parse(name), Ok(p) if p == *path))
            .map(|name| (*name).to_string())
    }
}

impl ArchiveProvider for PackageProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, path: &LogicalPath) -> bool {
        self.stored_name(path).is_some()
    }

    fn entries(&self) -> Vec<LogicalPath> {
        let archive = self.state.archive.read();
        archive
            .member_names()
            .iter()
            .filter_map(|name| LogicalPath::parse(name).ok())
            .collect()
    }

    fn open_read(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        let name = self
            .stored_name(path)
            .ok_or_else(|| VfsError::not_found(path.as_str()))?;
        let bytes = self.state.archive.read().read_member(&name)?;
        Ok(Box::new(MemoryStream::from_vec(bytes)))
    }

    fn open_write(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        Ok(Box::new(PackageWriteStream {
            state: Arc::clone(&self.state),
            name: path.as_str().to_string(),
            buffer: MemoryStream::new(),
            open: true,
        }))
    }

    fn writable(&self) -> bool {
        true
    }
}

/// Write stream for a single package member.
///
/// Bytes accumulate in memory; `close()` performs the rebuild-and-replace.
/// Dropping the stream without closing discards the pending member and
/// leaves the package untouched.
struct PackageWriteStream {
    state: Arc<PackageState>,
    name: String,
    buffer: MemoryStream,
    open: bool,
}

impl PackageWriteStream {
    fn commit(&mut self) -> VfsResult<()> {
        // One in-flight save per archive.
        let _exclusive = self.state.write_lock.lock();

        let replacing = LogicalPath::parse(&self.name)?;
        let mut builder = PackBuilder::new();
        let mut replaced = false;

        {
            let archive = self.state.archive.read();
            for entry in archive.entries() {
                let carried = matches!(
                    LogicalPath::parse(&entry.name),
                    Ok(p) if p == replacing
                );
                if carried {
                    // Same-named member: substituted below, in place.
                    builder.add_member(&self.name, self.buffer.data(), true);
                    replaced = true;
                    continue;
                }
                let bytes = archive.read_member(&entry.name)?;
                builder.add_member(&entry.name, &bytes, entry.flags.is_compressed());
            }
        }
        if !replaced {
            builder.add_member(&self.name, self.buffer.data(), true);
        }

        builder.write_to_path(&self.state.path)?;

        // Swap in a fresh reader over the rebuilt file.
        let reopened = PackArchive::open_path(&self.state.path)?;
        *self.state.archive.write() = reopened;
        Ok(())
    }
}

impl DocStream for PackageWriteStream {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        if !self.open {
            return Err(VfsError::StreamClosed);
        }
        self.buffer.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        if !self.open {
            return Err(VfsError::StreamClosed);
        }
        self.buffer.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        if !self.open {
            return Err(VfsError::StreamClosed);
        }
        self.buffer.seek(pos)
    }

    fn position(&self) -> u64 {
        self.buffer.position()
    }

    fn len(&self) -> VfsResult<u64> {
        if !self.open {
            return Err(VfsError::StreamClosed);
        }
        self.buffer.len()
    }

    fn close(&mut self) -> VfsResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn build_package(path: &Path) {
        let mut builder = PackBuilder::new();
        builder.add_member("maps/level1.scene", b"scene one", false);
        builder.add_member("textures/wall.png", &[0xAA; 256], true);
        builder.write_to_path(path).unwrap();
    }

    #[test]
    fn mount_parses_index_eagerly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.spak");
        std::fs::write(&path, b"not a package").unwrap();

        let result = PackageProvider::open("assets", &path);
        assert!(result.is_err());
    }

    #[test]
    fn read_members_through_provider() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.spak");
        build_package(&path);

        let provider = PackageProvider::open("assets", &path).unwrap();
        let logical = LogicalPath::parse("Maps/Level1.Scene").unwrap();
        assert!(provider.contains(&logical));

        let mut stream = provider.open_read(&logical).unwrap();
        assert_eq!(stream.read_to_vec().unwrap(), b"scene one");
    }

    #[test]
    fn write_replaces_member_and_keeps_others() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.spak");
        build_package(&path);

        let provider = PackageProvider::open("assets", &path).unwrap();
        let logical = LogicalPath::parse("maps/level1.scene").unwrap();

        let mut stream = provider.open_write(&logical).unwrap();
        stream.write_all_buf(b"scene one, revised").unwrap();
        stream.close().unwrap();

        let mut reread = provider.open_read(&logical).unwrap();
        assert_eq!(reread.read_to_vec().unwrap(), b"scene one, revised");

        let wall = LogicalPath::parse("textures/wall.png").unwrap();
        let mut wall_stream = provider.open_read(&wall).unwrap();
        assert_eq!(wall_stream.read_to_vec().unwrap(), vec![0xAA; 256]);
    }

    #[test]
    fn write_adds_new_member() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.spak");
        build_package(&path);

        let provider = PackageProvider::open("assets", &path).unwrap();
        let logical = LogicalPath::parse("maps/level2.scene").unwrap();

        let mut stream = provider.open_write(&logical).unwrap();
        stream.write_all_buf(b"scene two").unwrap();
        stream.close().unwrap();

        assert_eq!(provider.entries().len(), 3);
        let mut reread = provider.open_read(&logical).unwrap();
        assert_eq!(reread.read_to_vec().unwrap(), b"scene two");
    }

    #[test]
    fn abandoned_write_leaves_package_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.spak");
        build_package(&path);
        let before = std::fs::read(&path).unwrap();

        let provider = PackageProvider::open("assets", &path).unwrap();
        let logical = LogicalPath::parse("maps/level1.scene").unwrap();
        {
            let mut stream = provider.open_write(&logical).unwrap();
            stream.write_all_buf(b"half-finished").unwrap();
            // dropped without close
        }

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn closed_write_stream_is_inert() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.spak");
        build_package(&path);

        let provider = PackageProvider::open("assets", &path).unwrap();
        let logical = LogicalPath::parse("maps/level1.scene").unwrap();
        let mut stream = provider.open_write(&logical).unwrap();
        stream.write_all_buf(b"revised").unwrap();
        stream.close().unwrap();
        stream.close().unwrap();
        assert!(matches!(stream.write(b"x"), Err(VfsError::StreamClosed)));
    }
}
