//! Byte stream adapter between providers and the serializer framework.

use crate::error::{VfsError, VfsResult};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A positioned byte stream over a provider-opened handle.
///
/// This is the interface the serializer framework consumes. Implementations
/// track their own position, and `close()` is idempotent; dropping a stream
/// releases its handle too, so an error path that abandons a stream midway
/// never leaks it.
pub trait DocStream: Send {
    /// Reads up to `buf.len()` bytes, returning how many were read.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is closed or the medium fails.
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize>;

    /// Writes `buf`, returning how many bytes were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is closed, read-only, or the medium
    /// fails.
    fn write(&mut self, buf: &[u8]) -> VfsResult<usize>;

    /// Repositions the stream, returning the new absolute position.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is closed or the target position is
    /// invalid.
    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64>;

    /// Returns the current absolute position.
    fn position(&self) -> u64;

    /// Returns the total stream length in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is closed or the medium fails.
    fn len(&self) -> VfsResult<u64>;

    /// Checks whether the stream is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the length cannot be determined.
    fn is_empty(&self) -> VfsResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Releases the underlying handle. Idempotent.
    ///
    /// For write streams with replace-on-close semantics this is the commit
    /// point; abandoning the stream instead (drop without close) discards
    /// the pending write.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or committing fails.
    fn close(&mut self) -> VfsResult<()>;

    /// Reads exactly `buf.len()` bytes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the stream ends early.
    fn read_exact_buf(&mut self, buf: &mut [u8]) -> VfsResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(VfsError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "unexpected end of stream",
                )));
            }
            filled += n;
        }
        Ok(())
    }

    /// Reads from the current position to the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    fn read_to_vec(&mut self) -> VfsResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    /// Writes all of `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails or makes no progress.
    fn write_all_buf(&mut self, buf: &[u8]) -> VfsResult<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..])?;
            if n == 0 {
                return Err(VfsError::Io(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "stream refused further writes",
                )));
            }
            written += n;
        }
        Ok(())
    }
}

/// A stream over an open file on disk.
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
    pos: u64,
}

impl FileStream {
    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path) -> VfsResult<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file: Some(file),
            pos: 0,
        })
    }

    fn file(&mut self) -> VfsResult<&mut File> {
        self.file.as_mut().ok_or(VfsError::StreamClosed)
    }
}

impl DocStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        let n = self.file()?.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        let n = self.file()?.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        let new = self.file()?.seek(pos)?;
        self.pos = new;
        Ok(new)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> VfsResult<u64> {
        let file = self.file.as_ref().ok_or(VfsError::StreamClosed)?;
        Ok(file.metadata()?.len())
    }

    fn close(&mut self) -> VfsResult<()> {
        self.file.take();
        Ok(())
    }
}

/// A growable in-memory stream.
///
/// Used for package members (decompressed once, then random-accessed) and
/// throughout the tests. Writing past the end zero-fills the gap, matching
/// file semantics.
#[derive(Debug, Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    pos: u64,
    closed: bool,
}

impl MemoryStream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream positioned at the start of `data`.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            closed: false,
        }
    }

    /// Consumes the stream, returning its buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Returns the buffered bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn check_open(&self) -> VfsResult<()> {
        if self.closed {
            return Err(VfsError::StreamClosed);
        }
        Ok(())
    }
}

impl DocStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        self.check_open()?;
        let pos = self.pos.min(self.data.len() as u64) as usize;
        let n = buf.len().min(self.data.len() - pos);
        buf[..n].copy_from_slice(&self.data[pos..pos + n]);
        self.pos = (pos + n) as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        self.check_open()?;
        let pos = self.pos as usize;
        if pos > self.data.len() {
            self.data.resize(pos, 0);
        }
        let overlap = buf.len().min(self.data.len().saturating_sub(pos));
        self.data[pos..pos + overlap].copy_from_slice(&buf[..overlap]);
        self.data.extend_from_slice(&buf[overlap..]);
        self.pos += buf.len() as u64;
        Ok(buf.len())
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        self.check_open()?;
        let base = match pos {
            SeekFrom::Start(n) => return Ok(set_pos(&mut self.pos, n as i128)?),
            SeekFrom::End(delta) => self.data.len() as i128 + i128::from(delta),
            SeekFrom::Current(delta) => self.pos as i128 + i128::from(delta),
        };
        set_pos(&mut self.pos, base)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> VfsResult<u64> {
        self.check_open()?;
        Ok(self.data.len() as u64)
    }

    fn close(&mut self) -> VfsResult<()> {
        self.closed = true;
        Ok(())
    }
}

fn set_pos(pos: &mut u64, target: i128) -> VfsResult<u64> {
    if target < 0 {
        return Err(VfsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "seek before start of stream",
        )));
    }
    *pos = target as u64;
    Ok(*pos)
}

/// A write stream with replace-on-close semantics.
///
/// Bytes go to `<target>.tmp`; `close()` syncs the temporary file and
/// renames it over the target. Dropping the stream without closing removes
/// the temporary file and leaves the target untouched, so a failed save can
/// never truncate a previously good file.
#[derive(Debug)]
pub struct TempFileStream {
    file: Option<File>,
    tmp_path: PathBuf,
    target: PathBuf,
    pos: u64,
}

impl TempFileStream {
    /// Creates a temporary sibling of `target` and opens it for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn create(target: &Path) -> VfsResult<Self> {
        let mut name = target.file_name().map_or_else(
            || std::ffi::OsString::from("output"),
            std::ffi::OsStr::to_os_string,
        );
        name.push(".tmp");
        let tmp_path = target.with_file_name(name);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;

        Ok(Self {
            file: Some(file),
            tmp_path,
            target: target.to_path_buf(),
            pos: 0,
        })
    }

    fn file(&mut self) -> VfsResult<&mut File> {
        self.file.as_mut().ok_or(VfsError::StreamClosed)
    }
}

impl DocStream for TempFileStream {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        let n = self.file()?.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        let n = self.file()?.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        let new = self.file()?.seek(pos)?;
        self.pos = new;
        Ok(new)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> VfsResult<u64> {
        let file = self.file.as_ref().ok_or(VfsError::StreamClosed)?;
        Ok(file.metadata()?.len())
    }

    fn close(&mut self) -> VfsResult<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        let committed = (|| {
            file.flush()?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&self.tmp_path, &self.target)
        })();
        if committed.is_err() {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
        committed.map_err(VfsError::from)
    }
}

impl Drop for TempFileStream {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}
