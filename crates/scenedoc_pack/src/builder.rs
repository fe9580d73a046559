//! Package archive builder with atomic on-disk replacement.

use crate::crc::compute_crc32;
use crate::entry::{EntryFlags, PackEntry};
use crate::error::PackResult;
use crate::{PACK_HEADER_SIZE, PACK_MAGIC, PACK_VERSION};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A member waiting to be written.
#[derive(Debug, Clone)]
struct PendingMember {
    name: String,
    blob: Vec<u8>,
    uncompressed_size: u64,
    checksum: u32,
    flags: EntryFlags,
}

/// Assembles a package archive in memory.
///
/// Members are buffered as they are added (compression and checksumming
/// happen up front); [`finish`](Self::finish) lays out the header, index,
/// and blob region with final offsets in one pass. Identical inputs always
/// produce identical bytes, and members are emitted in insertion order.
///
/// [`write_to_path`](Self::write_to_path) replaces an on-disk package
/// atomically: the bytes go to a temporary sibling file first and are
/// renamed over the target only once fully written, so a failed save never
/// truncates a previously valid archive.
#[derive(Debug, Default)]
pub struct PackBuilder {
    members: Vec<PendingMember>,
}

impl PackBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Adds a member.
    ///
    /// With `compress` set the blob is DEFLATE-compressed; if compression
    /// does not shrink the data the member is stored raw instead (the flags
    /// reflect what was actually written). Duplicate names are not rejected
    /// here — the reader tolerates them with last-wins semantics.
    pub fn add_member(&mut self, name: &str, data: &[u8], compress: bool) {
        let checksum = compute_crc32(data);
        let uncompressed_size = data.len() as u64;

        let (blob, flags) = if compress {
            let compressed = deflate(data);
            if compressed.len() < data.len() {
                (compressed, EntryFlags::NONE.with_compressed())
            } else {
                (data.to_vec(), EntryFlags::NONE)
            }
        } else {
            (data.to_vec(), EntryFlags::NONE)
        };

        self.members.push(PendingMember {
            name: name.to_string(),
            blob,
            uncompressed_size,
            checksum,
            flags,
        });
    }

    /// Returns the number of buffered members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Checks whether no members have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Encodes the complete package to bytes.
    #[must_use]
    pub fn finish(&self) -> Vec<u8> {
        // First pass: compute the index size so blob offsets are final.
        let entries = self.layout();
        let index_size: usize = entries.iter().map(PackEntry::encoded_size).sum();
        let blob_size: usize = self.members.iter().map(|m| m.blob.len()).sum();

        let mut buf = Vec::with_capacity(PACK_HEADER_SIZE + index_size + blob_size);
        buf.extend_from_slice(&PACK_MAGIC);
        buf.extend_from_slice(&PACK_VERSION.to_le_bytes());
        let count = u32::try_from(self.members.len()).unwrap_or(u32::MAX);
        buf.extend_from_slice(&count.to_le_bytes());

        for entry in &entries {
            entry.encode_into(&mut buf);
        }
        for member in &self.members {
            buf.extend_from_slice(&member.blob);
        }

        buf
    }

    /// Writes the package to an arbitrary sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> PackResult<()> {
        sink.write_all(&self.finish())?;
        Ok(())
    }

    /// Writes the package to `path`, replacing any existing file atomically.
    ///
    /// The bytes are written to `<path>.tmp`, synced, and renamed over the
    /// target. On failure the temporary file is removed and the original
    /// file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or the
    /// rename fails.
    pub fn write_to_path(&self, path: &Path) -> PackResult<()> {
        let tmp_path = temp_sibling(path);

        let result = (|| -> PackResult<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&self.finish())?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    /// Computes final index entries with blob offsets resolved.
    fn layout(&self) -> Vec<PackEntry> {
        // The index size depends only on names, which are already known.
        let index_size: usize = self
            .members
            .iter()
            .map(|m| 2 + m.name.len() + 29)
            .sum();

        let mut offset = (PACK_HEADER_SIZE + index_size) as u64;
        self.members
            .iter()
            .map(|m| {
                let entry = PackEntry {
                    name: m.name.clone(),
                    offset,
                    compressed_size: m.blob.len() as u64,
                    uncompressed_size: m.uncompressed_size,
                    checksum: m.checksum,
                    flags: m.flags,
                };
                offset += m.blob.len() as u64;
                entry
            })
            .collect()
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("package"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".tmp");
    path.with_file_name(name)
}
