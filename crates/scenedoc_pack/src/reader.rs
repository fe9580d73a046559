//! Package archive reader with random-access member extraction.

use crate::crc::compute_crc32;
use crate::entry::PackEntry;
use crate::error::{PackError, PackResult};
use crate::{PACK_HEADER_SIZE, PACK_MAGIC, PACK_MIN_VERSION, PACK_VERSION};
use flate2::read::DeflateDecoder;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// An opened package archive.
///
/// The index is parsed eagerly when the archive is opened; member blobs are
/// read and decompressed lazily, one member at a time. Reads take `&self`
/// and are safe for concurrent readers — the underlying byte source is
/// locked per read.
///
/// Duplicate member names in the index are tolerated: the last occurrence
/// wins, and the colliding names are reported via
/// [`duplicate_names`](Self::duplicate_names) and a `tracing` warning.
///
/// # Example
///
/// ```
/// use scenedoc_pack::{PackArchive, PackBuilder};
/// use std::io::Cursor;
///
/// let mut builder = PackBuilder::new();
/// builder.add_member("a.bin", b"alpha", false);
/// let archive = PackArchive::open(Cursor::new(builder.finish())).unwrap();
/// assert!(archive.contains("a.bin"));
/// ```
#[derive(Debug)]
pub struct PackArchive<R> {
    source: Mutex<R>,
    version: u16,
    entries: Vec<PackEntry>,
    by_name: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl PackArchive<File> {
    /// Opens a package file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its header or index
    /// is invalid.
    pub fn open_path(path: &Path) -> PackResult<Self> {
        let file = File::open(path)?;
        Self::open(file)
    }
}

impl<R: Read + Seek> PackArchive<R> {
    /// Opens a package from a seekable byte source.
    ///
    /// The header and the full index are validated up front; a corrupt
    /// header fails fast here rather than on first member access.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The magic bytes do not match (`InvalidFormat`)
    /// - The version is outside the supported range (`UnsupportedVersion`)
    /// - The index is truncated or its offsets overlap (`InvalidFormat`)
    pub fn open(mut source: R) -> PackResult<Self> {
        source.seek(SeekFrom::Start(0))?;

        let mut header = [0u8; PACK_HEADER_SIZE];
        source
            .read_exact(&mut header)
            .map_err(|_| PackError::invalid_format("package too short for header"))?;

        if header[0..4] != PACK_MAGIC {
            return Err(PackError::invalid_format("bad magic bytes"));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if !(PACK_MIN_VERSION..=PACK_VERSION).contains(&version) {
            return Err(PackError::UnsupportedVersion {
                version,
                min: PACK_MIN_VERSION,
                max: PACK_VERSION,
            });
        }

        let entry_count = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);

        // Capacity is capped: a corrupt count should fail on the truncated
        // index below, not on a huge allocation here.
        let mut entries = Vec::with_capacity(entry_count.min(1024) as usize);
        for _ in 0..entry_count {
            entries.push(read_entry(&mut source)?);
        }

        let index_end = source.stream_position()?;
        let total_len = source.seek(SeekFrom::End(0))?;

        // Offsets must be monotonically non-overlapping and inside the file.
        let mut prev_end = index_end;
        for entry in &entries {
            if entry.offset < prev_end {
                return Err(PackError::invalid_format(format!(
                    "entry '{}' overlaps the previous blob",
                    entry.name
                )));
            }
            let end = entry.offset.saturating_add(entry.compressed_size);
            if end > total_len {
                return Err(PackError::invalid_format(format!(
                    "entry '{}' extends past end of package",
                    entry.name
                )));
            }
            prev_end = end;
        }

        let mut by_name = HashMap::with_capacity(entries.len());
        let mut duplicates = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let key = entry.name.to_ascii_lowercase();
            if by_name.insert(key, index).is_some() {
                // Last occurrence wins, matching archives produced by older
                // tooling. See DESIGN.md for the open question around this.
                tracing::warn!(name = %entry.name, "duplicate package entry, keeping last");
                duplicates.push(entry.name.clone());
            }
        }

        Ok(Self {
            source: Mutex::new(source),
            version,
            entries,
            by_name,
            duplicates,
        })
    }

    /// Returns the format version declared in the header.
    #[must_use]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Returns the index entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    /// Returns the member names in index order.
    #[must_use]
    pub fn member_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the names that collided during open (duplicates tolerated,
    /// last occurrence kept).
    #[must_use]
    pub fn duplicate_names(&self) -> &[String] {
        &self.duplicates
    }

    /// Returns the number of index entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the archive has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks whether a member exists. Names compare case-insensitively.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    /// Looks up a member's index entry. Names compare case-insensitively.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&PackEntry> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.entries[i])
    }

    /// Reads and verifies a single member, returning its uncompressed bytes.
    ///
    /// A checksum or decompression failure fails only this read; the archive
    /// stays open and other members remain readable.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The member does not exist (`EntryNotFound`)
    /// - The blob cannot be read (`Io`)
    /// - Decompression fails or the checksum mismatches (`CorruptEntry`)
    pub fn read_member(&self, name: &str) -> PackResult<Vec<u8>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| PackError::entry_not_found(name))?
            .clone();

        let stored = {
            let mut source = self.source.lock();
            source.seek(SeekFrom::Start(entry.offset))?;
            let mut buf = vec![0u8; entry.compressed_size as usize];
            source.read_exact(&mut buf)?;
            buf
        };

        let data = if entry.flags.is_compressed() {
            let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
            DeflateDecoder::new(stored.as_slice())
                .read_to_end(&mut out)
                .map_err(|e| {
                    PackError::corrupt_entry(&entry.name, format!("decompression failed: {e}"))
                })?;
            out
        } else {
            stored
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(PackError::corrupt_entry(
                &entry.name,
                format!(
                    "size mismatch: expected {}, got {}",
                    entry.uncompressed_size,
                    data.len()
                ),
            ));
        }

        let actual = compute_crc32(&data);
        if actual != entry.checksum {
            return Err(PackError::corrupt_entry(
                &entry.name,
                format!(
                    "checksum mismatch: expected {:08x}, got {actual:08x}",
                    entry.checksum
                ),
            ));
        }

        Ok(data)
    }
}

fn read_entry<R: Read>(source: &mut R) -> PackResult<PackEntry> {
    let mut len_buf = [0u8; 2];
    source
        .read_exact(&mut len_buf)
        .map_err(|_| PackError::invalid_format("index truncated"))?;
    let name_len = u16::from_le_bytes(len_buf) as usize;

    let mut rest = vec![0u8; name_len + 29];
    source
        .read_exact(&mut rest)
        .map_err(|_| PackError::invalid_format("index truncated"))?;

    let mut buf = Vec::with_capacity(2 + rest.len());
    buf.extend_from_slice(&len_buf);
    buf.extend_from_slice(&rest);

    let mut cursor = 0;
    PackEntry::decode(&buf, &mut cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PackBuilder;
    use std::io::Cursor;

    fn two_member_archive() -> Vec<u8> {
        let mut builder = PackBuilder::new();
        builder.add_member("a.bin", b"alpha bytes", false);
        builder.add_member("b.bin", b"bravo bytes, somewhat longer", true);
        builder.finish()
    }

    #[test]
    fn open_and_read_all_members() {
        let archive = PackArchive::open(Cursor::new(two_member_archive())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.read_member("a.bin").unwrap(), b"alpha bytes");
        assert_eq!(
            archive.read_member("b.bin").unwrap(),
            b"bravo bytes, somewhat longer"
        );
    }

    #[test]
    fn read_order_does_not_matter() {
        let archive = PackArchive::open(Cursor::new(two_member_archive())).unwrap();
        assert_eq!(
            archive.read_member("b.bin").unwrap(),
            b"bravo bytes, somewhat longer"
        );
        assert_eq!(archive.read_member("a.bin").unwrap(), b"alpha bytes");
        // and again, streaming position must not leak between reads
        assert_eq!(archive.read_member("a.bin").unwrap(), b"alpha bytes");
    }

    #[test]
    fn names_are_case_insensitive() {
        let archive = PackArchive::open(Cursor::new(two_member_archive())).unwrap();
        assert!(archive.contains("A.BIN"));
        assert_eq!(archive.read_member("A.Bin").unwrap(), b"alpha bytes");
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = two_member_archive();
        bytes[0] = b'X';
        let result = PackArchive::open(Cursor::new(bytes));
        assert!(matches!(result, Err(PackError::InvalidFormat { .. })));
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = two_member_archive();
        bytes[4..6].copy_from_slice(&(PACK_VERSION + 1).to_le_bytes());
        let result = PackArchive::open(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(PackError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn truncated_index_rejected() {
        let bytes = two_member_archive();
        let result = PackArchive::open(Cursor::new(bytes[..PACK_HEADER_SIZE + 4].to_vec()));
        assert!(matches!(result, Err(PackError::InvalidFormat { .. })));
    }

    #[test]
    fn corrupt_member_fails_alone() {
        let mut builder = PackBuilder::new();
        builder.add_member("a.bin", b"alpha", false);
        builder.add_member("b.bin", b"bravo", false);
        let mut bytes = builder.finish();

        // Flip a byte in b.bin's blob (the last stored member).
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let archive = PackArchive::open(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.read_member("a.bin").unwrap(), b"alpha");
        assert!(matches!(
            archive.read_member("b.bin"),
            Err(PackError::CorruptEntry { .. })
        ));
        // the archive stays usable and still lists both names
        assert_eq!(archive.member_names(), vec!["a.bin", "b.bin"]);
        assert_eq!(archive.read_member("a.bin").unwrap(), b"alpha");
    }

    #[test]
    fn missing_member_not_found() {
        let archive = PackArchive::open(Cursor::new(two_member_archive())).unwrap();
        assert!(matches!(
            archive.read_member("missing.bin"),
            Err(PackError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_names_last_wins() {
        let mut builder = PackBuilder::new();
        builder.add_member("dup.bin", b"first", false);
        builder.add_member("dup.bin", b"second", false);
        let archive = PackArchive::open(Cursor::new(builder.finish())).unwrap();

        assert_eq!(archive.len(), 2);
        assert_eq!(archive.duplicate_names(), &["dup.bin".to_string()]);
        assert_eq!(archive.read_member("dup.bin").unwrap(), b"second");
    }

    #[test]
    fn overlapping_offsets_rejected() {
        let mut builder = PackBuilder::new();
        builder.add_member("a.bin", b"0123456789", false);
        builder.add_member("b.bin", b"abcdefghij", false);
        let mut bytes = builder.finish();

        // Both names are 5 bytes, so each index entry is 2 + 5 + 29 bytes.
        // Entry A's offset field sits at 10 + 2 + 5, entry B's one entry
        // later. Point B's offset back at A's blob.
        let a_offset_pos = PACK_HEADER_SIZE + 2 + 5;
        let b_offset_pos = a_offset_pos + 2 + 5 + 29;
        let a_offset: [u8; 8] = bytes[a_offset_pos..a_offset_pos + 8].try_into().unwrap();
        bytes[b_offset_pos..b_offset_pos + 8].copy_from_slice(&a_offset);

        let result = PackArchive::open(Cursor::new(bytes));
        assert!(matches!(result, Err(PackError::InvalidFormat { .. })));
    }

    #[test]
    fn empty_archive_roundtrip() {
        let builder = PackBuilder::new();
        let archive = PackArchive::open(Cursor::new(builder.finish())).unwrap();
        assert!(archive.is_empty());
        assert!(!archive.contains("anything"));
    }
}
