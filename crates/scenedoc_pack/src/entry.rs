//! Package index entries.

use crate::error::{PackError, PackResult};

/// Flags for package index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryFlags(u8);

impl EntryFlags {
    /// No flags set: the member is stored verbatim.
    pub const NONE: Self = Self(0);
    /// Member blob is DEFLATE-compressed.
    pub const COMPRESSED: Self = Self(0x01);

    /// Creates flags from a raw byte.
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Self(b)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Checks whether the compressed flag is set.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Sets the compressed flag.
    #[must_use]
    pub const fn with_compressed(self) -> Self {
        Self(self.0 | 0x01)
    }
}

/// A single member record in the package index.
///
/// Layout (little-endian):
///
/// ```text
/// | name_len (2) | name bytes | offset (8) | compressed_size (8)
/// | uncompressed_size (8) | checksum (4) | flags (1) |
/// ```
///
/// `offset` is absolute within the package file. `checksum` is the CRC-32 of
/// the *uncompressed* member bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    /// Member name (a logical path within the package).
    pub name: String,
    /// Absolute offset of the blob within the file.
    pub offset: u64,
    /// Size of the blob as stored.
    pub compressed_size: u64,
    /// Size of the member once decompressed.
    pub uncompressed_size: u64,
    /// CRC-32 over the uncompressed member bytes.
    pub checksum: u32,
    /// Storage flags.
    pub flags: EntryFlags,
}

impl PackEntry {
    /// Fixed part of the encoded entry: offset (8) + compressed_size (8)
    /// + uncompressed_size (8) + checksum (4) + flags (1).
    const FIXED_SIZE: usize = 29;

    /// Returns the encoded size of this entry in the index table.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        2 + self.name.len() + Self::FIXED_SIZE
    }

    /// Appends the encoded entry to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        let name_bytes = self.name.as_bytes();
        let name_len = u16::try_from(name_bytes.len()).unwrap_or(u16::MAX);
        buf.extend_from_slice(&name_len.to_le_bytes());
        buf.extend_from_slice(&name_bytes[..name_len as usize]);
        buf.extend_from_slice(&self.offset.to_le_bytes());
        buf.extend_from_slice(&self.compressed_size.to_le_bytes());
        buf.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf.push(self.flags.as_byte());
    }

    /// Decodes one entry from `data` starting at `*cursor`, advancing the
    /// cursor past it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the data is truncated or the name is not
    /// valid UTF-8.
    pub fn decode(data: &[u8], cursor: &mut usize) -> PackResult<Self> {
        let mut pos = *cursor;

        if pos + 2 > data.len() {
            return Err(PackError::invalid_format("index truncated"));
        }
        let name_len = u16::from_le_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;

        if pos + name_len + Self::FIXED_SIZE > data.len() {
            return Err(PackError::invalid_format("index truncated"));
        }
        let name = std::str::from_utf8(&data[pos..pos + name_len])
            .map_err(|_| PackError::invalid_format("entry name is not valid UTF-8"))?
            .to_string();
        pos += name_len;

        let mut take_u64 = |p: &mut usize| {
            let v = u64::from_le_bytes([
                data[*p],
                data[*p + 1],
                data[*p + 2],
                data[*p + 3],
                data[*p + 4],
                data[*p + 5],
                data[*p + 6],
                data[*p + 7],
            ]);
            *p += 8;
            v
        };

        let offset = take_u64(&mut pos);
        let compressed_size = take_u64(&mut pos);
        let uncompressed_size = take_u64(&mut pos);

        let checksum = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        pos += 4;

        let flags = EntryFlags::from_byte(data[pos]);
        pos += 1;

        *cursor = pos;
        Ok(Self {
            name,
            offset,
            compressed_size,
            uncompressed_size,
            checksum,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackEntry {
        PackEntry {
            name: "textures/wall.png".to_string(),
            offset: 1024,
            compressed_size: 300,
            uncompressed_size: 512,
            checksum: 0xDEAD_BEEF,
            flags: EntryFlags::NONE.with_compressed(),
        }
    }

    #[test]
    fn entry_flags() {
        let flags = EntryFlags::NONE;
        assert!(!flags.is_compressed());
        assert!(flags.with_compressed().is_compressed());
        assert_eq!(EntryFlags::from_byte(0x01), EntryFlags::COMPRESSED);
    }

    #[test]
    fn entry_roundtrip() {
        let entry = sample();
        let mut buf = Vec::new();
        entry.encode_into(&mut buf);
        assert_eq!(buf.len(), entry.encoded_size());

        let mut cursor = 0;
        let decoded = PackEntry::decode(&buf, &mut cursor).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(cursor, buf.len());
    }

    #[test]
    fn truncated_entry_rejected() {
        let entry = sample();
        let mut buf = Vec::new();
        entry.encode_into(&mut buf);
        buf.truncate(buf.len() - 3);

        let mut cursor = 0;
        let result = PackEntry::decode(&buf, &mut cursor);
        assert!(matches!(result, Err(PackError::InvalidFormat { .. })));
    }

    #[test]
    fn invalid_utf8_name_rejected() {
        let entry = sample();
        let mut buf = Vec::new();
        entry.encode_into(&mut buf);
        buf[2] = 0xFF;

        let mut cursor = 0;
        let result = PackEntry::decode(&buf, &mut cursor);
        assert!(matches!(result, Err(PackError::InvalidFormat { .. })));
    }
}
