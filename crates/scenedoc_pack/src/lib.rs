//! # Scenedoc Pack
//!
//! Codec for the scenedoc package container format.
//!
//! A package bundles many named members behind a header and an index table,
//! so single members can be extracted by name without decoding the whole
//! archive. Members may be stored raw or DEFLATE-compressed and each carries
//! a CRC-32 checksum over its uncompressed bytes.
//!
//! ## Layout
//!
//! ```text
//! | magic (4) | version (2) | entry_count (4) | index entries... | blob region |
//! ```
//!
//! Index entries are described in [`PackEntry`]. All integers are
//! little-endian. Blob offsets are absolute and monotonically non-overlapping.
//!
//! ## Usage
//!
//! ```
//! use scenedoc_pack::{PackArchive, PackBuilder};
//! use std::io::Cursor;
//!
//! let mut builder = PackBuilder::new();
//! builder.add_member("maps/level1.scene", b"scene bytes", true);
//! let bytes = builder.finish();
//!
//! let archive = PackArchive::open(Cursor::new(bytes)).unwrap();
//! assert_eq!(archive.read_member("maps/level1.scene").unwrap(), b"scene bytes");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod crc;
mod entry;
mod error;
mod reader;

pub use builder::PackBuilder;
pub use crc::compute_crc32;
pub use entry::{EntryFlags, PackEntry};
pub use error::{PackError, PackResult};
pub use reader::PackArchive;

/// Magic bytes at the start of every package file.
pub const PACK_MAGIC: [u8; 4] = *b"SPAK";

/// Current package format version.
pub const PACK_VERSION: u16 = 1;

/// Oldest package format version this codec can read.
pub const PACK_MIN_VERSION: u16 = 1;

/// Header size: magic (4) + version (2) + entry count (4).
pub const PACK_HEADER_SIZE: usize = 10;
