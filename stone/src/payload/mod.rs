// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

pub mod attribute;
pub mod index;
pub mod layout;
pub mod meta;

use std::io::{Cursor, Read};

pub use self::attribute::Attribute;
pub use self::index::Index;
pub use self::layout::Layout;
pub use self::meta::Meta;
use crate::Error;
use crate::codec::{ReadExt, truncated_on_eof};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    /// The metadata store
    Meta = 1,
    /// File store, i.e. hash indexed
    Content,
    /// Maps files to disk with basic UNIX permissions + types
    Layout,
    /// Indexes the deduplicated content store
    Index,
    /// Key/value attribute storage
    Attributes,
    /// Opaque, uninterpreted payload body
    Dumb,

    Unknown = 255,
}

impl Kind {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Kind::Meta,
            2 => Kind::Content,
            3 => Kind::Layout,
            4 => Kind::Index,
            5 => Kind::Attributes,
            6 => Kind::Dumb,
            _ => Kind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Compression {
    /// Payload has no compression
    None = 1,
    /// Payload uses ZSTD compression
    Zstd,

    Unknown = 255,
}

impl Compression {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Compression::None,
            2 => Compression::Zstd,
            _ => Compression::Unknown,
        }
    }
}

/// Per-payload frame header: 32 bytes, big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub stored_size: u64,
    pub plain_size: u64,
    pub checksum: [u8; 8],
    pub num_records: usize,
    pub version: u16,
    pub kind: Kind,
    pub compression: Compression,
}

impl Header {
    /// Size of the encoded payload header in bytes.
    pub const SIZE: usize = 8 + 8 + 8 + 4 + 2 + 1 + 1;

    pub fn decode<R: Read>(mut reader: R) -> Result<Self, Error> {
        let stored_size = reader.read_u64().map_err(Error::Io)?;
        let plain_size = reader.read_u64().map_err(Error::Io)?;
        let checksum = reader.read_array().map_err(Error::Io)?;
        let num_records = reader.read_u32().map_err(Error::Io)? as usize;
        let version = reader.read_u16().map_err(Error::Io)?;
        let kind = Kind::from_u8(reader.read_u8().map_err(Error::Io)?);
        let compression = Compression::from_u8(reader.read_u8().map_err(Error::Io)?);

        Ok(Self {
            stored_size,
            plain_size,
            checksum,
            num_records,
            version,
            kind,
            compression,
        })
    }
}

/// A single typed record within a non-content payload.
///
/// Every decoder is a pull parser bounded by the enclosing buffer: running
/// past the end of the buffer mid-record surfaces as [`Error::Truncated`].
pub trait Record: Sized {
    fn decode<R: Read>(reader: R) -> Result<Self, Error>;
}

/// Decodes exactly `num_records` records from a fully-buffered payload body:
/// the declared count must be produced and the buffer must be exactly
/// drained in doing so.
///
/// Distinguishes two failure shapes: a record that starts but cannot
/// complete is [`Error::Truncated`]; the buffer running dry cleanly before
/// the declared count is reached is [`Error::RecordCountMismatch`].
pub fn decode_records<T: Record>(buffer: Vec<u8>, num_records: usize) -> Result<Vec<T>, Error> {
    let total_len = buffer.len() as u64;
    let mut cursor = Cursor::new(buffer);
    let mut records = Vec::with_capacity(num_records);

    for _ in 0..num_records {
        if cursor.position() >= total_len {
            return Err(Error::RecordCountMismatch {
                declared: num_records,
                decoded: records.len(),
            });
        }

        let record = T::decode(&mut cursor).map_err(|err| match err {
            Error::Io(io_err) => truncated_on_eof(io_err),
            other => other,
        })?;
        records.push(record);
    }

    if cursor.position() != total_len {
        return Err(Error::Truncated);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_decodes_known_kind_and_compression() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&10u64.to_be_bytes()); // stored_size
        bytes.extend_from_slice(&10u64.to_be_bytes()); // plain_size
        bytes.extend_from_slice(&[0u8; 8]); // checksum
        bytes.extend_from_slice(&3u32.to_be_bytes()); // num_records
        bytes.extend_from_slice(&1u16.to_be_bytes()); // version
        bytes.push(3); // kind = Layout
        bytes.push(2); // compression = Zstd

        let header = Header::decode(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(header.kind, Kind::Layout);
        assert_eq!(header.compression, Compression::Zstd);
        assert_eq!(header.num_records, 3);
    }

    #[test]
    fn unknown_kind_and_compression_are_not_errors() {
        assert_eq!(Kind::from_u8(250), Kind::Unknown);
        assert_eq!(Compression::from_u8(250), Compression::Unknown);
    }
}
