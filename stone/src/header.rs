// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Read;

use crate::Error;
use crate::codec::ReadExt;

const MAGIC: [u8; 4] = [0x00, b'm', b'o', b's'];

/// The only format version this crate understands.
pub const VERSION_V1: u32 = 1;

/// Header for the v1 archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV1 {
    pub num_payloads: u16,
    pub file_type: FileType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileType {
    Binary = 1,
    Delta = 2,
    Repository = 3,
    BuildManifest = 4,
    Unknown = 255,
}

impl FileType {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => FileType::Binary,
            2 => FileType::Delta,
            3 => FileType::Repository,
            4 => FileType::BuildManifest,
            _ => FileType::Unknown,
        }
    }
}

/// The full 32-byte archive header: magic, version, and the version-specific
/// block. Only V1 is understood; other versions fail with
/// [`Error::UnsupportedVersion`] before this crate looks at their layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub v1: HeaderV1,
}

impl Header {
    /// Size in bytes of the fixed archive header block.
    pub const SIZE: usize = 32;

    pub fn decode<R: Read>(mut reader: R) -> Result<Self, Error> {
        let magic = reader.read_array::<4>().map_err(Error::Io)?;
        if magic != MAGIC {
            return Err(Error::BadMagic);
        }

        let version = reader.read_u32().map_err(Error::Io)?;
        if version != VERSION_V1 {
            return Err(Error::UnsupportedVersion(version));
        }

        let num_payloads = reader.read_u16().map_err(Error::Io)?;
        let file_type = FileType::from_u8(reader.read_u8().map_err(Error::Io)?);
        // Remaining bytes up to Self::SIZE are reserved and zeroed.
        let _reserved = reader.read_vec(Self::SIZE - 4 - 4 - 2 - 1).map_err(Error::Io)?;

        Ok(Self {
            version,
            v1: HeaderV1 {
                num_payloads,
                file_type,
            },
        })
    }
}
