// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Read;

use super::Record;
use crate::Error;
use crate::codec::ReadExt;

/// An (offset, length, digest) triple addressing a file's bytes within the
/// decompressed content payload. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub start: u64,
    pub end: u64,
    pub digest: [u8; 16],
}

impl Index {
    /// Size of the encoded record in bytes.
    pub const SIZE: usize = 8 + 8 + 16;

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Record for Index {
    fn decode<R: Read>(mut reader: R) -> Result<Self, Error> {
        let start = reader.read_u64().map_err(Error::Io)?;
        let end = reader.read_u64().map_err(Error::Io)?;
        let digest = reader.read_array().map_err(Error::Io)?;

        Ok(Self { start, end, digest })
    }
}
