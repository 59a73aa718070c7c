// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Read;

use super::Record;
use crate::Error;
use crate::codec::ReadExt;

/// A length-prefixed key/value pair, used for extended attribute storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Record for Attribute {
    fn decode<R: Read>(mut reader: R) -> Result<Self, Error> {
        let key_len = reader.read_u64().map_err(Error::Io)?;
        let value_len = reader.read_u64().map_err(Error::Io)?;
        let key = reader.read_vec(key_len as usize).map_err(Error::Io)?;
        let value = reader.read_vec(value_len as usize).map_err(Error::Io)?;

        Ok(Self { key, value })
    }
}
