// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::{self, Read};

/// Big-endian primitive decoding helpers used by every record/header parser.
///
/// Blanket-implemented for any [`Read`], so it works identically over a
/// file, a memory buffer or a [`crate::io::Callback`] adapter.
pub trait ReadExt: Read {
    fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_i8(&mut self) -> io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_u16(&mut self) -> io::Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_i16(&mut self) -> io::Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> io::Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_u64(&mut self) -> io::Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> io::Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_u128(&mut self) -> io::Result<u128> {
        Ok(u128::from_be_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_vec(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads `len` bytes and lossily converts them to UTF-8.
    ///
    /// The wire format does not guarantee valid UTF-8; callers that need
    /// the raw bytes should use [`ReadExt::read_vec`] instead.
    fn read_string(&mut self, len: u64) -> io::Result<String> {
        let bytes = self.read_vec(len as usize)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a NUL-terminated string, bounded by `max_len` bytes.
    ///
    /// `max_len` is the declared size of the enclosing field; a missing
    /// terminator within that bound is not an error, since the declared
    /// `length` is only an authoritative upper bound, not a guarantee of a
    /// terminator.
    fn read_nul_terminated(&mut self, max_len: u64) -> io::Result<Vec<u8>> {
        let bytes = self.read_vec(max_len as usize)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(bytes[..end].to_vec())
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Maps an [`io::Error`] produced while draining a bounded buffer into the
/// crate's [`crate::Error::Truncated`], since an unexpected EOF inside a
/// record or frame always means the declared size lied.
pub(crate) fn truncated_on_eof(err: io::Error) -> crate::Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        crate::Error::Truncated
    } else {
        crate::Error::Io(err)
    }
}
