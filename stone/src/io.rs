// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! The abstract seekable byte source the reader is built over.
//!
//! Rather than a hand-rolled vtable (the approach the original C
//! `StoneReadVTable` takes), any type implementing [`std::io::Read`] +
//! [`std::io::Seek`] already satisfies [`crate::Reader`]'s bound: a file
//! descriptor, an in-memory buffer, or the [`Callback`] adapter below for
//! host-supplied I/O all work without an extra trait.

use std::io::{self, Read, Seek, SeekFrom};

/// Adapts caller-supplied read/seek function pointers (or closures) to
/// [`Read`] + [`Seek`], for hosts that can't hand over a native file or
/// buffer directly.
pub struct Callback<F, G> {
    read: F,
    seek: G,
}

impl<F, G> Callback<F, G>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
    G: FnMut(SeekFrom) -> io::Result<u64>,
{
    pub fn new(read: F, seek: G) -> Self {
        Self { read, seek }
    }
}

impl<F, G> Read for Callback<F, G>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
    G: FnMut(SeekFrom) -> io::Result<u64>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (self.read)(buf)
    }
}

impl<F, G> Seek for Callback<F, G>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
    G: FnMut(SeekFrom) -> io::Result<u64>,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        (self.seek)(pos)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read as _;

    use super::*;

    #[test]
    fn callback_forwards_to_closures() {
        let data = b"hello world".to_vec();
        let mut pos = 0usize;
        let mut source = Callback::new(
            |buf: &mut [u8]| {
                let n = buf.len().min(data.len() - pos);
                buf[..n].copy_from_slice(&data[pos..pos + n]);
                pos += n;
                Ok(n)
            },
            |_: SeekFrom| Ok(0),
        );

        let mut out = [0u8; 5];
        source.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"hello");
    }
}
