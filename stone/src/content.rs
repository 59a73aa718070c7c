// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! The CONTENT payload: a single blob holding every installed file's bytes
//! back to back, addressed by the INDEX payload's `(start, end, digest)`
//! triples.

use std::io::{self, BufReader, Read, Take, Write};

use xxhash_rust::xxh3::Xxh3;

use crate::Error;
use crate::payload::{Compression, Index};

enum Body<'x, S: Read + 'x> {
    Plain(Take<S>),
    // Boxed as `dyn Read + 'x` so the decoder's own internal lifetime
    // parameter (tied to an optional dictionary we never attach) doesn't
    // have to be named here, while still allowing `S` to borrow from the
    // caller (e.g. `&mut Reader`'s source) instead of owning it outright.
    Zstd(Box<dyn Read + 'x>),
}

impl<'x, S: Read + 'x> Read for Body<'x, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Body::Plain(inner) => inner.read(buf),
            Body::Zstd(decoder) => decoder.read(buf),
        }
    }
}

/// Reads and verifies the decompressed bytes of a CONTENT payload.
///
/// Offers both a sequential mode ([`Extractor::read`] with a final
/// [`Extractor::checksum_valid`]) and a random-access mode
/// [`Extractor::extract`] against already-parsed [`Index`] records. The
/// decoder never buffers the full content in memory: `Zstd` bodies are
/// driven by the caller one chunk at a time.
pub struct Extractor<'x, S: Read + 'x> {
    body: Body<'x, S>,
    expected_checksum: u64,
    hasher: Xxh3,
    offset: u64,
    eof: bool,
}

impl<'x, S: Read + 'x> Extractor<'x, S> {
    pub(crate) fn new(source: S, stored_size: u64, compression: Compression, expected_checksum: u64) -> Result<Self, Error> {
        let limited = source.take(stored_size);

        let body = match compression {
            Compression::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(BufReader::new(limited))
                    .map_err(Error::Compression)?;
                Body::Zstd(Box::new(decoder))
            }
            _ => Body::Plain(limited),
        };

        Ok(Self {
            body,
            expected_checksum,
            hasher: Xxh3::new(),
            offset: 0,
            eof: false,
        })
    }

    /// A sane buffer size to drive [`Extractor::read`] with; mirrors the
    /// reference C API's `stone_payload_content_reader_buf_hint` so callers
    /// don't have to guess.
    pub fn buf_hint(&self) -> usize {
        match &self.body {
            Body::Zstd(_) => 64 * 1024,
            Body::Plain(_) => 8 * 1024,
        }
    }

    /// Reads the next chunk of decompressed bytes. Returns `0` at EOF.
    ///
    /// The caller MUST drive this to EOF before trusting
    /// [`Extractor::checksum_valid`].
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = self.body.read(buf).map_err(Error::Io)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.hasher.update(&buf[..n]);
            self.offset += n as u64;
        }
        Ok(n)
    }

    /// Whether the running XXH3-64 over every byte streamed so far matches
    /// the payload header's checksum. Only meaningful once `read` has
    /// returned `0`.
    pub fn checksum_valid(&self) -> bool {
        self.eof && self.hasher.digest() == self.expected_checksum
    }

    /// The running XXH3-64 over every byte streamed so far. Only meaningful
    /// once `read` has returned `0`; see [`Extractor::checksum_valid`].
    pub fn digest(&self) -> u64 {
        self.hasher.digest()
    }

    /// Drains the full stream into `sink` and reports overall checksum
    /// validity.
    pub fn unpack_to<W: Write>(&mut self, sink: &mut W) -> Result<bool, Error> {
        let mut buf = vec![0u8; self.buf_hint()];
        loop {
            let n = self.read(&mut buf)?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n]).map_err(Error::Io)?;
        }
        Ok(self.checksum_valid())
    }

    /// Materialises one `IndexRecord`'s byte range, verifying its XXH3-128
    /// digest.
    ///
    /// This is a forward-only single pass: `record.start` must not be
    /// behind bytes already consumed. Callers extracting a full index
    /// should sort by `start` first; see [`Extractor::extract_all`] for
    /// that bookkeeping done for you.
    pub fn extract<W: Write>(&mut self, record: &Index, sink: &mut W) -> Result<(), Error> {
        if record.start < self.offset {
            return Err(Error::Internal);
        }

        let mut buf = vec![0u8; self.buf_hint()];

        while self.offset < record.start {
            let want = ((record.start - self.offset) as usize).min(buf.len());
            let n = self.read(&mut buf[..want])?;
            if n == 0 {
                return Err(Error::Truncated);
            }
        }

        let mut hasher = Xxh3::new();
        let mut remaining = record.len();
        while remaining > 0 {
            let want = (remaining as usize).min(buf.len());
            let n = self.read(&mut buf[..want])?;
            if n == 0 {
                return Err(Error::Truncated);
            }
            hasher.update(&buf[..n]);
            sink.write_all(&buf[..n]).map_err(Error::Io)?;
            remaining -= n as u64;
        }

        let digest = hasher.digest128().to_be_bytes();
        if digest != record.digest {
            return Err(Error::DigestMismatch {
                expected: record.digest,
                actual: digest,
            });
        }

        Ok(())
    }

    /// Extracts every record in `records` in a single forward pass,
    /// returning their bytes in the same order `records` was given in
    /// (internally sorted by `start`, then remapped back).
    pub fn extract_all(&mut self, records: &[Index]) -> Result<Vec<Vec<u8>>, Error> {
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by_key(|&i| records[i].start);

        let mut out = vec![Vec::new(); records.len()];
        for i in order {
            let mut buf = Vec::with_capacity(records[i].len() as usize);
            self.extract(&records[i], &mut buf)?;
            out[i] = buf;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use xxhash_rust::xxh3::{xxh3_64, xxh3_128};

    use super::*;

    #[test]
    fn streaming_mode_validates_checksum() {
        let plain = b"hello world, this is stone content".to_vec();
        let checksum = xxh3_64(&plain);

        let mut extractor =
            Extractor::new(Cursor::new(plain.clone()), plain.len() as u64, Compression::None, checksum).unwrap();

        let mut out = Vec::new();
        let valid = extractor.unpack_to(&mut out).unwrap();
        assert_eq!(out, plain);
        assert!(valid);
    }

    #[test]
    fn streaming_mode_detects_bit_flip() {
        let plain = b"hello world, this is stone content".to_vec();
        let checksum = xxh3_64(&plain);

        let mut corrupted = plain.clone();
        corrupted[0] ^= 0x01;

        let mut extractor =
            Extractor::new(Cursor::new(corrupted), plain.len() as u64, Compression::None, checksum).unwrap();

        let mut out = Vec::new();
        let valid = extractor.unpack_to(&mut out).unwrap();
        assert!(!valid);
    }

    #[test]
    fn random_access_extracts_exact_range() {
        let plain = b"AAAABBBBCCCC".to_vec();
        let checksum = xxh3_64(&plain);
        let mut extractor =
            Extractor::new(Cursor::new(plain.clone()), plain.len() as u64, Compression::None, checksum).unwrap();

        let record = Index {
            start: 4,
            end: 8,
            digest: xxh3_128(b"BBBB").to_be_bytes(),
        };

        let mut out = Vec::new();
        extractor.extract(&record, &mut out).unwrap();
        assert_eq!(out, b"BBBB");
    }

    #[test]
    fn random_access_rejects_digest_mismatch() {
        let plain = b"AAAABBBBCCCC".to_vec();
        let len = plain.len() as u64;
        let checksum = xxh3_64(&plain);
        let mut extractor = Extractor::new(Cursor::new(plain), len, Compression::None, checksum).unwrap();

        let record = Index {
            start: 4,
            end: 8,
            digest: [0u8; 16],
        };

        let mut out = Vec::new();
        let err = extractor.extract(&record, &mut out).unwrap_err();
        assert!(matches!(err, Error::DigestMismatch { .. }));
    }

    #[test]
    fn extract_all_preserves_caller_order_despite_internal_sort() {
        let plain = b"AAAABBBBCCCC".to_vec();
        let len = plain.len() as u64;
        let checksum = xxh3_64(&plain);
        let mut extractor = Extractor::new(Cursor::new(plain), len, Compression::None, checksum).unwrap();

        let records = vec![
            Index {
                start: 8,
                end: 12,
                digest: xxh3_128(b"CCCC").to_be_bytes(),
            },
            Index {
                start: 0,
                end: 4,
                digest: xxh3_128(b"AAAA").to_be_bytes(),
            },
        ];

        let extracted = extractor.extract_all(&records).unwrap();
        assert_eq!(extracted[0], b"CCCC");
        assert_eq!(extracted[1], b"AAAA");
    }
}
