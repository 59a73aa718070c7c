// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use xxhash_rust::xxh3::Xxh3;

use crate::codec::{ReadExt, truncated_on_eof};
use crate::content::Extractor;
use crate::header::Header;
use crate::payload::{self, Attribute, Compression, Index, Kind, Layout, Meta};
use crate::{Error, VERSION_V1};

/// Ties the whole engine together: owns the byte source, tracks parser
/// state, and is the only component that mutates it.
///
/// `S` is any seekable byte source: `fs_err::File` for a real file,
/// `std::io::Cursor` for an in-memory buffer, or [`crate::io::Callback`] for
/// host-supplied I/O. There is no vtable: the same engine is monomorphised
/// per source type.
pub struct Reader<S> {
    source: S,
    header: Header,
    /// Byte offset, from the start of the source, where the next payload
    /// header begins.
    next_frame: u64,
    payloads_read: u16,
}

impl Reader<fs_err::File> {
    /// Opens an archive from a path on disk.
    pub fn read_file(path: impl AsRef<Path>) -> Result<(Self, u32), Error> {
        let file = fs_err::File::open(path).map_err(|e| Error::Io(e.into()))?;
        Self::read(file)
    }
}

impl Reader<Cursor<Vec<u8>>> {
    /// Opens an archive from an in-memory buffer.
    ///
    /// The bytes are copied into an owned cursor so `Reader` doesn't need to
    /// carry a borrow's lifetime around; pass an already-owned `Vec<u8>` to
    /// avoid the copy.
    pub fn read_buffer(bytes: impl Into<Vec<u8>>) -> Result<(Self, u32), Error> {
        Self::read(Cursor::new(bytes.into()))
    }
}

impl<S: Read + Seek + 'static> Reader<S> {
    /// Opens an archive over any seekable byte source, returning the
    /// decoded format version alongside the reader so callers can dispatch
    /// on it before calling [`Reader::header_v1`].
    pub fn read(mut source: S) -> Result<(Self, u32), Error> {
        let header = Header::decode(&mut source)?;

        Ok((
            Self {
                source,
                header,
                next_frame: Header::SIZE as u64,
                payloads_read: 0,
            },
            header.version,
        ))
    }

    /// The cached V1 archive header.
    pub fn header_v1(&self) -> crate::header::HeaderV1 {
        self.header.v1
    }

    /// Advances to the next payload frame, or `Ok(None)` once
    /// `header.num_payloads` frames have all been read. Running past that
    /// count is an error, not silent EOF.
    pub fn next_payload(&mut self) -> Result<Option<Payload<'_, S>>, Error> {
        if self.payloads_read >= self.header.v1.num_payloads {
            return Ok(None);
        }

        self.source
            .seek(SeekFrom::Start(self.next_frame))
            .map_err(Error::Io)?;

        let header = payload::Header::decode(&mut self.source).map_err(|err| match err {
            Error::Io(io_err) => truncated_on_eof(io_err),
            other => other,
        })?;

        let body_start = self.next_frame + payload::Header::SIZE as u64;
        self.next_frame = body_start + header.stored_size;
        self.payloads_read += 1;

        Ok(Some(Payload {
            reader: self,
            header,
            body_start,
        }))
    }
}

/// A single framed payload, positioned at its body. Dropping this without
/// draining its records is legal: the next [`Reader::next_payload`] call
/// seeks past it unconditionally.
pub struct Payload<'r, S> {
    reader: &'r mut Reader<S>,
    header: payload::Header,
    body_start: u64,
}

impl<'r, S: Read + Seek + 'static> Payload<'r, S> {
    pub fn header(&self) -> payload::Header {
        self.header
    }

    /// Fully buffers this payload's plain (decompressed) bytes, verifying
    /// the per-payload checksum. Only valid for non-content payloads: the
    /// content payload is read via [`Payload::open_content`] instead so it
    /// is never buffered in full.
    fn plain_bytes(&mut self) -> Result<Vec<u8>, Error> {
        self.reader
            .source
            .seek(SeekFrom::Start(self.body_start))
            .map_err(Error::Io)?;

        let stored = self
            .reader
            .source
            .by_ref()
            .take(self.header.stored_size)
            .read_vec(self.header.stored_size as usize)
            .map_err(truncated_on_eof)?;

        let plain = match self.header.compression {
            Compression::Zstd => zstd::stream::decode_all(stored.as_slice()).map_err(Error::Compression)?,
            _ => stored.clone(),
        };

        // Non-content payload checksums cover the *stored* bytes, surfaced
        // at end-of-payload so record iteration can proceed speculatively
        // first.
        let actual = {
            let mut hasher = Xxh3::new();
            hasher.update(&stored);
            hasher.digest()
        };
        let expected = u64::from_be_bytes(self.header.checksum);
        if actual != expected {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        if plain.len() as u64 != self.header.plain_size {
            return Err(Error::Truncated);
        }

        Ok(plain)
    }

    fn expect_kind(&self, expected: Kind) -> Result<(), Error> {
        if self.header.kind != expected {
            return Err(Error::WrongPayloadKind {
                expected,
                actual: self.header.kind,
            });
        }
        Ok(())
    }

    pub fn iter_layout(&mut self) -> Result<Vec<Layout>, Error> {
        self.expect_kind(Kind::Layout)?;
        let bytes = self.plain_bytes()?;
        payload::decode_records(bytes, self.header.num_records)
    }

    pub fn iter_meta(&mut self) -> Result<Vec<Meta>, Error> {
        self.expect_kind(Kind::Meta)?;
        let bytes = self.plain_bytes()?;
        payload::decode_records(bytes, self.header.num_records)
    }

    pub fn iter_index(&mut self) -> Result<Vec<Index>, Error> {
        self.expect_kind(Kind::Index)?;
        let bytes = self.plain_bytes()?;
        payload::decode_records(bytes, self.header.num_records)
    }

    pub fn iter_attribute(&mut self) -> Result<Vec<Attribute>, Error> {
        self.expect_kind(Kind::Attributes)?;
        let bytes = self.plain_bytes()?;
        payload::decode_records(bytes, self.header.num_records)
    }

    /// Returns a [`Kind::Dumb`] payload's plain bytes uninterpreted: this
    /// payload kind carries no declared record shape, so there is no typed
    /// iterator for it, only the raw decompressed body.
    pub fn read_dumb(&mut self) -> Result<Vec<u8>, Error> {
        self.expect_kind(Kind::Dumb)?;
        self.plain_bytes()
    }

    /// Opens a streaming/random-access [`Extractor`] over a CONTENT
    /// payload. Borrows the reader's source for the extractor's lifetime;
    /// the extractor must be released before the reader advances.
    pub fn open_content(&mut self) -> Result<Extractor<'_, &mut S>, Error> {
        self.expect_kind(Kind::Content)?;

        self.reader
            .source
            .seek(SeekFrom::Start(self.body_start))
            .map_err(Error::Io)?;

        let expected_checksum = u64::from_be_bytes(self.header.checksum);
        Extractor::new(
            &mut self.reader.source,
            self.header.stored_size,
            self.header.compression,
            expected_checksum,
        )
    }

    /// Convenience wrapper over [`Payload::open_content`] +
    /// [`Extractor::unpack_to`] for callers that just want the decompressed
    /// bytes handed to an existing sink.
    pub fn unpack_content_to_writer<W: std::io::Write>(&mut self, sink: &mut W) -> Result<(), Error> {
        let expected = u64::from_be_bytes(self.header.checksum);
        let mut extractor = self.open_content()?;
        let valid = extractor.unpack_to(sink)?;
        if !valid {
            return Err(Error::ChecksumMismatch {
                expected,
                actual: extractor.digest(),
            });
        }
        Ok(())
    }

    /// As [`Payload::unpack_content_to_writer`], but returns the fully
    /// materialised content instead of writing through a sink.
    pub fn unpack_content_to_buf(&mut self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.unpack_content_to_writer(&mut buf)?;
        Ok(buf)
    }
}
