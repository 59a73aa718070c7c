// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Reader for the stone binary package container format.
//!
//! ```no_run
//! # fn main() -> Result<(), stone::Error> {
//! let (mut reader, _version) = stone::read_file("bash-completion-1.0-1-1-x86_64.stone")?;
//! while let Some(mut payload) = reader.next_payload()? {
//!     if payload.header().kind == stone::payload::Kind::Meta {
//!         for record in payload.iter_meta()? {
//!             println!("{:?}", record);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod content;
mod error;
pub mod header;
pub mod io;
pub mod payload;
mod reader;

pub use content::Extractor;
pub use error::Error;
pub use header::{FileType, Header, HeaderV1, VERSION_V1};
pub use payload::Record;
pub use reader::{Payload, Reader};

use std::io::{Read, Seek};
use std::path::Path;

/// Opens an archive over any seekable byte source.
pub fn read<S: Read + Seek + 'static>(source: S) -> Result<(Reader<S>, u32), Error> {
    Reader::read(source)
}

/// Opens an archive from a path on disk.
pub fn read_file(path: impl AsRef<Path>) -> Result<(Reader<fs_err::File>, u32), Error> {
    Reader::read_file(path)
}

/// Opens an archive from an in-memory buffer.
pub fn read_buffer(bytes: impl Into<Vec<u8>>) -> Result<(Reader<std::io::Cursor<Vec<u8>>>, u32), Error> {
    Reader::read_buffer(bytes)
}
