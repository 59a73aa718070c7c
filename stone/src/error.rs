// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io;

use thiserror::Error;

use crate::payload::Kind;

/// Every way a stone archive can fail to parse.
///
/// Unknown enum discriminants (file type, meta tag, primitive type,
/// dependency kind) are never represented here: they decode to an
/// `Unknown(_)` variant on the relevant type instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io")]
    Io(#[from] io::Error),

    #[error("bad magic")]
    BadMagic,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("payload checksum mismatch: expected {expected:016x}, got {actual:016x}")]
    ChecksumMismatch { expected: u64, actual: u64 },

    #[error("content range digest mismatch: expected {}, got {}", hex(expected), hex(actual))]
    DigestMismatch { expected: [u8; 16], actual: [u8; 16] },

    #[error("record or frame truncated")]
    Truncated,

    #[error("expected {declared} records, decoded {decoded}")]
    RecordCountMismatch { declared: usize, decoded: usize },

    #[error("wrong payload kind: expected {expected:?}, got {actual:?}")]
    WrongPayloadKind { expected: Kind, actual: Kind },

    #[error("zstd decompression")]
    Compression(#[source] io::Error),

    #[error("internal invariant violation")]
    Internal,
}

fn hex(bytes: &[u8; 16]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
