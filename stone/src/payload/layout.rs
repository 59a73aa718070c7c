// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Read;

use astr::AStr;

use super::Record;
use crate::Error;
use crate::codec::ReadExt;

/// Layout entries record their target file type so they can be rebuilt on
/// the target installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileType {
    /// Regular file
    Regular = 1,

    /// Symbolic link (source + target set)
    Symlink,

    /// Directory node
    Directory,

    /// Character device
    CharacterDevice,

    /// Block device
    BlockDevice,

    /// FIFO node
    Fifo,

    /// UNIX Socket
    Socket,

    Unknown = 255,
}

impl FileType {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => FileType::Regular,
            2 => FileType::Symlink,
            3 => FileType::Directory,
            4 => FileType::CharacterDevice,
            5 => FileType::BlockDevice,
            6 => FileType::Fifo,
            7 => FileType::Socket,
            _ => FileType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Regular(u128, AStr),
    Symlink(AStr, AStr),
    Directory(AStr),

    // not properly supported
    CharacterDevice(AStr),
    BlockDevice(AStr),
    Fifo(AStr),
    Socket(AStr),

    Unknown(AStr, AStr),
}

impl Entry {
    pub fn target(&self) -> &str {
        match self {
            Entry::Regular(_, target)
            | Entry::Symlink(_, target)
            | Entry::Directory(target)
            | Entry::CharacterDevice(target)
            | Entry::BlockDevice(target)
            | Entry::Fifo(target)
            | Entry::Socket(target)
            | Entry::Unknown(_, target) => target,
        }
    }
}

// TODO: Strong type these fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub tag: u32,
    pub entry: Entry,
}

impl Record for Layout {
    fn decode<R: Read>(mut reader: R) -> Result<Self, Error> {
        let uid = reader.read_u32().map_err(Error::Io)?;
        let gid = reader.read_u32().map_err(Error::Io)?;
        let mode = reader.read_u32().map_err(Error::Io)?;
        let tag = reader.read_u32().map_err(Error::Io)?;

        let source_length = reader.read_u16().map_err(Error::Io)?;
        let target_length = reader.read_u16().map_err(Error::Io)?;

        fn sanitize(s: &str) -> &str {
            s.trim_end_matches('\0')
        }

        let file_type = FileType::from_u8(reader.read_u8().map_err(Error::Io)?);

        // 11 reserved bytes, bringing the fixed prefix to 32 bytes total.
        let _padding = reader.read_array::<11>().map_err(Error::Io)?;

        // Make the layout entry *usable*
        let entry = match file_type {
            FileType::Regular => {
                let source = reader.read_vec(source_length as usize).map_err(Error::Io)?;
                let hash = u128::from_be_bytes(source.try_into().map_err(|_| Error::Truncated)?);
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::Regular(hash, sanitize(&target).into())
            }
            FileType::Symlink => {
                let source = reader.read_string(source_length as u64).map_err(Error::Io)?;
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::Symlink(sanitize(&source).into(), sanitize(&target).into())
            }
            FileType::Directory => {
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::Directory(sanitize(&target).into())
            }
            FileType::CharacterDevice => {
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::CharacterDevice(sanitize(&target).into())
            }
            FileType::BlockDevice => {
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::BlockDevice(sanitize(&target).into())
            }
            FileType::Fifo => {
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::Fifo(sanitize(&target).into())
            }
            FileType::Socket => {
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::Socket(sanitize(&target).into())
            }
            FileType::Unknown => {
                let source = reader.read_string(source_length as u64).map_err(Error::Io)?;
                let target = reader.read_string(target_length as u64).map_err(Error::Io)?;
                Entry::Unknown(sanitize(&source).into(), sanitize(&target).into())
            }
        };

        Ok(Self {
            uid,
            gid,
            mode,
            tag,
            entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[allow(clippy::too_many_arguments)]
    fn encode_fixed(
        uid: u32,
        gid: u32,
        mode: u32,
        tag: u32,
        source_len: u16,
        target_len: u16,
        file_type: u8,
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&uid.to_be_bytes());
        buf.extend_from_slice(&gid.to_be_bytes());
        buf.extend_from_slice(&mode.to_be_bytes());
        buf.extend_from_slice(&tag.to_be_bytes());
        buf.extend_from_slice(&source_len.to_be_bytes());
        buf.extend_from_slice(&target_len.to_be_bytes());
        buf.push(file_type);
        buf.extend_from_slice(&[0u8; 11]);
        buf
    }

    #[test]
    fn decodes_symlink_record() {
        let source = b"/usr/bin/vi";
        let target = b"nvim";
        let mut buf = encode_fixed(0, 0, 0o777, 0, source.len() as u16, target.len() as u16, 2);
        buf.extend_from_slice(source);
        buf.extend_from_slice(target);

        let record = Layout::decode(Cursor::new(buf)).unwrap();
        assert_eq!(record.mode, 0o777);
        assert_eq!(record.entry, Entry::Symlink("/usr/bin/vi".into(), "nvim".into()));
        assert_eq!(record.entry.target(), "nvim");
    }

    #[test]
    fn decodes_regular_record_with_hash() {
        let hash = 0x1122_3344_5566_7788_99aa_bbcc_ddee_ff00u128;
        let target = b"usr/bin/bash-completion";
        let mut buf = encode_fixed(0, 0, 0o644, 0, 16, target.len() as u16, 1);
        buf.extend_from_slice(&hash.to_be_bytes());
        buf.extend_from_slice(target);

        let record = Layout::decode(Cursor::new(buf)).unwrap();
        assert_eq!(record.entry, Entry::Regular(hash, "usr/bin/bash-completion".into()));
    }

    #[test]
    fn unknown_file_type_is_preserved_not_an_error() {
        let buf = encode_fixed(0, 0, 0, 0, 0, 0, 240);
        let record = Layout::decode(Cursor::new(buf)).unwrap();
        assert!(matches!(record.entry, Entry::Unknown(..)));
    }
}
