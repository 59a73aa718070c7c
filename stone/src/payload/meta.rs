// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Read;

use astr::AStr;

use super::Record;
use crate::Error;
use crate::codec::ReadExt;

/// Well-known metadata tags, per `StonePayloadMetaTag` in the original C
/// header (ground truth for the exact discriminant values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Name,
    Architecture,
    Version,
    Summary,
    Description,
    Homepage,
    SourceID,
    Depends,
    Provides,
    Conflicts,
    Release,
    License,
    BuildRelease,
    PackageURI,
    PackageHash,
    PackageSize,
    BuildDepends,
    SourceURI,
    SourcePath,
    SourceRef,

    /// Forward-compatibility: a tag this crate doesn't recognise yet.
    Unknown(u16),
}

impl Tag {
    fn from_u16(value: u16) -> Self {
        match value {
            1 => Tag::Name,
            2 => Tag::Architecture,
            3 => Tag::Version,
            4 => Tag::Summary,
            5 => Tag::Description,
            6 => Tag::Homepage,
            7 => Tag::SourceID,
            8 => Tag::Depends,
            9 => Tag::Provides,
            10 => Tag::Conflicts,
            11 => Tag::Release,
            12 => Tag::License,
            13 => Tag::BuildRelease,
            14 => Tag::PackageURI,
            15 => Tag::PackageHash,
            16 => Tag::PackageSize,
            17 => Tag::BuildDepends,
            18 => Tag::SourceURI,
            19 => Tag::SourcePath,
            20 => Tag::SourceRef,
            other => Tag::Unknown(other),
        }
    }
}

/// `StonePayloadMetaDependency` in the original C header; shared by the
/// `Dependency` and `Provider` primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    PackageName,
    SharedLibrary,
    PkgConfig,
    Interpreter,
    CMake,
    Python,
    Binary,
    SystemBinary,
    PkgConfig32,

    Unknown(u8),
}

impl DependencyKind {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DependencyKind::PackageName,
            1 => DependencyKind::SharedLibrary,
            2 => DependencyKind::PkgConfig,
            3 => DependencyKind::Interpreter,
            4 => DependencyKind::CMake,
            5 => DependencyKind::Python,
            6 => DependencyKind::Binary,
            7 => DependencyKind::SystemBinary,
            8 => DependencyKind::PkgConfig32,
            other => DependencyKind::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub name: AStr,
}

/// The decoded value of a meta record, tagged by its primitive type byte.
///
/// Discriminant order follows `StonePayloadMetaPrimitiveType` in the
/// reference C header (zero-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    /// Not required to be valid UTF-8 on the wire; decoded lossily here
    /// since every known string tag is human-readable text.
    String(AStr),
    Dependency(Dependency),
    Provider(Dependency),

    /// Forward-compatibility: a primitive type this crate doesn't recognise.
    Unknown(u8, Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub tag: Tag,
    pub value: Value,
}

impl Record for Meta {
    fn decode<R: Read>(mut reader: R) -> Result<Self, Error> {
        let length = reader.read_u32().map_err(Error::Io)?;
        let tag = Tag::from_u16(reader.read_u16().map_err(Error::Io)?);
        let primitive_type = reader.read_u8().map_err(Error::Io)?;

        let value = match primitive_type {
            0 => {
                expect_width(length, 1)?;
                Value::Int8(reader.read_i8().map_err(Error::Io)?)
            }
            1 => {
                expect_width(length, 1)?;
                Value::Uint8(reader.read_u8().map_err(Error::Io)?)
            }
            2 => {
                expect_width(length, 2)?;
                Value::Int16(reader.read_i16().map_err(Error::Io)?)
            }
            3 => {
                expect_width(length, 2)?;
                Value::Uint16(reader.read_u16().map_err(Error::Io)?)
            }
            4 => {
                expect_width(length, 4)?;
                Value::Int32(reader.read_i32().map_err(Error::Io)?)
            }
            5 => {
                expect_width(length, 4)?;
                Value::Uint32(reader.read_u32().map_err(Error::Io)?)
            }
            6 => {
                expect_width(length, 8)?;
                Value::Int64(reader.read_i64().map_err(Error::Io)?)
            }
            7 => {
                expect_width(length, 8)?;
                Value::Uint64(reader.read_u64().map_err(Error::Io)?)
            }
            8 => {
                let bytes = reader
                    .read_vec(length as usize)
                    .map_err(Error::Io)?;
                Value::String(String::from_utf8_lossy(&bytes).into_owned().into())
            }
            9 => Value::Dependency(decode_dependency(&mut reader, length)?),
            10 => Value::Provider(decode_dependency(&mut reader, length)?),
            other => {
                let bytes = reader.read_vec(length as usize).map_err(Error::Io)?;
                Value::Unknown(other, bytes)
            }
        };

        Ok(Self { tag, value })
    }
}

/// Fixed-width primitives are self-delimiting too: `length` must equal the
/// primitive's natural width, or the declared size disagrees with what's
/// about to be consumed and the shared record cursor would desync.
fn expect_width(length: u32, width: u32) -> Result<(), Error> {
    if length != width {
        return Err(Error::Truncated);
    }
    Ok(())
}

/// `length` is the authoritative upper bound on the dependency's `name`
/// field: the kind byte consumes one of it, the rest is the NUL-terminated
/// (or exactly-filled) name.
fn decode_dependency<R: Read>(mut reader: R, length: u32) -> Result<Dependency, Error> {
    let kind = DependencyKind::from_u8(reader.read_u8().map_err(Error::Io)?);
    let name_len = (length as u64).saturating_sub(1);
    let name = reader.read_nul_terminated(name_len).map_err(Error::Io)?;
    Ok(Dependency {
        kind,
        name: String::from_utf8_lossy(&name).into_owned().into(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn header(length: u32, tag: u16, primitive_type: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&length.to_be_bytes());
        buf.extend_from_slice(&tag.to_be_bytes());
        buf.push(primitive_type);
        buf
    }

    #[test]
    fn decodes_string_value() {
        let value = b"bash-completion";
        let mut buf = header(value.len() as u32, 1, 8);
        buf.extend_from_slice(value);

        let record = Meta::decode(Cursor::new(buf)).unwrap();
        assert_eq!(record.tag, Tag::Name);
        assert_eq!(record.value, Value::String("bash-completion".into()));
    }

    #[test]
    fn decodes_dependency_value() {
        let name = b"libc.so.6\0";
        let mut buf = header(1 + name.len() as u32, 8, 9);
        buf.push(1); // SharedLibrary
        buf.extend_from_slice(name);

        let record = Meta::decode(Cursor::new(buf)).unwrap();
        assert_eq!(record.tag, Tag::Depends);
        assert_eq!(
            record.value,
            Value::Dependency(Dependency {
                kind: DependencyKind::SharedLibrary,
                name: "libc.so.6".into(),
            })
        );
    }

    #[test]
    fn unknown_tag_and_primitive_type_are_preserved() {
        let mut buf = header(2, 9000, 200);
        buf.extend_from_slice(&[1, 2]);

        let record = Meta::decode(Cursor::new(buf)).unwrap();
        assert_eq!(record.tag, Tag::Unknown(9000));
        assert_eq!(record.value, Value::Unknown(200, vec![1, 2]));
    }

    #[test]
    fn decodes_fixed_width_integer_values() {
        let mut buf = header(8, 16, 7); // Uint64
        buf.extend_from_slice(&42u64.to_be_bytes());

        let record = Meta::decode(Cursor::new(buf)).unwrap();
        assert_eq!(record.tag, Tag::PackageSize);
        assert_eq!(record.value, Value::Uint64(42));
    }

    #[test]
    fn fixed_width_value_with_wrong_length_is_truncated() {
        // Int8 (primitive_type 0) is one byte wide; declaring 100 desyncs
        // the shared cursor instead of erroring if left unchecked.
        let buf = header(100, 1, 0);

        let err = Meta::decode(Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, Error::Truncated));
    }
}
