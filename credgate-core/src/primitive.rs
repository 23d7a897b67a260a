//! Primitive wire types.
//!
//! Every primitive has a fixed serialized width. Integers are little-endian
//! and bounds-checked once, when the value is constructed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cursor::{Cursor, Writer};
use crate::error::{CodecError, CodecResult};

/// Width of an [`Identifier`] on the wire.
pub const IDENTIFIER_LEN: usize = 32;

/// A raw 32-byte public-key-like identifier. Encoded as-is, no prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(pub [u8; IDENTIFIER_LEN]);

impl Identifier {
    pub const fn new(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; IDENTIFIER_LEN] {
        self.0
    }
}

impl From<[u8; IDENTIFIER_LEN]> for Identifier {
    fn from(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Declared type of a primitive field.
///
/// In IDL documents these are written as `"u8"`, `"u16"`, `"u32"`, `"u64"`,
/// `"i64"`, `"bool"`, `"identifier"` and `"[u8; N]"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrimitiveType {
    U8,
    U16,
    U32,
    U64,
    I64,
    Bool,
    Identifier,
    /// Fixed-length byte array.
    Bytes(usize),
}

impl PrimitiveType {
    /// Serialized width in bytes.
    pub const fn static_size(self) -> usize {
        match self {
            PrimitiveType::U8 | PrimitiveType::Bool => 1,
            PrimitiveType::U16 => 2,
            PrimitiveType::U32 => 4,
            PrimitiveType::U64 | PrimitiveType::I64 => 8,
            PrimitiveType::Identifier => IDENTIFIER_LEN,
            PrimitiveType::Bytes(len) => len,
        }
    }

    /// Inclusive bounds for integer types, `None` otherwise.
    pub const fn bounds(self) -> Option<(i128, i128)> {
        match self {
            PrimitiveType::U8 => Some((0, u8::MAX as i128)),
            PrimitiveType::U16 => Some((0, u16::MAX as i128)),
            PrimitiveType::U32 => Some((0, u32::MAX as i128)),
            PrimitiveType::U64 => Some((0, u64::MAX as i128)),
            PrimitiveType::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            PrimitiveType::Bool | PrimitiveType::Identifier | PrimitiveType::Bytes(_) => None,
        }
    }

    pub const fn is_integer(self) -> bool {
        self.bounds().is_some()
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::U8 => f.write_str("u8"),
            PrimitiveType::U16 => f.write_str("u16"),
            PrimitiveType::U32 => f.write_str("u32"),
            PrimitiveType::U64 => f.write_str("u64"),
            PrimitiveType::I64 => f.write_str("i64"),
            PrimitiveType::Bool => f.write_str("bool"),
            PrimitiveType::Identifier => f.write_str("identifier"),
            PrimitiveType::Bytes(len) => write!(f, "[u8; {}]", len),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "u8" => Ok(PrimitiveType::U8),
            "u16" => Ok(PrimitiveType::U16),
            "u32" => Ok(PrimitiveType::U32),
            "u64" => Ok(PrimitiveType::U64),
            "i64" => Ok(PrimitiveType::I64),
            "bool" => Ok(PrimitiveType::Bool),
            "identifier" | "pubkey" => Ok(PrimitiveType::Identifier),
            other => {
                let len = other
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .and_then(|s| s.trim().strip_prefix("u8"))
                    .and_then(|s| s.trim().strip_prefix(';'))
                    .ok_or_else(|| format!("Unknown primitive type '{}'", other))?;
                len.trim()
                    .parse::<usize>()
                    .map(PrimitiveType::Bytes)
                    .map_err(|e| format!("Invalid byte array length in '{}': {}", other, e))
            }
        }
    }
}

impl TryFrom<String> for PrimitiveType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrimitiveType> for String {
    fn from(ty: PrimitiveType) -> Self {
        ty.to_string()
    }
}

/// Width of a collection length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPrefix {
    U8,
    U16,
    #[default]
    U32,
}

impl LengthPrefix {
    pub const fn size(self) -> usize {
        match self {
            LengthPrefix::U8 => 1,
            LengthPrefix::U16 => 2,
            LengthPrefix::U32 => 4,
        }
    }

    /// Largest count the prefix can carry.
    pub const fn max_len(self) -> u64 {
        match self {
            LengthPrefix::U8 => u8::MAX as u64,
            LengthPrefix::U16 => u16::MAX as u64,
            LengthPrefix::U32 => u32::MAX as u64,
        }
    }

    pub(crate) fn is_default(&self) -> bool {
        *self == LengthPrefix::U32
    }
}

/// A primitive value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I64(i64),
    Bool(bool),
    Identifier(Identifier),
    Bytes(Vec<u8>),
}

impl Primitive {
    /// Construct an integer of type `ty`, failing with
    /// [`CodecError::OutOfRange`] when `value` is outside its bounds.
    pub fn integer(ty: PrimitiveType, value: i128) -> CodecResult<Self> {
        let (min, max) = ty
            .bounds()
            .ok_or_else(|| CodecError::mismatch("integer type", ty.to_string()))?;
        let out_of_range = |_| CodecError::OutOfRange {
            ty: ty.to_string(),
            value,
            min,
            max,
        };
        match ty {
            PrimitiveType::U8 => u8::try_from(value).map(Primitive::U8).map_err(out_of_range),
            PrimitiveType::U16 => u16::try_from(value).map(Primitive::U16).map_err(out_of_range),
            PrimitiveType::U32 => u32::try_from(value).map(Primitive::U32).map_err(out_of_range),
            PrimitiveType::U64 => u64::try_from(value).map(Primitive::U64).map_err(out_of_range),
            PrimitiveType::I64 => i64::try_from(value).map(Primitive::I64).map_err(out_of_range),
            other => Err(CodecError::mismatch("integer type", other.to_string())),
        }
    }

    /// Construct a fixed-length byte array; `data` must be exactly `len` bytes.
    pub fn bytes(len: usize, data: Vec<u8>) -> CodecResult<Self> {
        if data.len() != len {
            return Err(CodecError::mismatch(
                PrimitiveType::Bytes(len).to_string(),
                PrimitiveType::Bytes(data.len()).to_string(),
            ));
        }
        Ok(Primitive::Bytes(data))
    }

    pub fn ty(&self) -> PrimitiveType {
        match self {
            Primitive::U8(_) => PrimitiveType::U8,
            Primitive::U16(_) => PrimitiveType::U16,
            Primitive::U32(_) => PrimitiveType::U32,
            Primitive::U64(_) => PrimitiveType::U64,
            Primitive::I64(_) => PrimitiveType::I64,
            Primitive::Bool(_) => PrimitiveType::Bool,
            Primitive::Identifier(_) => PrimitiveType::Identifier,
            Primitive::Bytes(b) => PrimitiveType::Bytes(b.len()),
        }
    }

    /// Integer value widened to `i128`, `None` for non-integers.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Primitive::U8(v) => Some(*v as i128),
            Primitive::U16(v) => Some(*v as i128),
            Primitive::U32(v) => Some(*v as i128),
            Primitive::U64(v) => Some(*v as i128),
            Primitive::I64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Write exactly `self.ty().static_size()` bytes.
    pub fn encode(&self, writer: &mut Writer) {
        match self {
            Primitive::U8(v) => writer.write_u8(*v),
            Primitive::U16(v) => writer.write_u16(*v),
            Primitive::U32(v) => writer.write_u32(*v),
            Primitive::U64(v) => writer.write_u64(*v),
            Primitive::I64(v) => writer.write_i64(*v),
            Primitive::Bool(v) => writer.write_bool(*v),
            Primitive::Identifier(id) => writer.write_identifier(id),
            Primitive::Bytes(b) => writer.write_bytes(b),
        }
    }

    /// Exact inverse of [`Primitive::encode`] for a declared type.
    pub fn decode(ty: PrimitiveType, cursor: &mut Cursor<'_>) -> CodecResult<Self> {
        Ok(match ty {
            PrimitiveType::U8 => Primitive::U8(cursor.read_u8()?),
            PrimitiveType::U16 => Primitive::U16(cursor.read_u16()?),
            PrimitiveType::U32 => Primitive::U32(cursor.read_u32()?),
            PrimitiveType::U64 => Primitive::U64(cursor.read_u64()?),
            PrimitiveType::I64 => Primitive::I64(cursor.read_i64()?),
            PrimitiveType::Bool => Primitive::Bool(cursor.read_bool()?),
            PrimitiveType::Identifier => Primitive::Identifier(cursor.read_identifier()?),
            PrimitiveType::Bytes(len) => Primitive::Bytes(cursor.read_fixed(len)?.to_vec()),
        })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::U8(v) => write!(f, "{}", v),
            Primitive::U16(v) => write!(f, "{}", v),
            Primitive::U32(v) => write!(f, "{}", v),
            Primitive::U64(v) => write!(f, "{}", v),
            Primitive::I64(v) => write!(f, "{}", v),
            Primitive::Bool(v) => write!(f, "{}", v),
            Primitive::Identifier(id) => write!(f, "{}", id),
            Primitive::Bytes(b) => {
                f.write_str("0x")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}
