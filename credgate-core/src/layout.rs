//! Account layout reader.
//!
//! Account data is read directly with a [`Cursor`] rather than through the
//! schema engine, because the external program reserves fixed space for
//! its collections: a bounded collection always occupies
//! `prefix + capacity * element_size` bytes, whatever its logical length.
//!
//! Parsing is one linear pass. Before any field is read the buffer length
//! is checked against the minimum size computed from the layout's
//! [`Section`] list, so short buffers fail up front.

use crate::cursor::{padding_for, Cursor, Writer};
use crate::error::{CodecError, CodecResult};
use crate::primitive::{LengthPrefix, PrimitiveType};

/// One piece of an account layout, used to compute its minimum size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// A fixed-width field.
    Field(PrimitiveType),
    /// An optional field: presence byte plus the value when set.
    Optional(PrimitiveType),
    /// A capacity-bounded collection.
    Bounded {
        prefix: LengthPrefix,
        capacity: usize,
        element_size: usize,
    },
    /// Zero padding up to the next multiple of the given alignment.
    Align(usize),
}

impl Section {
    /// Bytes this section occupies at the smallest, starting at `offset`.
    fn min_len(self, offset: usize) -> usize {
        match self {
            Section::Field(ty) => ty.static_size(),
            Section::Optional(_) => 1,
            Section::Bounded {
                prefix,
                capacity,
                element_size,
            } => prefix.size() + capacity * element_size,
            Section::Align(align) => padding_for(offset, align),
        }
    }
}

/// Smallest buffer that can hold a layout: fixed fields, option flags and
/// every reserved capacity, with alignment applied.
pub const fn min_size(sections: &[Section]) -> usize {
    let mut offset = 0;
    let mut i = 0;
    while i < sections.len() {
        offset += match sections[i] {
            Section::Field(ty) => ty.static_size(),
            Section::Optional(_) => 1,
            Section::Bounded {
                prefix,
                capacity,
                element_size,
            } => prefix.size() + capacity * element_size,
            Section::Align(align) => {
                if align <= 1 {
                    0
                } else {
                    (align - offset % align) % align
                }
            }
        };
        i += 1;
    }
    offset
}

/// Byte offset at which section `index` starts, assuming every optional
/// section before it is absent. An index past the end yields the offset just
/// after the last section.
pub fn section_offset(sections: &[Section], index: usize) -> usize {
    sections[..index.min(sections.len())]
        .iter()
        .fold(0, |offset, section| offset + section.min_len(offset))
}

/// A fixed-size element stored in a bounded collection.
pub trait LayoutElement: Sized {
    const SIZE: usize;

    fn read(cursor: &mut Cursor<'_>) -> CodecResult<Self>;

    fn write(&self, writer: &mut Writer);
}

/// A typed view of one kind of account.
pub trait AccountLayout: Sized {
    const NAME: &'static str;
    const SECTIONS: &'static [Section];

    /// Read fields in declared order. Called only after the buffer passed
    /// the minimum size check.
    fn read(cursor: &mut Cursor<'_>) -> CodecResult<Self>;

    fn write(&self, writer: &mut Writer) -> CodecResult<()>;

    fn min_size() -> usize {
        min_size(Self::SECTIONS)
    }
}

/// Parse raw account data. Bytes past the layout are ignored, since
/// accounts may be allocated larger than their layout.
pub fn parse<T: AccountLayout>(bytes: &[u8]) -> CodecResult<T> {
    let needed = T::min_size();
    if bytes.len() < needed {
        return Err(CodecError::TruncatedBuffer {
            needed,
            available: bytes.len(),
        });
    }
    let mut cursor = Cursor::new(bytes);
    let value = T::read(&mut cursor)?;
    tracing::trace!(
        layout = T::NAME,
        consumed = cursor.position(),
        len = bytes.len(),
        "parsed account"
    );
    Ok(value)
}

/// Serialize an account, zero-padding unused capacity.
pub fn serialize<T: AccountLayout>(value: &T) -> CodecResult<Vec<u8>> {
    let mut writer = Writer::with_capacity(T::min_size());
    value.write(&mut writer)?;
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: &[Section] = &[
        Section::Field(PrimitiveType::U8),
        Section::Align(8),
        Section::Field(PrimitiveType::U64),
        Section::Bounded {
            prefix: LengthPrefix::U16,
            capacity: 3,
            element_size: 4,
        },
        Section::Optional(PrimitiveType::I64),
    ];

    #[test]
    fn min_size_applies_alignment_and_capacity() {
        assert_eq!(min_size(SECTIONS), 8 + 8 + 2 + 12 + 1);
    }

    #[test]
    fn section_offsets() {
        assert_eq!(section_offset(SECTIONS, 2), 8);
        assert_eq!(section_offset(SECTIONS, 4), 30);
        assert_eq!(section_offset(SECTIONS, SECTIONS.len()), min_size(SECTIONS));
    }
}
