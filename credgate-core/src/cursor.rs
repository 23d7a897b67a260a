//! Position-tracking reader and writer over wire buffers.

use crate::error::{CodecError, CodecResult};
use crate::primitive::{Identifier, LengthPrefix, IDENTIFIER_LEN};

/// Read cursor over a byte slice.
///
/// Tracks the current position and reads typed fields sequentially. Every
/// read is bounds-checked; reading past the end fails with
/// [`CodecError::TruncatedBuffer`] and leaves the position unchanged.
///
/// ```rust
/// use credgate_core::cursor::Cursor;
///
/// let data = [7u8, 0x34, 0x12];
/// let mut cur = Cursor::new(&data);
/// assert_eq!(cur.read_u8().unwrap(), 7);
/// assert_eq!(cur.read_u16().unwrap(), 0x1234);
/// assert_eq!(cur.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes remaining from the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Current byte offset into the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(CodecError::TruncatedBuffer {
            needed: usize::MAX,
            available: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(CodecError::TruncatedBuffer {
                needed: end,
                available: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> CodecResult<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> CodecResult<i64> {
        self.take_array().map(i64::from_le_bytes)
    }

    /// `0` → `false`, `1` → `true`, anything else is rejected.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        match self.peek_u8()? {
            0 | 1 => Ok(self.read_u8()? == 1),
            value => Err(CodecError::InvalidTag { what: "bool", value }),
        }
    }

    pub fn read_identifier(&mut self) -> CodecResult<Identifier> {
        self.take_array::<IDENTIFIER_LEN>().map(Identifier)
    }

    /// Borrow the next `n` bytes.
    pub fn read_fixed(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        self.take(n)
    }

    /// Read a collection length prefix of the given width.
    pub fn read_len(&mut self, prefix: LengthPrefix) -> CodecResult<u64> {
        Ok(match prefix {
            LengthPrefix::U8 => self.read_u8()? as u64,
            LengthPrefix::U16 => self.read_u16()? as u64,
            LengthPrefix::U32 => self.read_u32()? as u64,
        })
    }

    /// Read an option presence flag and, if set, the value.
    pub fn read_option<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> CodecResult<T>,
    ) -> CodecResult<Option<T>> {
        match self.peek_u8()? {
            0 => {
                self.pos += 1;
                Ok(None)
            }
            1 => {
                self.pos += 1;
                read(self).map(Some)
            }
            value => Err(CodecError::InvalidTag {
                what: "option flag",
                value,
            }),
        }
    }

    /// Read a capacity-bounded collection.
    ///
    /// Reads the logical count, then `count` elements, then skips the unused
    /// `(capacity - count) * element_size` bytes. The cursor always ends
    /// `prefix + capacity * element_size` bytes past where it started.
    pub fn read_bounded<T>(
        &mut self,
        prefix: LengthPrefix,
        capacity: usize,
        element_size: usize,
        mut read: impl FnMut(&mut Self) -> CodecResult<T>,
    ) -> CodecResult<Vec<T>> {
        let count = self.read_len(prefix)?;
        if count > capacity as u64 {
            return Err(CodecError::MalformedLength {
                declared: count,
                limit: capacity as u64,
            });
        }
        let region_start = self.pos;
        let region_len = capacity * element_size;
        if region_len > self.remaining() {
            return Err(CodecError::TruncatedBuffer {
                needed: region_start + region_len,
                available: self.data.len(),
            });
        }

        let count = count as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        let consumed = self.pos - region_start;
        if consumed != count * element_size {
            return Err(CodecError::TypeMismatch {
                expected: format!("{} elements of {} bytes", count, element_size),
                found: format!("{} bytes read", consumed),
            });
        }

        self.pos = region_start + region_len;
        Ok(items)
    }

    /// Skip `n` bytes without reading them.
    pub fn advance(&mut self, n: usize) -> CodecResult<()> {
        self.take(n).map(|_| ())
    }

    /// Skip forward to the next multiple of `align` from the buffer start.
    pub fn align_to(&mut self, align: usize) -> CodecResult<()> {
        self.advance(padding_for(self.pos, align))
    }

    /// Require that every byte has been consumed.
    pub fn finish(&self) -> CodecResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes { remaining }),
        }
    }

    fn peek_u8(&self) -> CodecResult<u8> {
        self.data.get(self.pos).copied().ok_or(CodecError::TruncatedBuffer {
            needed: self.pos + 1,
            available: self.data.len(),
        })
    }
}

/// Bytes needed to round `offset` up to a multiple of `align`.
pub(crate) fn padding_for(offset: usize, align: usize) -> usize {
    if align <= 1 {
        return 0;
    }
    (align - offset % align) % align
}

// ── Writer ───────────────────────────────────────────────────────────────────

/// Growable little-endian writer.
///
/// Mirrors [`Cursor`]: every `write_*` has a matching `read_*`.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_i64(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Writes `1u8` for `true`, `0u8` for `false`.
    pub fn write_bool(&mut self, val: bool) {
        self.buf.push(val as u8);
    }

    pub fn write_identifier(&mut self, id: &Identifier) {
        self.buf.extend_from_slice(id.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a length prefix, failing if `len` does not fit its width.
    pub fn write_len(&mut self, prefix: LengthPrefix, len: usize) -> CodecResult<()> {
        if len as u64 > prefix.max_len() {
            return Err(CodecError::MalformedLength {
                declared: len as u64,
                limit: prefix.max_len(),
            });
        }
        match prefix {
            LengthPrefix::U8 => self.write_u8(len as u8),
            LengthPrefix::U16 => self.write_u16(len as u16),
            LengthPrefix::U32 => self.write_u32(len as u32),
        }
        Ok(())
    }

    pub fn write_option<T>(&mut self, value: Option<&T>, write: impl FnOnce(&mut Self, &T)) {
        match value {
            None => self.write_u8(0),
            Some(v) => {
                self.write_u8(1);
                write(self, v);
            }
        }
    }

    /// Write a capacity-bounded collection: count, elements, zero padding.
    pub fn write_bounded<T>(
        &mut self,
        prefix: LengthPrefix,
        capacity: usize,
        element_size: usize,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T),
    ) -> CodecResult<()> {
        if items.len() > capacity {
            return Err(CodecError::CapacityExceeded {
                len: items.len(),
                capacity,
            });
        }
        self.write_len(prefix, items.len())?;
        let region_start = self.written();
        for item in items {
            write(self, item);
        }
        debug_assert_eq!(self.written() - region_start, items.len() * element_size);
        self.zero_fill((capacity - items.len()) * element_size);
        Ok(())
    }

    pub fn zero_fill(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    /// Zero-pad up to the next multiple of `align`.
    pub fn pad_to(&mut self, align: usize) {
        self.zero_fill(padding_for(self.buf.len(), align));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(Cursor::new(&data).read_u32().unwrap(), 0x0403_0201);
        assert_eq!(Cursor::new(&data).read_u64().unwrap(), 0x0807_0605_0403_0201);
        assert_eq!(Cursor::new(&[0xff; 8]).read_i64().unwrap(), -1);
    }

    #[test]
    fn truncated_read_leaves_position() {
        let data = [1u8, 2, 3];
        let mut cur = Cursor::new(&data);
        cur.read_u8().unwrap();
        let err = cur.read_u32().unwrap_err();
        assert_eq!(err, CodecError::TruncatedBuffer { needed: 5, available: 3 });
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn bool_rejects_other_bytes() {
        let err = Cursor::new(&[2]).read_bool().unwrap_err();
        assert_eq!(err, CodecError::InvalidTag { what: "bool", value: 2 });
    }

    #[test]
    fn align_rounds_up() {
        let data = [0u8; 16];
        let mut cur = Cursor::new(&data);
        cur.advance(3).unwrap();
        cur.align_to(8).unwrap();
        assert_eq!(cur.position(), 8);
        cur.align_to(8).unwrap();
        assert_eq!(cur.position(), 8);
    }

    #[test]
    fn finish_reports_trailing() {
        let data = [0u8; 4];
        let mut cur = Cursor::new(&data);
        cur.read_u16().unwrap();
        assert_eq!(cur.finish().unwrap_err(), CodecError::TrailingBytes { remaining: 2 });
    }

    #[test]
    fn write_len_checks_prefix_width() {
        let mut w = Writer::new();
        w.write_len(LengthPrefix::U8, 255).unwrap();
        let err = w.write_len(LengthPrefix::U8, 256).unwrap_err();
        assert!(matches!(err, CodecError::MalformedLength { declared: 256, limit: 255 }));
        assert_eq!(w.as_slice(), &[255]);
    }

    #[test]
    fn bounded_round_trip_skips_padding() {
        let mut w = Writer::new();
        w.write_bounded(LengthPrefix::U16, 4, 2, &[7u16, 9], |w, v| w.write_u16(*v))
            .unwrap();
        w.write_u8(0xAA);
        assert_eq!(w.written(), 2 + 4 * 2 + 1);

        let bytes = w.into_bytes();
        let mut cur = Cursor::new(&bytes);
        let items = cur
            .read_bounded(LengthPrefix::U16, 4, 2, |c| c.read_u16())
            .unwrap();
        assert_eq!(items, vec![7, 9]);
        assert_eq!(cur.read_u8().unwrap(), 0xAA);
    }

    #[test]
    fn bounded_rejects_count_over_capacity() {
        let bytes = [5u8, 0, 0, 0, 0, 0, 0, 0];
        let err = Cursor::new(&bytes)
            .read_bounded(LengthPrefix::U16, 3, 2, |c| c.read_u16())
            .unwrap_err();
        assert_eq!(err, CodecError::MalformedLength { declared: 5, limit: 3 });
    }
}
