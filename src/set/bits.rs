//! Packed bitmasks, 8 frames per byte.
//!
//! A [`BitBuf`] owns the storage; [`BitSlice`] and [`BitSliceMut`] are views
//! over an arbitrary (not necessarily byte-aligned) bit range of it. Every
//! accessor is bounds-checked against the view length.

use super::types::{SetOp, Span};

#[inline]
fn bytes_for(len: usize) -> usize {
    len.div_ceil(8)
}

#[inline]
fn read_bit(bytes: &[u8], i: usize) -> bool {
    bytes[i / 8] & (1u8 << (i % 8)) != 0
}

#[inline]
fn write_bit(bytes: &mut [u8], i: usize, value: bool) {
    let mask = 1u8 << (i % 8);
    if value {
        bytes[i / 8] |= mask;
    } else {
        bytes[i / 8] &= !mask;
    }
}

/// Growable packed bit buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitBuf {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuf {
    /// Create a buffer of `len` zero bits
    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0u8; bytes_for(len)],
            len,
        }
    }

    /// Build from a sequence of booleans
    pub fn from_bools(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut buf = Self::default();
        for bit in bits {
            buf.push(bit);
        }
        buf
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        self.len += 1;
        write_bit(&mut self.bytes, self.len - 1, value);
    }

    /// Resize to `len` bits; new bits are zero
    pub fn resize(&mut self, len: usize) {
        if len < self.len {
            self.truncate(len);
        } else {
            self.bytes.resize(bytes_for(len), 0);
            self.len = len;
        }
    }

    /// Shrink to `len` bits, clearing the unused tail of the last byte so
    /// that buffers with equal bits compare equal.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.bytes.truncate(bytes_for(len));
        if len % 8 != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << (len % 8)) - 1;
            }
        }
        self.len = len;
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of range for length {}", i, self.len);
        read_bit(&self.bytes, i)
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < self.len, "bit index {} out of range for length {}", i, self.len);
        write_bit(&mut self.bytes, i, value);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn as_slice(&self) -> BitSlice<'_> {
        BitSlice {
            bytes: &self.bytes,
            offset: 0,
            len: self.len,
        }
    }

    /// View over the bits addressed by `span`
    pub fn slice(&self, span: Span) -> BitSlice<'_> {
        assert!(
            span.end() <= self.len,
            "bit span {:?} out of range for length {}",
            span,
            self.len
        );
        BitSlice {
            bytes: &self.bytes,
            offset: span.offset,
            len: span.len,
        }
    }

    /// Mutable view over the bits addressed by `span`
    pub fn slice_mut(&mut self, span: Span) -> BitSliceMut<'_> {
        assert!(
            span.end() <= self.len,
            "bit span {:?} out of range for length {}",
            span,
            self.len
        );
        BitSliceMut {
            bytes: &mut self.bytes,
            offset: span.offset,
            len: span.len,
        }
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.bytes.capacity()
    }
}

/// Read-only view over a bit range
#[derive(Debug, Clone, Copy)]
pub struct BitSlice<'a> {
    bytes: &'a [u8],
    offset: usize,
    len: usize,
}

impl<'a> BitSlice<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of range for length {}", i, self.len);
        read_bit(self.bytes, self.offset + i)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        let BitSlice { bytes, offset, len } = *self;
        (offset..offset + len).map(move |i| read_bit(bytes, i))
    }

    pub fn any(&self) -> bool {
        self.iter().any(|b| b)
    }

    pub fn count_ones(&self) -> usize {
        self.iter().filter(|&b| b).count()
    }
}

impl PartialEq for BitSlice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for BitSlice<'_> {}

/// Mutable view over a bit range
#[derive(Debug)]
pub struct BitSliceMut<'a> {
    bytes: &'a mut [u8],
    offset: usize,
    len: usize,
}

impl BitSliceMut<'_> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of range for length {}", i, self.len);
        read_bit(self.bytes, self.offset + i)
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < self.len, "bit index {} out of range for length {}", i, self.len);
        write_bit(self.bytes, self.offset + i, value);
    }

    /// Set every bit in the view to `value`
    pub fn fill(&mut self, value: bool) {
        for i in 0..self.len {
            write_bit(self.bytes, self.offset + i, value);
        }
    }

    /// Set bits `start..stop` (relative to the view) to `value`
    pub fn fill_range(&mut self, start: usize, stop: usize, value: bool) {
        assert!(
            start <= stop && stop <= self.len,
            "bit range {}..{} out of range for length {}",
            start,
            stop,
            self.len
        );
        for i in start..stop {
            write_bit(self.bytes, self.offset + i, value);
        }
    }

    /// Overwrite the view with the bits of `src`
    pub fn copy_from(&mut self, src: BitSlice<'_>) {
        assert_eq!(self.len, src.len(), "bit copy between views of different length");
        for (i, bit) in src.iter().enumerate() {
            write_bit(self.bytes, self.offset + i, bit);
        }
    }

    pub fn any(&self) -> bool {
        (0..self.len).any(|i| read_bit(self.bytes, self.offset + i))
    }
}

#[inline]
fn mask_apply(op: SetOp, out: &mut BitSliceMut<'_>, lhs: BitSlice<'_>, rhs: BitSlice<'_>) {
    assert!(
        out.len() == lhs.len() && out.len() == rhs.len(),
        "mask {} operands differ in length: out={} lhs={} rhs={}",
        op,
        out.len(),
        lhs.len(),
        rhs.len()
    );

    let len = out.len;
    let mut done = 0;
    if out.offset % 8 == 0 && lhs.offset % 8 == 0 && rhs.offset % 8 == 0 {
        let whole = len / 8;
        let (o, l, r) = (out.offset / 8, lhs.offset / 8, rhs.offset / 8);
        let dst = &mut out.bytes[o..o + whole];
        for ((d, &a), &b) in dst.iter_mut().zip(&lhs.bytes[l..l + whole]).zip(&rhs.bytes[r..r + whole]) {
            *d = apply_byte(op, a, b);
        }
        done = whole * 8;
    }
    for i in done..len {
        let bit = op.apply(read_bit(lhs.bytes, lhs.offset + i), read_bit(rhs.bytes, rhs.offset + i));
        write_bit(out.bytes, out.offset + i, bit);
    }
}

#[inline]
fn apply_byte(op: SetOp, lhs: u8, rhs: u8) -> u8 {
    match op {
        SetOp::Union => lhs | rhs,
        SetOp::Intersection => lhs & rhs,
        SetOp::Difference => lhs & !rhs,
    }
}

/// Per-frame OR
pub fn mask_union(out: &mut BitSliceMut<'_>, lhs: BitSlice<'_>, rhs: BitSlice<'_>) {
    mask_apply(SetOp::Union, out, lhs, rhs);
}

/// Per-frame AND
pub fn mask_intersection(out: &mut BitSliceMut<'_>, lhs: BitSlice<'_>, rhs: BitSlice<'_>) {
    mask_apply(SetOp::Intersection, out, lhs, rhs);
}

/// Per-frame AND-NOT
pub fn mask_difference(out: &mut BitSliceMut<'_>, lhs: BitSlice<'_>, rhs: BitSlice<'_>) {
    mask_apply(SetOp::Difference, out, lhs, rhs);
}

/// Dispatch to the operator matching `op`
pub fn masks_apply(op: SetOp, out: &mut BitSliceMut<'_>, lhs: BitSlice<'_>, rhs: BitSlice<'_>) {
    mask_apply(op, out, lhs, rhs);
}
