//! Mutable accumulator that finalizes into a [`Cell`].
//!
//! Grounded on `original_source/.../cellops.cpp`'s builder primitives
//! (`stu`, `stref`, ...), which check bit/ref capacity on every store
//! rather than at finalize time.

use super::{Cell, CellError};
use crate::consts::{MAX_CELL_BITS, MAX_CELL_REFS};
use crate::error::{Exception, VmError};

/// Accumulates data bits and child references up to the per-cell limits,
/// then finalizes into an immutable [`Cell`].
#[derive(Debug, Clone, Default)]
pub struct Builder {
    data: Vec<bool>,
    refs: Vec<Cell>,
}

impl Builder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits stored so far.
    pub fn bit_len(&self) -> usize {
        self.data.len()
    }

    /// References stored so far.
    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    /// Bits still available before [`crate::error::Exception::CellOverflow`].
    pub fn bits_free(&self) -> usize {
        MAX_CELL_BITS - self.data.len()
    }

    /// References still available before overflow.
    pub fn refs_free(&self) -> usize {
        MAX_CELL_REFS - self.refs.len()
    }

    /// Append raw bits.
    pub fn store_bits(&mut self, bits: &[bool]) -> Result<&mut Self, VmError> {
        if bits.len() > self.bits_free() {
            return Err(VmError::from(Exception::CellOverflow));
        }
        self.data.extend_from_slice(bits);
        Ok(self)
    }

    /// Append a single bit.
    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, VmError> {
        self.store_bits(&[bit])
    }

    /// Append the low `n` bits of `value`, most significant first.
    pub fn store_uint(&mut self, value: u64, n: usize) -> Result<&mut Self, VmError> {
        debug_assert!(n <= 64);
        let bits: Vec<bool> = (0..n).map(|i| (value >> (n - 1 - i)) & 1 == 1).collect();
        self.store_bits(&bits)
    }

    /// Append a child reference.
    pub fn store_ref(&mut self, cell: Cell) -> Result<&mut Self, VmError> {
        if self.refs_free() == 0 {
            return Err(VmError::from(Exception::CellOverflow));
        }
        self.refs.push(cell);
        Ok(self)
    }

    /// Append every bit and reference of `slice` to this builder.
    pub fn store_slice(&mut self, slice: &super::Slice) -> Result<&mut Self, VmError> {
        let mut s = slice.clone();
        let bits = s.load_bits(s.bits_remaining())?;
        self.store_bits(&bits)?;
        while s.refs_remaining() > 0 {
            self.store_ref(s.load_ref()?)?;
        }
        Ok(self)
    }

    /// Append every bit and reference of `other` to this builder.
    pub fn append_builder(&mut self, other: &Self) -> Result<&mut Self, VmError> {
        if other.data.len() > self.bits_free() || other.refs.len() > self.refs_free() {
            return Err(VmError::from(Exception::CellOverflow));
        }
        self.data.extend_from_slice(&other.data);
        self.refs.extend_from_slice(&other.refs);
        Ok(self)
    }

    /// Write a 1-bit Maybe tag, then the reference itself if present.
    pub fn store_maybe_ref(&mut self, cell: Option<Cell>) -> Result<&mut Self, VmError> {
        self.store_bit(cell.is_some())?;
        if let Some(cell) = cell {
            self.store_ref(cell)?;
        }
        Ok(self)
    }

    /// Finalize into an ordinary cell, consuming the builder.
    pub fn finalize(self) -> Result<Cell, CellError> {
        Cell::new(self.data, self.refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_uint_then_finalize_round_trips() {
        let mut b = Builder::new();
        b.store_uint(0b1010, 4).unwrap();
        let cell = b.finalize().unwrap();
        assert_eq!(cell.bit_len(), 4);
        assert_eq!(cell.data(), &[true, false, true, false]);
    }

    #[test]
    fn overflow_on_too_many_bits() {
        let mut b = Builder::new();
        b.store_bits(&vec![true; MAX_CELL_BITS]).unwrap();
        assert_eq!(
            b.store_bit(true).unwrap_err(),
            VmError::from(Exception::CellOverflow)
        );
    }

    #[test]
    fn overflow_on_too_many_refs() {
        let mut b = Builder::new();
        for _ in 0..MAX_CELL_REFS {
            b.store_ref(Cell::empty()).unwrap();
        }
        assert_eq!(
            b.store_ref(Cell::empty()).unwrap_err(),
            VmError::from(Exception::CellOverflow)
        );
    }

    #[test]
    fn store_slice_appends_bits_and_refs() {
        use crate::cell::Slice;
        let child = Cell::new(vec![true, true], vec![]).unwrap();
        let src = Cell::new(vec![false, true], vec![child.clone()]).unwrap();
        let mut b = Builder::new();
        b.store_slice(&Slice::new(src)).unwrap();
        assert_eq!(b.bit_len(), 2);
        assert_eq!(b.ref_count(), 1);
    }

    #[test]
    fn append_builder_concatenates_bits_and_refs() {
        let mut a = Builder::new();
        a.store_uint(0b10, 2).unwrap();
        a.store_ref(Cell::empty()).unwrap();
        let mut b = Builder::new();
        b.store_uint(0b01, 2).unwrap();
        a.append_builder(&b).unwrap();
        assert_eq!(a.bit_len(), 4);
        assert_eq!(a.ref_count(), 1);
        let cell = a.finalize().unwrap();
        assert_eq!(cell.data(), &[true, false, false, true]);
    }

    #[test]
    fn store_maybe_ref_round_trips_through_a_slice() {
        use crate::cell::Slice;
        let mut b = Builder::new();
        b.store_maybe_ref(Some(Cell::empty())).unwrap();
        let cell = b.finalize().unwrap();
        let mut s = Slice::new(cell);
        assert_eq!(s.fetch_maybe_ref().unwrap(), Some(Cell::empty()));

        let mut b = Builder::new();
        b.store_maybe_ref(None).unwrap();
        let cell = b.finalize().unwrap();
        let mut s = Slice::new(cell);
        assert_eq!(s.fetch_maybe_ref().unwrap(), None);
    }
}
