//! Read cursor over a [`Cell`]'s data bits and references.
//!
//! Grounded on `original_source/.../cells/CellSlice.cpp`: a slice borrows a
//! cell and a `[bits_start, bits_end)` / `[refs_start, refs_end)` window
//! into it, advancing the start cursors as bits and refs are consumed.

use super::Cell;
use crate::bigint::BigInt257;
use crate::error::{Exception, VmError};

/// A read-only cursor over a window of a cell's bits and references.
#[derive(Debug, Clone)]
pub struct Slice {
    cell: Cell,
    bits_st: usize,
    bits_en: usize,
    refs_st: usize,
    refs_en: usize,
}

impl Slice {
    /// A slice over an entire cell.
    pub fn new(cell: Cell) -> Self {
        let bits_en = cell.bit_len();
        let refs_en = cell.ref_count();
        Self {
            cell,
            bits_st: 0,
            bits_en,
            refs_st: 0,
            refs_en,
        }
    }

    /// Bits remaining before the cursor.
    pub fn bits_remaining(&self) -> usize {
        self.bits_en - self.bits_st
    }

    /// References remaining before the cursor.
    pub fn refs_remaining(&self) -> usize {
        self.refs_en - self.refs_st
    }

    /// The underlying cell this slice was cut from.
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// True once both bits and references are exhausted.
    pub fn is_empty(&self) -> bool {
        self.bits_remaining() == 0 && self.refs_remaining() == 0
    }

    /// Read `n` bits without advancing the cursor.
    pub fn preload_bits(&self, n: usize) -> Result<Vec<bool>, VmError> {
        if n > self.bits_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        Ok(self.cell.data()[self.bits_st..self.bits_st + n].to_vec())
    }

    /// Read `n` bits and advance the cursor past them.
    pub fn load_bits(&mut self, n: usize) -> Result<Vec<bool>, VmError> {
        let bits = self.preload_bits(n)?;
        self.bits_st += n;
        Ok(bits)
    }

    /// Skip `n` bits without returning them.
    pub fn skip_bits(&mut self, n: usize) -> Result<(), VmError> {
        if n > self.bits_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        self.bits_st += n;
        Ok(())
    }

    /// Read a single bit and advance.
    pub fn load_bit(&mut self) -> Result<bool, VmError> {
        Ok(self.load_bits(1)?[0])
    }

    /// Read the next `n` bits as an unsigned big-endian integer. `n` must
    /// be at most 64.
    pub fn load_uint(&mut self, n: usize) -> Result<u64, VmError> {
        debug_assert!(n <= 64);
        let bits = self.load_bits(n)?;
        Ok(bits_to_u64(&bits))
    }

    /// Peek the `i`th child reference without advancing the cursor.
    pub fn preload_ref(&self, i: usize) -> Result<&Cell, VmError> {
        if i >= self.refs_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        Ok(&self.cell.references()[self.refs_st + i])
    }

    /// Take the next child reference and advance the ref cursor.
    pub fn load_ref(&mut self) -> Result<Cell, VmError> {
        let r = self.preload_ref(0)?.clone();
        self.refs_st += 1;
        Ok(r)
    }

    /// Read the next `n` bits (`n` at most 64) as an unsigned big-endian
    /// integer and advance the cursor. Alias of [`Self::load_uint`] under
    /// the fetch-family naming used alongside [`Self::fetch_int`].
    pub fn fetch_uint(&mut self, n: usize) -> Result<u64, VmError> {
        self.load_uint(n)
    }

    /// Read the next `n` bits (`n` at most 64) as a two's-complement signed
    /// integer, sign-extended to `i64`, and advance the cursor.
    pub fn fetch_int(&mut self, n: usize) -> Result<i64, VmError> {
        debug_assert!(n >= 1 && n <= 64);
        let bits = self.load_bits(n)?;
        let mut v = bits_to_u64(&bits);
        if n < 64 && bits[0] {
            v |= !0u64 << n;
        }
        Ok(v as i64)
    }

    /// Read the next `n` bits (`n` at most 257) as a [`BigInt257`],
    /// interpreting them as signed (two's complement) or unsigned per
    /// `signed`, and advance the cursor.
    pub fn fetch_int256(&mut self, n: usize, signed: bool) -> Result<BigInt257, VmError> {
        debug_assert!(n <= 257);
        let bits = self.load_bits(n)?;
        Ok(BigInt257::from_bits_be(&bits, signed))
    }

    /// Take the next child reference. Alias of [`Self::load_ref`] under the
    /// fetch-family naming used alongside [`Self::fetch_maybe_ref`].
    pub fn fetch_ref(&mut self) -> Result<Cell, VmError> {
        self.load_ref()
    }

    /// Consume a 1-bit Maybe tag, then the reference it announces, if any.
    pub fn fetch_maybe_ref(&mut self) -> Result<Option<Cell>, VmError> {
        if self.load_bit()? {
            Ok(Some(self.load_ref()?))
        } else {
            Ok(None)
        }
    }

    /// Cut an owned `bits`/`refs` window off the front of this slice as a
    /// new [`Slice`] sharing the same underlying cell, advancing past it.
    pub fn fetch_subslice(&mut self, bits: usize, refs: usize) -> Result<Self, VmError> {
        if bits > self.bits_remaining() || refs > self.refs_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        let sub = Self {
            cell: self.cell.clone(),
            bits_st: self.bits_st,
            bits_en: self.bits_st + bits,
            refs_st: self.refs_st,
            refs_en: self.refs_st + refs,
        };
        self.bits_st += bits;
        self.refs_st += refs;
        Ok(sub)
    }

    /// Advance past the first `bits`/`refs` of the window without
    /// returning them.
    pub fn skip_first(&mut self, bits: usize, refs: usize) -> Result<(), VmError> {
        if bits > self.bits_remaining() || refs > self.refs_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        self.bits_st += bits;
        self.refs_st += refs;
        Ok(())
    }

    /// Shrink the window to drop its last `bits`/`refs`.
    pub fn skip_last(&mut self, bits: usize, refs: usize) -> Result<(), VmError> {
        if bits > self.bits_remaining() || refs > self.refs_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        self.bits_en -= bits;
        self.refs_en -= refs;
        Ok(())
    }

    /// Shrink the window to just its first `bits`/`refs`.
    pub fn only_first(&mut self, bits: usize, refs: usize) -> Result<(), VmError> {
        if bits > self.bits_remaining() || refs > self.refs_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        self.bits_en = self.bits_st + bits;
        self.refs_en = self.refs_st + refs;
        Ok(())
    }

    /// Shrink the window to just its last `bits`/`refs`.
    pub fn only_last(&mut self, bits: usize, refs: usize) -> Result<(), VmError> {
        if bits > self.bits_remaining() || refs > self.refs_remaining() {
            return Err(VmError::from(Exception::CellUnderflow));
        }
        self.bits_st = self.bits_en - bits;
        self.refs_st = self.refs_en - refs;
        Ok(())
    }

    /// Count the run of consecutive `bit` values starting at the cursor,
    /// without advancing it.
    pub fn count_leading(&self, bit: bool) -> usize {
        let data = self.cell.data();
        (self.bits_st..self.bits_en)
            .take_while(|&i| data[i] == bit)
            .count()
    }

    /// Count the run of consecutive `bit` values ending at the window's
    /// last bit, without advancing the cursor.
    pub fn count_trailing(&self, bit: bool) -> usize {
        let data = self.cell.data();
        (self.bits_st..self.bits_en)
            .rev()
            .take_while(|&i| data[i] == bit)
            .count()
    }

    /// Trim a completion-encoded window: drop trailing zero bits, then the
    /// single `1` terminator bit beyond them. Errors if the window is all
    /// zero bits with no terminator to find.
    pub fn remove_trailing(&mut self) -> Result<(), VmError> {
        while self.bits_en > self.bits_st {
            let last = self.cell.data()[self.bits_en - 1];
            self.bits_en -= 1;
            if last {
                return Ok(());
            }
        }
        Err(VmError::from(Exception::CellUnderflow))
    }
}

fn bits_to_u64(bits: &[bool]) -> u64 {
    let mut v = 0u64;
    for &b in bits {
        v = (v << 1) | (b as u64);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn bits_of(byte: u8, n: usize) -> Vec<bool> {
        (0..n).map(|i| (byte >> (n - 1 - i)) & 1 == 1).collect()
    }

    #[test]
    fn load_bits_advances_cursor() {
        let cell = Cell::new(bits_of(0b1011_0000, 8), vec![]).unwrap();
        let mut s = Slice::new(cell);
        assert_eq!(s.load_uint(4).unwrap(), 0b1011);
        assert_eq!(s.bits_remaining(), 4);
        assert_eq!(s.load_uint(4).unwrap(), 0b0000);
        assert_eq!(s.bits_remaining(), 0);
    }

    #[test]
    fn underflow_on_over_read() {
        let cell = Cell::new(vec![true, false], vec![]).unwrap();
        let mut s = Slice::new(cell);
        assert_eq!(
            s.load_bits(3).unwrap_err(),
            VmError::from(Exception::CellUnderflow)
        );
    }

    #[test]
    fn load_ref_advances_ref_cursor() {
        let child = Cell::empty();
        let parent = Cell::new(vec![], vec![child.clone()]).unwrap();
        let mut s = Slice::new(parent);
        assert_eq!(s.refs_remaining(), 1);
        assert_eq!(s.load_ref().unwrap(), child);
        assert_eq!(s.refs_remaining(), 0);
        assert_eq!(
            s.load_ref().unwrap_err(),
            VmError::from(Exception::CellUnderflow)
        );
    }

    #[test]
    fn empty_slice_is_empty() {
        let s = Slice::new(Cell::empty());
        assert!(s.is_empty());
    }

    #[test]
    fn fetch_int_sign_extends() {
        let cell = Cell::new(bits_of(0b1000_0000, 8), vec![]).unwrap();
        let mut s = Slice::new(cell);
        assert_eq!(s.fetch_int(8).unwrap(), -128);
    }

    #[test]
    fn fetch_maybe_ref_absent_and_present() {
        let child = Cell::empty();
        let absent = Cell::new(vec![false], vec![]).unwrap();
        let mut s = Slice::new(absent);
        assert_eq!(s.fetch_maybe_ref().unwrap(), None);

        let present = Cell::new(vec![true], vec![child.clone()]).unwrap();
        let mut s = Slice::new(present);
        assert_eq!(s.fetch_maybe_ref().unwrap(), Some(child));
    }

    #[test]
    fn only_first_and_only_last_shrink_the_window() {
        let cell = Cell::new(bits_of(0b1100_1010, 8), vec![]).unwrap();
        let mut first = Slice::new(cell.clone());
        first.only_first(4, 0).unwrap();
        assert_eq!(first.fetch_uint(4).unwrap(), 0b1100);

        let mut last = Slice::new(cell);
        last.only_last(4, 0).unwrap();
        assert_eq!(last.fetch_uint(4).unwrap(), 0b1010);
    }

    #[test]
    fn remove_trailing_drops_padding_and_terminator() {
        let cell = Cell::new(bits_of(0b1011_0100, 8), vec![]).unwrap();
        let mut s = Slice::new(cell);
        s.remove_trailing().unwrap();
        assert_eq!(s.bits_remaining(), 5);
        assert_eq!(s.fetch_uint(5).unwrap(), 0b10110);
    }

    #[quickcheck_macros::quickcheck]
    fn int256_round_trips_through_builder_and_slice(x: i64) -> bool {
        let val = BigInt257::from_i64(x);
        let mut b = crate::cell::Builder::new();
        b.store_bits(&val.to_bits_be(64)).unwrap();
        let cell = b.finalize().unwrap();
        let mut s = Slice::new(cell);
        s.fetch_int256(64, true).unwrap() == val
    }
}
