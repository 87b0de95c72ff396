//! Prefix-interval opcode dispatch table.
//!
//! Grounded on `original_source/.../opctable.{h,cpp}` and `dispatch.{h,cpp}`:
//! instructions are matched by the shortest opcode prefix that uniquely
//! identifies them inside a 24-bit opcode space, not by a fixed-width
//! opcode field. Any code that matches no registered prefix is an
//! `invalid_opcode` exception rather than a distinguished "fill" entry —
//! `original_source`'s `cp0.cpp` wires `inv_opcode` the same way, as the
//! table's implicit default rather than literal entries for every gap.

use crate::error::{Exception, VmError};
use crate::interpreter::VmState;
use std::rc::Rc;

/// Width of the opcode space instructions are matched within.
pub const OPCODE_SPACE_BITS: u32 = 24;

/// An opcode handler: given the VM state and the number of opcode bits
/// the dispatched entry consumed, execute the instruction.
pub type Handler = Rc<dyn Fn(&mut VmState, u32) -> Result<(), VmError>>;

#[derive(Clone)]
struct Entry {
    prefix: u32,
    prefix_len: u32,
    mnemonic: &'static str,
    handler: Handler,
}

/// A table of opcode prefix intervals, matched longest-prefix-first.
#[derive(Clone, Default)]
pub struct DispatchTable {
    entries: Vec<Entry>,
    finalized: bool,
}

/// Two registered intervals whose prefixes overlap; the table can't tell
/// them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("overlapping opcode prefixes")]
pub struct OverlapError;

impl DispatchTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one instruction at the prefix `prefix`, using the top
    /// `prefix_len` bits of a 24-bit opcode word.
    ///
    /// # Panics
    /// If called after [`Self::finalize`].
    pub fn register(
        &mut self,
        prefix: u32,
        prefix_len: u32,
        mnemonic: &'static str,
        handler: Handler,
    ) {
        assert!(!self.finalized, "cannot register into a finalized table");
        assert!(prefix_len <= OPCODE_SPACE_BITS);
        self.entries.push(Entry {
            prefix: prefix << (OPCODE_SPACE_BITS - prefix_len),
            prefix_len,
            mnemonic,
            handler,
        });
    }

    /// Sort entries longest-prefix-first and reject ambiguous intervals —
    /// two entries of the *same* prefix length whose bits collide. A
    /// shorter prefix fully containing a longer, more specific one is the
    /// designed override mechanism (e.g. a one-instruction carve-out of an
    /// otherwise generic family byte), not an overlap.
    /// No further registration is accepted afterward.
    pub fn finalize(&mut self) -> Result<(), OverlapError> {
        self.entries
            .sort_by(|a, b| b.prefix_len.cmp(&a.prefix_len));
        for i in 0..self.entries.len() {
            for j in (i + 1)..self.entries.len() {
                if self.entries[i].prefix_len == self.entries[j].prefix_len
                    && Self::overlaps(&self.entries[i], &self.entries[j])
                {
                    return Err(OverlapError);
                }
            }
        }
        self.finalized = true;
        Ok(())
    }

    fn overlaps(a: &Entry, b: &Entry) -> bool {
        let shared_len = a.prefix_len.min(b.prefix_len);
        let shift = OPCODE_SPACE_BITS - shared_len;
        (a.prefix >> shift) == (b.prefix >> shift)
    }

    /// Find the instruction whose prefix matches the top bits of `code`
    /// (a left-aligned 24-bit opcode window), returning its mnemonic,
    /// consumed bit length, and handler.
    pub fn dispatch(&self, code: u32) -> Result<(&'static str, u32, Handler), VmError> {
        for entry in &self.entries {
            let shift = OPCODE_SPACE_BITS - entry.prefix_len;
            if entry.prefix_len == 0 || (code >> shift) == (entry.prefix >> shift) {
                return Ok((entry.mnemonic, entry.prefix_len, entry.handler.clone()));
            }
        }
        Err(VmError::from(Exception::InvalidOpcode))
    }

    /// Number of registered instructions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no instructions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// For diagnostics: sample every code of `sample_bits` width (must be
    /// small, this is exhaustive) and report which ones dispatch to no
    /// entry, i.e. would raise `invalid_opcode`.
    pub fn coverage_gaps(&self, sample_bits: u32) -> Vec<u32> {
        assert!(sample_bits <= 16, "exhaustive sample too large");
        let shift = OPCODE_SPACE_BITS - sample_bits;
        (0u32..(1 << sample_bits))
            .filter(|&sample| self.dispatch(sample << shift).is_err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackEntry;

    fn noop_handler() -> Handler {
        Rc::new(|vm: &mut VmState, _bits| {
            vm.stack.push(StackEntry::Null)?;
            Ok(())
        })
    }

    #[test]
    fn exact_prefix_dispatches() {
        let mut t = DispatchTable::new();
        t.register(0xAB, 8, "FOO", noop_handler());
        t.finalize().unwrap();
        let (mnemonic, len, _) = t.dispatch(0xAB << 16).unwrap();
        assert_eq!(mnemonic, "FOO");
        assert_eq!(len, 8);
    }

    #[test]
    fn unmatched_code_is_invalid_opcode() {
        let mut t = DispatchTable::new();
        t.register(0xAB, 8, "FOO", noop_handler());
        t.finalize().unwrap();
        assert_eq!(
            t.dispatch(0xCD << 16).unwrap_err(),
            VmError::from(Exception::InvalidOpcode)
        );
    }

    #[test]
    fn longer_prefix_wins_over_shorter() {
        let mut t = DispatchTable::new();
        t.register(0b1010, 4, "SHORT", noop_handler());
        t.register(0b10100000, 8, "LONG", noop_handler());
        t.finalize().unwrap();
        let (mnemonic, _, _) = t.dispatch(0b10100000_00000000) .unwrap();
        assert_eq!(mnemonic, "LONG");
    }

    #[test]
    fn overlapping_same_length_prefixes_rejected() {
        let mut t = DispatchTable::new();
        t.register(0xAB, 8, "FOO", noop_handler());
        t.register(0xAB, 8, "BAR", noop_handler());
        assert_eq!(t.finalize().unwrap_err(), OverlapError);
    }

    #[test]
    fn coverage_gaps_lists_unmatched_samples() {
        let mut t = DispatchTable::new();
        t.register(0x00, 8, "ONLY", noop_handler());
        t.finalize().unwrap();
        let gaps = t.coverage_gaps(8);
        assert_eq!(gaps.len(), 255);
        assert!(!gaps.contains(&0x00));
    }
}
