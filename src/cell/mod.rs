//! Content-addressed cells: the tree structure everything else builds on.
//!
//! Grounded on `original_source/.../cellops.cpp` and `cells/CellSlice.cpp`
//! for the ordinary/special-cell split and hashing discipline; shared
//! immutable storage is wrapped in a bounds-checked handle rather than
//! exposed as a raw buffer.

pub mod builder;
pub mod slice;

pub use builder::Builder;
pub use slice::Slice;

use crate::consts::{MAX_CELL_BITS, MAX_CELL_REFS};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::rc::Rc;

/// The four special-cell tags the core understands. Merkle proof/update
/// cells are recognized but not unwrapped: a slice over their data always
/// throws `cell_underflow`, since unwrapping a Merkle proof is a
/// collaborator's job, not this core's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// Stands in for a subtree pruned from a partial state; carries a
    /// virtualization level that must be zero to be dereferenced.
    PrunedBranch {
        /// Nonzero means "still virtualized"; dereferencing throws `virt_err`.
        virtualization: u8,
    },
    /// Forwards to a cell resolved by hash through a host-supplied library set.
    Library,
    /// Merkle proof wrapper; out of scope to unwrap.
    MerkleProof,
    /// Merkle update wrapper; out of scope to unwrap.
    MerkleUpdate,
}

#[derive(Debug)]
struct CellInner {
    data: Vec<bool>,
    refs: Vec<Cell>,
    special: Option<SpecialKind>,
    hash: [u8; 32],
}

/// An immutable, content-addressed cell: up to 1023 data bits and up to 4
/// child references. Cheap to clone — it's a reference-counted handle.
#[derive(Clone)]
pub struct Cell(Rc<CellInner>);

/// Why a cell could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    /// More than [`MAX_CELL_BITS`] data bits were supplied.
    #[error("cell overflow: too many data bits")]
    TooManyBits,
    /// More than [`MAX_CELL_REFS`] child references were supplied.
    #[error("cell overflow: too many references")]
    TooManyRefs,
}

impl Cell {
    /// Build an ordinary (non-special) cell.
    pub fn new(data: Vec<bool>, refs: Vec<Cell>) -> Result<Self, CellError> {
        Self::build(data, refs, None)
    }

    /// Build a special cell of the given kind. No structural validation of
    /// `data`'s content is performed beyond the bit/ref limits — the tag
    /// byte and any embedded hash are the caller's responsibility, matching
    /// `cellops.cpp`'s separation between generic cell storage and special
    /// cell interpretation.
    pub fn new_special(
        kind: SpecialKind,
        data: Vec<bool>,
        refs: Vec<Cell>,
    ) -> Result<Self, CellError> {
        Self::build(data, refs, Some(kind))
    }

    /// An empty ordinary cell: no data, no references.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new()).expect("empty cell is always valid")
    }

    fn build(data: Vec<bool>, refs: Vec<Cell>, special: Option<SpecialKind>) -> Result<Self, CellError> {
        if data.len() > MAX_CELL_BITS {
            return Err(CellError::TooManyBits);
        }
        if refs.len() > MAX_CELL_REFS {
            return Err(CellError::TooManyRefs);
        }
        let hash = Self::compute_hash(&data, &refs, special);
        Ok(Self(Rc::new(CellInner {
            data,
            refs,
            special,
            hash,
        })))
    }

    fn compute_hash(data: &[bool], refs: &[Cell], special: Option<SpecialKind>) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        match special {
            None => hasher.update([0u8]),
            Some(SpecialKind::PrunedBranch { virtualization }) => {
                hasher.update([1u8, virtualization])
            }
            Some(SpecialKind::Library) => hasher.update([2u8]),
            Some(SpecialKind::MerkleProof) => hasher.update([3u8]),
            Some(SpecialKind::MerkleUpdate) => hasher.update([4u8]),
        }
        hasher.update((data.len() as u32).to_be_bytes());
        for chunk in data.chunks(8) {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    byte |= 1 << (7 - i);
                }
            }
            hasher.update([byte]);
        }
        for r in refs {
            hasher.update(r.hash());
        }
        hasher.finalize().into()
    }

    /// This cell's content hash. Two cells with equal data, references and
    /// special tag always hash equal, independent of construction order.
    pub fn hash(&self) -> [u8; 32] {
        self.0.hash
    }

    /// Number of data bits stored.
    pub fn bit_len(&self) -> usize {
        self.0.data.len()
    }

    /// Number of child references stored.
    pub fn ref_count(&self) -> usize {
        self.0.refs.len()
    }

    /// The raw data bits, most significant first.
    pub fn data(&self) -> &[bool] {
        &self.0.data
    }

    /// The `i`th child reference, if present.
    pub fn reference(&self, i: usize) -> Option<&Cell> {
        self.0.refs.get(i)
    }

    /// All child references.
    pub fn references(&self) -> &[Cell] {
        &self.0.refs
    }

    /// The special tag, if this is a special cell.
    pub fn special_kind(&self) -> Option<SpecialKind> {
        self.0.special
    }

    /// True if this cell is special (pruned branch, library, or Merkle wrapper).
    pub fn is_special(&self) -> bool {
        self.0.special.is_some()
    }

    /// For a library cell, the 256-bit hash it forwards to: the 256 bits
    /// immediately following the tag byte. `None` if this isn't a library
    /// cell or doesn't carry enough data bits.
    pub fn library_hash(&self) -> Option<[u8; 32]> {
        if self.0.special != Some(SpecialKind::Library) {
            return None;
        }
        if self.0.data.len() < 256 {
            return None;
        }
        let mut out = [0u8; 32];
        for (byte_idx, chunk) in self.0.data[..256].chunks(8).enumerate() {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    byte |= 1 << (7 - i);
                }
            }
            out[byte_idx] = byte;
        }
        Some(out)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}
impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.bit_len())
            .field("refs", &self.ref_count())
            .field("special", &self.special_kind())
            .field("hash", &hex(&self.hash()))
            .finish()
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_hashes_equal() {
        let a = Cell::new(vec![true, false, true], vec![]).unwrap();
        let b = Cell::new(vec![true, false, true], vec![]).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a, b);
    }

    #[test]
    fn different_data_hashes_differ() {
        let a = Cell::new(vec![true], vec![]).unwrap();
        let b = Cell::new(vec![false], vec![]).unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn too_many_bits_rejected() {
        let data = vec![true; MAX_CELL_BITS + 1];
        assert_eq!(Cell::new(data, vec![]), Err(CellError::TooManyBits));
    }

    #[test]
    fn too_many_refs_rejected() {
        let refs = vec![Cell::empty(); MAX_CELL_REFS + 1];
        assert_eq!(Cell::new(vec![], refs), Err(CellError::TooManyRefs));
    }

    #[test]
    fn library_hash_reads_first_256_bits_after_tag() {
        let mut bits = vec![false; 256];
        bits[255] = true;
        let lib = Cell::new_special(SpecialKind::Library, bits, vec![]).unwrap();
        let expected = {
            let mut h = [0u8; 32];
            h[31] = 1;
            h
        };
        assert_eq!(lib.library_hash(), Some(expected));
    }

    #[test]
    fn ordinary_cell_has_no_library_hash() {
        let c = Cell::new(vec![true; 256], vec![]).unwrap();
        assert_eq!(c.library_hash(), None);
    }

    #[test]
    fn pruned_branch_tracks_virtualization() {
        let c = Cell::new_special(
            SpecialKind::PrunedBranch { virtualization: 1 },
            vec![],
            vec![],
        )
        .unwrap();
        assert!(c.is_special());
        assert_eq!(
            c.special_kind(),
            Some(SpecialKind::PrunedBranch { virtualization: 1 })
        );
    }
}
