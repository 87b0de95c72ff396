//! Control register file (`c0..c7`) and the sparse save-lists continuations
//! carry to restore a subset of it on return.
//!
//! Grounded on `original_source/.../continuation.h`'s `SaveList`: a
//! continuation doesn't snapshot every register, only the ones a
//! particular control transfer needs to restore, merged into whatever the
//! new continuation already set.

use crate::cell::Cell;
use crate::continuation::Continuation;
use crate::stack::StackEntry;
use std::rc::Rc;

/// Bitmask identifying a subset of `c0..c7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegMask(u8);

impl RegMask {
    /// The empty mask.
    pub const NONE: RegMask = RegMask(0);
    /// `c0`, the ordinary return continuation.
    pub const C0: RegMask = RegMask(1 << 0);
    /// `c1`, the alternative return continuation.
    pub const C1: RegMask = RegMask(1 << 1);
    /// `c2`, the exception handler.
    pub const C2: RegMask = RegMask(1 << 2);
    /// `c3`, the current code dispatch continuation.
    pub const C3: RegMask = RegMask(1 << 3);
    /// `c4`, the persistent data root.
    pub const C4: RegMask = RegMask(1 << 4);
    /// `c5`, the pending action list.
    pub const C5: RegMask = RegMask(1 << 5);
    /// `c6`, reserved.
    pub const C6: RegMask = RegMask(1 << 6);
    /// `c7`, the tuple of globals / smart-contract context.
    pub const C7: RegMask = RegMask(1 << 7);

    /// Union of two masks.
    pub const fn union(self, other: RegMask) -> RegMask {
        RegMask(self.0 | other.0)
    }

    /// Whether `bit` is set in this mask.
    pub const fn contains(self, bit: RegMask) -> bool {
        self.0 & bit.0 != 0
    }
}

/// A sparse overlay over the eight control registers: each field is
/// present only if this save-list explicitly carries a value for it.
#[derive(Debug, Clone, Default)]
pub struct ControlRegsPatch {
    pub c0: Option<Rc<Continuation>>,
    pub c1: Option<Rc<Continuation>>,
    pub c2: Option<Rc<Continuation>>,
    pub c3: Option<Rc<Continuation>>,
    pub c4: Option<Cell>,
    pub c5: Option<Cell>,
    pub c6: Option<StackEntry>,
    pub c7: Option<Rc<Vec<StackEntry>>>,
}

impl ControlRegsPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// `^=`: overwrite every field `other` carries a value for, leaving
    /// fields `other` leaves empty untouched.
    pub fn merge_overwrite(&mut self, other: &ControlRegsPatch) {
        if other.c0.is_some() {
            self.c0 = other.c0.clone();
        }
        if other.c1.is_some() {
            self.c1 = other.c1.clone();
        }
        if other.c2.is_some() {
            self.c2 = other.c2.clone();
        }
        if other.c3.is_some() {
            self.c3 = other.c3.clone();
        }
        if other.c4.is_some() {
            self.c4 = other.c4.clone();
        }
        if other.c5.is_some() {
            self.c5 = other.c5.clone();
        }
        if other.c6.is_some() {
            self.c6 = other.c6.clone();
        }
        if other.c7.is_some() {
            self.c7 = other.c7.clone();
        }
    }

    /// `&=`: clear every field not named by `mask`, keeping only the
    /// registers a caller is about to explicitly refill.
    pub fn preclear(&mut self, mask: RegMask) {
        if !mask.contains(RegMask::C0) {
            self.c0 = None;
        }
        if !mask.contains(RegMask::C1) {
            self.c1 = None;
        }
        if !mask.contains(RegMask::C2) {
            self.c2 = None;
        }
        if !mask.contains(RegMask::C3) {
            self.c3 = None;
        }
        if !mask.contains(RegMask::C4) {
            self.c4 = None;
        }
        if !mask.contains(RegMask::C5) {
            self.c5 = None;
        }
        if !mask.contains(RegMask::C6) {
            self.c6 = None;
        }
        if !mask.contains(RegMask::C7) {
            self.c7 = None;
        }
    }
}

/// The live control register file.
#[derive(Debug, Clone)]
pub struct ControlRegs {
    pub c0: Rc<Continuation>,
    pub c1: Rc<Continuation>,
    pub c2: Rc<Continuation>,
    pub c3: Rc<Continuation>,
    pub c4: Cell,
    pub c5: Cell,
    pub c6: StackEntry,
    pub c7: Rc<Vec<StackEntry>>,
}

impl ControlRegs {
    /// Apply every field `patch` carries, leaving the rest untouched —
    /// the register-file counterpart of [`ControlRegsPatch::merge_overwrite`].
    pub fn apply_patch(&mut self, patch: &ControlRegsPatch) {
        if let Some(c0) = &patch.c0 {
            self.c0 = c0.clone();
        }
        if let Some(c1) = &patch.c1 {
            self.c1 = c1.clone();
        }
        if let Some(c2) = &patch.c2 {
            self.c2 = c2.clone();
        }
        if let Some(c3) = &patch.c3 {
            self.c3 = c3.clone();
        }
        if let Some(c4) = &patch.c4 {
            self.c4 = c4.clone();
        }
        if let Some(c5) = &patch.c5 {
            self.c5 = c5.clone();
        }
        if let Some(c6) = &patch.c6 {
            self.c6 = c6.clone();
        }
        if let Some(c7) = &patch.c7 {
            self.c7 = c7.clone();
        }
    }

    /// Snapshot the registers named by `mask` into a patch, for attaching
    /// to a continuation about to be jumped away from.
    pub fn snapshot(&self, mask: RegMask) -> ControlRegsPatch {
        ControlRegsPatch {
            c0: mask.contains(RegMask::C0).then(|| self.c0.clone()),
            c1: mask.contains(RegMask::C1).then(|| self.c1.clone()),
            c2: mask.contains(RegMask::C2).then(|| self.c2.clone()),
            c3: mask.contains(RegMask::C3).then(|| self.c3.clone()),
            c4: mask.contains(RegMask::C4).then(|| self.c4.clone()),
            c5: mask.contains(RegMask::C5).then(|| self.c5.clone()),
            c6: mask.contains(RegMask::C6).then(|| self.c6.clone()),
            c7: mask.contains(RegMask::C7).then(|| self.c7.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::BigInt257;

    fn quit_regs() -> ControlRegs {
        let quit = Rc::new(Continuation::Quit { exit_code: 0 });
        ControlRegs {
            c0: quit.clone(),
            c1: quit.clone(),
            c2: quit.clone(),
            c3: quit,
            c4: Cell::empty(),
            c5: Cell::empty(),
            c6: StackEntry::Null,
            c7: Rc::new(vec![]),
        }
    }

    #[test]
    fn merge_overwrite_only_touches_present_fields() {
        let mut base = ControlRegsPatch::new();
        base.c4 = Some(Cell::empty());
        let mut other = ControlRegsPatch::new();
        other.c0 = Some(Rc::new(Continuation::ExcQuit));
        base.merge_overwrite(&other);
        assert!(base.c0.is_some());
        assert!(base.c4.is_some());
    }

    #[test]
    fn preclear_keeps_only_masked_fields() {
        let mut patch = ControlRegsPatch::new();
        patch.c0 = Some(Rc::new(Continuation::ExcQuit));
        patch.c4 = Some(Cell::empty());
        patch.preclear(RegMask::C0);
        assert!(patch.c0.is_some());
        assert!(patch.c4.is_none());
    }

    #[test]
    fn apply_patch_updates_register_file() {
        let mut regs = quit_regs();
        let mut patch = ControlRegsPatch::new();
        patch.c6 = Some(StackEntry::Int(BigInt257::from_i64(7)));
        regs.apply_patch(&patch);
        match regs.c6 {
            StackEntry::Int(v) => assert_eq!(v, BigInt257::from_i64(7)),
            _ => panic!("expected int"),
        }
    }

    #[test]
    fn snapshot_round_trips_through_apply() {
        let regs = quit_regs();
        let snap = regs.snapshot(RegMask::C4.union(RegMask::C5));
        assert!(snap.c4.is_some());
        assert!(snap.c5.is_some());
        assert!(snap.c0.is_none());
    }
}
