//! Continuation values: the VM's representation of "what to run next".
//!
//! Grounded on `original_source/.../continuation.{h,cpp}` for the variant
//! catalogue (`OrdCont`, `ArgContExt`, the loop bodies, `PushIntCont`,
//! quit continuations); shared structure is held behind `Rc` and
//! save/restore is named after call-frame save/restore conventions.

use crate::bigint::BigInt257;
use crate::cell::Slice;
use crate::control_regs::ControlRegsPatch;
use crate::stack::StackEntry;
use std::rc::Rc;

/// The control-register overlay and argument-count limit a continuation
/// carries with it, applied to the register file when the continuation is
/// entered. Mirrors `original_source`'s `ControlData` member of `OrdCont`.
#[derive(Debug, Clone, Default)]
pub struct ControlData {
    /// Registers to overwrite on entry (`^=` against the live file).
    pub save: ControlRegsPatch,
    /// If set, caps how many stack entries may be passed into this
    /// continuation; extras stay behind on the caller's stack.
    pub nargs: Option<u32>,
    /// If set, this continuation runs with its own stack instead of the
    /// caller's (e.g. a `CALLXARGS`-cut frame).
    pub stack_cut: Option<Vec<StackEntry>>,
}

/// A first-class continuation: "where to resume execution", plus whatever
/// bookkeeping that resumption needs.
#[derive(Debug, Clone)]
pub enum Continuation {
    /// An ordinary continuation: resume by executing `code` from its
    /// current cursor, after applying `cdata`.
    Ord { code: Slice, cdata: ControlData },
    /// Terminates the whole run with `exit_code` once reached.
    Quit { exit_code: i32 },
    /// Terminates the run signaling an unhandled exception.
    ExcQuit,
    /// Pushes `value` onto the stack, then continues as `next`. Used to
    /// splice a produced integer into a continuation chain (e.g. the
    /// numeric argument of a conditional jump).
    PushInt {
        value: BigInt257,
        next: Rc<Continuation>,
    },
    /// Runs `body` `count` more times (if `count > 0`), then `after`.
    Repeat {
        count: i64,
        body: Rc<Continuation>,
        after: Rc<Continuation>,
    },
    /// Runs `body` forever, looping back into itself on normal exit.
    Again { body: Rc<Continuation> },
    /// Runs `body` repeatedly until it returns a truthy flag on the
    /// stack, then continues as `after`.
    Until {
        body: Rc<Continuation>,
        after: Rc<Continuation>,
    },
    /// Runs `cond`; if it leaves a truthy flag, runs `body` and loops,
    /// otherwise continues as `after`.
    While {
        cond: Rc<Continuation>,
        body: Rc<Continuation>,
        after: Rc<Continuation>,
    },
    /// Extends `next`'s apparent argument list with `extra_args`, pushed
    /// beneath whatever the caller supplies.
    ArgExt {
        extra_args: Vec<StackEntry>,
        next: Rc<Continuation>,
    },
}

impl Continuation {
    /// An ordinary continuation over `code` with no register overlay.
    pub fn ordinary(code: Slice) -> Self {
        Self::Ord {
            code,
            cdata: ControlData::default(),
        }
    }

    /// Short, stable name for tracing/diagnostics — not used for control
    /// flow, only `describe()`-style logging.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Ord { .. } => "ord",
            Self::Quit { .. } => "quit",
            Self::ExcQuit => "exc_quit",
            Self::PushInt { .. } => "push_int",
            Self::Repeat { .. } => "repeat",
            Self::Again { .. } => "again",
            Self::Until { .. } => "until",
            Self::While { .. } => "while",
            Self::ArgExt { .. } => "arg_ext",
        }
    }

    /// The register overlay this continuation carries, if it's an
    /// ordinary code continuation (the only variant with one of its own).
    pub fn control_data(&self) -> Option<&ControlData> {
        match self {
            Self::Ord { cdata, .. } => Some(cdata),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn ordinary_continuation_has_empty_cdata() {
        let c = Continuation::ordinary(Slice::new(Cell::empty()));
        assert!(c.control_data().unwrap().save.c0.is_none());
    }

    #[test]
    fn describe_is_stable_per_variant() {
        assert_eq!(Continuation::Quit { exit_code: 0 }.describe(), "quit");
        assert_eq!(Continuation::ExcQuit.describe(), "exc_quit");
    }

    #[test]
    fn push_int_wraps_next() {
        let next = Rc::new(Continuation::Quit { exit_code: 0 });
        let c = Continuation::PushInt {
            value: BigInt257::from_i64(5),
            next: next.clone(),
        };
        match c {
            Continuation::PushInt { next: n, .. } => assert!(Rc::ptr_eq(&n, &next)),
            _ => panic!("wrong variant"),
        }
    }
}
