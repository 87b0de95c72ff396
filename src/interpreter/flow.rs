//! Control transfer: entering continuations and applying their register
//! overlays.
//!
//! Grounded on `original_source/.../continuation.cpp`'s `ok_jump`/
//! `extract_cc` family; the explicit `JumpOutcome` result, rather than a
//! recursive "just keep going", propagates state out of this module's
//! callers explicitly instead of looping silently inside a single call.

use super::VmState;
use crate::continuation::{Continuation, ControlData};
use crate::error::VmError;
use crate::gas::GasUnit;
use crate::stack::StackEntry;
use std::rc::Rc;

/// What happened when [`jump`] entered a continuation.
pub enum JumpOutcome {
    /// `vm.cc` now holds an ordinary continuation, ready for the next
    /// fetch-dispatch cycle.
    Continue,
    /// A `Quit`/`ExcQuit` continuation was reached; the run is over.
    Halt(i32),
}

/// Enter `cont`: apply its register overlay (if any) and either leave it
/// as the new current continuation, or — for non-code continuations like
/// `PushInt`/loop wrappers — perform its effect and recurse into whatever
/// it transfers to next.
pub fn jump(vm: &mut VmState, cont: Rc<Continuation>) -> Result<JumpOutcome, VmError> {
    match &*cont {
        Continuation::Ord { cdata, .. } => {
            apply_control_data(vm, cdata)?;
            vm.cc = cont;
            Ok(JumpOutcome::Continue)
        }
        Continuation::Quit { exit_code } => Ok(JumpOutcome::Halt(*exit_code)),
        Continuation::ExcQuit => Ok(JumpOutcome::Halt(-1)),
        Continuation::PushInt { value, next } => {
            vm.stack.push(StackEntry::Int(value.clone()))?;
            jump(vm, next.clone())
        }
        Continuation::Repeat { count, body, after } => {
            if *count <= 0 {
                jump(vm, after.clone())
            } else {
                let resumption = Rc::new(Continuation::Repeat {
                    count: count - 1,
                    body: body.clone(),
                    after: after.clone(),
                });
                jump(vm, with_return_point(body.clone(), resumption))
            }
        }
        Continuation::Again { body } => {
            let resumption = Rc::new(Continuation::Again { body: body.clone() });
            jump(vm, with_return_point(body.clone(), resumption))
        }
        // Reached only as a resumption point, after `body` has already run
        // once: pop the flag it left and decide whether to loop again.
        // The unconditional first entry into `body` is the `UNTIL` opcode
        // handler's job (`contops::exec_until`), not this match arm.
        Continuation::Until { body, after } => {
            let flag = vm.stack.pop_int()?;
            if flag.is_zero() {
                jump(vm, after.clone())
            } else {
                let resumption = Rc::new(Continuation::Until {
                    body: body.clone(),
                    after: after.clone(),
                });
                jump(vm, enter_loop_body(body.clone(), resumption))
            }
        }
        // Reached after `cond` has run and left its flag on the stack; the
        // first entry into `cond` is `contops::exec_while`'s job.
        Continuation::While { cond, body, after } => {
            let flag = vm.stack.pop_int()?;
            if flag.is_zero() {
                jump(vm, after.clone())
            } else {
                let recheck = Rc::new(Continuation::While {
                    cond: cond.clone(),
                    body: body.clone(),
                    after: after.clone(),
                });
                let back_to_cond = enter_loop_body(cond.clone(), recheck);
                jump(vm, enter_loop_body(body.clone(), back_to_cond))
            }
        }
        Continuation::ArgExt { extra_args, next } => {
            for entry in extra_args.iter().rev() {
                vm.stack.push(entry.clone())?;
            }
            jump(vm, next.clone())
        }
    }
}

/// Clone of `body` with its control-data `c0` overridden to resume at
/// `resumption` on normal exit. Non-`Ord` bodies ignore the override —
/// documented simplification: loop bodies built by `PUSHCONT` are always
/// ordinary continuations, so this covers every real call site.
fn with_return_point(body: Rc<Continuation>, resumption: Rc<Continuation>) -> Rc<Continuation> {
    match &*body {
        Continuation::Ord { code, cdata } => {
            let mut cdata = cdata.clone();
            cdata.save.c0 = Some(resumption);
            Rc::new(Continuation::Ord {
                code: code.clone(),
                cdata,
            })
        }
        _ => body,
    }
}

/// Entry point for the `REPEAT`/`AGAIN`/`UNTIL`/`WHILE` opcode handlers:
/// build the continuation that runs `body` once with `c0` set to
/// `resumption`.
pub(crate) fn enter_loop_body(body: Rc<Continuation>, resumption: Rc<Continuation>) -> Rc<Continuation> {
    with_return_point(body, resumption)
}

/// Apply a continuation's saved register overlay and argument-count cut.
/// `stack_cut`, if set, replaces the live stack outright (a `CALLXARGS`-
/// style private frame); `nargs` otherwise only documents the intended
/// cap and is enforced by the call-site opcode handler, not here.
fn apply_control_data(vm: &mut VmState, cdata: &ControlData) -> Result<(), VmError> {
    vm.regs.apply_patch(&cdata.save);
    if let Some(entries) = &cdata.stack_cut {
        let n = entries.len() as u32;
        vm.gas.consume(GasUnit::StackEntries(n))?;
        let max_depth = vm.stack.max_depth();
        vm.stack = crate::stack::Stack::from_entries(entries.clone(), max_depth);
    }
    Ok(())
}
