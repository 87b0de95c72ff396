//! Control-flow opcode handlers: call/jump, conditionals, loops,
//! continuation-argument shaping, dictionary call, throw, and the
//! debug/codepage no-ops.
//!
//! Grounded on `original_source/.../contops.cpp` for the call/jump/
//! conditional/loop instruction catalogue and `debugops.cpp`/`cp0.cpp`
//! for the debug and codepage-selection opcodes, which are no-ops here
//! since only one codepage exists.

use super::flow;
use crate::bigint::BigInt257;
use crate::continuation::Continuation;
use crate::error::VmError;
use crate::stack::StackEntry;
use std::rc::Rc;

use super::VmState;

fn truthy(v: &BigInt257) -> bool {
    !v.is_zero() && !v.is_nan()
}

/// Clamp a loop-count integer into an `i64`, saturating at `i64::MAX` for
/// anything too large to matter (no real run repeats a loop that many
/// times before running out of gas anyway).
fn clamp_count(v: &BigInt257) -> i64 {
    if v.is_nan() || v.is_negative() {
        return 0;
    }
    if !v.unsigned_fits_bits(63) {
        return i64::MAX;
    }
    let bits = v.to_bits_be(64);
    let mut u: u64 = 0;
    for b in bits {
        u = (u << 1) | (b as u64);
    }
    u as i64
}

/// `JMPX`: pop a continuation and jump to it with no return point saved
/// (a tail call).
pub fn exec_jmpx(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let cont = vm.stack.pop_continuation()?;
    let outcome = flow::jump(vm, cont)?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `CALLX`: pop a continuation; jump to it with its `c0` set to the
/// current position, so `RET` inside it resumes after this instruction.
pub fn exec_callx(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let cont = vm.stack.pop_continuation()?;
    let return_here = vm.regs.c0.clone();
    vm.regs.c0 = vm.cc.clone();
    match flow::jump(vm, cont) {
        Ok(outcome) => {
            vm.apply_jump(outcome);
            Ok(())
        }
        Err(e) => {
            vm.regs.c0 = return_here;
            Err(e)
        }
    }
}

/// `RET`: jump to `c0`.
pub fn exec_ret(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let c0 = vm.regs.c0.clone();
    let outcome = flow::jump(vm, c0)?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `IFRET`: pop a flag; if truthy, behave like `RET`.
pub fn exec_ifret(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let flag = vm.stack.pop_int()?;
    if truthy(&flag) {
        exec_ret(vm, 0)
    } else {
        Ok(())
    }
}

/// `IF`: pop a continuation then a flag; if truthy, call it (like
/// `CALLX`), otherwise fall through.
pub fn exec_if(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let cont = vm.stack.pop_continuation()?;
    let flag = vm.stack.pop_int()?;
    if truthy(&flag) {
        vm.regs.c0 = vm.cc.clone();
        let outcome = flow::jump(vm, cont)?;
        vm.apply_jump(outcome);
    }
    Ok(())
}

/// `IFJMP`: pop a continuation then a flag; if truthy, tail-jump to it.
pub fn exec_ifjmp(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let cont = vm.stack.pop_continuation()?;
    let flag = vm.stack.pop_int()?;
    if truthy(&flag) {
        let outcome = flow::jump(vm, cont)?;
        vm.apply_jump(outcome);
    }
    Ok(())
}

/// `REPEAT`: pop a body continuation then a count; run `body` that many
/// times before resuming where `REPEAT` was executed.
pub fn exec_repeat(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let body = vm.stack.pop_continuation()?;
    let count = clamp_count(&vm.stack.pop_int()?);
    let after = vm.cc.clone();
    let outcome = flow::jump(vm, Rc::new(Continuation::Repeat { count, body, after }))?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `AGAIN`: pop a body continuation; run it forever.
pub fn exec_again(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let body = vm.stack.pop_continuation()?;
    let outcome = flow::jump(vm, Rc::new(Continuation::Again { body }))?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `UNTIL`: pop a body continuation; run it, then repeat while it leaves
/// a falsy flag, resuming after `UNTIL` once it's truthy.
pub fn exec_until(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let body = vm.stack.pop_continuation()?;
    let after = vm.cc.clone();
    let resumption = Rc::new(Continuation::Until {
        body: body.clone(),
        after,
    });
    let outcome = flow::jump(vm, flow::enter_loop_body(body, resumption))?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `WHILE`: pop a body continuation then a condition continuation; run
/// `cond`, and while it leaves a truthy flag run `body` then `cond` again.
pub fn exec_while(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let body = vm.stack.pop_continuation()?;
    let cond = vm.stack.pop_continuation()?;
    let after = vm.cc.clone();
    let resumption = Rc::new(Continuation::While {
        cond: cond.clone(),
        body,
        after,
    });
    let outcome = flow::jump(vm, flow::enter_loop_body(cond, resumption))?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `SETCONTARGS n`: pop a continuation, record that it expects `n`
/// arguments. Doesn't itself cut the stack — only `CALLXARGS`-style call
/// sites enforce the cap; see `flow::apply_control_data`'s doc comment. `n`
/// is a 4-bit inline immediate following the opcode byte.
pub fn exec_setcontargs(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(4)? as u32;
    let cont = vm.stack.pop_continuation()?;
    let wrapped = match &*cont {
        Continuation::Ord { code, cdata } => {
            let mut cdata = cdata.clone();
            cdata.nargs = Some(n);
            Continuation::Ord {
                code: code.clone(),
                cdata,
            }
        }
        other => other.clone(),
    };
    vm.stack.push(StackEntry::Continuation(Rc::new(wrapped)))
}

/// `CALLDICT n`: push `n`, then call `c3` — the shared dispatcher
/// continuation a full build would resolve `n` through an actual
/// dictionary of procedures; this core has no dictionary engine, so `c3`
/// stands in directly as the sole callable procedure table.
pub fn exec_calldict(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(8)? as i64;
    vm.stack.push(StackEntry::Int(BigInt257::from_i64(n)))?;
    let c3 = vm.regs.c3.clone();
    vm.regs.c0 = vm.cc.clone();
    let outcome = flow::jump(vm, c3)?;
    vm.apply_jump(outcome);
    Ok(())
}

/// `THROW n`: throw the exception numbered `n` unconditionally. `n` is an
/// arbitrary bytecode-supplied number, not restricted to the VM's own
/// exception taxonomy, and is pushed to `c2` verbatim on catch.
pub fn exec_throw(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(8)?;
    Err(VmError::ThrownRaw(n as u16))
}

/// `THROWIF n`: pop a flag; if truthy, throw exception `n` (see
/// [`exec_throw`] for the raw-number contract).
pub fn exec_throwif(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(8)?;
    let flag = vm.stack.pop_int()?;
    if truthy(&flag) {
        Err(VmError::ThrownRaw(n as u16))
    } else {
        Ok(())
    }
}

/// `SETCP0`: select codepage 0. A no-op — this core implements only one
/// codepage.
pub fn exec_setcp0(_vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    Ok(())
}

/// `DEBUGSTR`: a debug annotation with no stack or control effect, traced
/// at `trace!` level.
pub fn exec_debug_nop(_vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    tracing::trace!("DEBUG nop reached");
    Ok(())
}

/// Register the control-flow, continuation-argument, dictionary-call,
/// throw, and debug/codepage families, at the byte values named in the
/// opcode prefix table (`0xD8..0xDB` call/jump, `0xDE..0xE2` conditional,
/// `0xE4..0xEB` loops, `0xEC..0xEE` set-cont-args, `0xF0..0xF1` calldict,
/// `0xF2..0xF3` throw, `0xFE..0xFF` debug/setcp).
pub fn register(table: &mut crate::dispatch::DispatchTable) {
    table.register(0xD8, 8, "JMPX", Rc::new(exec_jmpx));
    table.register(0xD9, 8, "CALLX", Rc::new(exec_callx));
    table.register(0xDB, 8, "RET", Rc::new(exec_ret));
    table.register(0xDE, 8, "IFRET", Rc::new(exec_ifret));
    table.register(0xDF, 8, "IF", Rc::new(exec_if));
    table.register(0xE0, 8, "IFJMP", Rc::new(exec_ifjmp));
    table.register(0xE4, 8, "REPEAT", Rc::new(exec_repeat));
    table.register(0xE6, 8, "UNTIL", Rc::new(exec_until));
    table.register(0xE8, 8, "WHILE", Rc::new(exec_while));
    table.register(0xEA, 8, "AGAIN", Rc::new(exec_again));
    table.register(0xEC, 8, "SETCONTARGS", Rc::new(exec_setcontargs));
    table.register(0xF0, 8, "CALLDICT", Rc::new(exec_calldict));
    table.register(0xF2, 8, "THROW", Rc::new(exec_throw));
    table.register(0xF3, 8, "THROWIF", Rc::new(exec_throwif));
    table.register(0xFF, 8, "SETCP0", Rc::new(exec_setcp0));
    table.register(0xFE, 8, "DEBUGSTR", Rc::new(exec_debug_nop));
}
