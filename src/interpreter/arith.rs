//! Arithmetic and divmod opcode handlers.
//!
//! Grounded on `original_source/.../arithops.cpp`: plain arithmetic throws
//! `int_overflow` on a NaN operand or NaN result (`check_and_push` in the
//! original); the `Q`-prefixed "quiet" forms push NaN through instead.

use super::VmState;
use crate::bigint::{BigInt257, Rounding};
use crate::error::VmError;
use crate::stack::{require_finite, StackEntry};
use std::rc::Rc;

fn strict(v: BigInt257) -> Result<BigInt257, VmError> {
    require_finite(v)
}

/// `ADD`: pop `b`, `a`; push `a + b`.
pub fn exec_add(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    vm.stack.push(StackEntry::Int(strict(a.add(&b))?))
}

/// `SUB`: pop `b`, `a`; push `a - b`.
pub fn exec_sub(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    vm.stack.push(StackEntry::Int(strict(a.sub(&b))?))
}

/// `NEGATE`: pop `a`; push `-a`.
pub fn exec_negate(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let a = vm.stack.pop_int()?;
    vm.stack.push(StackEntry::Int(strict(a.neg())?))
}

/// `MUL`: pop `b`, `a`; push `a * b`.
pub fn exec_mul(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    vm.stack.push(StackEntry::Int(strict(a.mul(&b))?))
}

/// `DIVMOD`: pop `b`, `a`; push floor-quotient then floor-remainder.
pub fn exec_divmod(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    let (q, r) = a.divmod(&b, Rounding::Floor);
    vm.stack.push(StackEntry::Int(strict(q)?))?;
    vm.stack.push(StackEntry::Int(strict(r)?))
}

/// `DIV`: pop `b`, `a`; push the floor-quotient only.
pub fn exec_div(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    let (q, _r) = a.divmod(&b, Rounding::Floor);
    vm.stack.push(StackEntry::Int(strict(q)?))
}

/// `MOD`: pop `b`, `a`; push the floor-remainder only.
pub fn exec_mod(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    let (_q, r) = a.divmod(&b, Rounding::Floor);
    vm.stack.push(StackEntry::Int(strict(r)?))
}

/// `QADD`: the quiet form of `ADD` — NaN operands or overflow yield NaN
/// on the stack instead of throwing.
pub fn exec_qadd(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    vm.stack.push(StackEntry::Int(a.add(&b)))
}

/// `QSUB`: the quiet form of `SUB`.
pub fn exec_qsub(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    vm.stack.push(StackEntry::Int(a.sub(&b)))
}

/// `QDIVMOD`: the quiet form of `DIVMOD`.
pub fn exec_qdivmod(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let b = vm.stack.pop_int()?;
    let a = vm.stack.pop_int()?;
    let (q, r) = a.divmod(&b, Rounding::Floor);
    vm.stack.push(StackEntry::Int(q))?;
    vm.stack.push(StackEntry::Int(r))
}

/// Register the arithmetic family into `table`: `ADD`/`SUB`/`NEGATE`/`MUL`
/// at their 8-bit prefixes, `DIVMOD`/`DIV`/`MOD`, and the `Q`-prefixed
/// quiet escapes at their 16-bit prefixes.
pub fn register(table: &mut crate::dispatch::DispatchTable) {
    table.register(0xA0, 8, "ADD", Rc::new(exec_add));
    table.register(0xA1, 8, "SUB", Rc::new(exec_sub));
    table.register(0xA2, 8, "NEGATE", Rc::new(exec_negate));
    table.register(0xA8, 8, "MUL", Rc::new(exec_mul));
    table.register(0xA9, 8, "DIVMOD", Rc::new(exec_divmod));
    table.register(0xAA, 8, "DIV", Rc::new(exec_div));
    table.register(0xAB, 8, "MOD", Rc::new(exec_mod));
    table.register(0xB7A0, 16, "QADD", Rc::new(exec_qadd));
    table.register(0xB7A1, 16, "QSUB", Rc::new(exec_qsub));
    table.register(0xB7A9, 16, "QDIVMOD", Rc::new(exec_qdivmod));
}
