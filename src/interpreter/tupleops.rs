//! Tuple opcode handlers.
//!
//! Grounded on `original_source/.../tupleops.cpp`'s `TUPLE`/`UNTUPLE`/
//! `INDEX`/`UNPAIR`/`TLEN` family — the operations that actually exercise
//! the `StackEntry::Tuple` variant the data model declares.

use super::VmState;
use crate::bigint::BigInt257;
use crate::error::{Exception, VmError};
use crate::gas::GasUnit;
use crate::stack::StackEntry;
use std::rc::Rc;

/// `TUPLE n`: pop `n` entries and push them as one tuple, bottom to top.
pub fn exec_tuple(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(4)? as usize;
    let mut entries = Vec::with_capacity(n);
    for _ in 0..n {
        entries.push(vm.stack.pop()?);
    }
    entries.reverse();
    vm.gas.consume(GasUnit::TupleEntries(n as u32))?;
    vm.stack.push(StackEntry::Tuple(Rc::new(entries)))
}

/// `UNTUPLE n`: pop a tuple, require it has exactly `n` entries, push them.
pub fn exec_untuple(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(4)? as usize;
    let tuple = vm.stack.pop_tuple()?;
    if tuple.len() != n {
        return Err(VmError::from(Exception::TypeCheck));
    }
    vm.gas.consume(GasUnit::TupleEntries(n as u32))?;
    for entry in tuple.iter() {
        vm.stack.push(entry.clone())?;
    }
    Ok(())
}

/// `INDEX k`: pop a tuple, push its `k`th entry (0-based).
pub fn exec_index(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let k = vm.code_mut()?.load_uint(4)? as usize;
    let tuple = vm.stack.pop_tuple()?;
    let entry = tuple
        .get(k)
        .cloned()
        .ok_or_else(|| VmError::from(Exception::RangeCheck))?;
    vm.stack.push(entry)
}

/// `UNPAIR`: pop a 2-entry tuple, push its first then second entry.
pub fn exec_unpair(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let tuple = vm.stack.pop_tuple()?;
    if tuple.len() != 2 {
        return Err(VmError::from(Exception::TypeCheck));
    }
    vm.stack.push(tuple[0].clone())?;
    vm.stack.push(tuple[1].clone())
}

/// `TLEN`: pop a tuple, push its length.
pub fn exec_tlen(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let tuple = vm.stack.pop_tuple()?;
    vm.stack
        .push(StackEntry::Int(BigInt257::from_i64(tuple.len() as i64)))
}

/// Register the tuple family.
pub fn register(table: &mut crate::dispatch::DispatchTable) {
    table.register(0x69, 8, "TUPLE", Rc::new(exec_tuple));
    table.register(0x6A, 8, "UNTUPLE", Rc::new(exec_untuple));
    table.register(0x6B, 8, "INDEX", Rc::new(exec_index));
    table.register(0x6C, 8, "UNPAIR", Rc::new(exec_unpair));
    table.register(0x6D, 8, "TLEN", Rc::new(exec_tlen));
}
