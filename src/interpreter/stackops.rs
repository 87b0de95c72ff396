//! Stack shuffle opcode handlers.
//!
//! Grounded on `original_source/.../stackops.cpp`: `DROP`/`DUP`/`SWAP` are
//! dedicated one-byte opcodes (the common cases of the general `PUSH
//! s(i)`/`POP s(i)`/`XCHG s(i)` families), which are themselves a 4-bit
//! family tag plus an inline 4-bit index decoded by the handler, not by
//! the dispatch prefix.

use super::VmState;
use crate::error::VmError;
use std::rc::Rc;

/// `NOP`: do nothing.
pub fn exec_nop(_vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    Ok(())
}

/// `DROP`: discard the top of stack.
pub fn exec_drop(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    vm.stack.pop()?;
    Ok(())
}

/// `DUP`: push a copy of the top of stack.
pub fn exec_dup(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let top = vm.stack.top_at(0)?.clone();
    vm.stack.push(top)
}

/// `SWAP`: exchange the top two entries.
pub fn exec_swap(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    vm.stack.xchg(1)
}

/// `PUSH s(i)`: push a copy of the entry `i` slots from the top. `i` is a
/// 4-bit inline immediate following the family tag.
pub fn exec_push(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let i = vm.code_mut()?.load_uint(4)? as usize;
    let entry = vm.stack.top_at(i)?.clone();
    vm.stack.push(entry)
}

/// `POP s(i)`: pop the top of stack into slot `i`, overwriting what was
/// there (equivalent to `XCHG s(i)` followed by `DROP`).
pub fn exec_pop(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let i = vm.code_mut()?.load_uint(4)? as usize;
    if i == 0 {
        vm.stack.pop()?;
        return Ok(());
    }
    vm.stack.xchg(i)?;
    vm.stack.pop()?;
    Ok(())
}

/// `XCHG s(i)`: exchange the top of stack with slot `i`. `i` is a 4-bit
/// inline immediate.
pub fn exec_xchg(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let i = vm.code_mut()?.load_uint(4)? as usize;
    vm.stack.xchg(i)
}

/// Register the stack shuffle family: `NOP`/`SWAP`/`DUP`/`DROP` at their
/// named one-byte opcodes, carved out of the 4-bit `XCHG`/`PUSH`/`POP`
/// families they each specialize.
pub fn register(table: &mut crate::dispatch::DispatchTable) {
    table.register(0x2, 4, "PUSH", Rc::new(exec_push));
    table.register(0x3, 4, "POP", Rc::new(exec_pop));
    table.register(0x0, 4, "XCHG", Rc::new(exec_xchg));
    table.register(0x00, 8, "NOP", Rc::new(exec_nop));
    table.register(0x01, 8, "SWAP", Rc::new(exec_swap));
    table.register(0x20, 8, "DUP", Rc::new(exec_dup));
    table.register(0x30, 8, "DROP", Rc::new(exec_drop));
}
