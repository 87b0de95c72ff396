//! Integer-literal push opcodes.
//!
//! Grounded on `original_source/.../arithops.cpp`'s
//! `register_int_const_ops`: a 4-bit tiny-literal family folded into the
//! 8-bit opcode, plus wider fixed-width immediates read out of the code
//! stream after the prefix. The variable-length `0x82xx` form and the
//! `PUSHPOW2`/`PUSHNAN` family from the same table aren't part of this
//! core's mandatory opcode subset and are left out.

use super::VmState;
use crate::bigint::BigInt257;
use crate::error::VmError;
use crate::stack::StackEntry;
use std::rc::Rc;

/// `PUSHINT x` for `x` in `-5..=10`, folded one-per-byte into `0x70..0x7F`
/// the way the original's `exec_push_tinyint4` unpacks its 4-bit suffix.
fn exec_pushint_tiny(value: i64) -> impl Fn(&mut VmState, u32) -> Result<(), VmError> {
    move |vm: &mut VmState, _bits: u32| vm.stack.push(StackEntry::Int(BigInt257::from_i64(value)))
}

/// `PUSHINT x`: an 8-bit signed immediate following the prefix.
pub fn exec_pushint8(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let bits = vm.code_mut()?.load_bits(8)?;
    let value = BigInt257::from_bits_be(&bits, true);
    vm.stack.push(StackEntry::Int(value))
}

/// `PUSHINT x`: a 16-bit signed immediate following the prefix.
pub fn exec_pushint16(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let bits = vm.code_mut()?.load_bits(16)?;
    let value = BigInt257::from_bits_be(&bits, true);
    vm.stack.push(StackEntry::Int(value))
}

/// Register the tiny-literal family (one entry per byte `0x70..0x7F`) and
/// the 8-bit/16-bit immediate forms.
pub fn register(table: &mut crate::dispatch::DispatchTable) {
    for suffix in 0u32..16 {
        let value = ((suffix as i64 + 5) & 15) - 5;
        table.register(
            0x70 | suffix,
            8,
            "PUSHINT",
            Rc::new(exec_pushint_tiny(value)),
        );
    }
    table.register(0x80, 8, "PUSHINT", Rc::new(exec_pushint8));
    table.register(0x81, 8, "PUSHINT", Rc::new(exec_pushint16));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Slice};
    use crate::interpreter::{LibraryResolver, NoLibraries, VmConfig};

    fn vm_over(bits: Vec<bool>) -> VmState {
        let mut table = crate::dispatch::DispatchTable::new();
        register(&mut table);
        table.finalize().unwrap();
        let dispatch = Rc::new(table);
        let libs: Rc<dyn LibraryResolver> = Rc::new(NoLibraries);
        VmState::new(
            Slice::new(Cell::new(bits, vec![]).unwrap()),
            dispatch,
            libs,
            VmConfig::default(),
        )
    }

    fn byte_bits(byte: u8) -> Vec<bool> {
        (0..8).map(|i| (byte >> (7 - i)) & 1 == 1).collect()
    }

    #[test]
    fn tiny_literal_decodes_small_positive() {
        let mut vm = vm_over(byte_bits(0x72));
        let (_, _, handler) = vm.dispatch.dispatch(0x72 << 16).unwrap();
        handler(&mut vm, 8).unwrap();
        assert_eq!(vm.stack.pop_int().unwrap(), BigInt257::from_i64(2));
    }

    #[test]
    fn tiny_literal_decodes_negative() {
        let mut vm = vm_over(byte_bits(0x7F));
        let (_, _, handler) = vm.dispatch.dispatch(0x7F << 16).unwrap();
        handler(&mut vm, 8).unwrap();
        assert_eq!(vm.stack.pop_int().unwrap(), BigInt257::from_i64(-1));
    }
}
