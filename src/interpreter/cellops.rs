//! Cell builder/deserialize opcode handlers, plus the shared cell-load
//! path every deserializing opcode routes through.
//!
//! Grounded on `original_source/.../cellops.cpp`: `load_cell_slice`'s
//! special-cell handling (library forwarding, pruned-branch
//! virtualization check) mirrors `cellops.cpp`'s `load_cell`; builder
//! opcodes (`NEWC`/`STU`/`ENDC`/`STREF`) and slice opcodes
//! (`CTOS`/`LDU`/`LDREF`) are the subset of that file's primitives needed
//! to build and walk cells end to end.

use super::VmState;
use crate::cell::{Builder, Cell, SpecialKind, Slice};
use crate::consts::MAX_LIBRARY_RESOLUTION_DEPTH;
use crate::error::{Exception, VmError};
use crate::gas::GasUnit;
use crate::stack::StackEntry;
use std::rc::Rc;

/// Turn `cell` into a slice over its own data, charging the appropriate
/// load/reload gas and transparently following library cells. Merkle
/// proof/update cells and virtualized pruned branches are out of scope
/// and throw rather than unwrap.
pub fn load_cell_slice(vm: &mut VmState, cell: &Cell) -> Result<Slice, VmError> {
    load_cell_slice_depth(vm, cell, 0)
}

fn load_cell_slice_depth(vm: &mut VmState, cell: &Cell, depth: usize) -> Result<Slice, VmError> {
    let unit = vm.loaded_cells.charge_for(cell.hash());
    vm.gas.consume(unit)?;
    match cell.special_kind() {
        None => Ok(Slice::new(cell.clone())),
        Some(SpecialKind::Library) => {
            if depth >= MAX_LIBRARY_RESOLUTION_DEPTH {
                return Err(VmError::Fatal);
            }
            let hash = cell
                .library_hash()
                .ok_or_else(|| VmError::from(Exception::CellUnderflow))?;
            let resolved = vm
                .libraries
                .resolve(&hash)
                .ok_or_else(|| VmError::from(Exception::CellUnderflow))?;
            load_cell_slice_depth(vm, &resolved, depth + 1)
        }
        Some(SpecialKind::PrunedBranch { virtualization }) if virtualization > 0 => {
            Err(VmError::from(Exception::VirtError))
        }
        Some(_) => Err(VmError::from(Exception::CellUnderflow)),
    }
}

/// `NEWC`: push a fresh, empty builder.
pub fn exec_newc(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    vm.stack.push(StackEntry::Builder(Builder::new()))
}

/// `ENDC`: pop a builder, finalize it into a cell, push the cell.
pub fn exec_endc(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let builder = vm.stack.pop_builder()?;
    vm.gas.consume(GasUnit::CellCreate)?;
    let cell = builder
        .finalize()
        .map_err(|_| VmError::from(Exception::CellOverflow))?;
    vm.stack.push(StackEntry::Cell(cell))
}

/// `STU n`: pop a builder then a value; store the value's `n`-bit
/// unsigned big-endian representation, push the builder back.
pub fn exec_stu(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(8)? as usize;
    let mut builder = vm.stack.pop_builder()?;
    let value = vm.stack.pop_int_finite()?;
    if !value.unsigned_fits_bits(n as u32) {
        return Err(VmError::from(Exception::RangeCheck));
    }
    builder.store_bits(&value.to_bits_be(n))?;
    vm.stack.push(StackEntry::Builder(builder))
}

/// `STREF`: pop a builder then a cell; append the cell as a reference,
/// push the builder back.
pub fn exec_stref(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let mut builder = vm.stack.pop_builder()?;
    let cell = vm.stack.pop_cell()?;
    builder.store_ref(cell)?;
    vm.stack.push(StackEntry::Builder(builder))
}

/// `CTOS`: pop a cell, push a slice over it.
pub fn exec_ctos(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let cell = vm.stack.pop_cell()?;
    let slice = load_cell_slice(vm, &cell)?;
    vm.stack.push(StackEntry::Slice(slice))
}

/// `LDU n`: pop a slice, read its next `n` bits as an unsigned integer,
/// push the value then the advanced slice.
pub fn exec_ldu(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let n = vm.code_mut()?.load_uint(8)? as usize;
    let mut slice = vm.stack.pop_slice()?;
    let bits = slice.load_bits(n)?;
    let value = crate::bigint::BigInt257::from_bits_be(&bits, false);
    vm.stack.push(StackEntry::Int(value))?;
    vm.stack.push(StackEntry::Slice(slice))
}

/// `LDREF`: pop a slice, take its next reference, push the remaining
/// slice then the reference cell.
pub fn exec_ldref(vm: &mut VmState, _bits: u32) -> Result<(), VmError> {
    let mut slice = vm.stack.pop_slice()?;
    let r = slice.load_ref()?;
    vm.stack.push(StackEntry::Slice(slice))?;
    vm.stack.push(StackEntry::Cell(r))
}

/// Register the cell builder/deserialize family.
pub fn register(table: &mut crate::dispatch::DispatchTable) {
    table.register(0xC8, 8, "NEWC", Rc::new(exec_newc));
    table.register(0xC9, 8, "ENDC", Rc::new(exec_endc));
    table.register(0xCA, 8, "STU", Rc::new(exec_stu));
    table.register(0xCB, 8, "STREF", Rc::new(exec_stref));
    table.register(0xD0, 8, "CTOS", Rc::new(exec_ctos));
    table.register(0xD2, 8, "LDU", Rc::new(exec_ldu));
    table.register(0xD3, 8, "LDREF", Rc::new(exec_ldref));
}
