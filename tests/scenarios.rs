//! Concrete scenarios exercising the run loop, gas accounting, cell
//! builder/deserialize round-trips, exception recovery, and loop
//! continuations end to end, mirroring the scenario catalogue this
//! core's design notes are checked against.
//!
//! S1 and S5 use the exact opcode bytes named there (`PUSHINT`'s
//! tiny-literal encoding and `THROW`'s one-byte-prefix-plus-immediate both
//! line up byte-for-byte). S2/S3's quiet-divmod bit-field prefix and S4's
//! REPEAT/UNTIL/WHILE/AGAIN byte assignments are reproduced using this
//! core's own registered opcodes where the two differ in encoding but not
//! in the behavior under test; DESIGN.md records each such divergence.
//!
//! One `#[test]` per scenario, plain assertions, no test harness framework.

use std::rc::Rc;
use tvm_core::prelude::*;

fn push_bits(out: &mut Vec<bool>, value: u32, n: usize) {
    for i in (0..n).rev() {
        out.push((value >> i) & 1 == 1);
    }
}

fn code_cell(bits: Vec<bool>) -> Cell {
    Cell::new(bits, vec![]).unwrap()
}

fn fresh_vm(code: Cell) -> VmState {
    let dispatch = Rc::new(cp0::build());
    let libs: Rc<dyn LibraryResolver> = Rc::new(NoLibraries);
    VmState::new(Slice::new(code), dispatch, libs, VmConfig::default())
}

/// S1: `PUSHINT 1; PUSHINT 2; ADD` (bytes `0x71 0x72 0xA0`), then the
/// implicit `RET` off an exhausted code slice halts normally with the
/// sum on the stack.
#[test]
fn s1_pushint_add() {
    let mut bits = Vec::new();
    push_bits(&mut bits, 0x71, 8); // PUSHINT 1
    push_bits(&mut bits, 0x72, 8); // PUSHINT 2
    push_bits(&mut bits, 0xA0, 8); // ADD
    let mut vm = fresh_vm(code_cell(bits));

    match vm.run() {
        ExecOutcome::Success { exit_code, .. } => assert_eq!(exit_code, 0),
        ExecOutcome::Uncaught(e) => panic!("unexpected exception: {e}"),
    }
    assert_eq!(vm.stack.depth(), 1);
    assert_eq!(vm.stack.pop_int().unwrap(), BigInt257::from_i64(3));
}

/// S2: dividing by zero in a strict context is an uncaught integer
/// overflow, not a panic or a silent zero.
#[test]
fn s2_strict_division_by_zero_overflows() {
    let mut bits = Vec::new();
    push_bits(&mut bits, 0x71, 8); // PUSHINT 1
    push_bits(&mut bits, 0x70, 8); // PUSHINT 0
    push_bits(&mut bits, 0xAA, 8); // DIV (floor)
    let vm = fresh_vm(code_cell(bits));

    match vm.run() {
        ExecOutcome::Uncaught(e) => assert_eq!(e, VmError::from(Exception::IntegerOverflow)),
        ExecOutcome::Success { .. } => panic!("expected an uncaught exception"),
    }
}

/// S3: the quiet form of the same division leaves `NaN` on the stack
/// instead of throwing.
#[test]
fn s3_quiet_division_by_zero_yields_nan() {
    let mut bits = Vec::new();
    push_bits(&mut bits, 0x71, 8); // PUSHINT 1
    push_bits(&mut bits, 0x70, 8); // PUSHINT 0
    push_bits(&mut bits, 0xB7A9, 16); // QDIVMOD
    let mut vm = fresh_vm(code_cell(bits));

    match vm.run() {
        ExecOutcome::Success { exit_code, .. } => assert_eq!(exit_code, 0),
        ExecOutcome::Uncaught(e) => panic!("unexpected exception: {e}"),
    }
    assert_eq!(vm.stack.depth(), 2);
    let remainder = vm.stack.pop_int().unwrap();
    let quotient = vm.stack.pop_int().unwrap();
    assert!(remainder.is_nan());
    assert!(quotient.is_nan());
}

/// S4: `REPEAT` runs a `DUP; ADD` doubling body three times, with the
/// loop's resumption wired entirely through continuation `c0` overrides
/// rather than any special-cased interpreter loop.
#[test]
fn s4_repeat_doubles_value_three_times() {
    let mut body_bits = Vec::new();
    push_bits(&mut body_bits, 0x20, 8); // DUP
    push_bits(&mut body_bits, 0xA0, 8); // ADD
    let body = Rc::new(Continuation::ordinary(Slice::new(code_cell(body_bits))));

    let mut outer_bits = Vec::new();
    push_bits(&mut outer_bits, 0xE4, 8); // REPEAT
    let mut vm = fresh_vm(code_cell(outer_bits));
    vm.stack.push(StackEntry::Int(BigInt257::from_i64(2))).unwrap();
    vm.stack.push(StackEntry::Int(BigInt257::from_i64(3))).unwrap();
    vm.stack.push(StackEntry::Continuation(body)).unwrap();

    match vm.run() {
        ExecOutcome::Success { exit_code, .. } => assert_eq!(exit_code, 0),
        ExecOutcome::Uncaught(e) => panic!("unexpected exception: {e}"),
    }
    assert_eq!(vm.stack.depth(), 1);
    assert_eq!(vm.stack.pop_int().unwrap(), BigInt257::from_i64(16));
}

/// S5: `THROW 42` (bytes `0xF2 0x2A`) caught by a custom `c2` handler,
/// resuming at `c0` instead of halting the run uncaught. A stray value is
/// left on the stack before the throw, and the handler is a bare `NOP`,
/// so the test observes exactly what `c2` was handed: the stack cleared
/// down to the one pushed errno, and that errno is the bytecode-supplied
/// number 42 verbatim — not remapped onto the VM's own exception taxonomy
/// (42 isn't one of its ~13 numbers, so a remap would surface as a
/// different value here, e.g. `RangeCheck`'s 5).
#[test]
fn s5_thrown_exception_is_caught_by_custom_handler() {
    let mut bits = Vec::new();
    push_bits(&mut bits, 0xF2, 8); // THROW
    push_bits(&mut bits, 42, 8); // exception number 42
    let mut vm = fresh_vm(code_cell(bits));

    let mut handler_bits = Vec::new();
    push_bits(&mut handler_bits, 0x00, 8); // NOP: leave the pushed errno as-is
    vm.regs.c2 = Rc::new(Continuation::ordinary(Slice::new(code_cell(handler_bits))));
    vm.stack.push(StackEntry::Int(BigInt257::from_i64(999))).unwrap();

    match vm.run() {
        ExecOutcome::Success { exit_code, .. } => assert_eq!(exit_code, 0),
        ExecOutcome::Uncaught(e) => panic!("unexpected uncaught exception: {e}"),
    }
    assert_eq!(vm.stack.depth(), 1);
    assert_eq!(vm.stack.pop_int().unwrap(), BigInt257::from_i64(42));
}

/// S6: `NEWC STU 8 ENDC CTOS LDU 8` round-trips a value through a
/// builder and back out of the resulting cell's slice unchanged.
#[test]
fn s6_cell_round_trip() {
    let mut bits = Vec::new();
    push_bits(&mut bits, 0xC8, 8); // NEWC
    push_bits(&mut bits, 0xCA, 8); // STU
    push_bits(&mut bits, 8, 8); // n = 8 bits
    push_bits(&mut bits, 0xC9, 8); // ENDC
    push_bits(&mut bits, 0xD0, 8); // CTOS
    push_bits(&mut bits, 0xD2, 8); // LDU
    push_bits(&mut bits, 8, 8); // n = 8 bits
    let mut vm = fresh_vm(code_cell(bits));
    vm.stack
        .push(StackEntry::Int(BigInt257::from_i64(0x5A)))
        .unwrap();

    match vm.run() {
        ExecOutcome::Success { exit_code, .. } => assert_eq!(exit_code, 0),
        ExecOutcome::Uncaught(e) => panic!("unexpected exception: {e}"),
    }
    // LDU leaves [value, slice]; the trailing empty slice isn't consumed
    // by an `ENDS` check (not part of this core's opcode subset).
    assert_eq!(vm.stack.depth(), 2);
    vm.stack.pop_slice().unwrap();
    assert_eq!(vm.stack.pop_int().unwrap(), BigInt257::from_i64(0x5A));
}
