//! VM-wide limits and fixed gas prices.

/// Maximum number of data bits a cell may hold.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of child references a cell may hold.
pub const MAX_CELL_REFS: usize = 4;

/// Default maximum operand stack depth.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 1 << 12;

/// Default maximum commit depth for `c4`/`c5` on successful exit.
pub const DEFAULT_MAX_DATA_DEPTH: usize = 512;

/// Maximum recursion depth when resolving a library special cell.
pub const MAX_LIBRARY_RESOLUTION_DEPTH: usize = 8;

/// Number of control registers (`c0..c7`).
pub const CONTROL_REGISTER_COUNT: usize = 8;

/// Gas price for a fresh cell load (first time a given hash is seen this run).
pub const GAS_CELL_LOAD: i64 = 100;

/// Gas price for reloading a cell whose hash was already charged this run.
pub const GAS_CELL_RELOAD: i64 = 25;

/// Gas price for finalizing a builder into a new cell.
pub const GAS_CELL_CREATE: i64 = 500;

/// Gas price charged by `throw_exception`.
pub const GAS_EXCEPTION: i64 = 50;

/// Gas price for an implicit `JMPREF` taken at the end of a code slice.
pub const GAS_IMPLICIT_JMPREF: i64 = 10;

/// Gas price for an implicit `RET` taken at the end of a code slice.
pub const GAS_IMPLICIT_RET: i64 = 5;

/// Gas price per tuple entry touched.
pub const GAS_TUPLE_ENTRY: i64 = 1;

/// Gas price per stack entry touched (e.g. moved between stacks on call/jump).
pub const GAS_STACK_ENTRY: i64 = 1;

/// Fixed per-instruction gas base, added to `opc_bits` on every dispatch.
pub const GAS_INSTRUCTION_BASE: i64 = 10;
