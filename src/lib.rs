//! A stack-based, content-addressed, gas-metered execution core.
//!
//! Module layout: one file per component, a `prelude` re-exporting the
//! public surface, and `interpreter/` holding the run loop plus one file
//! per opcode family.

pub mod bigint;
pub mod cell;
pub mod consts;
pub mod continuation;
pub mod control_regs;
pub mod cp0;
pub mod dispatch;
pub mod error;
pub mod gas;
pub mod interpreter;
pub mod stack;

pub mod prelude {
    pub use crate::bigint::{BigInt257, Rounding};
    pub use crate::cell::{Builder, Cell, SpecialKind, Slice};
    pub use crate::continuation::{Continuation, ControlData};
    pub use crate::control_regs::{ControlRegs, ControlRegsPatch, RegMask};
    pub use crate::cp0;
    pub use crate::dispatch::DispatchTable;
    pub use crate::error::{Exception, VmError};
    pub use crate::gas::{GasConsumer, GasUnit, LoadedCells};
    pub use crate::interpreter::{ExecOutcome, LibraryResolver, NoLibraries, VmConfig, VmState};
    pub use crate::stack::{Stack, StackEntry};
}
