//! The execution core: state, run loop, and per-opcode handlers.
//!
//! `VmState` holds run state; the instruction catalogue is split across
//! `flow`/`arith`/`stackops`/`cellops`/`contops`/`tupleops`/`intlit`, one
//! file per instruction family. The fetch-dispatch-execute loop itself is
//! grounded on `original_source/.../vm.cpp::run()`.

pub mod arith;
pub mod cellops;
pub mod contops;
pub mod flow;
pub mod intlit;
pub mod stackops;
pub mod tupleops;

use crate::cell::Cell;
use crate::consts::{DEFAULT_MAX_DATA_DEPTH, DEFAULT_MAX_STACK_DEPTH};
use crate::continuation::Continuation;
use crate::control_regs::ControlRegs;
use crate::dispatch::DispatchTable;
use crate::error::VmError;
use crate::gas::{GasConsumer, LoadedCells};
use crate::stack::{Stack, StackEntry};
use std::rc::Rc;

/// Resolves a library special cell's hash to the cell it stands for.
/// The library set is a host-supplied collaborator, not something this
/// core owns.
pub trait LibraryResolver {
    /// Look up a library cell by its content hash.
    fn resolve(&self, hash: &[u8; 32]) -> Option<Cell>;
}

/// A [`LibraryResolver`] that never resolves anything, for runs that don't
/// use library cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLibraries;

impl LibraryResolver for NoLibraries {
    fn resolve(&self, _hash: &[u8; 32]) -> Option<Cell> {
        None
    }
}

/// Tunables for one VM run, gathered into one config struct rather than
/// free-floating constants at each call site.
#[derive(Debug, Clone, Copy)]
pub struct VmConfig {
    /// Operand stack depth cap.
    pub max_stack_depth: usize,
    /// Commit depth cap for `c4`/`c5` on successful exit.
    pub max_data_depth: usize,
    /// Hard gas cap for the run.
    pub gas_max: i64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            max_data_depth: DEFAULT_MAX_DATA_DEPTH,
            gas_max: 1_000_000,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    /// Ran to completion (or hit an explicit `QUIT`) with this exit code.
    Success {
        /// 0 for a normal `RET` off the top continuation, or the
        /// explicit code passed to `QUIT`.
        exit_code: i32,
        /// The committed `c4`/`c5` pair, if `COMMIT` was ever executed.
        committed: Option<(Cell, Cell)>,
    },
    /// An exception propagated past `c2` with no handler left to catch it,
    /// carrying the original error so a bytecode-thrown raw number (see
    /// [`VmError::ThrownRaw`]) survives past the point where it went
    /// uncaught instead of being rounded into the nearest taxonomy member.
    Uncaught(VmError),
}

/// The full machine state for one run.
pub struct VmState {
    pub stack: Stack,
    pub regs: ControlRegs,
    pub gas: GasConsumer,
    pub loaded_cells: LoadedCells,
    pub cc: Rc<Continuation>,
    pub dispatch: Rc<DispatchTable>,
    pub libraries: Rc<dyn LibraryResolver>,
    pub max_data_depth: usize,
    pub committed: Option<(Cell, Cell)>,
    pub steps: u64,
    /// Set by [`Self::apply_jump`] when an opcode handler's own call to
    /// [`flow::jump`] reaches a `Quit`/`ExcQuit` continuation. `step()`
    /// checks this after every handler call, since a handler's `Result<(),
    /// VmError>` return has no room to carry `flow::JumpOutcome::Halt`
    /// itself.
    pub halt: Option<i32>,
}

impl VmState {
    /// Build a fresh run over `code`, with `c0..c2` set to quit
    /// continuations, `c3` and the current continuation both set to an
    /// ordinary continuation over `code`, `c4`/`c5` empty, `c6` null and
    /// `c7` an empty tuple — `original_source`'s `vm.cpp` initial state.
    pub fn new(
        code: crate::cell::Slice,
        dispatch: Rc<DispatchTable>,
        libraries: Rc<dyn LibraryResolver>,
        config: VmConfig,
    ) -> Self {
        let quit0 = Rc::new(Continuation::Quit { exit_code: 0 });
        let quit1 = Rc::new(Continuation::Quit { exit_code: 1 });
        let exc_quit = Rc::new(Continuation::ExcQuit);
        let entry = Rc::new(Continuation::ordinary(code));
        let regs = ControlRegs {
            c0: quit0,
            c1: quit1,
            c2: exc_quit,
            c3: entry.clone(),
            c4: Cell::empty(),
            c5: Cell::empty(),
            c6: StackEntry::Null,
            c7: Rc::new(vec![]),
        };
        Self {
            stack: Stack::with_max_depth(config.max_stack_depth),
            regs,
            gas: GasConsumer::new(config.gas_max),
            loaded_cells: LoadedCells::new(),
            cc: entry,
            dispatch,
            libraries,
            max_data_depth: config.max_data_depth,
            committed: None,
            steps: 0,
            halt: None,
        }
    }

    /// Record the outcome of a handler-initiated [`flow::jump`]. Call this
    /// with every `flow::jump` result an opcode handler produces.
    pub fn apply_jump(&mut self, outcome: flow::JumpOutcome) {
        if let flow::JumpOutcome::Halt(code) = outcome {
            self.halt = Some(code);
        }
    }

    /// Mutable access to the current continuation's code cursor, for
    /// opcode handlers that decode an inline immediate after the dispatch
    /// prefix (e.g. `PUSH i`'s index nibble). `step()` always leaves `cc`
    /// as a freshly-allocated `Ord` before invoking a handler, so this
    /// `Rc` is uniquely held and `make_mut` never clones.
    pub fn code_mut(&mut self) -> Result<&mut crate::cell::Slice, VmError> {
        match Rc::make_mut(&mut self.cc) {
            Continuation::Ord { code, .. } => Ok(code),
            _ => Err(VmError::Fatal),
        }
    }

    /// Run to completion: fetch-dispatch-execute until a `Quit`/`ExcQuit`
    /// continuation is reached or an uncaught exception halts the run.
    pub fn run(mut self) -> ExecOutcome {
        loop {
            match self.step() {
                Ok(Some(outcome)) => return outcome,
                Ok(None) => continue,
                Err(err) => match self.handle_error(err) {
                    Ok(()) => continue,
                    Err(outcome) => return outcome,
                },
            }
        }
    }

    /// Run one fetch-dispatch-execute cycle. `Ok(Some(outcome))` means the
    /// run just ended; `Ok(None)` means keep looping.
    fn step(&mut self) -> Result<Option<ExecOutcome>, VmError> {
        let Continuation::Ord { code, .. } = &*self.cc.clone() else {
            unreachable!("flow::jump always leaves cc as Ord before returning Continue")
        };
        let mut code = code.clone();
        self.steps += 1;

        if code.bits_remaining() == 0 {
            if code.refs_remaining() > 0 {
                self.gas.consume(crate::gas::GasUnit::ImplicitJmpRef)?;
                let next = code.load_ref()?;
                let next_cont = Rc::new(Continuation::ordinary(crate::cell::Slice::new(next)));
                return self.dispatch_jump(next_cont);
            }
            self.gas.consume(crate::gas::GasUnit::ImplicitRet)?;
            let ret = self.regs.c0.clone();
            return self.dispatch_jump(ret);
        }

        let peek_len = code.bits_remaining().min(crate::dispatch::OPCODE_SPACE_BITS as usize);
        let peek = code.preload_bits(peek_len)?;
        let window = bits_to_window(&peek);
        let (_, consumed, handler) = self.dispatch.dispatch(window)?;
        self.gas
            .consume(crate::gas::GasUnit::Instruction { opc_bits: consumed })?;
        code.skip_bits(consumed as usize)?;

        let rest = Rc::new(Continuation::Ord {
            code,
            cdata: Default::default(),
        });
        self.cc = rest;
        handler(self, consumed)?;
        if let Some(exit_code) = self.halt.take() {
            return Ok(Some(ExecOutcome::Success {
                exit_code,
                committed: self.committed.clone(),
            }));
        }
        Ok(None)
    }

    fn dispatch_jump(
        &mut self,
        cont: Rc<Continuation>,
    ) -> Result<Option<ExecOutcome>, VmError> {
        match flow::jump(self, cont)? {
            flow::JumpOutcome::Continue => Ok(None),
            flow::JumpOutcome::Halt(exit_code) => Ok(Some(ExecOutcome::Success {
                exit_code,
                committed: self.committed.clone(),
            })),
        }
    }

    fn handle_error(&mut self, err: VmError) -> Result<(), ExecOutcome> {
        if !err.is_recoverable() {
            return Err(ExecOutcome::Uncaught(err));
        }
        if matches!(&*self.regs.c2, Continuation::ExcQuit) {
            return Err(ExecOutcome::Uncaught(err));
        }
        let _ = self.gas.consume(crate::gas::GasUnit::Exception);
        let handler = self.regs.c2.clone();
        self.stack.clear();
        if self
            .stack
            .push(StackEntry::Int(crate::bigint::BigInt257::from_i64(
                err.number() as i64,
            )))
            .is_err()
        {
            return Err(ExecOutcome::Uncaught(err));
        }
        match flow::jump(self, handler) {
            Ok(flow::JumpOutcome::Continue) => Ok(()),
            Ok(flow::JumpOutcome::Halt(code)) => Err(ExecOutcome::Success {
                exit_code: code,
                committed: self.committed.clone(),
            }),
            Err(_) => Err(ExecOutcome::Uncaught(err)),
        }
    }
}

fn bits_to_window(bits: &[bool]) -> u32 {
    let mut v: u32 = 0;
    for &b in bits {
        v = (v << 1) | (b as u32);
    }
    v << (crate::dispatch::OPCODE_SPACE_BITS - bits.len() as u32)
}
