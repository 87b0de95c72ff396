//! Gas accounting.
//!
//! Tracks three values: `max` (hard cap), `limit` (current ceiling) and
//! `credit` (overdraft taken against a future refill). `GasUnit` keeps a
//! price/cost split so individual charges stay self-describing instead of
//! bare integers.

use crate::consts::*;
use crate::error::{Exception, VmError};

/// A priced unit of gas consumption.
///
/// Each variant names *what* was charged; `cost()`/`unit_price()` look its
/// price up once here instead of repeating it at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasUnit {
    /// Base dispatch cost for one instruction, parametrized by the number
    /// of opcode bits it consumes (`10 + opc_bits`).
    Instruction {
        /// Bits of opcode prefix consumed by the dispatched instruction.
        opc_bits: u32,
    },
    /// Loading a cell for the first time this run.
    CellLoad,
    /// Reloading a cell already charged this run.
    CellReload,
    /// Finalizing a builder into a cell.
    CellCreate,
    /// Throwing an exception.
    Exception,
    /// Implicit `JMPREF` at the end of a code slice.
    ImplicitJmpRef,
    /// Implicit `RET` at the end of a code slice.
    ImplicitRet,
    /// Touching `n` tuple entries.
    TupleEntries(u32),
    /// Touching `n` stack entries (e.g. moved across a call/jump boundary).
    StackEntries(u32),
}

impl GasUnit {
    /// Price of this unit, in gas.
    pub const fn cost(self) -> i64 {
        match self {
            Self::Instruction { opc_bits } => GAS_INSTRUCTION_BASE + opc_bits as i64,
            Self::CellLoad => GAS_CELL_LOAD,
            Self::CellReload => GAS_CELL_RELOAD,
            Self::CellCreate => GAS_CELL_CREATE,
            Self::Exception => GAS_EXCEPTION,
            Self::ImplicitJmpRef => GAS_IMPLICIT_JMPREF,
            Self::ImplicitRet => GAS_IMPLICIT_RET,
            Self::TupleEntries(n) => GAS_TUPLE_ENTRY * n as i64,
            Self::StackEntries(n) => GAS_STACK_ENTRY * n as i64,
        }
    }
}

/// Gas limits and consumption counters for one VM run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasConsumer {
    /// Hard cap; never raised once the run starts.
    max: i64,
    /// Current ceiling; consumption may not push `consumed` past this plus
    /// whatever `credit` is outstanding.
    limit: i64,
    /// Overdraft accumulated by charges that pushed the balance negative;
    /// becomes chargeable again the next time limits are reset.
    credit: i64,
    /// Total gas consumed so far this run.
    consumed: i64,
}

impl GasConsumer {
    /// Build a fresh gas consumer with `limit == max` and no credit used.
    pub const fn new(max: i64) -> Self {
        Self {
            max,
            limit: max,
            credit: 0,
            consumed: 0,
        }
    }

    /// Gas consumed so far.
    pub const fn consumed(&self) -> i64 {
        self.consumed
    }

    /// The hard cap.
    pub const fn max(&self) -> i64 {
        self.max
    }

    /// Gas remaining before the next charge would throw.
    pub const fn remaining(&self) -> i64 {
        self.limit - self.consumed
    }

    /// Raise the ceiling and clear outstanding credit, as a host does
    /// between metered batches.
    pub fn set_limit(&mut self, limit: i64) {
        self.limit = limit;
        self.credit = 0;
    }

    /// Debit `unit`'s cost, throwing [`VmError::NoGas`] if the balance would
    /// drop below zero.
    pub fn consume(&mut self, unit: GasUnit) -> Result<(), VmError> {
        self.consume_chk(unit.cost())
    }

    /// Debit a raw amount of gas, throwing [`VmError::NoGas`] if the balance
    /// would drop below zero.
    pub fn consume_chk(&mut self, amount: i64) -> Result<(), VmError> {
        self.consumed += amount;
        if self.remaining() < 0 {
            self.credit -= self.remaining();
            return Err(VmError::from(Exception::OutOfGas));
        }
        Ok(())
    }
}

/// Tracks which cell hashes have already been charged the full load price
/// this run, so repeated loads are charged the cheaper reload price.
///
/// Determinism requires this set's iteration order never leak into
/// results, so it's only ever probed by hash membership.
#[derive(Debug, Clone, Default)]
pub struct LoadedCells(std::collections::HashSet<[u8; 32]>);

impl LoadedCells {
    /// Empty set, as at the start of a run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a load of `hash`, returning the [`GasUnit`] to charge for
    /// it: [`GasUnit::CellLoad`] the first time, [`GasUnit::CellReload`]
    /// thereafter.
    pub fn charge_for(&mut self, hash: [u8; 32]) -> GasUnit {
        if self.0.insert(hash) {
            GasUnit::CellLoad
        } else {
            GasUnit::CellReload
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_within_limit_succeeds() {
        let mut g = GasConsumer::new(1000);
        g.consume(GasUnit::Instruction { opc_bits: 8 }).unwrap();
        assert_eq!(g.consumed(), 18);
        assert_eq!(g.remaining(), 982);
    }

    #[test]
    fn overdraft_throws_out_of_gas() {
        let mut g = GasConsumer::new(5);
        let err = g.consume(GasUnit::CellLoad).unwrap_err();
        assert_eq!(err, VmError::from(Exception::OutOfGas));
    }

    #[test]
    fn loaded_cells_charge_reload_on_second_touch() {
        let mut cells = LoadedCells::new();
        let h = [7u8; 32];
        assert_eq!(cells.charge_for(h), GasUnit::CellLoad);
        assert_eq!(cells.charge_for(h), GasUnit::CellReload);
        assert_eq!(cells.charge_for([8u8; 32]), GasUnit::CellLoad);
    }

    #[test]
    fn gas_monotone_across_steps() {
        let mut g = GasConsumer::new(1000);
        let before = g.consumed();
        g.consume(GasUnit::Instruction { opc_bits: 4 }).unwrap();
        assert!(g.consumed() >= before);
    }
}
