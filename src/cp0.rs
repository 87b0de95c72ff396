//! Wires every instruction family into one finalized [`DispatchTable`].
//!
//! Grounded on `original_source/.../cp0.cpp`: that file's whole job is
//! registering every opcode family into the codepage-0 table and
//! finalizing it; this is the same wiring step, minus the families
//! outside this core's opcode subset.

use crate::dispatch::DispatchTable;
use crate::interpreter::{arith, cellops, contops, intlit, stackops, tupleops};

/// Build and finalize the standard opcode table (what TON calls
/// "codepage 0"): every family this core implements, registered once.
pub fn build() -> DispatchTable {
    let mut table = DispatchTable::new();
    intlit::register(&mut table);
    arith::register(&mut table);
    stackops::register(&mut table);
    cellops::register(&mut table);
    contops::register(&mut table);
    tupleops::register(&mut table);
    table
        .finalize()
        .expect("codepage 0 opcode families must not overlap");
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_overlap() {
        let table = build();
        assert!(table.len() > 20);
    }
}
