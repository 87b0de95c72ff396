//! Exception taxonomy and runtime error representation.

use core::fmt;

/// Exception kind exposed to bytecode, with its wire-visible exception
/// number.
///
/// <https://ton.org> `Excno` — numbers are load-bearing: they are pushed to
/// the stack on an unhandled exception and observed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
#[non_exhaustive]
pub enum Exception {
    /// Alternative exit, unused by the core.
    Alt = 1,
    /// Stack underflow.
    StackUnderflow = 2,
    /// Stack overflow or closure too big.
    StackOverflow = 3,
    /// Integer overflow or NaN encountered in a strict context.
    IntegerOverflow = 4,
    /// Value out of its declared range.
    RangeCheck = 5,
    /// No opcode matches the current prefix, or a truncated immediate.
    InvalidOpcode = 6,
    /// Type mismatch on a stack pop.
    TypeCheck = 7,
    /// Builder overflow or commit depth exceeded.
    CellOverflow = 8,
    /// Slice underflow or invalid special cell.
    CellUnderflow = 9,
    /// Dictionary structural failure.
    DictError = 10,
    /// Implementation-internal invariant broken.
    Fatal = 12,
    /// Gas exhausted.
    OutOfGas = 13,
    /// Virtualization rule violated (pruned branch touched).
    VirtError = 14,
}

impl Exception {
    /// The wire-visible exception number pushed to the stack on throw.
    pub const fn number(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Alt => "alternative exit",
            Self::StackUnderflow => "stack underflow",
            Self::StackOverflow => "stack overflow",
            Self::IntegerOverflow => "integer overflow",
            Self::RangeCheck => "range check error",
            Self::InvalidOpcode => "invalid opcode",
            Self::TypeCheck => "type check error",
            Self::CellOverflow => "cell overflow",
            Self::CellUnderflow => "cell underflow",
            Self::DictError => "dictionary error",
            Self::Fatal => "fatal error",
            Self::OutOfGas => "out of gas",
            Self::VirtError => "virtualization error",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for Exception {}

impl TryFrom<u16> for Exception {
    type Error = ();

    fn try_from(n: u16) -> Result<Self, Self::Error> {
        use Exception::*;
        Ok(match n {
            1 => Alt,
            2 => StackUnderflow,
            3 => StackOverflow,
            4 => IntegerOverflow,
            5 => RangeCheck,
            6 => InvalidOpcode,
            7 => TypeCheck,
            8 => CellOverflow,
            9 => CellUnderflow,
            10 => DictError,
            12 => Fatal,
            13 => OutOfGas,
            14 => VirtError,
            _ => return Err(()),
        })
    }
}

/// Runtime error description that either carries a catchable bytecode
/// exception, or must halt the execution outright.
///
/// Splits recoverable from halting failures: a `Thrown` exception unwinds
/// into `c2` via `throw_exception`; `NoGas` and `Fatal` are never
/// recoverable and stop the run loop immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// A catchable exception drawn from the VM's own taxonomy (stack
    /// underflow, type check, and so on).
    #[error("{0}")]
    Thrown(Exception),
    /// A catchable exception thrown directly by bytecode (`THROW`/
    /// `THROWIF`), carrying its wire number verbatim. Bytecode can throw
    /// any number in `0..=65535`; the VM's own taxonomy is just the subset
    /// of numbers the core itself ever raises, not a restriction on what
    /// a program may throw.
    #[error("uncaught exception {0}")]
    ThrownRaw(u16),
    /// Gas exhausted; not recoverable.
    #[error("out of gas")]
    NoGas,
    /// Implementation-internal invariant broken; not recoverable.
    #[error("fatal vm error")]
    Fatal,
}

impl VmError {
    /// True if this error can be handled by jumping to `c2`.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Thrown(_) | Self::ThrownRaw(_))
    }

    /// The wire-visible exception number this error carries — what
    /// `throw_exception` pushes to the stack ahead of jumping to `c2`.
    pub const fn number(&self) -> u16 {
        match self {
            Self::Thrown(e) => e.number(),
            Self::ThrownRaw(n) => *n,
            Self::NoGas => Exception::OutOfGas.number(),
            Self::Fatal => Exception::Fatal.number(),
        }
    }

    /// The taxonomy exception this error maps onto, for errors that are
    /// always inside it. Falls back to [`Exception::RangeCheck`] for a
    /// `ThrownRaw` number outside the taxonomy — only used where a
    /// concrete `Exception` is unavoidable (e.g. summarizing an uncaught
    /// raw throw); prefer [`Self::number`] wherever the raw wire number
    /// itself is what's needed.
    pub fn exception(&self) -> Exception {
        match self {
            Self::Thrown(e) => *e,
            Self::ThrownRaw(n) => Exception::try_from(*n).unwrap_or(Exception::RangeCheck),
            Self::NoGas => Exception::OutOfGas,
            Self::Fatal => Exception::Fatal,
        }
    }
}

impl From<Exception> for VmError {
    fn from(e: Exception) -> Self {
        Self::Thrown(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn exception_number_round_trips() {
        for e in Exception::iter() {
            assert_eq!(Exception::try_from(e.number()), Ok(e));
        }
    }

    #[test]
    fn unknown_number_is_rejected() {
        assert_eq!(Exception::try_from(11), Err(()));
        assert_eq!(Exception::try_from(0), Err(()));
    }
}
