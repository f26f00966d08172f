//! Value-layer errors and the stable VM/language exception ABI.
//!
//! `PvmError` covers the handful of failures the value-encoding API itself
//! can report (spec.md section 4.1); resource/allocation failures are
//! explicitly out of scope per section 7 ("allocation failures abort the
//! process; the value and environment APIs do not surface them").

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PvmError {
    #[error("invalid width {width} for {kind}")]
    InvalidWidth { kind: ValueKind, width: u16 },

    #[error("popped the top-level environment frame")]
    PoppedTopLevelFrame,

    #[error("invalid offset: {reason}")]
    InvalidOffset { reason: &'static str },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValueKind {
    Int,
    UInt,
    Long,
    ULong,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Int => "Int",
            ValueKind::UInt => "UInt",
            ValueKind::Long => "Long",
            ValueKind::ULong => "ULong",
        };
        write!(f, "{}", s)
    }
}

/// Stable exception numbers shared between the VM and the language's
/// standard library (spec.md section 6). Kept as a plain enum (rather than
/// folded into `PvmError`) because downstream code matches on the numeric
/// ABI directly.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExceptionCode {
    Generic = 0,
    DivisionByZero = 1,
    NoIos = 2,
    NoReturn = 3,
    OutOfBounds = 4,
    MapOutOfBounds = 5,
    Eof = 6,
    NoMap = 7,
    ConversionError = 8,
    InvalidElement = 9,
    ConstraintViolation = 10,
    GenericIo = 11,
    Signal = 12,
    InvalidIoFlags = 13,
    InvalidArgument = 14,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_codes_match_stable_abi() {
        assert_eq!(ExceptionCode::Generic as u8, 0);
        assert_eq!(ExceptionCode::DivisionByZero as u8, 1);
        assert_eq!(ExceptionCode::InvalidArgument as u8, 14);
    }
}
