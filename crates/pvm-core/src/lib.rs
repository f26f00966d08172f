//! Tagged value model, boxed representation, and lexical environment for a
//! binary-data interpreter VM.
//!
//! Mirrors the module layout of the teacher's `crates/runtime` (a `value`
//! module with the tagged representation, an `env` module for the call
//! stack) scaled down to the surface spec.md section 4 actually requires.

pub mod array;
pub mod boxed;
pub mod closure;
pub mod env;
pub mod error;
pub mod offset;
pub mod struct_value;
pub mod types;
pub mod value;
mod word;

pub use array::{ArrayData, ArrayElement};
pub use closure::{ClosureData, EntryPoint};
pub use env::Environment;
pub use error::{ExceptionCode, PvmError, ValueKind};
pub use offset::{units, OffsetData};
pub use struct_value::{StructData, StructField};
pub use types::{ArgType, ArrayBound, FieldType, TypeDesc};
pub use value::{Kind, Value};
