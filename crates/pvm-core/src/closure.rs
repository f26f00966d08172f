//! Closure values: a reference to a compiled program, an entry point, and a
//! captured environment (spec.md section 3.1).
//!
//! The compiled program itself (bytecode, entry point addressing) is the
//! bytecode emitter's concern, out of scope here (spec.md section 1); this
//! crate only needs an opaque handle plus the captured environment slice,
//! mirroring the shape of `Value::Closure { fn_ptr, env }` in the teacher's
//! `crates/runtime/src/value.rs` (there using `Arc` for a multi-threaded
//! VM; here `Rc`, since spec.md section 5 specifies a single-threaded VM).

use std::rc::Rc;

use crate::types::TypeDesc;
use crate::value::Value;

/// Opaque reference to a compiled program entry point, supplied by the
/// (external) bytecode emitter/jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint(pub usize);

#[derive(Debug)]
pub struct ClosureData {
    pub entry: EntryPoint,
    /// Captured values from the creation-site environment, ordered
    /// top-down (index 0 was the top of stack at creation).
    pub captured: Rc<[Value]>,
    /// The closure's own type, recorded at creation since nothing else at
    /// runtime can reconstruct an argument/return signature from `entry`
    /// and `captured` alone.
    pub ty: Rc<TypeDesc>,
}

impl PartialEq for ClosureData {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry && Rc::ptr_eq(&self.captured, &other.captured)
    }
}
