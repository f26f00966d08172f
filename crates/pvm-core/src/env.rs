//! Environment: nested lexical frames addressed by (back, over) pairs
//! (spec.md section 5).
//!
//! The frame stack itself (push/pop, (back, over) lookup) has no teacher
//! analogue — the teacher's closures are flat, fixed-arity captured arrays
//! with no enclosing call-frame stack to walk. `capture_innermost` below
//! is grounded on that piece of the teacher instead: `crates/runtime/src
//! /closures.rs`'s `patch_seq_create_env`/`patch_seq_env_set` build a
//! closure's captured environment as a plain `Vec<Value>` snapshot, which
//! is exactly what `capture_innermost` produces here for `ClosureData`.

use tracing::trace;

use crate::error::PvmError;
use crate::value::Value;

type Frame = Vec<Value>;

/// The VM's stack of lexical frames. Frame 0 (the bottom of `frames`) is
/// the top-level frame and can never be popped (spec.md section 5).
#[derive(Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::new()],
        }
    }

    pub fn is_toplevel(&self) -> bool {
        self.frames.len() == 1
    }

    /// Push a new lexical frame, reserving `hint` slots.
    pub fn push_frame(&mut self, hint: usize) {
        trace!(depth = self.frames.len(), hint, "push_frame");
        self.frames.push(Frame::with_capacity(hint));
    }

    /// Pop the innermost frame. Errs without effect if called at the
    /// top-level frame.
    pub fn pop_frame(&mut self) -> Result<(), PvmError> {
        if self.is_toplevel() {
            return Err(PvmError::PoppedTopLevelFrame);
        }
        self.frames.pop();
        Ok(())
    }

    /// Append a new variable to the innermost frame, returning its `over`
    /// index (position within that frame).
    pub fn register(&mut self, value: Value) -> usize {
        let frame = self.frames.last_mut().expect("at least one frame always present");
        frame.push(value);
        frame.len() - 1
    }

    /// Look up a variable `back` frames out (0 = innermost) at position
    /// `over` within that frame.
    pub fn lookup(&self, back: usize, over: usize) -> Option<Value> {
        let idx = self.frames.len().checked_sub(1)?.checked_sub(back)?;
        self.frames.get(idx)?.get(over).cloned()
    }

    /// Overwrite a variable `back` frames out at position `over`.
    pub fn set(&mut self, back: usize, over: usize, value: Value) -> Option<()> {
        let idx = self.frames.len().checked_sub(1)?.checked_sub(back)?;
        let slot = self.frames.get_mut(idx)?.get_mut(over)?;
        *slot = value;
        Some(())
    }

    /// Snapshot the innermost frame's current contents, for capturing into
    /// a closure.
    pub fn capture_innermost(&self) -> Vec<Value> {
        self.frames
            .last()
            .map(|f| f.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toplevel_frame_cannot_be_popped() {
        let mut env = Environment::new();
        assert!(env.is_toplevel());
        assert_eq!(env.pop_frame(), Err(PvmError::PoppedTopLevelFrame));
    }

    #[test]
    fn lookup_resolves_lexical_back_over() {
        let mut env = Environment::new();
        env.register(Value::make_int(1, 32).unwrap());
        env.push_frame(1);
        env.register(Value::make_int(2, 32).unwrap());

        assert_eq!(env.lookup(0, 0).unwrap().int_value(), Some(2));
        assert_eq!(env.lookup(1, 0).unwrap().int_value(), Some(1));
        assert!(env.lookup(2, 0).is_none());
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut env = Environment::new();
        env.register(Value::make_int(1, 32).unwrap());
        env.set(0, 0, Value::make_int(99, 32).unwrap()).unwrap();
        assert_eq!(env.lookup(0, 0).unwrap().int_value(), Some(99));
    }

    #[test]
    fn push_pop_round_trips() {
        let mut env = Environment::new();
        env.push_frame(0);
        assert!(!env.is_toplevel());
        env.pop_frame().unwrap();
        assert!(env.is_toplevel());
    }
}
