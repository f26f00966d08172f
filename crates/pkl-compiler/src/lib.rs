//! Type inference, type checking, and completeness analysis for a
//! binary-data description language (spec.md sections 1-4).
//!
//! Two independent passes, run in sequence by [`check`]: the Type
//! Inference Pass ([`typecheck`]) annotates every expression with its
//! `pvm_core::TypeDesc` and is the only pass that can report a user-facing
//! type error; the Completeness Pass ([`completeness`]) only runs if the
//! first reported zero errors, and annotates every type node with its
//! completeness flag plus the one rule that belongs to it alone
//! (sized arrays in argument position).

pub mod ast;
pub mod completeness;
pub mod diagnostics;
pub mod error;
pub mod typecheck;

use ast::Program;
use diagnostics::DiagnosticSink;

/// Runs both passes over `program`, reporting diagnostics to `sink`.
/// Returns the total error count; zero means the program is ready for
/// code generation.
pub fn check(program: &Program, sink: &mut dyn DiagnosticSink) -> usize {
    let mut tc = typecheck::TypeChecker::new(sink);
    if tc.check_program(program).is_err() {
        return tc.error_count();
    }
    let errors_after_phase1 = tc.error_count();
    drop(tc);

    let mut cc = completeness::CompletenessChecker::new(sink);
    let _ = cc.check_program(program);
    errors_after_phase1 + cc.error_count()
}
