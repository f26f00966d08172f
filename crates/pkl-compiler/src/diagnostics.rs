//! Diagnostic surface: the seam for the external formatter/pretty-printer
//! (spec.md section 6 — "Diagnostics out").
//!
//! The type and completeness passes never format messages for a terminal
//! or an LSP client directly; they hand `(severity, location, message)`
//! triples to a `DiagnosticSink` and let the caller decide how to render
//! them, the same separation the teacher draws between `seq-compiler`
//! (which raises `String` errors) and `seq-lsp` (which turns them into
//! `lsp_types::Diagnostic`s).

use crate::ast::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    InternalCompilerError,
}

pub trait DiagnosticSink {
    fn report(&mut self, severity: Severity, loc: SourceLocation, message: String);
}

/// An in-memory sink, primarily for tests and for callers that want to
/// collect every diagnostic before deciding how to render them.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<(Severity, SourceLocation, String)>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, severity: Severity, loc: SourceLocation, message: String) {
        self.diagnostics.push((severity, loc, message));
    }
}
