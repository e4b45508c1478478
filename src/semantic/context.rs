use super::symtab::GLOBAL_SCOPE;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use tracing::debug;

/// State shared by the resolver and the type checker for one compilation.
#[derive(Debug)]
pub struct AnalysisContext {
    /// Function whose body is being visited, or the global scope
    pub scope: String,
    /// Next memory-location ordinal; one counter for the whole program
    pub next_location: usize,
    pub main_seen: bool,
    pub had_error: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self {
            scope: GLOBAL_SCOPE.to_string(),
            next_location: 0,
            main_seen: false,
            had_error: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn allocate_location(&mut self) -> usize {
        let location = self.next_location;
        self.next_location += 1;
        location
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.had_error = true;
        self.diagnostics.push(diagnostic);
    }

    pub fn declaration_error(&mut self, line: usize, message: &str) {
        self.report(Diagnostic::declaration(line, message));
    }

    pub fn type_error(&mut self, line: usize, message: &str) {
        self.report(Diagnostic::type_error(line, message));
    }

    /// Diagnostics of one kind, in the order they were reported.
    pub fn errors_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}
