//! Front end for the C-minus teaching language: scanner, LALR(1) parser with
//! error recovery, symbol table construction and type checking.

pub mod ast;
pub mod diagnostic;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod semantic;
pub mod tokens;

use anyhow::Result;
use ast::Program;
use diagnostic::Diagnostic;
use lexer::tokenize;
use options::Options;
use parser::Parser;
use semantic::{analyze, ScopedTable};
use tracing::{debug, info};

/// Everything one run of the front end produced.
#[derive(Debug)]
pub struct Compilation {
    /// `None` when the parser could not recover
    pub program: Option<Program>,
    pub table: ScopedTable,
    /// Syntax errors, or declaration and type errors when parsing was clean
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn failed(&self) -> bool {
        self.program.is_none() || !self.diagnostics.is_empty()
    }
}

/// Scans, parses and, if there were no syntax errors, analyzes `source`.
///
/// Diagnostics in the source are returned in the [`Compilation`]; the `Err`
/// case is reserved for scanner failures and internal parser faults.
pub fn compile(source: &str, options: &Options) -> Result<Compilation> {
    let tokens = tokenize(source)?;
    debug!(tokens = tokens.len(), "scanned");

    let outcome = Parser::with_options(tokens, options.clone()).parse()?;
    let mut table = ScopedTable::new();
    if outcome.has_errors() {
        info!(errors = outcome.diagnostics.len(), "skipping analysis after syntax errors");
        return Ok(Compilation {
            program: outcome.program,
            table,
            diagnostics: outcome.diagnostics,
        });
    }

    let mut program = outcome.program;
    let diagnostics = match program.as_mut() {
        Some(program) => analyze(program, &mut table).diagnostics,
        None => Vec::new(),
    };
    Ok(Compilation {
        program,
        table,
        diagnostics,
    })
}
