pub mod checker;
pub mod context;
pub mod resolver;
pub mod symtab;

pub use checker::TypeChecker;
pub use context::AnalysisContext;
pub use resolver::Resolver;
pub use symtab::{ScopedTable, SymbolEntry, SymbolKind, SymbolTable, GLOBAL_SCOPE};

use crate::ast::Program;
use tracing::debug;

/// Builds the symbol table for `program`, then annotates and checks its types.
/// Errors are collected in the returned context; nothing here aborts.
pub fn analyze<T: SymbolTable + ?Sized>(program: &mut Program, table: &mut T) -> AnalysisContext {
    let mut ctx = AnalysisContext::new();
    Resolver::new(table, &mut ctx).resolve(program);
    debug!(errors = ctx.diagnostics.len(), "symbol table built");
    TypeChecker::new(table, &mut ctx).check(program);
    debug!(errors = ctx.diagnostics.len(), "type check finished");
    ctx
}
