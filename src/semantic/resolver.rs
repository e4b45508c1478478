use super::context::AnalysisContext;
use super::symtab::{SymbolKind, SymbolTable, GLOBAL_SCOPE};
use crate::ast::{Node, NodeKind, Program, TypeSpec};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use tracing::debug;

const FUNCTION_REDECLARED: &str = "name already used by another function";
const VARIABLE_REDECLARED: &str =
    "name already used by another variable previously declared in this scope or by another function";
const VOID_VARIABLE: &str = "variable must not be declared as void";
const UNDECLARED_VARIABLE: &str = "variable not declared in this scope";
const UNDECLARED_FUNCTION: &str = "function called was not declared";
const MISSING_MAIN: &str = "main must be declared";

/// Preorder pass that fills the symbol table and reports declaration errors.
pub struct Resolver<'a, T: SymbolTable + ?Sized> {
    table: &'a mut T,
    ctx: &'a mut AnalysisContext,
}

impl<'a, T: SymbolTable + ?Sized> Resolver<'a, T> {
    pub fn new(table: &'a mut T, ctx: &'a mut AnalysisContext) -> Self {
        Resolver { table, ctx }
    }

    pub fn resolve(&mut self, program: &mut Program) {
        self.ctx.scope = GLOBAL_SCOPE.to_string();
        for decl in program.declarations.iter_mut() {
            self.resolve_node(decl);
        }
        if !self.ctx.main_seen {
            self.ctx
                .report(Diagnostic::unlocated(DiagnosticKind::Declaration, MISSING_MAIN));
        }
    }

    fn resolve_seq(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            self.resolve_node(node);
        }
    }

    fn resolve_node(&mut self, node: &mut Node) {
        let line = node.line;
        let registered = node.registered;
        let mut inserted = false;
        match &mut node.kind {
            NodeKind::FuncDecl {
                name,
                return_type,
                params,
                body,
            } => {
                inserted = self.resolve_func_decl(name, *return_type, line, registered);
                if let Some(params) = params {
                    self.resolve_node(params);
                }
                self.resolve_seq(body);
                self.ctx.scope = GLOBAL_SCOPE.to_string();
            }
            NodeKind::TypeDecl { declared, name, .. } => {
                self.resolve_type_decl(*declared, name, line);
            }
            NodeKind::Id { name } => {
                inserted = self.resolve_use(name, registered, line);
            }
            NodeKind::Vector { name, index } => {
                inserted = self.resolve_use(name, registered, line);
                self.resolve_node(index);
            }
            NodeKind::Call { name, args } => {
                if self.table.lookup(name, GLOBAL_SCOPE).is_none() {
                    self.ctx.declaration_error(line, UNDECLARED_FUNCTION);
                }
                self.resolve_seq(args);
            }
            NodeKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.resolve_node(cond);
                self.resolve_seq(then);
                if let Some(otherwise) = otherwise {
                    self.resolve_seq(otherwise);
                }
            }
            NodeKind::While { cond, body } => {
                self.resolve_node(cond);
                self.resolve_seq(body);
            }
            NodeKind::Assign { target, value } => {
                self.resolve_node(target);
                self.resolve_node(value);
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.resolve_node(value);
                }
            }
            NodeKind::Params { list } => self.resolve_seq(list),
            NodeKind::Op { lhs, rhs, .. } => {
                self.resolve_node(lhs);
                self.resolve_node(rhs);
            }
            NodeKind::Const { .. } => {}
        }
        if inserted {
            node.registered = true;
        }
    }

    /// Returns whether the function was inserted. A declaration registered
    /// by an earlier visit only re-enters its scope.
    fn resolve_func_decl(
        &mut self,
        name: &str,
        return_type: TypeSpec,
        line: usize,
        registered: bool,
    ) -> bool {
        self.ctx.scope = name.to_string();
        if name == "main" {
            self.ctx.main_seen = true;
        }
        if registered {
            return false;
        }
        if self.table.lookup(name, GLOBAL_SCOPE).is_some() {
            self.ctx.declaration_error(line, FUNCTION_REDECLARED);
            return false;
        }
        let location = self.ctx.allocate_location();
        debug!(name, location, "register function");
        self.table.insert(
            name,
            line,
            location,
            GLOBAL_SCOPE,
            Some(SymbolKind::Function),
            Some(return_type),
        );
        true
    }

    /// `id` is the declaration-site identifier; it is flagged once inserted.
    fn resolve_type_decl(&mut self, declared: TypeSpec, id: &mut Node, line: usize) {
        if id.registered {
            return;
        }
        if declared == TypeSpec::Void {
            self.ctx.declaration_error(line, VOID_VARIABLE);
            return;
        }
        let Some(name) = id.name() else {
            return;
        };
        if self.table.lookup(name, &self.ctx.scope).is_some() {
            self.ctx.declaration_error(line, VARIABLE_REDECLARED);
            return;
        }
        let location = self.ctx.allocate_location();
        debug!(name, scope = %self.ctx.scope, location, "register variable");
        self.table.insert(
            name,
            id.line,
            location,
            &self.ctx.scope,
            Some(SymbolKind::Variable),
            Some(TypeSpec::Int),
        );
        id.registered = true;
    }

    /// Records a use line once per node. Returns whether a record was inserted.
    fn resolve_use(&mut self, name: &str, registered: bool, line: usize) -> bool {
        if self.table.lookup(name, &self.ctx.scope).is_none() {
            self.ctx.declaration_error(line, UNDECLARED_VARIABLE);
            return false;
        }
        if registered {
            return false;
        }
        self.table.insert(name, line, 0, &self.ctx.scope, None, None);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use crate::semantic::symtab::ScopedTable;

    fn resolve(input: &str) -> (Program, ScopedTable, AnalysisContext) {
        let tokens = tokenize(input).unwrap();
        let mut program = Parser::new(tokens).parse().unwrap().program.unwrap();
        let mut table = ScopedTable::new();
        let mut ctx = AnalysisContext::new();
        Resolver::new(&mut table, &mut ctx).resolve(&mut program);
        (program, table, ctx)
    }

    fn messages(ctx: &AnalysisContext) -> Vec<String> {
        ctx.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_registers_function_and_local() {
        let (_, table, ctx) = resolve("int main(void) { int x; x = 1; return x; }");
        assert!(!ctx.had_error, "{:?}", ctx.diagnostics);
        let main = table.entry("main", GLOBAL_SCOPE).unwrap();
        assert_eq!(main.kind, Some(SymbolKind::Function));
        assert_eq!(main.declared, Some(TypeSpec::Int));
        assert_eq!(main.location, 0);
        let x = table.entry("x", "main").unwrap();
        assert_eq!(x.scope, "main");
        assert_eq!(x.declared, Some(TypeSpec::Int));
        assert_eq!(x.location, 1);
        assert_eq!(x.lines, vec![1, 1, 1]);
    }

    #[test]
    fn test_declaration_site_is_flagged() {
        let (program, _, _) = resolve("int g; void main(void) { }");
        match &program.declarations[0].kind {
            NodeKind::TypeDecl { name, .. } => assert!(name.registered),
            other => panic!("expected a declaration, found {:?}", other),
        }
    }

    #[test]
    fn test_missing_main() {
        let (_, _, ctx) = resolve("int f(void) { return 1; }");
        assert_eq!(messages(&ctx), vec!["Declaration error: main must be declared"]);
        assert!(ctx.had_error);
    }

    #[test]
    fn test_duplicate_function_keeps_first_entry() {
        let (_, table, ctx) = resolve("void f(void) { }\nint f(void) { }\nvoid main(void) { }");
        assert_eq!(
            messages(&ctx),
            vec!["Declaration error at line 2: name already used by another function"]
        );
        let f = table.entry("f", GLOBAL_SCOPE).unwrap();
        assert_eq!(f.location, 0);
        assert_eq!(f.declared, Some(TypeSpec::Void));
        assert_eq!(table.lookup("main", GLOBAL_SCOPE), Some(1));
    }

    #[test]
    fn test_duplicate_variable_keeps_first_location() {
        let (_, table, ctx) = resolve("int main(void) {\n int x;\n int x;\n}");
        assert_eq!(
            messages(&ctx),
            vec![format!("Declaration error at line 3: {}", VARIABLE_REDECLARED)]
        );
        assert_eq!(table.lookup("x", "main"), Some(1));
    }

    #[test]
    fn test_void_variable() {
        let (_, table, ctx) = resolve("void main(void) { void v; }");
        assert_eq!(
            messages(&ctx),
            vec!["Declaration error at line 1: variable must not be declared as void"]
        );
        assert_eq!(table.lookup("v", "main"), None);
    }

    #[test]
    fn test_undeclared_variable() {
        let (_, _, ctx) = resolve("void main(void) {\n y = 1;\n}");
        assert_eq!(
            messages(&ctx),
            vec!["Declaration error at line 2: variable not declared in this scope"]
        );
    }

    #[test]
    fn test_undeclared_array_reference() {
        let (_, _, ctx) = resolve("void main(void) { int i; i = a[i]; }");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].message, UNDECLARED_VARIABLE);
    }

    #[test]
    fn test_undeclared_function() {
        let (_, _, ctx) = resolve("void main(void) {\n int x;\n x = foo();\n}");
        assert_eq!(
            messages(&ctx),
            vec!["Declaration error at line 3: function called was not declared"]
        );
    }

    #[test]
    fn test_locals_are_per_function() {
        let (_, table, ctx) = resolve(
            "int f(int a) { int x; return a + x; }\nvoid main(void) { int x; x = f(x); }",
        );
        assert!(!ctx.had_error, "{:?}", ctx.diagnostics);
        assert_eq!(table.lookup("x", "f"), Some(2));
        assert_eq!(table.lookup("x", "main"), Some(4));
        assert_eq!(table.lookup("a", "main"), None);
    }

    #[test]
    fn test_globals_after_functions_are_global() {
        let (_, table, ctx) = resolve("void main(void) { }\nint g;\nvoid h(void) { g = 1; }");
        assert!(!ctx.had_error, "{:?}", ctx.diagnostics);
        assert_eq!(table.entry("g", GLOBAL_SCOPE).unwrap().lines, vec![2, 3]);
    }

    #[test]
    fn test_local_cannot_reuse_function_name() {
        let (_, _, ctx) = resolve("void main(void) { int main; }");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].message, VARIABLE_REDECLARED);
    }

    #[test]
    fn test_revisit_leaves_table_unchanged() {
        let tokens = tokenize("int g;\nint main(void) { int x; x = g; return x; }").unwrap();
        let mut program = Parser::new(tokens).parse().unwrap().program.unwrap();
        let mut table = ScopedTable::new();
        let mut ctx = AnalysisContext::new();
        Resolver::new(&mut table, &mut ctx).resolve(&mut program);
        assert!(ctx.diagnostics.is_empty(), "{:?}", ctx.diagnostics);
        let listing = table.dump();

        let mut again = AnalysisContext::new();
        Resolver::new(&mut table, &mut again).resolve(&mut program);
        assert!(again.diagnostics.is_empty(), "{:?}", again.diagnostics);
        assert_eq!(table.dump(), listing);
        assert_eq!(table.entry("x", "main").unwrap().lines, vec![2, 2, 2]);
    }

    #[test]
    fn test_uses_are_flagged_once_recorded() {
        let (program, _, _) = resolve("void main(void) { int i; i = i; }");
        match &program.declarations[0].kind {
            NodeKind::FuncDecl { body, .. } => match &body[1].kind {
                NodeKind::Assign { target, value } => {
                    assert!(target.registered);
                    assert!(value.registered);
                }
                other => panic!("expected an assignment, found {:?}", other),
            },
            other => panic!("expected a function, found {:?}", other),
        }
        assert!(program.declarations[0].registered);
    }
}
