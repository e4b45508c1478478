use super::context::AnalysisContext;
use super::symtab::{SymbolTable, GLOBAL_SCOPE};
use crate::ast::{Node, NodeKind, Program, Type, TypeSpec};
use tracing::trace;

const NON_INTEGER_OPERAND: &str = "Op applied to non-integer";
const IF_TEST: &str = "if test is not Boolean";
const WHILE_TEST: &str = "while test is not Boolean";
const ASSIGN_MISMATCH: &str = "assignment error: different types";

/// Postorder pass that annotates expression types and reports type errors.
/// Runs after the resolver so calls can read declared return types.
pub struct TypeChecker<'a, T: SymbolTable + ?Sized> {
    table: &'a T,
    ctx: &'a mut AnalysisContext,
}

impl<'a, T: SymbolTable + ?Sized> TypeChecker<'a, T> {
    pub fn new(table: &'a T, ctx: &'a mut AnalysisContext) -> Self {
        TypeChecker { table, ctx }
    }

    pub fn check(&mut self, program: &mut Program) {
        for decl in program.declarations.iter_mut() {
            self.check_node(decl);
        }
    }

    fn check_seq(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            self.check_node(node);
        }
    }

    fn check_node(&mut self, node: &mut Node) {
        let line = node.line;
        let ty = match &mut node.kind {
            NodeKind::FuncDecl { params, body, .. } => {
                if let Some(params) = params {
                    self.check_node(params);
                }
                self.check_seq(body);
                None
            }
            NodeKind::Params { list } => {
                self.check_seq(list);
                None
            }
            NodeKind::TypeDecl { declared, name, .. } => {
                name.ty = Some(Type::Integer);
                Some(match declared {
                    TypeSpec::Int => Type::Integer,
                    TypeSpec::Void => Type::Void,
                })
            }
            NodeKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.check_node(cond);
                self.check_seq(then);
                if let Some(otherwise) = otherwise {
                    self.check_seq(otherwise);
                }
                self.check_test(cond, cond.line, IF_TEST);
                None
            }
            NodeKind::While { cond, body } => {
                self.check_node(cond);
                self.check_seq(body);
                let at = body.first().map_or(cond.line, |stmt| stmt.line);
                self.check_test(cond, at, WHILE_TEST);
                None
            }
            NodeKind::Assign { target, value } => {
                self.check_node(target);
                self.check_node(value);
                if target.ty != value.ty {
                    self.ctx.type_error(target.line, ASSIGN_MISMATCH);
                }
                None
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.check_node(value);
                }
                None
            }
            NodeKind::Call { name, args } => {
                self.check_seq(args);
                let declared = self
                    .table
                    .entry(name, GLOBAL_SCOPE)
                    .and_then(|entry| entry.declared);
                match declared {
                    Some(TypeSpec::Void) => Some(Type::Void),
                    _ => Some(Type::Integer),
                }
            }
            NodeKind::Op { op, lhs, rhs } => {
                self.check_node(lhs);
                self.check_node(rhs);
                if lhs.ty != Some(Type::Integer) || rhs.ty != Some(Type::Integer) {
                    self.ctx.type_error(line, NON_INTEGER_OPERAND);
                }
                if op.is_relational() {
                    Some(Type::Boolean)
                } else {
                    Some(Type::Integer)
                }
            }
            NodeKind::Vector { index, .. } => {
                self.check_node(index);
                Some(Type::Integer)
            }
            NodeKind::Const { .. } | NodeKind::Id { .. } => Some(Type::Integer),
        };
        trace!(line, ?ty, "annotated node");
        node.ty = ty;
    }

    /// Conditions are reported when they are plain integers. `if` reports at
    /// the condition, `while` at the first statement of its body.
    fn check_test(&mut self, cond: &Node, line: usize, message: &str) {
        if cond.ty == Some(Type::Integer) {
            self.ctx.type_error(line, message);
        }
    }
}
