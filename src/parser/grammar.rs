//! The C- grammar as data, plus the synthesis action run on each reduction.

use super::ParseError;
use crate::ast::{ArraySize, Node, NodeKind, Operator, Program, TypeSpec};
use crate::tokens::{Token, TokenKind};
use anyhow::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    /// Augmented start symbol
    Accept,
    Program,
    DeclList,
    Declaration,
    VarDecl,
    TypeSpec,
    FunDecl,
    Params,
    ParamList,
    Param,
    CompoundStmt,
    LocalDecls,
    StmtList,
    Statement,
    ExprStmt,
    IfStmt,
    WhileStmt,
    ReturnStmt,
    Expr,
    Var,
    SimpleExpr,
    RelOp,
    Additive,
    Term,
    Factor,
    Call,
    Args,
    ArgList,
}

impl NonTerminal {
    pub const COUNT: usize = NonTerminal::ArgList as usize + 1;

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    T(TokenKind),
    /// The error marker shifted during recovery
    Error,
    N(NonTerminal),
}

/// Number of table columns: every token kind plus the error marker.
pub const TERMINAL_COUNT: usize = TokenKind::ALL.len() + 1;
pub const ERROR_TERMINAL: usize = TokenKind::ALL.len();

impl Symbol {
    /// Column of a terminal symbol, `None` for nonterminals.
    pub fn terminal(self) -> Option<usize> {
        match self {
            Symbol::T(kind) => Some(kind.index()),
            Symbol::Error => Some(ERROR_TERMINAL),
            Symbol::N(_) => None,
        }
    }
}

/// What a reduction builds from the values it pops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Build {
    Accept,
    Program,
    /// Forward the only value unchanged
    Pass,
    /// Forward the value between brackets
    Inner,
    EmptySeq,
    Single,
    /// `list item`
    Append,
    /// `list , item`
    AppendAfterComma,
    VarScalar,
    VarArray,
    TypeSpec,
    FunDecl,
    ParamsList,
    ParamsVoid,
    ParamScalar,
    ParamArray,
    Compound,
    ExprStmt,
    If,
    IfElse,
    While,
    ReturnVoid,
    ReturnValue,
    Assign,
    VarId,
    VarIndex,
    Binary,
    Const,
    Call,
}

impl Build {
    /// Whether the value built wraps its children in a new tree node.
    pub fn nests(self) -> bool {
        matches!(
            self,
            Build::VarScalar
                | Build::VarArray
                | Build::FunDecl
                | Build::ParamsList
                | Build::ParamScalar
                | Build::ParamArray
                | Build::If
                | Build::IfElse
                | Build::While
                | Build::ReturnVoid
                | Build::ReturnValue
                | Build::Assign
                | Build::VarId
                | Build::VarIndex
                | Build::Binary
                | Build::Const
                | Build::Call
        )
    }
}

pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: &'static [Symbol],
    pub build: Build,
}

use NonTerminal as V;
use Symbol::{Error as E, N, T};
use TokenKind as K;

const fn prod(lhs: NonTerminal, rhs: &'static [Symbol], build: Build) -> Production {
    Production { lhs, rhs, build }
}

pub static PRODUCTIONS: &[Production] = &[
    prod(V::Accept, &[N(V::Program)], Build::Accept),
    prod(V::Program, &[N(V::DeclList)], Build::Program),
    prod(V::DeclList, &[N(V::DeclList), N(V::Declaration)], Build::Append),
    prod(V::DeclList, &[N(V::Declaration)], Build::Single),
    prod(V::Declaration, &[N(V::VarDecl)], Build::Pass),
    prod(V::Declaration, &[N(V::FunDecl)], Build::Pass),
    prod(V::Declaration, &[E, T(K::Semi)], Build::EmptySeq),
    prod(V::VarDecl, &[N(V::TypeSpec), T(K::Id), T(K::Semi)], Build::VarScalar),
    prod(
        V::VarDecl,
        &[
            N(V::TypeSpec),
            T(K::Id),
            T(K::LBracket),
            T(K::Num),
            T(K::RBracket),
            T(K::Semi),
        ],
        Build::VarArray,
    ),
    prod(V::TypeSpec, &[T(K::Int)], Build::TypeSpec),
    prod(V::TypeSpec, &[T(K::Void)], Build::TypeSpec),
    prod(
        V::FunDecl,
        &[
            N(V::TypeSpec),
            T(K::Id),
            T(K::LParen),
            N(V::Params),
            T(K::RParen),
            N(V::CompoundStmt),
        ],
        Build::FunDecl,
    ),
    prod(V::Params, &[N(V::ParamList)], Build::ParamsList),
    prod(V::Params, &[T(K::Void)], Build::ParamsVoid),
    prod(
        V::ParamList,
        &[N(V::ParamList), T(K::Comma), N(V::Param)],
        Build::AppendAfterComma,
    ),
    prod(V::ParamList, &[N(V::Param)], Build::Single),
    prod(V::Param, &[N(V::TypeSpec), T(K::Id)], Build::ParamScalar),
    prod(
        V::Param,
        &[N(V::TypeSpec), T(K::Id), T(K::LBracket), T(K::RBracket)],
        Build::ParamArray,
    ),
    prod(
        V::CompoundStmt,
        &[
            T(K::LBrace),
            N(V::LocalDecls),
            N(V::StmtList),
            T(K::RBrace),
        ],
        Build::Compound,
    ),
    prod(V::LocalDecls, &[N(V::LocalDecls), N(V::VarDecl)], Build::Append),
    prod(V::LocalDecls, &[], Build::EmptySeq),
    prod(V::StmtList, &[N(V::StmtList), N(V::Statement)], Build::Append),
    prod(V::StmtList, &[], Build::EmptySeq),
    prod(V::Statement, &[N(V::ExprStmt)], Build::Pass),
    prod(V::Statement, &[N(V::CompoundStmt)], Build::Pass),
    prod(V::Statement, &[N(V::IfStmt)], Build::Pass),
    prod(V::Statement, &[N(V::WhileStmt)], Build::Pass),
    prod(V::Statement, &[N(V::ReturnStmt)], Build::Pass),
    prod(V::Statement, &[E, T(K::Semi)], Build::EmptySeq),
    prod(V::ExprStmt, &[N(V::Expr), T(K::Semi)], Build::ExprStmt),
    prod(V::ExprStmt, &[T(K::Semi)], Build::EmptySeq),
    prod(
        V::IfStmt,
        &[
            T(K::If),
            T(K::LParen),
            N(V::Expr),
            T(K::RParen),
            N(V::Statement),
        ],
        Build::If,
    ),
    prod(
        V::IfStmt,
        &[
            T(K::If),
            T(K::LParen),
            N(V::Expr),
            T(K::RParen),
            N(V::Statement),
            T(K::Else),
            N(V::Statement),
        ],
        Build::IfElse,
    ),
    prod(
        V::WhileStmt,
        &[
            T(K::While),
            T(K::LParen),
            N(V::Expr),
            T(K::RParen),
            N(V::Statement),
        ],
        Build::While,
    ),
    prod(V::ReturnStmt, &[T(K::Return), T(K::Semi)], Build::ReturnVoid),
    prod(
        V::ReturnStmt,
        &[T(K::Return), N(V::Expr), T(K::Semi)],
        Build::ReturnValue,
    ),
    prod(V::Expr, &[N(V::Var), T(K::Assign), N(V::Expr)], Build::Assign),
    prod(V::Expr, &[N(V::SimpleExpr)], Build::Pass),
    prod(V::Var, &[T(K::Id)], Build::VarId),
    prod(
        V::Var,
        &[T(K::Id), T(K::LBracket), N(V::Expr), T(K::RBracket)],
        Build::VarIndex,
    ),
    prod(
        V::SimpleExpr,
        &[N(V::Additive), N(V::RelOp), N(V::Additive)],
        Build::Binary,
    ),
    prod(V::SimpleExpr, &[N(V::Additive)], Build::Pass),
    prod(V::RelOp, &[T(K::LtEq)], Build::Pass),
    prod(V::RelOp, &[T(K::Lt)], Build::Pass),
    prod(V::RelOp, &[T(K::Gt)], Build::Pass),
    prod(V::RelOp, &[T(K::GtEq)], Build::Pass),
    prod(V::RelOp, &[T(K::Equal)], Build::Pass),
    prod(V::RelOp, &[T(K::Diff)], Build::Pass),
    prod(
        V::Additive,
        &[N(V::Additive), T(K::Plus), N(V::Term)],
        Build::Binary,
    ),
    prod(
        V::Additive,
        &[N(V::Additive), T(K::Minus), N(V::Term)],
        Build::Binary,
    ),
    prod(V::Additive, &[N(V::Term)], Build::Pass),
    prod(V::Term, &[N(V::Term), T(K::Times), N(V::Factor)], Build::Binary),
    prod(V::Term, &[N(V::Term), T(K::Over), N(V::Factor)], Build::Binary),
    prod(V::Term, &[N(V::Factor)], Build::Pass),
    prod(
        V::Factor,
        &[T(K::LParen), N(V::Expr), T(K::RParen)],
        Build::Inner,
    ),
    prod(V::Factor, &[N(V::Var)], Build::Pass),
    prod(V::Factor, &[N(V::Call)], Build::Pass),
    prod(V::Factor, &[T(K::Num)], Build::Const),
    prod(
        V::Call,
        &[T(K::Id), T(K::LParen), N(V::Args), T(K::RParen)],
        Build::Call,
    ),
    prod(V::Args, &[N(V::ArgList)], Build::Pass),
    prod(V::Args, &[], Build::EmptySeq),
    prod(
        V::ArgList,
        &[N(V::ArgList), T(K::Comma), N(V::Expr)],
        Build::AppendAfterComma,
    ),
    prod(V::ArgList, &[N(V::Expr)], Build::Single),
];

/// Semantic value kept on the parser's value stack.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Token(Token),
    Node(Node),
    Seq(Vec<Node>),
    Type(TypeSpec, usize),
    /// `None` for a `(void)` parameter list
    Params(Option<Node>),
    Program(Program),
    Nothing,
}

impl Value {
    fn into_node(self) -> Result<Node> {
        match self {
            Value::Node(node) => Ok(node),
            _ => anyhow::bail!(ParseError::BadState),
        }
    }

    /// Statements and lists both flatten into a sequence.
    fn into_seq(self) -> Result<Vec<Node>> {
        match self {
            Value::Seq(seq) => Ok(seq),
            Value::Node(node) => Ok(vec![node]),
            _ => anyhow::bail!(ParseError::BadState),
        }
    }

    fn into_token(self) -> Result<Token> {
        match self {
            Value::Token(token) => Ok(token),
            _ => anyhow::bail!(ParseError::BadState),
        }
    }

    fn into_type(self) -> Result<(TypeSpec, usize)> {
        match self {
            Value::Type(type_spec, line) => Ok((type_spec, line)),
            _ => anyhow::bail!(ParseError::BadState),
        }
    }

    pub fn into_program(self) -> Result<Program> {
        match self {
            Value::Program(program) => Ok(program),
            _ => anyhow::bail!(ParseError::BadState),
        }
    }
}

fn take(rhs: &mut [Value], i: usize) -> Result<Value> {
    match rhs.get_mut(i) {
        Some(value) => Ok(std::mem::replace(value, Value::Nothing)),
        None => anyhow::bail!(ParseError::BadState),
    }
}

fn parse_num(token: &Token) -> Result<i64> {
    token
        .lexeme
        .parse()
        .map_err(|_| anyhow::anyhow!(ParseError::BadState))
}

fn type_decl(type_spec: (TypeSpec, usize), id: Token, size: Option<ArraySize>) -> Node {
    let (declared, line) = type_spec;
    Node::new(
        NodeKind::TypeDecl {
            declared,
            name: Box::new(Node::id(id.lexeme, id.line)),
            size,
        },
        line,
    )
}

/// Runs the synthesis action of `build` over the popped right-hand side.
pub fn build(build: Build, mut rhs: Vec<Value>) -> Result<Value> {
    let rhs = rhs.as_mut_slice();
    Ok(match build {
        Build::Accept | Build::Pass => take(rhs, 0)?,
        Build::Inner => take(rhs, 1)?,
        Build::Program => Value::Program(Program::new(take(rhs, 0)?.into_seq()?)),
        Build::EmptySeq => Value::Seq(Vec::new()),
        Build::Single => Value::Seq(take(rhs, 0)?.into_seq()?),
        Build::Append => {
            let mut list = take(rhs, 0)?.into_seq()?;
            list.extend(take(rhs, 1)?.into_seq()?);
            Value::Seq(list)
        }
        Build::AppendAfterComma => {
            let mut list = take(rhs, 0)?.into_seq()?;
            list.push(take(rhs, 2)?.into_node()?);
            Value::Seq(list)
        }
        Build::VarScalar | Build::ParamScalar => {
            let type_spec = take(rhs, 0)?.into_type()?;
            let id = take(rhs, 1)?.into_token()?;
            Value::Node(type_decl(type_spec, id, None))
        }
        Build::VarArray => {
            let type_spec = take(rhs, 0)?.into_type()?;
            let id = take(rhs, 1)?.into_token()?;
            let size = parse_num(&take(rhs, 3)?.into_token()?)?;
            Value::Node(type_decl(type_spec, id, Some(ArraySize::Sized(size))))
        }
        Build::ParamArray => {
            let type_spec = take(rhs, 0)?.into_type()?;
            let id = take(rhs, 1)?.into_token()?;
            Value::Node(type_decl(type_spec, id, Some(ArraySize::Unsized)))
        }
        Build::TypeSpec => {
            let token = take(rhs, 0)?.into_token()?;
            match TypeSpec::from_token(token.kind) {
                Some(type_spec) => Value::Type(type_spec, token.line),
                None => anyhow::bail!(ParseError::BadState),
            }
        }
        Build::FunDecl => {
            let (return_type, _) = take(rhs, 0)?.into_type()?;
            let id = take(rhs, 1)?.into_token()?;
            let params = match take(rhs, 3)? {
                Value::Params(params) => params.map(Box::new),
                _ => anyhow::bail!(ParseError::BadState),
            };
            let body = take(rhs, 5)?.into_seq()?;
            Value::Node(Node::new(
                NodeKind::FuncDecl {
                    name: id.lexeme,
                    return_type,
                    params,
                    body,
                },
                id.line,
            ))
        }
        Build::ParamsList => {
            let list = take(rhs, 0)?.into_seq()?;
            let line = list.first().map_or(0, |param| param.line);
            Value::Params(Some(Node::new(NodeKind::Params { list }, line)))
        }
        Build::ParamsVoid => Value::Params(None),
        Build::Compound => {
            let mut seq = take(rhs, 1)?.into_seq()?;
            seq.extend(take(rhs, 2)?.into_seq()?);
            Value::Seq(seq)
        }
        Build::ExprStmt => Value::Seq(vec![take(rhs, 0)?.into_node()?]),
        Build::If | Build::IfElse => {
            let keyword = take(rhs, 0)?.into_token()?;
            let cond = Box::new(take(rhs, 2)?.into_node()?);
            let then = take(rhs, 4)?.into_seq()?;
            let otherwise = if build == Build::IfElse {
                Some(take(rhs, 6)?.into_seq()?)
            } else {
                None
            };
            Value::Node(Node::new(
                NodeKind::If {
                    cond,
                    then,
                    otherwise,
                },
                keyword.line,
            ))
        }
        Build::While => {
            let keyword = take(rhs, 0)?.into_token()?;
            let cond = Box::new(take(rhs, 2)?.into_node()?);
            let body = take(rhs, 4)?.into_seq()?;
            Value::Node(Node::new(NodeKind::While { cond, body }, keyword.line))
        }
        Build::ReturnVoid => {
            let keyword = take(rhs, 0)?.into_token()?;
            Value::Node(Node::new(NodeKind::Return { value: None }, keyword.line))
        }
        Build::ReturnValue => {
            let keyword = take(rhs, 0)?.into_token()?;
            let value = Some(Box::new(take(rhs, 1)?.into_node()?));
            Value::Node(Node::new(NodeKind::Return { value }, keyword.line))
        }
        Build::Assign => {
            let target = take(rhs, 0)?.into_node()?;
            let value = take(rhs, 2)?.into_node()?;
            let line = target.line;
            Value::Node(Node::new(
                NodeKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                line,
            ))
        }
        Build::VarId => {
            let id = take(rhs, 0)?.into_token()?;
            Value::Node(Node::id(id.lexeme, id.line))
        }
        Build::VarIndex => {
            let id = take(rhs, 0)?.into_token()?;
            let index = Box::new(take(rhs, 2)?.into_node()?);
            Value::Node(Node::new(
                NodeKind::Vector {
                    name: id.lexeme,
                    index,
                },
                id.line,
            ))
        }
        Build::Binary => {
            let lhs = Box::new(take(rhs, 0)?.into_node()?);
            let op_token = take(rhs, 1)?.into_token()?;
            let rhs = Box::new(take(rhs, 2)?.into_node()?);
            let op = match Operator::from_token(op_token.kind) {
                Some(op) => op,
                None => anyhow::bail!(ParseError::BadState),
            };
            Value::Node(Node::new(NodeKind::Op { op, lhs, rhs }, op_token.line))
        }
        Build::Const => {
            let num = take(rhs, 0)?.into_token()?;
            let value = parse_num(&num)?;
            Value::Node(Node::new(NodeKind::Const { value }, num.line))
        }
        Build::Call => {
            let id = take(rhs, 0)?.into_token()?;
            let args = take(rhs, 2)?.into_seq()?;
            Value::Node(Node::new(
                NodeKind::Call {
                    name: id.lexeme,
                    args,
                },
                id.line,
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_nonterminal_has_a_production() {
        for index in 0..NonTerminal::COUNT {
            assert!(
                PRODUCTIONS.iter().any(|p| p.lhs.index() == index),
                "nonterminal {} has no production",
                index
            );
        }
    }

    #[test]
    fn test_augmented_start_is_first() {
        assert_eq!(PRODUCTIONS[0].lhs, NonTerminal::Accept);
        assert_eq!(PRODUCTIONS[0].rhs, &[N(V::Program)]);
    }

    #[test]
    fn test_binary_synthesis() {
        let values = vec![
            Value::Node(Node::id("a", 1)),
            Value::Token(Token::new(TokenKind::Plus, 2)),
            Value::Node(Node::new(NodeKind::Const { value: 3 }, 2)),
        ];
        let node = build(Build::Binary, values).unwrap();
        match node {
            Value::Node(node) => {
                assert_eq!(node.to_string(), "(+ a 3)");
                assert_eq!(node.line, 2);
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_append_splices_statement_lists() {
        let list = Value::Seq(vec![Node::id("a", 1)]);
        let block = Value::Seq(vec![Node::id("b", 2), Node::id("c", 3)]);
        let value = build(Build::Append, vec![list, block]).unwrap();
        assert_eq!(
            value,
            Value::Seq(vec![Node::id("a", 1), Node::id("b", 2), Node::id("c", 3)])
        );
    }

    #[test]
    fn test_shape_mismatch_is_bad_state() {
        let result = build(Build::Binary, vec![Value::Nothing]);
        assert_eq!(
            result.unwrap_err().downcast::<ParseError>().unwrap(),
            ParseError::BadState
        );
    }
}
