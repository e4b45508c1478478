use super::{ArraySize, Operator, Type, TypeSpec};
use std::fmt::Display;

/// A syntax tree node. `ty` stays `None` until the type checker visits it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub ty: Option<Type>,
    /// Set on a declaration-site `Id` once its symbol has been inserted
    pub registered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // Statements
    /// Condition, then-branch, optional else-branch
    If {
        cond: Box<Node>,
        then: Vec<Node>,
        otherwise: Option<Vec<Node>>,
    },
    While {
        cond: Box<Node>,
        body: Vec<Node>,
    },
    /// Target is an `Id` or `Vector` reference
    Assign {
        target: Box<Node>,
        value: Box<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    /// `params` is `None` for `(void)`
    FuncDecl {
        name: String,
        return_type: TypeSpec,
        params: Option<Box<Node>>,
        body: Vec<Node>,
    },
    /// Marks the start of a parameter list; each entry is a `TypeDecl`
    Params {
        list: Vec<Node>,
    },
    Call {
        name: String,
        args: Vec<Node>,
    },

    // Expressions
    Op {
        op: Operator,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Const {
        value: i64,
    },
    Id {
        name: String,
    },
    /// Variable declaration. `name` is the declaration-site `Id`.
    TypeDecl {
        declared: TypeSpec,
        name: Box<Node>,
        size: Option<ArraySize>,
    },
    /// Array element reference
    Vector {
        name: String,
        index: Box<Node>,
    },
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            ty: None,
            registered: false,
        }
    }

    pub fn id(name: impl Into<String>, line: usize) -> Self {
        Self::new(NodeKind::Id { name: name.into() }, line)
    }

    /// Name carried by identifier-like nodes.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::FuncDecl { name, .. }
            | NodeKind::Call { name, .. }
            | NodeKind::Id { name }
            | NodeKind::Vector { name, .. } => Some(name),
            NodeKind::TypeDecl { name, .. } => name.name(),
            _ => None,
        }
    }
}

pub(crate) struct Seq<'a>(pub &'a [Node]);

impl Display for Seq<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self
            .0
            .iter()
            .map(|node| node.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{{{}}}", items)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NodeKind::If {
                cond,
                then,
                otherwise,
            } => {
                if let Some(otherwise) = otherwise {
                    write!(f, "(if {} {} {})", cond, Seq(then), Seq(otherwise))
                } else {
                    write!(f, "(if {} {})", cond, Seq(then))
                }
            }
            NodeKind::While { cond, body } => write!(f, "(while {} {})", cond, Seq(body)),
            NodeKind::Assign { target, value } => write!(f, "(= {} {})", target, value),
            NodeKind::Return { value } => match value {
                Some(value) => write!(f, "(return {})", value),
                None => write!(f, "(return)"),
            },
            NodeKind::FuncDecl {
                name,
                return_type,
                params,
                body,
            } => match params {
                Some(params) => write!(f, "(fun {} {} {} {})", return_type, name, params, Seq(body)),
                None => write!(f, "(fun {} {} void {})", return_type, name, Seq(body)),
            },
            NodeKind::Params { list } => {
                write!(f, "(params")?;
                for param in list {
                    write!(f, " {}", param)?;
                }
                write!(f, ")")
            }
            NodeKind::Call { name, args } => {
                write!(f, "(call {}", name)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            NodeKind::Op { op, lhs, rhs } => write!(f, "({} {} {})", op, lhs, rhs),
            NodeKind::Const { value } => write!(f, "{}", value),
            NodeKind::Id { name } => write!(f, "{}", name),
            NodeKind::TypeDecl {
                declared,
                name,
                size,
            } => match size {
                Some(ArraySize::Sized(n)) => write!(f, "({} {}[{}])", declared, name, n),
                Some(ArraySize::Unsized) => write!(f, "({} {}[])", declared, name),
                None => write!(f, "({} {})", declared, name),
            },
            NodeKind::Vector { name, index } => write!(f, "{}[{}]", name, index),
        }
    }
}
