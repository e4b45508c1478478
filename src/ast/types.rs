use crate::tokens::TokenKind;
use std::fmt::Display;

/// Semantic type assigned by the checker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
    Integer,
    Void,
    Boolean,
}

/// Type keyword written at a declaration site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeSpec {
    Int,
    Void,
}

impl TypeSpec {
    pub fn from_token(kind: TokenKind) -> Option<TypeSpec> {
        match kind {
            TokenKind::Int => Some(TypeSpec::Int),
            TokenKind::Void => Some(TypeSpec::Void),
            _ => None,
        }
    }
}

/// Array shape of a declaration. Parameters are declared without a size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArraySize {
    Sized(i64),
    Unsized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Over,
    Equal,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Diff,
}

impl Operator {
    pub fn from_token(kind: TokenKind) -> Option<Operator> {
        Some(match kind {
            TokenKind::Plus => Operator::Plus,
            TokenKind::Minus => Operator::Minus,
            TokenKind::Times => Operator::Times,
            TokenKind::Over => Operator::Over,
            TokenKind::Equal => Operator::Equal,
            TokenKind::Lt => Operator::Lt,
            TokenKind::LtEq => Operator::LtEq,
            TokenKind::Gt => Operator::Gt,
            TokenKind::GtEq => Operator::GtEq,
            TokenKind::Diff => Operator::Diff,
            _ => return None,
        })
    }

    /// Comparisons yield a Boolean, everything else an Integer.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::Lt
                | Operator::LtEq
                | Operator::Gt
                | Operator::GtEq
                | Operator::Diff
        )
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Integer => write!(f, "Integer"),
            Type::Void => write!(f, "Void"),
            Type::Boolean => write!(f, "Boolean"),
        }
    }
}

impl Display for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Void => write!(f, "void"),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Times => "*",
            Operator::Over => "/",
            Operator::Equal => "==",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Diff => "!=",
        };
        write!(f, "{}", op)
    }
}
