use super::Node;
use std::fmt::Display;

/// Top-level variable and function declarations, in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub declarations: Vec<Node>,
}

impl Program {
    pub fn new(declarations: Vec<Node>) -> Self {
        Self { declarations }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for decl in &self.declarations {
            writeln!(f, "{}", decl)?;
        }
        Ok(())
    }
}
