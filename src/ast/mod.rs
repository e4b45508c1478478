pub mod node;
pub mod program;
pub mod types;

pub use node::{Node, NodeKind};
pub use program::Program;
pub use types::{ArraySize, Operator, Type, TypeSpec};
