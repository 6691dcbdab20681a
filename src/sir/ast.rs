//! Ast node and its builder.

use serde::{Deserialize, Serialize};

use super::stmt::Stmt;

/// A body of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ast {
    /// Statements, in program order.
    pub statements: Vec<Stmt>,
}

impl From<Vec<Stmt>> for Ast {
    fn from(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

/// Shortcut to create an `Ast`.
pub fn ast(statements: impl IntoIterator<Item = Stmt>) -> Ast {
    Ast {
        statements: statements.into_iter().collect(),
    }
}
