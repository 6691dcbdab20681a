//! Stencil node and its builder.

use serde::{Deserialize, Serialize};

use super::ast::Ast;
use super::field::Field;
use super::loc::SourceLocation;

/// A named stencil: a body together with the fields it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stencil {
    /// Stencil name, reused for the generated class and kernels.
    pub name: String,
    /// Top-level statements, expected to be vertical regions.
    pub ast: Ast,
    /// Declared fields, in declaration order.
    pub fields: Vec<Field>,
    /// Where the stencil is declared.
    pub loc: SourceLocation,
}

impl Stencil {
    /// Looks a declared field up by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Shortcut to create a `Stencil`.
pub fn stencil(name: impl ToString, ast: Ast, fields: impl IntoIterator<Item = Field>) -> Stencil {
    Stencil {
        name: name.to_string(),
        ast,
        fields: fields.into_iter().collect(),
        loc: SourceLocation::default(),
    }
}
