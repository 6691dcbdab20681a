//! Root node of a stencil description.

use serde::{Deserialize, Serialize};

use super::stencil::Stencil;

/// Kind of horizontal grid a program iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridType {
    /// Unstructured mesh of cells, edges and vertices.
    Unstructured,
}

/// A whole stencil program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Name of the file the generated code is meant for.
    pub filename: String,
    /// Kind of horizontal grid.
    pub grid_type: GridType,
    /// Stencils of the program, in declaration order.
    pub stencils: Vec<Stencil>,
}

/// Shortcut to create a `Program`.
pub fn program(
    filename: impl ToString,
    grid_type: GridType,
    stencils: impl IntoIterator<Item = Stencil>,
) -> Program {
    Program {
        filename: filename.to_string(),
        grid_type,
        stencils: stencils.into_iter().collect(),
    }
}
