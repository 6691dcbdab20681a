//! Field declarations and their dimensionality.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::loc::SourceLocation;

/// Kind of mesh element a horizontal dimension iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationType {
    /// Mesh cells.
    Cell,
    /// Mesh edges.
    Edge,
    /// Mesh vertices.
    Vertex,
}

/// A chain of location types, from the iteration location to the neighbors
/// being visited.
pub type NeighborChain = Vec<LocationType>;

/// Dimensionality of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDimensions {
    /// Location of the dense horizontal dimension, if the field has one.
    pub dense_location: Option<LocationType>,
    /// Whether the field extends along the vertical axis.
    pub mask_k: bool,
}

/// A field declared by a stencil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Whether the field is scratch storage private to the stencil.
    pub is_temporary: bool,
    /// Field dimensionality.
    pub dimensions: FieldDimensions,
    /// Declaration site.
    pub loc: SourceLocation,
}

/// Shortcut to create the dimensions of a dense unstructured field.
pub fn unstructured_dimensions(dense_location: LocationType, mask_k: bool) -> FieldDimensions {
    FieldDimensions {
        dense_location: Some(dense_location),
        mask_k,
    }
}

/// Shortcut to create the dimensions of a purely vertical field.
pub fn vertical_dimensions() -> FieldDimensions {
    FieldDimensions {
        dense_location: None,
        mask_k: true,
    }
}

/// Shortcut to declare a field.
pub fn field(name: impl ToString, dimensions: FieldDimensions) -> Field {
    Field {
        name: name.to_string(),
        is_temporary: false,
        dimensions,
        loc: SourceLocation::default(),
    }
}

/// Shortcut to declare a temporary field.
pub fn temporary_field(name: impl ToString, dimensions: FieldDimensions) -> Field {
    Field {
        is_temporary: true,
        ..field(name, dimensions)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocationType::Cell => "cell",
            LocationType::Edge => "edge",
            LocationType::Vertex => "vertex",
        })
    }
}
