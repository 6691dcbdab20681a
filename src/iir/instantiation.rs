//! The lowered form of one stencil.

use super::multistage::MultiStage;
use crate::sir::field::FieldDimensions;

/// What the IIR keeps of a field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Dimensions of the field.
    pub dimensions: FieldDimensions,
    /// Whether the field is a stencil-local temporary.
    pub is_temporary: bool,
}

/// A stencil lowered to multistages, the representation the passes and the
/// backends work on.
///
/// Fields stay in declaration order: the backends derive constructor and
/// kernel parameter order from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StencilInstantiation {
    /// Stencil name.
    pub name: String,
    /// Fields of the stencil, in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Multistages, in execution order.
    pub multistages: Vec<MultiStage>,
}
