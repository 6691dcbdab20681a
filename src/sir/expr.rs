//! Expressions of stencil bodies, and shortcuts to build them.

use serde::{Deserialize, Serialize};

use super::field::{LocationType, NeighborChain};
use super::loc::SourceLocation;
use crate::utils::boxed;
use ExprKind::*;

/// Scalar type of a literal or a local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinType {
    /// Leave the choice to the backend.
    Auto,
    /// Booleans.
    Boolean,
    /// Integers.
    Integer,
    /// Single precision floating point.
    Float,
    /// Double precision floating point.
    Double,
}

/// Horizontal displacement of a field access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalOffset {
    /// Read the element under iteration.
    #[default]
    Center,
    /// Read the neighbor under iteration, inside a reduction.
    Neighbor,
}

/// Complete offset of a field access.
///
/// The level read is `k + vertical_shift` or, when the access is indirected,
/// `vertical_indirection[k] + vertical_shift`. The indirection field itself
/// is always read at the iteration level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessOffset {
    /// Horizontal part of the offset.
    pub horizontal: HorizontalOffset,
    /// Shift along the vertical axis.
    pub vertical_shift: i32,
    /// Field whose value gives the level to read, for indirected accesses.
    pub vertical_indirection: Option<String>,
}

impl AccessOffset {
    /// Is this the plain center access, with no displacement at all?
    pub fn is_zero(&self) -> bool {
        self.horizontal == HorizontalOffset::Center
            && self.vertical_shift == 0
            && self.vertical_indirection.is_none()
    }
}

/// An expression in a stencil body.
///
/// Rule: all variants end with a capital `E`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    /// A prefix operator applied to an operand.
    UnaryE {
        /// Operator, e.g. `-` or `!`.
        op: String,
        /// Operand.
        operand: Box<Expr>,
    },
    /// A binary operation.
    BinaryE {
        /// Left operand.
        left: Box<Expr>,
        /// Operator, e.g. `+`.
        op: String,
        /// Right operand.
        right: Box<Expr>,
    },
    /// An assignment, `left op right`.
    AssignE {
        /// Assigned place, a field or variable access.
        left: Box<Expr>,
        /// Assignment operator, `=` or a compound one like `+=`.
        op: String,
        /// Assigned value.
        right: Box<Expr>,
    },
    /// A conditional expression.
    TernaryE {
        /// Condition.
        cond: Box<Expr>,
        /// Value when the condition holds.
        left: Box<Expr>,
        /// Value otherwise.
        right: Box<Expr>,
    },
    /// A call to a math function.
    CallE {
        /// Name of the callee.
        callee: String,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// A local variable access.
    VarE {
        /// Variable name.
        name: String,
        /// Index, when the variable is an array.
        index: Option<Box<Expr>>,
    },
    /// A field access.
    FieldE {
        /// Field name.
        name: String,
        /// Where the field is touched, relative to the iteration point.
        offset: AccessOffset,
    },
    /// A literal value.
    LitE {
        /// Textual value, kept verbatim for the backends.
        value: String,
        /// Scalar type of the literal.
        typ: BuiltinType,
    },
    /// A fold over the values sitting on the neighbors of the iteration
    /// point.
    ReduceE {
        /// Folding operator, e.g. `+` or `max`.
        op: String,
        /// Expression evaluated once per neighbor.
        rhs: Box<Expr>,
        /// Initial value of the fold.
        init: Box<Expr>,
        /// Locations visited, from the iteration location to the neighbors.
        chain: NeighborChain,
        /// Whether the iteration point itself is visited too.
        include_center: bool,
    },
}

/// An expression, together with its location in the stencil description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    /// What the expression is.
    pub kind: ExprKind,
    /// Where it sits.
    pub loc: SourceLocation,
}

impl Expr {
    /// Creates an expression at the unknown location.
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            loc: SourceLocation::default(),
        }
    }

    /// Attaches a location to this expression.
    pub fn at(mut self, loc: SourceLocation) -> Self {
        self.loc = loc;
        self
    }

    /// Sees this expression as an assignment.
    ///
    /// Returns: `(left, op, right)`.
    ///
    /// # Errors
    /// Returns `None` if the expression is not an assignment.
    pub fn as_assign(&self) -> Option<(&Expr, &str, &Expr)> {
        if let AssignE { left, op, right } = &self.kind {
            Some((left, op, right))
        } else {
            None
        }
    }

    /// Sees this expression as a field access.
    ///
    /// Returns: `(name, offset)`.
    ///
    /// # Errors
    /// Returns `None` if the expression is not a field access.
    pub fn as_field_access(&self) -> Option<(&str, &AccessOffset)> {
        if let FieldE { name, offset } = &self.kind {
            Some((name, offset))
        } else {
            None
        }
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Self::new(kind)
    }
}

/// Shortcut to create a plain, undisplaced field access.
pub fn field_access(name: impl ToString) -> Expr {
    Expr::new(FieldE {
        name: name.to_string(),
        offset: AccessOffset::default(),
    })
}

/// Shortcut to create a field access shifted along the vertical axis.
pub fn field_access_at(name: impl ToString, vertical_shift: i32) -> Expr {
    Expr::new(FieldE {
        name: name.to_string(),
        offset: AccessOffset {
            vertical_shift,
            ..AccessOffset::default()
        },
    })
}

/// Shortcut to create a field access reading the level stored in
/// `indirection`, plus `vertical_shift`.
pub fn indirected_field_access(
    name: impl ToString,
    vertical_shift: i32,
    indirection: impl ToString,
) -> Expr {
    Expr::new(FieldE {
        name: name.to_string(),
        offset: AccessOffset {
            horizontal: HorizontalOffset::Center,
            vertical_shift,
            vertical_indirection: Some(indirection.to_string()),
        },
    })
}

/// Shortcut to create the neighbor-side field access of a reduction.
pub fn neighbor_field_access(name: impl ToString) -> Expr {
    Expr::new(FieldE {
        name: name.to_string(),
        offset: AccessOffset {
            horizontal: HorizontalOffset::Neighbor,
            ..AccessOffset::default()
        },
    })
}

/// Shortcut to create a variable access.
pub fn var(name: impl ToString) -> Expr {
    Expr::new(VarE {
        name: name.to_string(),
        index: None,
    })
}

/// Shortcut to create a literal.
pub fn lit(value: impl ToString, typ: BuiltinType) -> Expr {
    Expr::new(LitE {
        value: value.to_string(),
        typ,
    })
}

/// Shortcut to create a double precision literal.
pub fn double(value: f64) -> Expr {
    lit(format!("{value:?}"), BuiltinType::Double)
}

/// Shortcut to create a unary operation.
pub fn unary(op: impl ToString, operand: Expr) -> Expr {
    Expr::new(UnaryE {
        op: op.to_string(),
        operand: boxed(operand),
    })
}

/// Shortcut to create a binary operation.
pub fn binary(left: Expr, op: impl ToString, right: Expr) -> Expr {
    Expr::new(BinaryE {
        left: boxed(left),
        op: op.to_string(),
        right: boxed(right),
    })
}

/// Shortcut to create a conditional expression.
pub fn ternary(cond: Expr, left: Expr, right: Expr) -> Expr {
    Expr::new(TernaryE {
        cond: boxed(cond),
        left: boxed(left),
        right: boxed(right),
    })
}

/// Shortcut to create a call.
pub fn call(callee: impl ToString, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::new(CallE {
        callee: callee.to_string(),
        args: args.into_iter().collect(),
    })
}

/// Shortcut to create a plain `left = right` assignment.
pub fn assign(left: Expr, right: Expr) -> Expr {
    Expr::new(AssignE {
        left: boxed(left),
        op: "=".to_string(),
        right: boxed(right),
    })
}

/// Shortcut to create a fold over the neighbors reached through `chain`.
pub fn reduce(
    op: impl ToString,
    rhs: Expr,
    init: Expr,
    chain: impl IntoIterator<Item = LocationType>,
) -> Expr {
    Expr::new(ReduceE {
        op: op.to_string(),
        rhs: boxed(rhs),
        init: boxed(init),
        chain: chain.into_iter().collect(),
        include_center: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_access_has_zero_offset() {
        let expr = field_access("in");
        let (name, offset) = expr.as_field_access().unwrap();
        assert_eq!(name, "in");
        assert!(offset.is_zero());
    }

    #[test]
    fn indirected_access_is_not_zero() {
        let expr = indirected_field_access("in", 1, "vert_nbh");
        let (_, offset) = expr.as_field_access().unwrap();
        assert!(!offset.is_zero());
        assert_eq!(offset.vertical_shift, 1);
        assert_eq!(offset.vertical_indirection.as_deref(), Some("vert_nbh"));
    }

    #[test]
    fn assignment_accessor() {
        let expr = assign(field_access("out"), field_access_at("in", -1));
        let (left, op, right) = expr.as_assign().unwrap();
        assert_eq!(op, "=");
        assert_eq!(left.as_field_access().unwrap().0, "out");
        assert_eq!(right.as_field_access().unwrap().1.vertical_shift, -1);
    }

    #[test]
    fn double_keeps_the_decimal_point() {
        assert!(matches!(&double(3.0).kind, LitE { value, .. } if value == "3.0"));
    }
}
