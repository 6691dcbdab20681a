//! Statements of stencil bodies, and shortcuts to build them.

use serde::{Deserialize, Serialize};

use super::expr::{assign, AccessOffset, BuiltinType, Expr};
use super::interval::Interval;
use super::loc::SourceLocation;
use super::region::{LoopOrder, VerticalRegion};
use super::Ast;
use crate::utils::boxed;
use StmtKind::*;

/// A statement in a stencil body.
///
/// Rule: all variants end with a capital `S`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtKind {
    /// A braced sequence of statements.
    BlockS(Vec<Stmt>),
    /// An expression evaluated for its effect, typically an assignment.
    ExprS(Expr),
    /// A local variable declaration.
    DeclareS {
        /// Variable name.
        name: String,
        /// Scalar type of the variable.
        typ: BuiltinType,
        /// Initialization operator, `=` in virtually all cases.
        op: String,
        /// Initializers. Several of them make the variable an array.
        init: Vec<Expr>,
    },
    /// A conditional statement.
    IfS {
        /// Condition.
        cond: Expr,
        /// Statement executed when the condition holds.
        then: Box<Stmt>,
        /// Statement executed otherwise, if any.
        otherwise: Option<Box<Stmt>>,
    },
    /// A vertical region: a body iterated over an interval of levels.
    RegionS(VerticalRegion),
}

/// A statement, together with its location in the stencil description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    /// What the statement is.
    pub kind: StmtKind,
    /// Where it sits.
    pub loc: SourceLocation,
}

impl Stmt {
    /// Creates a statement at the unknown location.
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            loc: SourceLocation::default(),
        }
    }

    /// Attaches a location to this statement.
    pub fn at(mut self, loc: SourceLocation) -> Self {
        self.loc = loc;
        self
    }

    /// Sees this statement as an expression statement.
    ///
    /// # Errors
    /// Returns `None` if the statement is not an expression statement.
    pub fn as_expr(&self) -> Option<&Expr> {
        if let ExprS(expr) = &self.kind {
            Some(expr)
        } else {
            None
        }
    }

    /// Sees this statement as a vertical region.
    ///
    /// # Errors
    /// Returns `None` if the statement is not a vertical region.
    pub fn as_region(&self) -> Option<&VerticalRegion> {
        if let RegionS(region) = &self.kind {
            Some(region)
        } else {
            None
        }
    }

    /// Sees this statement as an assignment statement.
    ///
    /// Returns: `(left, op, right)`.
    ///
    /// # Errors
    /// Returns `None` if the statement is not an assignment.
    pub fn as_assign(&self) -> Option<(&Expr, &str, &Expr)> {
        self.as_expr()?.as_assign()
    }
}

impl From<StmtKind> for Stmt {
    fn from(kind: StmtKind) -> Self {
        Self::new(kind)
    }
}

/// Shortcut to create an expression statement.
pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::new(ExprS(expr))
}

/// Shortcut to create a `left = right` statement.
pub fn assign_stmt(left: Expr, right: Expr) -> Stmt {
    expr_stmt(assign(left, right))
}

/// Shortcut to create a braced block of statements.
pub fn block_stmt(stmts: impl IntoIterator<Item = Stmt>) -> Stmt {
    Stmt::new(BlockS(stmts.into_iter().collect()))
}

/// Shortcut to create a variable declaration.
pub fn declare_stmt(
    name: impl ToString,
    typ: BuiltinType,
    init: impl IntoIterator<Item = Expr>,
) -> Stmt {
    Stmt::new(DeclareS {
        name: name.to_string(),
        typ,
        op: "=".to_string(),
        init: init.into_iter().collect(),
    })
}

/// Shortcut to create a conditional statement.
pub fn if_stmt(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Stmt {
    Stmt::new(IfS {
        cond,
        then: boxed(then),
        otherwise: otherwise.map(boxed),
    })
}

/// Shortcut to create a vertical region statement.
pub fn vertical_region_stmt(ast: Ast, interval: Interval, loop_order: LoopOrder) -> Stmt {
    Stmt::new(RegionS(VerticalRegion {
        ast,
        interval,
        loop_order,
    }))
}

/// Walks a statement and hands every field write in it to `f`.
///
/// A write is the left-hand side of an assignment whose target is a field
/// access.
pub fn for_each_write(stmt: &Stmt, f: &mut impl FnMut(&str, &AccessOffset)) {
    match &stmt.kind {
        BlockS(stmts) => {
            for stmt in stmts {
                for_each_write(stmt, f);
            }
        }
        ExprS(expr) => {
            if let Some((left, _, _)) = expr.as_assign() {
                if let Some((name, offset)) = left.as_field_access() {
                    f(name, offset);
                }
            }
        }
        IfS {
            then, otherwise, ..
        } => {
            for_each_write(then, f);
            if let Some(otherwise) = otherwise {
                for_each_write(otherwise, f);
            }
        }
        DeclareS { .. } => (),
        RegionS(region) => {
            for stmt in &region.ast.statements {
                for_each_write(stmt, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::expr::{field_access, field_access_at};
    use super::*;

    #[test]
    fn assignment_accessor() {
        let stmt = assign_stmt(field_access("out"), field_access_at("in", 1));
        let (left, op, _) = stmt.as_assign().unwrap();
        assert_eq!(op, "=");
        assert_eq!(left.as_field_access().unwrap().0, "out");
    }

    #[test]
    fn writes_are_found_inside_conditionals() {
        let stmt = if_stmt(
            field_access("flag"),
            assign_stmt(field_access("a"), field_access("in")),
            Some(assign_stmt(field_access("b"), field_access("in"))),
        );
        let mut written = vec![];
        for_each_write(&stmt, &mut |name, _| written.push(name.to_string()));
        assert_eq!(written, ["a", "b"]);
    }
}
