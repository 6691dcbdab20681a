//! Read-only visitor over stencil bodies.

use super::ast::Ast;
use super::expr::{Expr, ExprKind};
use super::region::VerticalRegion;
use super::stmt::{Stmt, StmtKind};

/// A read-only traversal of a stencil body.
///
/// Every method defaults to walking the children, so an implementor only
/// overrides the nodes it cares about (and calls the matching `walk_*`
/// function to keep descending).
pub trait Visitor {
    /// Visits a body.
    fn visit_ast(&mut self, ast: &Ast) {
        walk_ast(self, ast);
    }

    /// Visits a statement.
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Visits an expression.
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Visits a vertical region.
    fn visit_region(&mut self, region: &VerticalRegion) {
        walk_region(self, region);
    }
}

/// Walks the statements of a body.
pub fn walk_ast<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast) {
    for stmt in &ast.statements {
        visitor.visit_stmt(stmt);
    }
}

/// Walks the children of a statement.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::BlockS(stmts) => {
            for stmt in stmts {
                visitor.visit_stmt(stmt);
            }
        }
        StmtKind::ExprS(expr) => visitor.visit_expr(expr),
        StmtKind::DeclareS { init, .. } => {
            for expr in init {
                visitor.visit_expr(expr);
            }
        }
        StmtKind::IfS {
            cond,
            then,
            otherwise,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(then);
            if let Some(otherwise) = otherwise {
                visitor.visit_stmt(otherwise);
            }
        }
        StmtKind::RegionS(region) => visitor.visit_region(region),
    }
}

/// Walks the children of an expression.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::UnaryE { operand, .. } => visitor.visit_expr(operand),
        ExprKind::BinaryE { left, right, .. } | ExprKind::AssignE { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::TernaryE { cond, left, right } => {
            visitor.visit_expr(cond);
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::CallE { args, .. } => {
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::VarE { index, .. } => {
            if let Some(index) = index {
                visitor.visit_expr(index);
            }
        }
        ExprKind::FieldE { .. } | ExprKind::LitE { .. } => (),
        ExprKind::ReduceE { rhs, init, .. } => {
            visitor.visit_expr(rhs);
            visitor.visit_expr(init);
        }
    }
}

/// Walks the body of a vertical region.
pub fn walk_region<V: Visitor + ?Sized>(visitor: &mut V, region: &VerticalRegion) {
    visitor.visit_ast(&region.ast);
}
