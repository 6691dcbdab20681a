//! Semantic checking of stencil descriptions.
//!
//! Runs before lowering, so that the passes and the backends can rely on
//! declared fields, well-formed indirections and consistent locations.

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::sir::expr::{Expr, ExprKind, HorizontalOffset};
use crate::sir::field::{Field, LocationType};
use crate::sir::loc::SourceLocation;
use crate::sir::program::Program;
use crate::sir::stencil::Stencil;
use crate::sir::stmt::{Stmt, StmtKind};

/// Checks a whole program.
///
/// # Errors
/// Returns the first semantic error found, carrying the location of the
/// offending node.
pub(crate) fn validate(program: &Program) -> Result<()> {
    for stencil in &program.stencils {
        Validator::new(stencil).check()?;
    }
    Ok(())
}

/// Checks one stencil.
struct Validator<'a> {
    /// The stencil under scrutiny.
    stencil: &'a Stencil,
}

impl<'a> Validator<'a> {
    /// Creates a new validator for `stencil`.
    fn new(stencil: &'a Stencil) -> Self {
        Self { stencil }
    }

    /// Runs every check on the stencil.
    fn check(&self) -> Result<()> {
        self.check_fields()?;
        for stmt in &self.stencil.ast.statements {
            self.check_stmt(stmt, false)?;
        }
        Ok(())
    }

    /// Checks the field declarations themselves.
    fn check_fields(&self) -> Result<()> {
        if let Some(field) = self
            .stencil
            .fields
            .iter()
            .duplicates_by(|field| field.name.clone())
            .next()
        {
            return Err(Error::semantic(
                format!("field `{}` is declared twice", field.name),
                field.loc,
            ));
        }
        Ok(())
    }

    /// Checks a statement. `in_region` tells whether we already are inside a
    /// vertical region.
    fn check_stmt(&self, stmt: &Stmt, in_region: bool) -> Result<()> {
        match &stmt.kind {
            StmtKind::BlockS(stmts) => {
                for stmt in stmts {
                    self.check_stmt(stmt, in_region)?;
                }
            }
            StmtKind::ExprS(expr) => {
                self.check_expr(expr, false)?;
            }
            StmtKind::DeclareS { init, .. } => {
                for expr in init {
                    self.check_expr(expr, false)?;
                }
            }
            StmtKind::IfS {
                cond,
                then,
                otherwise,
            } => {
                self.check_expr(cond, false)?;
                self.check_stmt(then, in_region)?;
                if let Some(otherwise) = otherwise {
                    self.check_stmt(otherwise, in_region)?;
                }
            }
            StmtKind::RegionS(region) => {
                if in_region {
                    return Err(Error::semantic("vertical regions cannot nest", stmt.loc));
                }
                for stmt in &region.ast.statements {
                    self.check_stmt(stmt, true)?;
                }
            }
        }
        Ok(())
    }

    /// Checks an expression and infers the dense location its operands
    /// agree on, if any. `in_reduction` tells whether we are on the neighbor
    /// side of a reduction.
    fn check_expr(&self, expr: &Expr, in_reduction: bool) -> Result<Option<LocationType>> {
        match &expr.kind {
            ExprKind::UnaryE { operand, .. } => self.check_expr(operand, in_reduction),
            ExprKind::BinaryE { left, right, .. } => {
                let left = self.check_expr(left, in_reduction)?;
                let right = self.check_expr(right, in_reduction)?;
                self.join(left, right, expr.loc)
            }
            ExprKind::AssignE { left, right, .. } => {
                self.check_write(left)?;
                let left = self.check_expr(left, in_reduction)?;
                let right = self.check_expr(right, in_reduction)?;
                self.join(left, right, expr.loc)
            }
            ExprKind::TernaryE { cond, left, right } => {
                let cond = self.check_expr(cond, in_reduction)?;
                let left = self.check_expr(left, in_reduction)?;
                let right = self.check_expr(right, in_reduction)?;
                let values = self.join(left, right, expr.loc)?;
                self.join(cond, values, expr.loc)
            }
            ExprKind::CallE { args, .. } => {
                let mut joined = None;
                for arg in args {
                    let arg = self.check_expr(arg, in_reduction)?;
                    joined = self.join(joined, arg, expr.loc)?;
                }
                Ok(joined)
            }
            ExprKind::VarE { index, .. } => {
                if let Some(index) = index {
                    self.check_expr(index, in_reduction)?;
                }
                Ok(None)
            }
            ExprKind::FieldE { name, offset } => {
                let field = self.field(name, expr.loc)?;
                if let Some(lookup) = &offset.vertical_indirection {
                    let lookup = self.field(lookup, expr.loc)?;
                    if !lookup.dimensions.mask_k {
                        return Err(Error::semantic(
                            format!(
                                "vertical indirection `{}` must be a vertically masked field",
                                lookup.name
                            ),
                            expr.loc,
                        ));
                    }
                }
                if offset.horizontal == HorizontalOffset::Neighbor && !in_reduction {
                    return Err(Error::semantic(
                        format!("neighbor access to `{name}` outside of a reduction"),
                        expr.loc,
                    ));
                }
                Ok(field.dimensions.dense_location)
            }
            ExprKind::LitE { .. } => Ok(None),
            ExprKind::ReduceE {
                rhs, init, chain, ..
            } => {
                let [source, .., target] = chain.as_slice() else {
                    return Err(Error::semantic(
                        "a reduction chain needs a source and a target location",
                        expr.loc,
                    ));
                };
                let init = self.check_expr(init, in_reduction)?;
                self.join(init, Some(*source), expr.loc)?;
                let rhs = self.check_expr(rhs, true)?;
                if let Some(rhs) = rhs {
                    if rhs != *target {
                        return Err(Error::semantic(
                            format!(
                                "the neighbor side of a {source} -> {target} reduction reads {rhs} fields"
                            ),
                            expr.loc,
                        ));
                    }
                }
                Ok(Some(*source))
            }
        }
    }

    /// Checks the left-hand side of an assignment: a plain field access at
    /// the iteration point, or a variable.
    fn check_write(&self, left: &Expr) -> Result<()> {
        match &left.kind {
            ExprKind::FieldE { name, offset } => {
                self.field(name, left.loc)?;
                if offset.vertical_indirection.is_some() {
                    return Err(Error::semantic(
                        format!("cannot write `{name}` through a vertical indirection"),
                        left.loc,
                    ));
                }
                if !offset.is_zero() {
                    return Err(Error::semantic(
                        format!("cannot write `{name}` away from the iteration point"),
                        left.loc,
                    ));
                }
                Ok(())
            }
            ExprKind::VarE { .. } => Ok(()),
            _ => Err(Error::semantic(
                "the left-hand side of an assignment must be a field or a variable",
                left.loc,
            )),
        }
    }

    /// Joins the locations of two operands, erroring on a mix.
    fn join(
        &self,
        left: Option<LocationType>,
        right: Option<LocationType>,
        at: SourceLocation,
    ) -> Result<Option<LocationType>> {
        match (left, right) {
            (Some(left), Some(right)) if left != right => Err(Error::semantic(
                format!("operands mix {left} and {right} fields"),
                at,
            )),
            (Some(left), _) => Ok(Some(left)),
            (None, right) => Ok(right),
        }
    }

    /// Looks a field up, erroring if it is not declared.
    fn field(&self, name: &str, at: SourceLocation) -> Result<&Field> {
        self.stencil
            .field(name)
            .ok_or_else(|| Error::semantic(format!("unknown field `{name}`"), at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples::vertical_indirection;
    use crate::sir::expr::{
        double, field_access, indirected_field_access, neighbor_field_access, reduce,
    };
    use crate::sir::field::{unstructured_dimensions, vertical_dimensions};
    use crate::sir::interval::{interval, Level};
    use crate::sir::program::GridType;
    use crate::sir::region::LoopOrder;
    use crate::sir::stmt::{assign_stmt, vertical_region_stmt};
    use crate::sir::{ast, field, program, stencil, Ast, Program, Stmt};
    use LocationType::*;

    /// Wraps `body` in a single forward region over the whole column.
    fn one_region(body: Vec<Stmt>) -> Ast {
        ast([vertical_region_stmt(
            body.into(),
            interval(Level::Start, Level::End, 0, 0),
            LoopOrder::Forward,
        )])
    }

    /// A one-stencil program over cell fields `in`, `out` and the vertically
    /// masked `vert_nbh`, with `body` as its only region.
    fn cells(body: Vec<Stmt>) -> Program {
        program(
            "cells.cpp",
            GridType::Unstructured,
            [stencil(
                "cells",
                one_region(body),
                ["in", "out", "vert_nbh"].map(|name| field(name, unstructured_dimensions(Cell, true))),
            )],
        )
    }

    #[test]
    fn the_driver_program_is_valid() {
        assert!(validate(&vertical_indirection()).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let program = cells(vec![assign_stmt(
            field_access("out"),
            field_access("missing"),
        )]);
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("unknown field `missing`"));
    }

    #[test]
    fn errors_point_at_the_offending_node() {
        let program = cells(vec![assign_stmt(
            field_access("out"),
            field_access("missing").at(SourceLocation::new(4, 17)),
        )]);
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("at 4:17"));
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let program = program(
            "dup.cpp",
            GridType::Unstructured,
            [stencil(
                "dup",
                one_region(vec![]),
                ["in", "in"].map(|name| field(name, unstructured_dimensions(Cell, true))),
            )],
        );
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn indirection_must_be_vertically_masked() {
        let program = program(
            "flat.cpp",
            GridType::Unstructured,
            [stencil(
                "flat",
                one_region(vec![assign_stmt(
                    field_access("out"),
                    indirected_field_access("in", 0, "lookup"),
                )]),
                [
                    field("in", unstructured_dimensions(Cell, true)),
                    field("out", unstructured_dimensions(Cell, true)),
                    field("lookup", unstructured_dimensions(Cell, false)),
                ],
            )],
        );
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("vertically masked"));
    }

    #[test]
    fn indirected_writes_are_rejected() {
        let program = cells(vec![assign_stmt(
            indirected_field_access("out", 0, "vert_nbh"),
            field_access("in"),
        )]);
        let err = validate(&program).unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot write `out` through a vertical indirection"));
    }

    #[test]
    fn shifted_writes_are_rejected() {
        let program = cells(vec![assign_stmt(
            crate::sir::expr::field_access_at("out", 1),
            field_access("in"),
        )]);
        let err = validate(&program).unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot write `out` away from the iteration point"));
    }

    #[test]
    fn location_mixes_are_rejected() {
        let program = program(
            "mixed.cpp",
            GridType::Unstructured,
            [stencil(
                "mixed",
                one_region(vec![assign_stmt(field_access("out"), field_access("in"))]),
                [
                    field("in", unstructured_dimensions(Edge, true)),
                    field("out", unstructured_dimensions(Cell, true)),
                ],
            )],
        );
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("mix"));
    }

    #[test]
    fn neighbor_access_needs_a_reduction() {
        let program = cells(vec![assign_stmt(
            field_access("out"),
            neighbor_field_access("in"),
        )]);
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("outside of a reduction"));
    }

    #[test]
    fn reductions_check_their_chain() {
        let short = cells(vec![assign_stmt(
            field_access("out"),
            reduce("+", neighbor_field_access("in"), double(0.0), [Cell]),
        )]);
        let err = validate(&short).unwrap_err();
        assert!(err.to_string().contains("reduction chain"));
    }

    #[test]
    fn reductions_read_the_chain_target() {
        let gather = |in_location| {
            program(
                "gather.cpp",
                GridType::Unstructured,
                [stencil(
                    "gather",
                    one_region(vec![assign_stmt(
                        field_access("out"),
                        reduce("+", neighbor_field_access("in"), double(0.0), [Edge, Cell]),
                    )]),
                    [
                        field("in", unstructured_dimensions(in_location, true)),
                        field("out", unstructured_dimensions(Edge, true)),
                    ],
                )],
            )
        };
        assert!(validate(&gather(Cell)).is_ok());
        let err = validate(&gather(Edge)).unwrap_err();
        assert!(err.to_string().contains("reduction reads"));
    }

    #[test]
    fn vertical_fields_join_with_anything() {
        let program = program(
            "column.cpp",
            GridType::Unstructured,
            [stencil(
                "column",
                one_region(vec![assign_stmt(field_access("out"), field_access("dz"))]),
                [
                    field("out", unstructured_dimensions(Cell, true)),
                    field("dz", vertical_dimensions()),
                ],
            )],
        );
        assert!(validate(&program).is_ok());
    }

    #[test]
    fn nested_regions_are_rejected() {
        let inner = vertical_region_stmt(
            ast([]),
            interval(Level::Start, Level::End, 0, 0),
            LoopOrder::Forward,
        );
        let program = cells(vec![inner]);
        let err = validate(&program).unwrap_err();
        assert!(err.to_string().contains("cannot nest"));
    }
}
