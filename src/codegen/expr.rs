//! Rendering statements and expressions to C++.
//!
//! Everything here is backend-independent: the two access forms whose
//! spelling depends on the data layout, field accesses and neighbor
//! reductions, are delegated to an [`AccessPrinter`].

use super::cxx::SourceWriter;
use crate::error::{Error, Result};
use crate::sir::expr::{AccessOffset, BuiltinType, Expr, ExprKind};
use crate::sir::field::LocationType;
use crate::sir::stmt::{Stmt, StmtKind};

/// How a backend renders the accesses of its data layout.
pub(crate) trait AccessPrinter {
    /// Renders a field access.
    fn field_access(&mut self, name: &str, offset: &AccessOffset) -> Result<String>;

    /// Renders a fold of `rhs` over the neighbors reached through `chain`.
    fn reduction(
        &mut self,
        op: &str,
        rhs: &Expr,
        init: &Expr,
        chain: &[LocationType],
        include_center: bool,
    ) -> Result<String>;

    /// Emits whatever the expressions rendered since the last flush need to
    /// run first, typically reduction loops. The default emits nothing.
    fn flush_hoisted(&mut self, _writer: &mut SourceWriter) {}
}

/// The C++ spelling of a scalar type.
pub(crate) fn cxx_type(typ: BuiltinType) -> &'static str {
    match typ {
        BuiltinType::Auto => "auto",
        BuiltinType::Boolean => "bool",
        BuiltinType::Integer => "int",
        BuiltinType::Float => "float",
        BuiltinType::Double => "::dawn::float_type",
    }
}

/// Whether a folding operator is spelled as a call (like `max`) rather than
/// as a compound assignment (like `+`).
pub(crate) fn op_is_call(op: &str) -> bool {
    op.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Renders one expression to a C++ expression string.
///
/// Compound operands are parenthesized instead of reconstructing precedence,
/// so the output always evaluates in tree order.
pub(crate) fn render_expr(expr: &Expr, printer: &mut impl AccessPrinter) -> Result<String> {
    Ok(match &expr.kind {
        ExprKind::UnaryE { op, operand } => format!("({op}{})", render_expr(operand, printer)?),
        ExprKind::BinaryE { left, op, right } => format!(
            "({} {op} {})",
            render_expr(left, printer)?,
            render_expr(right, printer)?
        ),
        ExprKind::AssignE { left, op, right } => format!(
            "{} {op} {}",
            render_expr(left, printer)?,
            render_expr(right, printer)?
        ),
        ExprKind::TernaryE { cond, left, right } => format!(
            "({} ? {} : {})",
            render_expr(cond, printer)?,
            render_expr(left, printer)?,
            render_expr(right, printer)?
        ),
        ExprKind::CallE { callee, args } => {
            let mut rendered = vec![];
            for arg in args {
                rendered.push(render_expr(arg, printer)?);
            }
            format!("{callee}({})", rendered.join(", "))
        }
        ExprKind::VarE { name, index } => match index {
            Some(index) => format!("{name}[{}]", render_expr(index, printer)?),
            None => name.clone(),
        },
        ExprKind::FieldE { name, offset } => printer.field_access(name, offset)?,
        ExprKind::LitE { value, .. } => value.clone(),
        ExprKind::ReduceE {
            op,
            rhs,
            init,
            chain,
            include_center,
        } => printer.reduction(op, rhs, init, chain, *include_center)?,
    })
}

/// Renders one statement into `writer`.
pub(crate) fn render_stmt(
    stmt: &Stmt,
    printer: &mut impl AccessPrinter,
    writer: &mut SourceWriter,
) -> Result<()> {
    match &stmt.kind {
        StmtKind::BlockS(stmts) => {
            writer.open("{");
            for stmt in stmts {
                render_stmt(stmt, printer, writer)?;
            }
            writer.close("}");
        }
        StmtKind::ExprS(expr) => {
            let line = format!("{};", render_expr(expr, printer)?);
            printer.flush_hoisted(writer);
            writer.line(line);
        }
        StmtKind::DeclareS {
            name,
            typ,
            op,
            init,
        } => match init.as_slice() {
            [] => writer.line(format!("{} {name};", cxx_type(*typ))),
            [single] => {
                let value = render_expr(single, printer)?;
                printer.flush_hoisted(writer);
                writer.line(format!("{} {name} {op} {value};", cxx_type(*typ)));
            }
            many => {
                let mut values = vec![];
                for value in many {
                    values.push(render_expr(value, printer)?);
                }
                printer.flush_hoisted(writer);
                writer.line(format!(
                    "{} {name}[{}] {op} {{{}}};",
                    cxx_type(*typ),
                    many.len(),
                    values.join(", ")
                ));
            }
        },
        StmtKind::IfS {
            cond,
            then,
            otherwise,
        } => {
            let cond = render_expr(cond, printer)?;
            printer.flush_hoisted(writer);
            writer.open(format!("if({cond}) {{"));
            render_body(then, printer, writer)?;
            if let Some(otherwise) = otherwise {
                writer.reopen("} else {");
                render_body(otherwise, printer, writer)?;
            }
            writer.close("}");
        }
        StmtKind::RegionS(_) => {
            return Err(Error::CodeGen(
                "vertical region inside a stage body".to_string(),
            ))
        }
    }
    Ok(())
}

/// Renders the body of a branch, flattening a block into its children so
/// the output does not double its braces.
fn render_body(
    stmt: &Stmt,
    printer: &mut impl AccessPrinter,
    writer: &mut SourceWriter,
) -> Result<()> {
    if let StmtKind::BlockS(stmts) = &stmt.kind {
        for stmt in stmts {
            render_stmt(stmt, printer, writer)?;
        }
        Ok(())
    } else {
        render_stmt(stmt, printer, writer)
    }
}
