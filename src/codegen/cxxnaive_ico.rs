//! Reference C++ backend over unstructured meshes.
//!
//! Emits one templated class per stencil, usable with any mesh library that
//! implements the unstructured interface: `getCells(LibTag{}, mesh)` style
//! iteration, field types like `::dawn::cell_field_t` indexed by element and
//! level, and a generic `reduce` over neighbor chains.

use itertools::Itertools;
use unindent::Unindent;

use super::cxx::{
    interval_groups, location_plural, lower_bound, shifted, stage_location, upper_bound,
    SourceWriter,
};
use super::expr::{op_is_call, render_expr, render_stmt, AccessPrinter};
use crate::error::{Error, Result};
use crate::iir::{FieldInfo, LoopOrder, StencilInstantiation};
use crate::sir::expr::{AccessOffset, Expr, HorizontalOffset};
use crate::sir::field::LocationType;

/// Generates the naive translation unit of a whole program.
pub(crate) fn generate(instantiations: &[StencilInstantiation]) -> Result<String> {
    let mut writer = SourceWriter::new();
    writer.raw(
        "
        #define DAWN_GENERATED 1
        #undef DAWN_BACKEND_T
        #define DAWN_BACKEND_T CXXNAIVEICO
        #include <driver-includes/unstructured_interface.hpp>
        namespace dawn_generated {
        namespace cxxnaiveico {
        "
        .unindent(),
    );
    for instantiation in instantiations {
        writer.blank();
        stencil_class(&mut writer, instantiation)?;
    }
    writer.line("} // namespace cxxnaiveico");
    writer.line("} // namespace dawn_generated");
    writer.finish()
}

/// The runtime reference type of a field.
fn field_type(field: &FieldInfo) -> &'static str {
    match field.dimensions.dense_location {
        None => "::dawn::vertical_field_t<LibTag, ::dawn::float_type>",
        Some(LocationType::Cell) => "::dawn::cell_field_t<LibTag, ::dawn::float_type>",
        Some(LocationType::Edge) => "::dawn::edge_field_t<LibTag, ::dawn::float_type>",
        Some(LocationType::Vertex) => "::dawn::vertex_field_t<LibTag, ::dawn::float_type>",
    }
}

/// Emits the templated class of one stencil.
fn stencil_class(writer: &mut SourceWriter, instantiation: &StencilInstantiation) -> Result<()> {
    if let Some(field) = instantiation.fields.iter().find(|field| field.is_temporary) {
        return Err(Error::Unsupported(format!(
            "temporary field `{}`",
            field.name
        )));
    }
    writer.line("template <typename LibTag>");
    writer.open(format!("class {} {{", instantiation.name));
    writer.line("::dawn::mesh_t<LibTag> const& m_mesh;");
    writer.line("int m_k_size;");
    for field in &instantiation.fields {
        writer.line(format!("{}& m_{};", field_type(field), field.name));
    }
    writer.reopen("public:");

    let mut params = vec![
        "::dawn::mesh_t<LibTag> const& mesh".to_string(),
        "int k_size".to_string(),
    ];
    let mut inits = vec!["m_mesh(mesh)".to_string(), "m_k_size(k_size)".to_string()];
    for field in &instantiation.fields {
        params.push(format!("{}& {}", field_type(field), field.name));
        inits.push(format!("m_{0}({0})", field.name));
    }
    writer.line(format!(
        "{}({}) : {} {{}}",
        instantiation.name,
        params.join(", "),
        inits.join(", ")
    ));

    writer.blank();
    writer.open("void run() {");
    writer.line("using ::dawn::deref;");
    for (i, multistage) in instantiation.multistages.iter().enumerate() {
        writer.line(format!("// multistage {i} ({})", multistage.loop_order));
        writer.open("{");
        for group in interval_groups(&multistage.stages) {
            let lower = lower_bound(&group.interval, "m_k_size");
            let upper = upper_bound(&group.interval, "m_k_size");
            let k_loop = match multistage.loop_order {
                LoopOrder::Backward => format!("for(int k = {upper}; k >= {lower}; --k) {{"),
                _ => format!("for(int k = {lower}; k <= {upper}; ++k) {{"),
            };
            writer.open(k_loop);
            for (stage, do_method) in &group.bodies {
                let location = stage_location(stage)?;
                if let Some(name) = &stage.name {
                    writer.line(format!("// stage {name}"));
                }
                writer.open(format!(
                    "for(auto const& loc : get{}(LibTag{{}}, m_mesh)) {{",
                    location_plural(location)
                ));
                let mut printer = NaivePrinter {
                    fields: &instantiation.fields,
                    reduction: None,
                };
                for stmt in &do_method.statements {
                    render_stmt(stmt, &mut printer, writer)?;
                }
                writer.close("}");
            }
            writer.close("}");
        }
        writer.close("}");
    }
    writer.close("}");
    writer.close("};");
    Ok(())
}

/// Renders accesses against the reference field types.
struct NaivePrinter<'a> {
    /// Fields of the stencil, for their dimensions.
    fields: &'a [FieldInfo],
    /// Target location of the enclosing reduction, if any.
    reduction: Option<LocationType>,
}

impl NaivePrinter<'_> {
    /// Looks a field up by name.
    fn field(&self, name: &str) -> Result<&FieldInfo> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::CodeGen(format!("unknown field `{name}`")))
    }

    /// Renders the vertical coordinate of an access.
    fn level(&self, offset: &AccessOffset) -> Result<String> {
        let base = match &offset.vertical_indirection {
            None => "k".to_string(),
            Some(lookup) => {
                let read = match self.field(lookup)?.dimensions.dense_location {
                    None => format!("m_{lookup}(k)"),
                    Some(_) => format!("m_{lookup}(deref(LibTag{{}}, loc), k)"),
                };
                format!("(int) {read}")
            }
        };
        Ok(shifted(base, offset.vertical_shift))
    }
}

impl AccessPrinter for NaivePrinter<'_> {
    fn field_access(&mut self, name: &str, offset: &AccessOffset) -> Result<String> {
        let field = self.field(name)?;
        let level = self.level(offset)?;
        Ok(match field.dimensions.dense_location {
            None => format!("m_{name}({level})"),
            Some(_) => {
                let element = match offset.horizontal {
                    HorizontalOffset::Center => "deref(LibTag{}, loc)",
                    HorizontalOffset::Neighbor => {
                        if self.reduction.is_none() {
                            return Err(Error::CodeGen(format!(
                                "neighbor access to `{name}` outside of a reduction"
                            )));
                        }
                        "deref(LibTag{}, red_loc)"
                    }
                };
                format!("m_{name}({element}, {level})")
            }
        })
    }

    fn reduction(
        &mut self,
        op: &str,
        rhs: &Expr,
        init: &Expr,
        chain: &[LocationType],
        include_center: bool,
    ) -> Result<String> {
        if include_center {
            return Err(Error::Unsupported(
                "reductions including the center".to_string(),
            ));
        }
        if self.reduction.is_some() {
            return Err(Error::Unsupported("nested reductions".to_string()));
        }
        let Some(target) = chain.last() else {
            return Err(Error::CodeGen(
                "reduction with an empty neighbor chain".to_string(),
            ));
        };
        let init = render_expr(init, self)?;
        self.reduction = Some(*target);
        let rhs = render_expr(rhs, self);
        self.reduction = None;
        let rhs = rhs?;
        let fold = if op_is_call(op) {
            format!("lhs = {op}(lhs, {rhs});")
        } else {
            format!("lhs {op}= {rhs};")
        };
        let chain = chain
            .iter()
            .map(|location| format!("::dawn::LocationType::{}", location_plural(*location)))
            .join(", ");
        Ok(format!(
            "reduce(LibTag{{}}, m_mesh, loc, {init}, std::vector<::dawn::LocationType>{{{chain}}}, [&](auto& lhs, auto red_loc) {{ {fold} return lhs; }})"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::examples;
    use crate::lowering::Lowerer;
    use crate::passes::{default_pass_groups, run_pass_groups};
    use crate::sir::field::unstructured_dimensions;
    use crate::sir::Program;
    use crate::Config;

    /// Lowers and optimizes every stencil of `program` with the default
    /// passes.
    fn optimized(program: &Program) -> Vec<StencilInstantiation> {
        let ctx = Context::new(Config::default());
        program
            .stencils
            .iter()
            .map(|stencil| {
                let mut instantiation = Lowerer::new().lower(stencil).unwrap();
                run_pass_groups(&ctx, &mut instantiation, &default_pass_groups()).unwrap();
                instantiation
            })
            .collect()
    }

    #[test]
    fn the_indirected_program_reads_levels_through_the_lookup() {
        let code = generate(&optimized(&examples::vertical_indirection())).unwrap();
        assert!(code.contains("template <typename LibTag>"));
        assert!(code.contains("class vertical_indirection_stencil {"));
        assert!(code.contains("for(auto const& loc : getCells(LibTag{}, m_mesh)) {"));
        assert!(code.contains("(int) m_vert_nbh(deref(LibTag{}, loc), k)"));
        assert!(code.contains("(int) m_vert_nbh(deref(LibTag{}, loc), k) + 1"));
    }

    #[test]
    fn the_smoother_walks_the_column_interior() {
        let code = generate(&optimized(&examples::smoother())).unwrap();
        assert!(code
            .contains("for(int k = 1; k <= ( m_k_size == 0 ? 0 : (m_k_size - 1)) + -1; ++k) {"));
        assert!(code.contains("m_in(deref(LibTag{}, loc), k - 1)"));
        assert!(code.contains("m_in(deref(LibTag{}, loc), k + 1)"));
    }

    #[test]
    fn reductions_use_the_generic_reduce() {
        let code = generate(&optimized(&examples::neighbor_sum())).unwrap();
        assert!(code.contains("for(auto const& loc : getEdges(LibTag{}, m_mesh)) {"));
        assert!(code.contains(
            "reduce(LibTag{}, m_mesh, loc, 0.0, \
             std::vector<::dawn::LocationType>{::dawn::LocationType::Edges, \
             ::dawn::LocationType::Cells}, [&](auto& lhs, auto red_loc) \
             { lhs += m_in(deref(LibTag{}, red_loc), k); return lhs; })"
        ));
    }

    #[test]
    fn temporaries_are_rejected() {
        let instantiation = StencilInstantiation {
            name: "scratch_user".to_string(),
            fields: vec![FieldInfo {
                name: "tmp".to_string(),
                dimensions: unstructured_dimensions(LocationType::Cell, true),
                is_temporary: true,
            }],
            multistages: vec![],
        };
        assert!(matches!(
            generate(&[instantiation]),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn unlocated_stages_are_refused() {
        let program = examples::smoother();
        let instantiation = Lowerer::new().lower(&program.stencils[0]).unwrap();
        assert!(matches!(generate(&[instantiation]), Err(Error::CodeGen(_))));
    }
}
