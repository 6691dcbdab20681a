//! CUDA backend over unstructured meshes.
//!
//! Emits one `__global__` kernel per multistage and a host class per stencil
//! that launches them in order. Device fields are laid out K-major: level
//! `k` of element `e` of a cell field sits at `k * NumCells + e`. Sequential
//! multistages put the vertical loop inside the kernel; parallel ones map
//! levels to the second grid dimension.

use std::collections::BTreeSet;

use itertools::Itertools;
use unindent::Unindent;

use super::cxx::{
    interval_groups, location_plural, lower_bound, shifted, stage_location, upper_bound,
    IntervalGroup, SourceWriter,
};
use super::expr::{op_is_call, render_expr, render_stmt, AccessPrinter};
use crate::error::{Error, Result};
use crate::iir::{FieldInfo, KCache, LoopOrder, MultiStage, StencilInstantiation, VerticalExtent};
use crate::sir::expr::{AccessOffset, Expr, ExprKind, HorizontalOffset};
use crate::sir::field::{LocationType, NeighborChain};
use crate::sir::visit::{walk_expr, Visitor};

/// Generates the CUDA translation unit of a whole program.
pub(crate) fn generate(instantiations: &[StencilInstantiation]) -> Result<String> {
    let mut writer = SourceWriter::new();
    writer.raw(
        "
        #define DAWN_GENERATED 1
        #undef DAWN_BACKEND_T
        #define DAWN_BACKEND_T CUDAICO
        #include <algorithm>
        #include <driver-includes/cuda_utils.hpp>
        #include <driver-includes/defs.hpp>
        #include <driver-includes/math.hpp>
        #include <driver-includes/unstructured_interface.hpp>
        #define BLOCK_SIZE 128
        #define DEVICE_MISSING_VALUE -1
        "
        .unindent(),
    );
    let mut all_chains = BTreeSet::new();
    for instantiation in instantiations {
        for multistage in &instantiation.multistages {
            all_chains.extend(chains_of(multistage));
        }
    }
    for chain in &all_chains {
        writer.line(format!(
            "#define {} {}",
            chain_size_macro(chain),
            chain_size(chain)?
        ));
    }
    writer.line("namespace dawn_generated {");
    writer.line("namespace cuda_ico {");
    for instantiation in instantiations {
        if let Some(field) = instantiation.fields.iter().find(|field| field.is_temporary) {
            return Err(Error::Unsupported(format!(
                "temporary field `{}`",
                field.name
            )));
        }
        let mut envs = vec![];
        for multistage in &instantiation.multistages {
            envs.push(kernel_env(instantiation, multistage)?);
        }
        for (i, (multistage, env)) in instantiation.multistages.iter().zip(&envs).enumerate() {
            writer.blank();
            kernel(&mut writer, instantiation, i, multistage, env)?;
        }
        writer.blank();
        host_class(&mut writer, instantiation, &envs)?;
    }
    writer.line("} // namespace cuda_ico");
    writer.line("} // namespace dawn_generated");
    writer.finish()
}

/// Looks a field up by name.
fn field_info<'a>(fields: &'a [FieldInfo], name: &str) -> Result<&'a FieldInfo> {
    fields
        .iter()
        .find(|field| field.name == name)
        .ok_or_else(|| Error::CodeGen(format!("unknown field `{name}`")))
}

/// Initials of a chain, the stem of its table name (`ec` gives `ecTable`).
fn chain_initials(chain: &[LocationType]) -> String {
    chain
        .iter()
        .map(|location| match location {
            LocationType::Cell => 'c',
            LocationType::Edge => 'e',
            LocationType::Vertex => 'v',
        })
        .collect()
}

/// Name of the neighbor table of a chain.
fn chain_table(chain: &[LocationType]) -> String {
    format!("{}Table", chain_initials(chain))
}

/// Name of the macro holding the neighbor count of a chain.
fn chain_size_macro(chain: &[LocationType]) -> String {
    let letters = chain
        .iter()
        .map(|location| match location {
            LocationType::Cell => "C",
            LocationType::Edge => "E",
            LocationType::Vertex => "V",
        })
        .join("_");
    format!("{letters}_SIZE")
}

/// Neighbor count of a direct chain on a triangle mesh.
fn chain_size(chain: &[LocationType]) -> Result<usize> {
    match chain {
        [source, _] => Ok(match source {
            LocationType::Cell => 3,
            LocationType::Edge => 2,
            LocationType::Vertex => 6,
        }),
        _ => Err(Error::Unsupported(
            "neighbor chains through more than two locations".to_string(),
        )),
    }
}

/// Collects the neighbor chains of every reduction under the visited nodes.
#[derive(Default)]
struct ChainCollector {
    /// Chains seen, in a stable order.
    chains: BTreeSet<NeighborChain>,
}

impl Visitor for ChainCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::ReduceE { chain, .. } = &expr.kind {
            self.chains.insert(chain.clone());
        }
        walk_expr(self, expr);
    }
}

/// All neighbor chains reduced over inside a multistage.
fn chains_of(multistage: &MultiStage) -> BTreeSet<NeighborChain> {
    let mut collector = ChainCollector::default();
    for stage in &multistage.stages {
        for do_method in &stage.do_methods {
            for stmt in &do_method.statements {
                collector.visit_stmt(stmt);
            }
        }
    }
    collector.chains
}

/// Everything one kernel touches, driving its parameter list.
struct KernelEnv<'a> {
    /// Locations whose element counts the kernel needs, ordered.
    counts: Vec<LocationType>,
    /// Locations its stages iterate over, ordered and deduplicated.
    stage_locations: Vec<LocationType>,
    /// Neighbor chains it reduces over, ordered.
    chains: Vec<NeighborChain>,
    /// Fields it touches, in declaration order, with writability.
    fields: Vec<(&'a FieldInfo, bool)>,
}

impl KernelEnv<'_> {
    /// The comma-joined parameter list of the kernel.
    fn params(&self) -> String {
        let mut params = vec![];
        for location in &self.counts {
            params.push(format!("int Num{}", location_plural(*location)));
        }
        params.push("int kSize".to_string());
        for chain in &self.chains {
            params.push(format!("const int* {}", chain_table(chain)));
        }
        for (field, written) in &self.fields {
            params.push(if *written {
                format!("::dawn::float_type* __restrict__ {}", field.name)
            } else {
                format!("const ::dawn::float_type* __restrict__ {}", field.name)
            });
        }
        params.join(", ")
    }
}

/// Computes what the kernel of `multistage` needs from the host.
fn kernel_env<'a>(
    instantiation: &'a StencilInstantiation,
    multistage: &MultiStage,
) -> Result<KernelEnv<'a>> {
    let accesses = multistage.accesses();
    let mut fields = vec![];
    for field in &instantiation.fields {
        let written = accesses.writes.contains_key(&field.name);
        if written || accesses.reads.contains_key(&field.name) {
            fields.push((field, written));
        }
    }
    let mut stage_locations = BTreeSet::new();
    for stage in &multistage.stages {
        stage_locations.insert(stage_location(stage)?);
    }
    let mut counts = stage_locations.clone();
    for (field, _) in &fields {
        if let Some(location) = field.dimensions.dense_location {
            counts.insert(location);
        }
    }
    Ok(KernelEnv {
        counts: counts.into_iter().collect(),
        stage_locations: stage_locations.into_iter().collect(),
        chains: chains_of(multistage).into_iter().collect(),
        fields,
    })
}

/// Emits the kernel of one multistage.
fn kernel(
    writer: &mut SourceWriter,
    instantiation: &StencilInstantiation,
    index: usize,
    multistage: &MultiStage,
    env: &KernelEnv,
) -> Result<()> {
    writer.open(format!(
        "__global__ void {}_ms{index}_kernel({}) {{",
        instantiation.name,
        env.params()
    ));
    writer.line("unsigned int pidx = blockIdx.x * blockDim.x + threadIdx.x;");
    let uniform = match env.stage_locations.as_slice() {
        [single] => Some(*single),
        _ => None,
    };
    if let Some(location) = uniform {
        writer.open(format!("if(pidx >= Num{}) {{", location_plural(location)));
        writer.line("return;");
        writer.close("}");
    }
    let groups = interval_groups(&multistage.stages);
    // A register window only works against a single marching k-loop.
    let caches = if multistage.loop_order.is_parallel() || groups.len() != 1 {
        &[]
    } else {
        multistage.caches.as_slice()
    };
    let mut printer = CudaPrinter {
        fields: &instantiation.fields,
        caches,
        reduction: None,
        pending: vec![],
        counter: 0,
    };
    if multistage.loop_order.is_parallel() {
        writer.line("int kIter = blockIdx.y * blockDim.y + threadIdx.y;");
        for group in &groups {
            let lower = lower_bound(&group.interval, "kSize");
            let upper = upper_bound(&group.interval, "kSize");
            writer.open(format!("if(kIter >= {lower} && kIter <= {upper}) {{"));
            stage_bodies(writer, &mut printer, group, uniform.is_some())?;
            writer.close("}");
        }
    } else {
        let backward = matches!(multistage.loop_order, LoopOrder::Backward);
        for group in &groups {
            let lower = lower_bound(&group.interval, "kSize");
            let upper = upper_bound(&group.interval, "kSize");
            let first = if backward { &upper } else { &lower };
            for cache in caches {
                fill_cache(writer, &instantiation.fields, cache, first)?;
            }
            let k_loop = if backward {
                format!("for(int kIter = {upper}; kIter >= {lower}; kIter--) {{")
            } else {
                format!("for(int kIter = {lower}; kIter <= {upper}; kIter++) {{")
            };
            writer.open(k_loop);
            stage_bodies(writer, &mut printer, group, uniform.is_some())?;
            for cache in caches {
                slide_cache(writer, &instantiation.fields, cache, backward)?;
            }
            writer.close("}");
        }
    }
    writer.close("}");
    Ok(())
}

/// Emits the statements of the bodies of one interval group.
///
/// With `uniform` set, the kernel-level guard already filtered the threads
/// and the bodies run bare. Otherwise every stage guards its own element
/// count.
fn stage_bodies(
    writer: &mut SourceWriter,
    printer: &mut CudaPrinter,
    group: &IntervalGroup,
    uniform: bool,
) -> Result<()> {
    for (stage, do_method) in &group.bodies {
        let location = stage_location(stage)?;
        if let Some(name) = &stage.name {
            writer.line(format!("// stage {name}"));
        }
        if !uniform {
            writer.open(format!("if(pidx < Num{}) {{", location_plural(location)));
        }
        for stmt in &do_method.statements {
            render_stmt(stmt, printer, writer)?;
        }
        if !uniform {
            writer.close("}");
        }
    }
    Ok(())
}

/// The static window of a cache.
fn cache_window(cache: &KCache) -> Result<(i32, i32)> {
    match cache.window {
        VerticalExtent::Defined { minus, plus } => Ok((minus, plus)),
        VerticalExtent::Undefined => Err(Error::CodeGen(format!(
            "cache on `{}` has no static window",
            cache.field
        ))),
    }
}

/// The element of `field` at the absolute level `level`.
fn at_level(field: &FieldInfo, level: &str) -> String {
    match field.dimensions.dense_location {
        Some(location) => format!(
            "{}[{level} * Num{} + pidx]",
            field.name,
            location_plural(location)
        ),
        None => format!("{}[{level}]", field.name),
    }
}

/// Emits the declaration and initial fill of one cache, centered on the
/// first level the loop will process.
fn fill_cache(
    writer: &mut SourceWriter,
    fields: &[FieldInfo],
    cache: &KCache,
    first: &str,
) -> Result<()> {
    let (minus, plus) = cache_window(cache)?;
    let width = plus - minus + 1;
    let field = field_info(fields, &cache.field)?;
    writer.line(format!(
        "::dawn::float_type {}_kcache[{width}];",
        cache.field
    ));
    writer.open(format!("for(int kw = 0; kw < {width}; kw++) {{"));
    writer.line(format!("int klev = {} + kw;", shifted(first, minus)));
    writer.line(format!(
        "{}_kcache[kw] = (klev >= 0 && klev < kSize) ? {} : (::dawn::float_type)0.0;",
        cache.field,
        at_level(field, "klev")
    ));
    writer.close("}");
    Ok(())
}

/// Emits the end-of-level slide of one cache at the bottom of the k-loop.
fn slide_cache(
    writer: &mut SourceWriter,
    fields: &[FieldInfo],
    cache: &KCache,
    backward: bool,
) -> Result<()> {
    let (minus, plus) = cache_window(cache)?;
    let width = plus - minus + 1;
    let field = field_info(fields, &cache.field)?;
    writer.open("{");
    if backward {
        writer.open(format!("for(int kw = {}; kw > 0; kw--) {{", width - 1));
        writer.line(format!("{0}_kcache[kw] = {0}_kcache[kw - 1];", cache.field));
        writer.close("}");
        writer.line(format!("int klev = {};", shifted("kIter - 1", minus)));
        writer.line(format!(
            "{}_kcache[0] = (klev >= 0 && klev < kSize) ? {} : (::dawn::float_type)0.0;",
            cache.field,
            at_level(field, "klev")
        ));
    } else {
        writer.open(format!("for(int kw = 0; kw < {}; kw++) {{", width - 1));
        writer.line(format!("{0}_kcache[kw] = {0}_kcache[kw + 1];", cache.field));
        writer.close("}");
        writer.line(format!("int klev = {};", shifted("kIter + 1", plus)));
        writer.line(format!(
            "{}_kcache[{}] = (klev >= 0 && klev < kSize) ? {} : (::dawn::float_type)0.0;",
            cache.field,
            width - 1,
            at_level(field, "klev")
        ));
    }
    writer.close("}");
    Ok(())
}

/// Emits the host class owning the device pointers and launching the
/// kernels in multistage order.
fn host_class(
    writer: &mut SourceWriter,
    instantiation: &StencilInstantiation,
    envs: &[KernelEnv],
) -> Result<()> {
    let mut counts = BTreeSet::new();
    let mut chains = BTreeSet::new();
    for env in envs {
        counts.extend(env.counts.iter().copied());
        chains.extend(env.chains.iter().cloned());
    }
    writer.open(format!("class {} {{", instantiation.name));
    for location in &counts {
        writer.line(format!("int m_num_{};", count_suffix(*location)));
    }
    writer.line("int m_k_size;");
    for chain in &chains {
        writer.line(format!("const int* m_{}_table;", chain_initials(chain)));
    }
    for field in &instantiation.fields {
        writer.line(format!("::dawn::float_type* m_{};", field.name));
    }
    writer.reopen("public:");
    let mut params = vec![];
    let mut inits = vec![];
    for location in &counts {
        params.push(format!("int num_{}", count_suffix(*location)));
        inits.push(format!("m_num_{0}(num_{0})", count_suffix(*location)));
    }
    params.push("int k_size".to_string());
    inits.push("m_k_size(k_size)".to_string());
    for chain in &chains {
        params.push(format!("const int* {}_table", chain_initials(chain)));
        inits.push(format!("m_{0}_table({0}_table)", chain_initials(chain)));
    }
    for field in &instantiation.fields {
        params.push(format!("::dawn::float_type* {}", field.name));
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
    writer.line("dim3 dB(BLOCK_SIZE, 1, 1);");
    for (i, (multistage, env)) in instantiation.multistages.iter().zip(envs).enumerate() {
        writer.line(format!("// multistage {i} ({})", multistage.loop_order));
        writer.open("{");
        let elements = env
            .stage_locations
            .iter()
            .map(|location| format!("m_num_{}", count_suffix(*location)))
            .reduce(|a, b| format!("std::max({a}, {b})"))
            .unwrap_or_else(|| "0".to_string());
        let k_blocks = if multistage.loop_order.is_parallel() {
            "m_k_size"
        } else {
            "1"
        };
        writer.line(format!(
            "dim3 dG(({elements} + BLOCK_SIZE - 1) / BLOCK_SIZE, {k_blocks}, 1);"
        ));
        let mut args = vec![];
        for location in &env.counts {
            args.push(format!("m_num_{}", count_suffix(*location)));
        }
        args.push("m_k_size".to_string());
        for chain in &env.chains {
            args.push(format!("m_{}_table", chain_initials(chain)));
        }
        for (field, _) in &env.fields {
            args.push(format!("m_{}", field.name));
        }
        writer.line(format!(
            "{}_ms{i}_kernel<<<dG, dB>>>({});",
            instantiation.name,
            args.join(", ")
        ));
        writer.line("gpuErrchk(cudaPeekAtLastError());");
        writer.line("gpuErrchk(cudaDeviceSynchronize());");
        writer.close("}");
    }
    writer.close("}");
    writer.close("};");
    Ok(())
}

/// The lowercase plural of a location, for host-side member names.
fn count_suffix(location: LocationType) -> &'static str {
    match location {
        LocationType::Cell => "cells",
        LocationType::Edge => "edges",
        LocationType::Vertex => "vertices",
    }
}

/// A reduction loop waiting to be emitted ahead of its statement.
struct PendingReduction {
    /// Variable receiving the fold.
    name: String,
    /// Rendered initial value.
    init: String,
    /// Rendered per-neighbor update.
    update: String,
    /// Macro naming the neighbor count of the chain.
    size: String,
    /// Neighbor table of the chain.
    table: String,
}

/// Renders accesses against the K-major device layout.
struct CudaPrinter<'a> {
    /// Fields of the stencil, for their dimensions.
    fields: &'a [FieldInfo],
    /// Caches active in the current kernel.
    caches: &'a [KCache],
    /// Target location of the enclosing reduction, if any.
    reduction: Option<LocationType>,
    /// Reduction loops not yet emitted.
    pending: Vec<PendingReduction>,
    /// Reductions rendered so far, for variable naming.
    counter: usize,
}

impl CudaPrinter<'_> {
    /// Renders the vertical coordinate of an access, parenthesized so it
    /// can multiply a stride.
    fn level(&self, offset: &AccessOffset) -> Result<String> {
        let base = match &offset.vertical_indirection {
            None => "kIter".to_string(),
            Some(lookup) => match field_info(self.fields, lookup)?.dimensions.dense_location {
                None => format!("(int){lookup}[kIter]"),
                Some(location) => format!(
                    "(int){lookup}[kIter * Num{} + pidx]",
                    location_plural(location)
                ),
            },
        };
        Ok(match offset.vertical_shift {
            0 => base,
            shift if shift > 0 => format!("({base} + {shift})"),
            shift => format!("({base} - {})", -shift),
        })
    }
}

impl AccessPrinter for CudaPrinter<'_> {
    fn field_access(&mut self, name: &str, offset: &AccessOffset) -> Result<String> {
        let field = field_info(self.fields, name)?;
        if offset.vertical_indirection.is_none() && offset.horizontal == HorizontalOffset::Center {
            if let Some(cache) = self.caches.iter().find(|cache| cache.field == name) {
                let (minus, _) = cache_window(cache)?;
                return Ok(format!("{name}_kcache[{}]", offset.vertical_shift - minus));
            }
        }
        let level = self.level(offset)?;
        Ok(match field.dimensions.dense_location {
            None => format!("{name}[{level}]"),
            Some(location) => {
                let element = match offset.horizontal {
                    HorizontalOffset::Center => "pidx",
                    HorizontalOffset::Neighbor => {
                        if self.reduction.is_none() {
                            return Err(Error::CodeGen(format!(
                                "neighbor access to `{name}` outside of a reduction"
                            )));
                        }
                        "nbhIdx"
                    }
                };
                format!(
                    "{name}[{level} * Num{} + {element}]",
                    location_plural(location)
                )
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
        let [_, .., target] = chain else {
            return Err(Error::CodeGen(
                "reduction without a neighbor chain".to_string(),
            ));
        };
        let init = render_expr(init, self)?;
        self.reduction = Some(*target);
        let rhs = render_expr(rhs, self);
        self.reduction = None;
        let rhs = rhs?;
        let name = format!("red_{}", self.counter);
        self.counter += 1;
        let update = if op_is_call(op) {
            format!("{name} = {op}({name}, {rhs});")
        } else {
            format!("{name} {op}= {rhs};")
        };
        self.pending.push(PendingReduction {
            name: name.clone(),
            init,
            update,
            size: chain_size_macro(chain),
            table: chain_table(chain),
        });
        Ok(name)
    }

    fn flush_hoisted(&mut self, writer: &mut SourceWriter) {
        for reduction in std::mem::take(&mut self.pending) {
            writer.line(format!(
                "::dawn::float_type {} = {};",
                reduction.name, reduction.init
            ));
            writer.open(format!(
                "for(int nbhIter = 0; nbhIter < {}; nbhIter++) {{",
                reduction.size
            ));
            writer.line(format!(
                "int nbhIdx = {}[pidx * {} + nbhIter];",
                reduction.table, reduction.size
            ));
            writer.open("if(nbhIdx == DEVICE_MISSING_VALUE) {");
            writer.line("continue;");
            writer.close("}");
            writer.line(reduction.update);
            writer.close("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::examples;
    use crate::iir::Stage;
    use crate::lowering::Lowerer;
    use crate::passes::{default_pass_groups, run_pass_groups, PassGroup};
    use crate::sir::expr::{double, field_access, neighbor_field_access, reduce};
    use crate::sir::field::unstructured_dimensions;
    use crate::sir::interval::{interval, Level};
    use crate::sir::stmt::assign_stmt;
    use crate::sir::Program;
    use crate::Config;

    /// Lowers and optimizes every stencil of `program` with `groups`.
    fn optimized(program: &Program, groups: &[PassGroup]) -> Vec<StencilInstantiation> {
        let ctx = Context::new(Config::default());
        program
            .stencils
            .iter()
            .map(|stencil| {
                let mut instantiation = Lowerer::new().lower(stencil).unwrap();
                run_pass_groups(&ctx, &mut instantiation, groups).unwrap();
                instantiation
            })
            .collect()
    }

    /// The pass list the indirection driver runs.
    fn driver_groups() -> Vec<PassGroup> {
        let mut groups = default_pass_groups();
        groups.insert(1, PassGroup::MultiStageMerger);
        groups.insert(1, PassGroup::SetLoopOrder);
        groups.insert(1, PassGroup::SetNonTempCaches);
        groups
    }

    #[test]
    fn the_indirected_program_compiles_to_two_kernels() {
        let code = generate(&optimized(
            &examples::vertical_indirection(),
            &driver_groups(),
        ))
        .unwrap();
        assert_eq!(code.matches("__global__ void").count(), 2);
        assert!(code.contains(
            "__global__ void vertical_indirection_stencil_ms0_kernel(int NumCells, int kSize, \
             const ::dawn::float_type* __restrict__ in, \
             ::dawn::float_type* __restrict__ in_out, \
             ::dawn::float_type* __restrict__ out, \
             ::dawn::float_type* __restrict__ vert_nbh) {"
        ));
        assert!(code.contains(
            "__global__ void vertical_indirection_stencil_ms1_kernel(int NumCells, int kSize, \
             ::dawn::float_type* __restrict__ in, \
             ::dawn::float_type* __restrict__ in_out, \
             ::dawn::float_type* __restrict__ vert_nbh) {"
        ));
        assert!(code.contains("if(pidx >= NumCells) {"));
        // Both merged multistages march forward over the whole column.
        assert!(code
            .contains("for(int kIter = 0; kIter <= ( kSize == 0 ? 0 : (kSize - 1)) + 0; kIter++) {"));
        assert!(code.contains(
            "out[kIter * NumCells + pidx] = in[(int)vert_nbh[kIter * NumCells + pidx] * NumCells + pidx];"
        ));
        assert!(code.contains("in[((int)vert_nbh[kIter * NumCells + pidx] + 1) * NumCells + pidx]"));
        assert!(code.contains(
            "in[kIter * NumCells + pidx] = in[((int)vert_nbh[kIter * NumCells + pidx] - 1) * NumCells + pidx];"
        ));
        // Indirection-involved fields never get a register window.
        assert!(!code.contains("_kcache"));
        assert!(code.contains(
            "vertical_indirection_stencil_ms0_kernel<<<dG, dB>>>(m_num_cells, m_k_size, m_in, m_in_out, m_out, m_vert_nbh);"
        ));
        assert!(code.contains(
            "vertical_indirection_stencil_ms1_kernel<<<dG, dB>>>(m_num_cells, m_k_size, m_in, m_in_out, m_vert_nbh);"
        ));
    }

    #[test]
    fn parallel_kernels_map_levels_to_the_grid() {
        let mut groups = default_pass_groups();
        groups.insert(1, PassGroup::SetLoopOrder);
        let code = generate(&optimized(&examples::smoother(), &groups)).unwrap();
        assert!(code.contains("int kIter = blockIdx.y * blockDim.y + threadIdx.y;"));
        assert!(code.contains("if(kIter >= 1 && kIter <= ( kSize == 0 ? 0 : (kSize - 1)) + -1) {"));
        assert!(code.contains("dim3 dG((m_num_cells + BLOCK_SIZE - 1) / BLOCK_SIZE, m_k_size, 1);"));
    }

    #[test]
    fn sequential_kernels_keep_a_register_window() {
        let mut groups = default_pass_groups();
        groups.insert(1, PassGroup::SetNonTempCaches);
        let code = generate(&optimized(&examples::smoother(), &groups)).unwrap();
        assert!(code.contains("::dawn::float_type in_kcache[3];"));
        assert!(code.contains(
            "in_kcache[kw] = (klev >= 0 && klev < kSize) ? in[klev * NumCells + pidx] : (::dawn::float_type)0.0;"
        ));
        assert!(code.contains(
            "out[kIter * NumCells + pidx] = (((in_kcache[0] + in_kcache[1]) + in_kcache[2]) / 3.0);"
        ));
        assert!(code.contains("in_kcache[kw] = in_kcache[kw + 1];"));
    }

    #[test]
    fn reductions_loop_over_the_neighbor_table() {
        let code = generate(&optimized(&examples::neighbor_sum(), &default_pass_groups())).unwrap();
        assert!(code.contains("#define E_C_SIZE 2"));
        assert!(code.contains("const int* ecTable"));
        assert!(code.contains("::dawn::float_type red_0 = 0.0;"));
        assert!(code.contains("int nbhIdx = ecTable[pidx * E_C_SIZE + nbhIter];"));
        assert!(code.contains("if(nbhIdx == DEVICE_MISSING_VALUE) {"));
        assert!(code.contains("red_0 += in[kIter * NumCells + nbhIdx];"));
        assert!(code.contains("out[kIter * NumEdges + pidx] = red_0;"));
    }

    #[test]
    fn long_chains_are_not_supported() {
        let column = interval(Level::Start, Level::End, 0, 0);
        let mut stage = Stage::new(
            column,
            vec![assign_stmt(
                field_access("out"),
                reduce(
                    "+",
                    neighbor_field_access("in"),
                    double(0.0),
                    [LocationType::Edge, LocationType::Cell, LocationType::Vertex],
                ),
            )],
        );
        stage.location = Some(LocationType::Edge);
        let instantiation = StencilInstantiation {
            name: "diamond".to_string(),
            fields: vec![
                FieldInfo {
                    name: "in".to_string(),
                    dimensions: unstructured_dimensions(LocationType::Vertex, true),
                    is_temporary: false,
                },
                FieldInfo {
                    name: "out".to_string(),
                    dimensions: unstructured_dimensions(LocationType::Edge, true),
                    is_temporary: false,
                },
            ],
            multistages: vec![MultiStage::new(LoopOrder::Forward, vec![stage])],
        };
        assert!(matches!(
            generate(&[instantiation]),
            Err(Error::Unsupported(_))
        ));
    }
}
