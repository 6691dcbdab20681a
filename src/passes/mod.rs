//! Optimization passes over the IIR.
//!
//! One pass group = one file.

use std::fmt;
use std::io::Write;
use std::time::Instant;

use crate::context::Context;
use crate::error::Result;
use crate::iir::StencilInstantiation;

mod caches;
mod loop_order;
mod multistage_merger;
mod stage_location;
mod stage_merger;
mod stage_name;
mod stage_reordering;

/// One group of the pass pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassGroup {
    /// Name the unnamed stages.
    SetStageName,
    /// Cluster stages with matching location types.
    StageReordering,
    /// Fuse adjacent compatible stages.
    StageMerger,
    /// Infer the location type every stage iterates over.
    SetStageLocationType,
    /// Set up register caches for repeatedly read fields.
    SetNonTempCaches,
    /// Demote vertically independent multistages to parallel.
    SetLoopOrder,
    /// Fuse adjacent compatible multistages.
    MultiStageMerger,
}

impl fmt::Display for PassGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The pass list run when the caller asks for nothing special.
pub fn default_pass_groups() -> Vec<PassGroup> {
    use PassGroup::*;
    vec![SetStageName, StageReordering, StageMerger, SetStageLocationType]
}

/// Runs `groups` over `instantiation`, in order.
pub fn run_pass_groups(
    ctx: &Context,
    instantiation: &mut StencilInstantiation,
    groups: &[PassGroup],
) -> Result<()> {
    for &group in groups {
        run_group(ctx, instantiation, group)?;
    }
    Ok(())
}

/// Runs one pass group, tracing its wall time in verbose mode.
fn run_group(
    ctx: &Context,
    instantiation: &mut StencilInstantiation,
    group: PassGroup,
) -> Result<()> {
    verbose_print!(ctx, "Running {group}...");
    std::io::stdout().flush()?;
    let start = Instant::now();
    match group {
        PassGroup::SetStageName => stage_name::run(instantiation),
        PassGroup::StageReordering => stage_reordering::run(instantiation),
        PassGroup::StageMerger => stage_merger::run(instantiation),
        PassGroup::SetStageLocationType => stage_location::run(instantiation),
        PassGroup::SetNonTempCaches => caches::run(instantiation),
        PassGroup::SetLoopOrder => loop_order::run(instantiation),
        PassGroup::MultiStageMerger => multistage_merger::run(instantiation),
    }?;
    verbose_println!(ctx, "\rRan {group} [{:?}]", start.elapsed());
    Ok(())
}
