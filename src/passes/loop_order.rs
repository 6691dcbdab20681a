//! Demoting vertically independent multistages to parallel.

use crate::error::Result;
use crate::iir::{LoopOrder, StencilInstantiation};

/// Marks a multistage `Parallel` when its levels cannot see each other: no
/// field written in the multistage is also touched at a nonzero or undefined
/// vertical extent there.
///
/// An indirected read of a written field has an undefined extent, so such a
/// multistage always keeps its sequential order.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    for multistage in &mut instantiation.multistages {
        let accesses = multistage.accesses();
        let levels_independent = accesses.writes.keys().all(|name| {
            accesses
                .extents_of(name)
                .map_or(true, |extents| extents.vertical.is_zero())
        });
        if levels_independent {
            multistage.loop_order = LoopOrder::Parallel;
        }
    }
    Ok(())
}
