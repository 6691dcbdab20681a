//! Fusing adjacent compatible multistages.

use crate::error::Result;
use crate::iir::accesses::pointwise_between;
use crate::iir::{LoopOrder, StencilInstantiation};

/// Merges every multistage into its predecessor when their loop orders are
/// compatible and every dependency between the two is pointwise. Stages
/// concatenate and caches union.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    let multistages = &mut instantiation.multistages;
    let mut i = 1;
    while i < multistages.len() {
        let Some(order) = merged_order(multistages[i - 1].loop_order, multistages[i].loop_order)
        else {
            i += 1;
            continue;
        };
        if !pointwise_between(&multistages[i - 1].accesses(), &multistages[i].accesses()) {
            i += 1;
            continue;
        }
        let merged = multistages.remove(i);
        let target = &mut multistages[i - 1];
        target.loop_order = order;
        target.stages.extend(merged.stages);
        // A cached field cannot be written on the other side, that cross
        // dependency would not have been pointwise. Unioning windows is
        // enough.
        for cache in merged.caches {
            match target
                .caches
                .iter_mut()
                .find(|ours| ours.field == cache.field)
            {
                Some(ours) => ours.window = ours.window.merge(cache.window),
                None => target.caches.push(cache),
            }
        }
        // Stay put: the enlarged multistage may swallow the next one too.
    }
    Ok(())
}

/// The order a fused multistage would run in, if the two sides agree.
/// `Parallel` adopts the other side's order.
fn merged_order(first: LoopOrder, second: LoopOrder) -> Option<LoopOrder> {
    match (first, second) {
        (first, second) if first == second => Some(first),
        (LoopOrder::Parallel, other) | (other, LoopOrder::Parallel) => Some(other),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples::vertical_indirection;
    use crate::lowering::Lowerer;
    use crate::passes::{loop_order, stage_name};
    use LoopOrder::*;

    #[test]
    fn orders_fuse_with_parallel_as_a_wildcard() {
        assert_eq!(merged_order(Forward, Forward), Some(Forward));
        assert_eq!(merged_order(Parallel, Backward), Some(Backward));
        assert_eq!(merged_order(Forward, Parallel), Some(Forward));
        assert_eq!(merged_order(Parallel, Parallel), Some(Parallel));
        assert_eq!(merged_order(Forward, Backward), None);
    }

    #[test]
    fn the_driver_multistages_fuse_down_to_two() {
        let program = vertical_indirection();
        let mut lowered = Lowerer::new().lower(&program.stencils[0]).unwrap();
        stage_name::run(&mut lowered).unwrap();
        loop_order::run(&mut lowered).unwrap();
        run(&mut lowered).unwrap();

        // Bodies 1 to 4 fuse: every cross dependency (`out` and `vert_nbh`
        // writes against level-zero touches) is pointwise, and body 4's
        // one-up read of `vert_nbh` only pairs with its own write. Body 5
        // cannot join: the fused head touches `vert_nbh` one level up and
        // `in_out` at an undefined extent, both written by body 5. Body 6
        // then fuses with body 5 over their pointwise `vert_nbh` link.
        assert_eq!(lowered.multistages.len(), 2);
        assert_eq!(lowered.multistages[0].loop_order, Forward);
        assert_eq!(lowered.multistages[0].stages.len(), 4);
        assert_eq!(lowered.multistages[1].loop_order, Forward);
        assert_eq!(lowered.multistages[1].stages.len(), 2);
    }
}
