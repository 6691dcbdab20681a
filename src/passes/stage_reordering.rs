//! Clustering stages with matching location types.

use super::stage_location::write_location;
use crate::error::Result;
use crate::iir::{Accesses, StencilInstantiation};
use crate::sir::field::LocationType;

/// Bubbles independent stages around so that stages iterating over the same
/// location type end up adjacent, which gives the stage merger its chances.
///
/// A stage moves above its predecessor only when the two are independent
/// (no field written by one and accessed by the other) and the swap makes
/// its location match the stage before. Any dependency pins the order.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    let fields = &instantiation.fields;
    for multistage in &mut instantiation.multistages {
        let stages = &mut multistage.stages;
        let mut locations: Vec<Option<LocationType>> = Vec::with_capacity(stages.len());
        for stage in stages.iter() {
            locations.push(write_location(fields, stage)?);
        }
        let mut accesses: Vec<Accesses> = stages.iter().map(|stage| stage.accesses()).collect();

        // One sweep can unlock the next, never more sweeps than stages.
        for _ in 0..stages.len() {
            let mut swapped = false;
            for i in 2..stages.len() {
                let clusters = locations[i] == locations[i - 2] && locations[i] != locations[i - 1];
                if clusters && accesses[i].independent_from(&accesses[i - 1]) {
                    stages.swap(i - 1, i);
                    locations.swap(i - 1, i);
                    accesses.swap(i - 1, i);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iir::{FieldInfo, LoopOrder, MultiStage, Stage};
    use crate::sir::expr::{double, field_access, neighbor_field_access, reduce, Expr};
    use crate::sir::field::unstructured_dimensions;
    use crate::sir::interval::{interval, Interval, Level};
    use crate::sir::stmt::assign_stmt;
    use LocationType::*;

    /// A one-multistage instantiation writing `targets[i] = sources[i]` in
    /// one stage each, over cell/edge fields named after their location.
    fn sandwich(writes: &[(&str, &str)]) -> StencilInstantiation {
        let located = |name: &str| {
            let location = if name.starts_with('c') { Cell } else { Edge };
            FieldInfo {
                name: name.to_string(),
                dimensions: unstructured_dimensions(location, true),
                is_temporary: false,
            }
        };
        let column: Interval = interval(Level::Start, Level::End, 0, 0);
        let mut fields: Vec<FieldInfo> = vec![];
        let mut stages = vec![];
        for &(target, source) in writes {
            for name in [target, source] {
                if !fields.iter().any(|field| field.name == name) {
                    fields.push(located(name));
                }
            }
            let source: Expr = field_access(source);
            stages.push(Stage::new(
                column,
                vec![assign_stmt(field_access(target), source)],
            ));
        }
        StencilInstantiation {
            name: "sandwich".to_string(),
            fields,
            multistages: vec![MultiStage::new(LoopOrder::Forward, stages)],
        }
    }

    /// The written field of each stage, in order.
    fn order(instantiation: &StencilInstantiation) -> Vec<String> {
        instantiation.multistages[0]
            .stages
            .iter()
            .map(|stage| {
                let (name, _) = stage.do_methods[0].statements[0]
                    .as_assign()
                    .unwrap()
                    .0
                    .as_field_access()
                    .unwrap();
                name.to_string()
            })
            .collect()
    }

    #[test]
    fn independent_stages_cluster_by_location() {
        // cell, edge, cell with no dependencies: the trailing cell stage
        // hoists above the edge one.
        let mut instantiation = sandwich(&[("c_a", "c_in"), ("e_a", "e_in"), ("c_b", "c_in")]);
        run(&mut instantiation).unwrap();
        assert_eq!(order(&instantiation), ["c_a", "c_b", "e_a"]);
    }

    #[test]
    fn dependencies_pin_the_order() {
        let mut instantiation = sandwich(&[("c_a", "c_in"), ("e_a", "e_in"), ("c_b", "c_in")]);
        // Make the trailing cell stage read e_a through a reduction: it now
        // depends on the edge stage and may not hoist above it.
        instantiation.multistages[0].stages[2].do_methods[0].statements = vec![assign_stmt(
            field_access("c_b"),
            reduce("+", neighbor_field_access("e_a"), double(0.0), [Cell, Edge]),
        )];
        run(&mut instantiation).unwrap();
        assert_eq!(order(&instantiation), ["c_a", "e_a", "c_b"]);
    }
}
