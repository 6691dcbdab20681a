//! Fusing adjacent compatible stages.

use super::stage_location::write_location;
use crate::error::Result;
use crate::iir::accesses::pointwise_between;
use crate::iir::{FieldInfo, Stage, StencilInstantiation};

/// Merges every stage into its predecessor when both run a single do-method
/// over the same interval, write at the same location, and every dependency
/// between the two is pointwise.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    let fields = &instantiation.fields;
    for multistage in &mut instantiation.multistages {
        let stages = &mut multistage.stages;
        let mut i = 1;
        while i < stages.len() {
            if !can_merge(fields, &stages[i - 1], &stages[i])? {
                i += 1;
                continue;
            }
            let mut merged = stages.remove(i);
            if let (Some(target), Some(source)) = (
                stages[i - 1].do_methods.first_mut(),
                merged.do_methods.first_mut(),
            ) {
                target.statements.append(&mut source.statements);
            }
            // Stay put: the enlarged stage may swallow the next one too.
        }
    }
    Ok(())
}

/// Can `second` fuse into `first`?
fn can_merge(fields: &[FieldInfo], first: &Stage, second: &Stage) -> Result<bool> {
    let ([first_dm], [second_dm]) = (first.do_methods.as_slice(), second.do_methods.as_slice())
    else {
        return Ok(false);
    };
    if first_dm.interval != second_dm.interval {
        return Ok(false);
    }
    if write_location(fields, first)? != write_location(fields, second)? {
        return Ok(false);
    }
    Ok(pointwise_between(
        &first_dm.accesses(),
        &second_dm.accesses(),
    ))
}
