//! Inferring the location type every stage iterates over.

use crate::error::{Error, Result};
use crate::iir::{FieldInfo, Stage, StencilInstantiation};
use crate::sir::field::LocationType;
use crate::sir::loc::SourceLocation;
use crate::sir::stmt::for_each_write;

/// Sets every stage's location to the dense location of the fields it
/// writes.
///
/// # Errors
/// Errors when the writes of a stage disagree on their location, or when a
/// stage writes no horizontal field at all.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    let fields = &instantiation.fields;
    for multistage in &mut instantiation.multistages {
        for stage in &mut multistage.stages {
            let Some(location) = write_location(fields, stage)? else {
                return Err(Error::semantic(
                    "cannot infer the location of a stage that writes no horizontal field",
                    stage_loc(stage),
                ));
            };
            stage.location = Some(location);
        }
    }
    Ok(())
}

/// The location a stage writes at: the agreeing dense location of every
/// horizontal field written by its statements.
///
/// Reductions write their chain source, which is the written field's dense
/// location already, so written fields cover them too.
pub(crate) fn write_location(
    fields: &[FieldInfo],
    stage: &Stage,
) -> Result<Option<LocationType>> {
    let mut found: Option<LocationType> = None;
    for do_method in &stage.do_methods {
        for stmt in &do_method.statements {
            let mut clash = None;
            for_each_write(stmt, &mut |name, _| {
                let location = fields
                    .iter()
                    .find(|field| field.name == name)
                    .and_then(|field| field.dimensions.dense_location);
                match (found, location) {
                    (Some(ours), Some(theirs)) if ours != theirs => clash = Some((ours, theirs)),
                    (None, Some(theirs)) => found = Some(theirs),
                    _ => (),
                }
            });
            if let Some((ours, theirs)) = clash {
                return Err(Error::semantic(
                    format!("stage writes both {ours} and {theirs} fields"),
                    stmt.loc,
                ));
            }
        }
    }
    Ok(found)
}

/// A reportable location for a stage: where its first statement sits.
fn stage_loc(stage: &Stage) -> SourceLocation {
    stage
        .do_methods
        .first()
        .and_then(|do_method| do_method.statements.first())
        .map(|stmt| stmt.loc)
        .unwrap_or_default()
}
