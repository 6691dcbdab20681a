//! Naming the unnamed stages.

use crate::error::Result;
use crate::iir::StencilInstantiation;

/// Gives every unnamed stage a `<stencil>_ms<i>_s<j>` name, after its
/// position in the instantiation. The generated kernels reuse these names.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    let stencil = &instantiation.name;
    for (i, multistage) in instantiation.multistages.iter_mut().enumerate() {
        for (j, stage) in multistage.stages.iter_mut().enumerate() {
            if stage.name.is_none() {
                stage.name = Some(format!("{stencil}_ms{i}_s{j}"));
            }
        }
    }
    Ok(())
}
