//! Lowering stencils from the SIR down to the IIR.

use crate::error::{Error, Result};
use crate::iir::{FieldInfo, MultiStage, Stage, StencilInstantiation};
use crate::sir::stencil::Stencil;
use crate::sir::stmt::StmtKind;

/// Lowers one stencil at a time down to a `StencilInstantiation`.
pub(crate) struct Lowerer {}

impl Lowerer {
    /// Creates a new lowerer.
    pub fn new() -> Self {
        Self {}
    }

    /// Lowers `stencil`.
    ///
    /// Each top-level vertical region becomes one multistage holding a
    /// single stage with a single do-method. Stage names and locations
    /// start unset, the passes fill them in.
    ///
    /// # Errors
    /// Errors on any top-level statement that is not a vertical region.
    pub fn lower(&mut self, stencil: &Stencil) -> Result<StencilInstantiation> {
        let mut multistages = vec![];
        for stmt in &stencil.ast.statements {
            let StmtKind::RegionS(region) = &stmt.kind else {
                return Err(Error::semantic(
                    "only vertical regions may appear at the top level of a stencil",
                    stmt.loc,
                ));
            };
            multistages.push(MultiStage::new(
                region.loop_order.into(),
                vec![Stage::new(region.interval, region.ast.statements.clone())],
            ));
        }

        Ok(StencilInstantiation {
            name: stencil.name.clone(),
            fields: stencil
                .fields
                .iter()
                .map(|field| FieldInfo {
                    name: field.name.clone(),
                    dimensions: field.dimensions.clone(),
                    is_temporary: field.is_temporary,
                })
                .collect(),
            multistages,
        })
    }
}
