//! Stencil compiler library for unstructured meshes.
//!
//! Takes a [`sir::Program`], lowers every stencil down to its IIR, runs a
//! configurable pass pipeline over it and generates C++ or CUDA code.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Instant;

// Defined first so that the macros can be used in the other modules.
#[macro_use]
pub mod context;

mod codegen;
pub mod config;
pub mod error;
pub mod examples;
pub mod iir;
mod lowering;
pub mod passes;
pub mod sir;
mod utils;
mod validating;

pub use codegen::Backend;
pub use config::Config;
pub use context::Context;
pub use error::{Error, Result};
pub use passes::{default_pass_groups, run_pass_groups, PassGroup};
pub use steps::{generate, lower, optimize, validate};

/// Compiles `program` down to `backend` source code, running the `groups`
/// pass pipeline over every stencil in between.
pub fn compile(
    ctx: &Context,
    program: &sir::Program,
    groups: &[PassGroup],
    backend: Backend,
) -> Result<String> {
    validate(ctx, program)?;
    let mut instantiations = vec![];
    for stencil in &program.stencils {
        let mut instantiation = lower(ctx, stencil)?;
        optimize(ctx, &mut instantiation, groups)?;
        instantiations.push(instantiation);
    }
    generate(ctx, &instantiations, backend)
}

mod steps {
    //! Defining the functions for all the steps of the compiler.

    use std::io::Write;

    use super::*;
    use crate::iir::StencilInstantiation;
    use crate::sir::{Program, Stencil};

    /// Checks a given program.
    ///
    /// If it returns successfully, the program is semantically sound: every
    /// accessed field is declared, indirections go through plain vertically
    /// masked fields and no region interval is trivially empty.
    pub fn validate(ctx: &Context, program: &Program) -> Result<()> {
        verbose_print!(ctx, "Validating...");
        std::io::stdout().flush()?;
        let start = Instant::now();
        let res = crate::validating::validate(program);
        verbose_println!(ctx, "\rValidated [{:?}]", start.elapsed());
        res
    }

    /// Lowers a given stencil down to its IIR.
    ///
    /// Under the hood, this function is in charge of allocating a new
    /// `Lowerer` and launching it on your stencil.
    pub fn lower(ctx: &Context, stencil: &Stencil) -> Result<StencilInstantiation> {
        verbose_print!(ctx, "Lowering...");
        std::io::stdout().flush()?;
        let start = Instant::now();
        let mut lowerer = crate::lowering::Lowerer::new();
        let res = lowerer.lower(stencil);
        verbose_println!(ctx, "\rLowered [{:?}]", start.elapsed());
        res
    }

    /// Runs the `groups` pass pipeline over a lowered stencil, in order.
    ///
    /// Each group reports its own wall time in verbose mode.
    pub fn optimize(
        ctx: &Context,
        instantiation: &mut StencilInstantiation,
        groups: &[PassGroup],
    ) -> Result<()> {
        run_pass_groups(ctx, instantiation, groups)
    }

    /// Generates `backend` source code for the optimized stencils.
    pub fn generate(
        ctx: &Context,
        instantiations: &[StencilInstantiation],
        backend: Backend,
    ) -> Result<String> {
        verbose_print!(ctx, "Generating {backend} code...");
        std::io::stdout().flush()?;
        let start = Instant::now();
        let res = crate::codegen::generate(instantiations, backend);
        verbose_println!(ctx, "\rGenerated {backend} code [{:?}]", start.elapsed());
        res
    }
}
