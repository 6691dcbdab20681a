//! Driver building the vertical indirection stencil and compiling it with
//! the CUDA backend.

use anyhow::{Context as _, Result};
use clap::Parser;
use foehn_lib::{compile, default_pass_groups, Backend, Config, Context, PassGroup};

/// Path the generated code is written to.
const OUTPUT_PATH: &str = "vertical_indirection_stencil.cpp";

/// Compiles the vertical indirection stencil with the CUDA backend.
#[derive(Parser)]
struct Args {
    /// Print the stencil program as JSON
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let ctx = Context::new(Config {
        verbose: args.verbose,
    });

    let program = foehn_lib::examples::vertical_indirection();
    if args.verbose {
        println!("{}", foehn_lib::sir::to_json(&program)?);
    }

    // Extend the default passes by the non-standard ones that indirected
    // vertical reads could affect.
    let mut groups = default_pass_groups();
    groups.insert(1, PassGroup::MultiStageMerger);
    groups.insert(1, PassGroup::SetLoopOrder);
    groups.insert(1, PassGroup::SetNonTempCaches);

    let code = compile(&ctx, &program, &groups, Backend::CudaIco)
        .context("could not compile the vertical indirection stencil")?;

    println!("Writing generated code to '{OUTPUT_PATH}'");
    std::fs::write(OUTPUT_PATH, code)
        .with_context(|| format!("could not write '{OUTPUT_PATH}'"))?;
    Ok(())
}
