//! Code generation: turning optimized stencils into compilable C++.
//!
//! One backend = one file. The expression renderer is shared, each backend
//! plugs its own access layout into it.

use std::fmt;

use crate::error::Result;
use crate::iir::StencilInstantiation;

mod cuda_ico;
mod cxx;
mod cxxnaive_ico;
mod expr;

/// Target of code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Templated reference C++, one loop nest per multistage.
    CxxNaiveIco,
    /// CUDA over unstructured meshes, one kernel per multistage.
    CudaIco,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::CxxNaiveIco => write!(f, "c++-naive-ico"),
            Backend::CudaIco => write!(f, "cuda-ico"),
        }
    }
}

/// Generates the full translation unit of `instantiations` for `backend`.
pub(crate) fn generate(
    instantiations: &[StencilInstantiation],
    backend: Backend,
) -> Result<String> {
    match backend {
        Backend::CxxNaiveIco => cxxnaive_ico::generate(instantiations),
        Backend::CudaIco => cuda_ico::generate(instantiations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_display_their_target() {
        assert_eq!(Backend::CxxNaiveIco.to_string(), "c++-naive-ico");
        assert_eq!(Backend::CudaIco.to_string(), "cuda-ico");
    }
}
