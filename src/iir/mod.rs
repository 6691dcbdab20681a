//! Internal Intermediate Representation: stencils lowered to multistages,
//! stages and do-methods, the form the optimization passes rewrite.
//!
//! Each node in the tree = one file.

pub mod accesses;
pub mod cache;
pub mod instantiation;
pub mod multistage;
pub mod stage;

pub use accesses::{Accesses, Extents, VerticalExtent};
pub use cache::KCache;
pub use instantiation::{FieldInfo, StencilInstantiation};
pub use multistage::{LoopOrder, MultiStage};
pub use stage::{DoMethod, Stage};
