//! Examples.

mod neighbor_sum;
mod smoother;
mod vertical_indirection;

pub use neighbor_sum::*;
pub use smoother::*;
pub use vertical_indirection::*;
pub use ExprKind::*;
pub use GridType::*;
pub use Level::*;
pub use LocationType::*;
pub use LoopOrder::*;
pub use StmtKind::*;

pub use crate::sir::ast::*;
pub use crate::sir::expr::*;
pub use crate::sir::field::*;
pub use crate::sir::interval::*;
pub use crate::sir::program::*;
pub use crate::sir::region::*;
pub use crate::sir::stencil::*;
pub use crate::sir::stmt::*;
pub use crate::sir::*;
pub use crate::utils::boxed;
