//! Stencil Intermediate Representation: the typed description of a stencil
//! program, as handed to the compiler.
//!
//! Each node in the tree = one file.

pub mod ast;
pub mod expr;
pub mod field;
pub mod interval;
pub mod json;
pub mod loc;
pub mod program;
pub mod region;
pub mod stencil;
pub mod stmt;
pub mod visit;

pub use ast::{ast, Ast};
pub use expr::{AccessOffset, BuiltinType, Expr, ExprKind, HorizontalOffset};
pub use field::{field, Field, FieldDimensions, LocationType, NeighborChain};
pub use interval::{interval, Interval, Level};
pub use json::{from_json, to_json};
pub use loc::SourceLocation;
pub use program::{program, GridType, Program};
pub use region::{LoopOrder, VerticalRegion};
pub use stencil::{stencil, Stencil};
pub use stmt::{Stmt, StmtKind};
pub use visit::Visitor;
