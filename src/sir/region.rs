//! Vertical region node.

use serde::{Deserialize, Serialize};

use super::ast::Ast;
use super::interval::Interval;

/// Direction in which a vertical region walks its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopOrder {
    /// From the lower bound up to the upper bound.
    Forward,
    /// From the upper bound down to the lower bound.
    Backward,
}

/// A body iterated over an interval of vertical levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalRegion {
    /// Statements executed at every level.
    pub ast: Ast,
    /// Levels iterated over.
    pub interval: Interval,
    /// Direction of the iteration.
    pub loop_order: LoopOrder,
}
