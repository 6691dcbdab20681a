//! Multistages: the units of vertical iteration.

use std::fmt;

use super::accesses::Accesses;
use super::cache::KCache;
use super::stage::Stage;
use crate::sir::region::LoopOrder as RegionLoopOrder;

/// Direction of a multistage's vertical iteration.
///
/// Unlike a region's declared order, a multistage can be `Parallel`: the
/// `SetLoopOrder` pass promotes a multistage whose levels do not depend on
/// each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOrder {
    /// From the lower bound up to the upper bound.
    Forward,
    /// From the upper bound down to the lower bound.
    Backward,
    /// All levels at once.
    Parallel,
}

impl LoopOrder {
    /// Can the levels run concurrently?
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel)
    }
}

impl From<RegionLoopOrder> for LoopOrder {
    fn from(order: RegionLoopOrder) -> Self {
        match order {
            RegionLoopOrder::Forward => Self::Forward,
            RegionLoopOrder::Backward => Self::Backward,
        }
    }
}

impl fmt::Display for LoopOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// One vertical iteration over a sequence of stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiStage {
    /// Direction of the vertical iteration.
    pub loop_order: LoopOrder,
    /// Stages executed at every level, in order.
    pub stages: Vec<Stage>,
    /// Register caches, set by the `SetNonTempCaches` pass.
    pub caches: Vec<KCache>,
}

impl MultiStage {
    /// Creates a multistage without caches.
    pub fn new(loop_order: LoopOrder, stages: Vec<Stage>) -> Self {
        Self {
            loop_order,
            stages,
            caches: vec![],
        }
    }

    /// Merged accesses of all stages of this multistage.
    pub fn accesses(&self) -> Accesses {
        let mut accesses = Accesses::default();
        for stage in &self.stages {
            accesses.merge(&stage.accesses());
        }
        accesses
    }

    /// The cache set up for `field`, if any.
    pub fn cache(&self, field: &str) -> Option<&KCache> {
        self.caches.iter().find(|cache| cache.field == field)
    }
}
