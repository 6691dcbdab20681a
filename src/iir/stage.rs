//! Stages and their do-methods.

use super::accesses::Accesses;
use crate::sir::field::LocationType;
use crate::sir::interval::Interval;
use crate::sir::stmt::Stmt;

/// A body executed over one interval of vertical levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoMethod {
    /// Levels the body runs over.
    pub interval: Interval,
    /// Statements of the body.
    pub statements: Vec<Stmt>,
}

impl DoMethod {
    /// Accesses of this do-method.
    pub fn accesses(&self) -> Accesses {
        Accesses::of_stmts(&self.statements)
    }
}

/// A unit of horizontal iteration: all do-methods of a stage run over the
/// elements of one location type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Stage name, set by the `SetStageName` pass.
    pub name: Option<String>,
    /// Location iterated over, set by the `SetStageLocationType` pass.
    pub location: Option<LocationType>,
    /// Bodies of the stage.
    pub do_methods: Vec<DoMethod>,
}

impl Stage {
    /// Creates an unnamed, unlocated stage with a single do-method.
    pub fn new(interval: Interval, statements: Vec<Stmt>) -> Self {
        Self {
            name: None,
            location: None,
            do_methods: vec![DoMethod {
                interval,
                statements,
            }],
        }
    }

    /// Merged accesses of all do-methods of this stage.
    pub fn accesses(&self) -> Accesses {
        let mut accesses = Accesses::default();
        for do_method in &self.do_methods {
            accesses.merge(&do_method.accesses());
        }
        accesses
    }
}
