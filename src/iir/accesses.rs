//! Field access analysis over statement sequences.
//!
//! Every pass decision (reordering, merging, caching, parallelization) boils
//! down to questions about which fields a body reads and writes, and how far
//! from the iteration point. This module answers them.

use std::collections::{BTreeMap, BTreeSet};

use crate::sir::expr::{AccessOffset, Expr, ExprKind, HorizontalOffset};
use crate::sir::stmt::Stmt;
use crate::sir::visit::{walk_expr, Visitor};

/// Vertical footprint of the accesses to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalExtent {
    /// Levels `k + minus` to `k + plus` are touched.
    Defined {
        /// Lowest shift.
        minus: i32,
        /// Highest shift.
        plus: i32,
    },
    /// The levels touched are not known statically. This is the extent of
    /// any access through a vertical indirection.
    Undefined,
}

impl VerticalExtent {
    /// The extent of an access at the iteration level itself.
    pub fn zero() -> Self {
        Self::at(0)
    }

    /// The extent of a single access shifted by `shift` levels.
    pub fn at(shift: i32) -> Self {
        Self::Defined {
            minus: shift,
            plus: shift,
        }
    }

    /// The smallest extent covering both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (
                Self::Defined { minus, plus },
                Self::Defined {
                    minus: other_minus,
                    plus: other_plus,
                },
            ) => Self::Defined {
                minus: minus.min(other_minus),
                plus: plus.max(other_plus),
            },
            _ => Self::Undefined,
        }
    }

    /// Is the extent statically known?
    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined { .. })
    }

    /// Is the extent exactly the iteration level?
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Defined { minus: 0, plus: 0 })
    }
}

/// Full footprint of the accesses to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extents {
    /// Vertical part of the footprint.
    pub vertical: VerticalExtent,
    /// Whether any access leaves the iteration point horizontally.
    pub horizontal: bool,
}

impl Extents {
    /// The footprint of an access at the iteration point itself.
    pub fn zero() -> Self {
        Self {
            vertical: VerticalExtent::zero(),
            horizontal: false,
        }
    }

    /// The footprint of a single access at `offset`.
    pub fn of_offset(offset: &AccessOffset) -> Self {
        Self {
            vertical: if offset.vertical_indirection.is_some() {
                VerticalExtent::Undefined
            } else {
                VerticalExtent::at(offset.vertical_shift)
            },
            horizontal: offset.horizontal != HorizontalOffset::Center,
        }
    }

    /// The smallest footprint covering both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            vertical: self.vertical.merge(other.vertical),
            horizontal: self.horizontal || other.horizontal,
        }
    }

    /// Does the footprint stay exactly on the iteration point?
    pub fn is_pointwise(&self) -> bool {
        self.vertical.is_zero() && !self.horizontal
    }
}

/// The fields a body reads and writes, with their footprints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accesses {
    /// Read fields.
    pub reads: BTreeMap<String, Extents>,
    /// Written fields.
    pub writes: BTreeMap<String, Extents>,
}

impl Accesses {
    /// Computes the accesses of one statement.
    pub fn of_stmt(stmt: &Stmt) -> Self {
        Self::of_stmts([stmt])
    }

    /// Computes the merged accesses of a sequence of statements.
    pub fn of_stmts<'a>(stmts: impl IntoIterator<Item = &'a Stmt>) -> Self {
        let mut collector = Collector::default();
        for stmt in stmts {
            collector.visit_stmt(stmt);
        }
        collector.accesses
    }

    /// Records a read of `name`.
    pub fn add_read(&mut self, name: &str, extents: Extents) {
        merge_into(&mut self.reads, name, extents);
    }

    /// Records a write of `name`.
    pub fn add_write(&mut self, name: &str, extents: Extents) {
        merge_into(&mut self.writes, name, extents);
    }

    /// Merges the accesses of `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        for (name, &extents) in &other.reads {
            self.add_read(name, extents);
        }
        for (name, &extents) in &other.writes {
            self.add_write(name, extents);
        }
    }

    /// The merged read and write footprint of `name`, if it is accessed.
    pub fn extents_of(&self, name: &str) -> Option<Extents> {
        match (self.reads.get(name), self.writes.get(name)) {
            (Some(&read), Some(&write)) => Some(read.merge(write)),
            (Some(&only), None) | (None, Some(&only)) => Some(only),
            (None, None) => None,
        }
    }

    /// Do these accesses share no field with `other`, in either direction,
    /// where one side writes?
    pub fn independent_from(&self, other: &Self) -> bool {
        let clash = |a: &Self, b: &Self| a.writes.keys().any(|name| b.extents_of(name).is_some());
        !clash(self, other) && !clash(other, self)
    }
}

/// Merges `extents` into the entry of `name` in `map`.
fn merge_into(map: &mut BTreeMap<String, Extents>, name: &str, extents: Extents) {
    map.entry(name.to_string())
        .and_modify(|entry| *entry = entry.merge(extents))
        .or_insert(extents);
}

/// Can two bodies with these accesses run fused at the same iteration point?
///
/// Every field written on one side and touched on the other must be written
/// pointwise there and touched pointwise here. Accesses pairing a side with
/// itself are that side's own business and do not count: fusion keeps the
/// statement order within each iteration point. `Undefined` extents are
/// never pointwise, so any indirected cross dependency refuses the fusion.
pub fn pointwise_between(first: &Accesses, second: &Accesses) -> bool {
    fn crossing(a: &Accesses, b: &Accesses) -> bool {
        a.writes.iter().all(|(name, write)| {
            let Some(touch) = b.extents_of(name) else {
                return true;
            };
            write.is_pointwise() && touch.is_pointwise()
        })
    }
    crossing(first, second) && crossing(second, first)
}

/// Visitor accumulating the `Accesses` of the visited nodes.
#[derive(Default)]
struct Collector {
    /// Accesses recorded so far.
    accesses: Accesses,
}

impl Collector {
    /// Records a read of `name` at `offset`.
    ///
    /// An indirected read also reads the indirection field, at the iteration
    /// level.
    fn read(&mut self, name: &str, offset: &AccessOffset) {
        self.accesses.add_read(name, Extents::of_offset(offset));
        if let Some(lookup) = &offset.vertical_indirection {
            self.accesses.add_read(lookup, Extents::zero());
        }
    }

    /// Records a write of `name` at `offset`.
    fn write(&mut self, name: &str, offset: &AccessOffset) {
        self.accesses.add_write(name, Extents::of_offset(offset));
        if let Some(lookup) = &offset.vertical_indirection {
            self.accesses.add_read(lookup, Extents::zero());
        }
    }
}

impl Visitor for Collector {
    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::AssignE { left, op, right } => {
                if let Some((name, offset)) = left.as_field_access() {
                    self.write(name, offset);
                    // A compound assignment also reads the assigned place.
                    if op != "=" {
                        self.read(name, offset);
                    }
                } else {
                    self.visit_expr(left);
                }
                self.visit_expr(right);
            }
            ExprKind::FieldE { name, offset } => self.read(name, offset),
            _ => walk_expr(self, expr),
        }
    }
}

/// Per-field access summary driving the cache pass: the distinct vertical
/// shifts a field is read at, and everything that disqualifies it from being
/// cached.
#[derive(Debug, Clone, Default)]
pub struct AccessProfile {
    /// Distinct defined vertical shifts the field is read at.
    pub read_shifts: BTreeSet<i32>,
    /// The field is read at a statically unknown level.
    pub undefined_read: bool,
    /// The field is written.
    pub written: bool,
    /// The field is accessed away from the iteration point horizontally.
    pub horizontal: bool,
    /// The field is read through, or serves as, a vertical indirection.
    pub indirection: bool,
}

/// Profiles every field accessed by `stmts`.
pub fn profile_stmts<'a>(
    stmts: impl IntoIterator<Item = &'a Stmt>,
) -> BTreeMap<String, AccessProfile> {
    let mut profiler = Profiler::default();
    for stmt in stmts {
        profiler.visit_stmt(stmt);
    }
    profiler.profiles
}

/// Visitor accumulating the `AccessProfile` of every touched field.
#[derive(Default)]
struct Profiler {
    /// Profiles recorded so far.
    profiles: BTreeMap<String, AccessProfile>,
}

impl Profiler {
    /// The profile of `name`, created blank on first use.
    fn profile(&mut self, name: &str) -> &mut AccessProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    /// Records a read of `name` at `offset`.
    fn read(&mut self, name: &str, offset: &AccessOffset) {
        let profile = self.profile(name);
        if offset.horizontal != HorizontalOffset::Center {
            profile.horizontal = true;
        }
        if offset.vertical_indirection.is_some() {
            profile.indirection = true;
            profile.undefined_read = true;
        } else {
            profile.read_shifts.insert(offset.vertical_shift);
        }
        if let Some(lookup) = &offset.vertical_indirection {
            let lookup = self.profile(lookup);
            lookup.indirection = true;
            lookup.read_shifts.insert(0);
        }
    }

    /// Records a write of `name` at `offset`.
    fn write(&mut self, name: &str, offset: &AccessOffset) {
        self.profile(name).written = true;
        if let Some(lookup) = &offset.vertical_indirection {
            let lookup = self.profile(lookup);
            lookup.indirection = true;
            lookup.read_shifts.insert(0);
        }
    }
}

impl Visitor for Profiler {
    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::AssignE { left, op, right } => {
                if let Some((name, offset)) = left.as_field_access() {
                    self.write(name, offset);
                    if op != "=" {
                        self.read(name, offset);
                    }
                } else {
                    self.visit_expr(left);
                }
                self.visit_expr(right);
            }
            ExprKind::FieldE { name, offset } => self.read(name, offset),
            _ => walk_expr(self, expr),
        }
    }
}
