#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure reachability system that computes the cells a unit may move to.
//!
//! The expansion is a uniform-cost breadth-first search: every orthogonal
//! step costs one, so the first time a cell is discovered its cost is already
//! minimal and a FIFO queue suffices. Introducing per-tile movement costs
//! would require a cost-ordered (Dijkstra) expansion instead.

use std::collections::{BTreeSet, VecDeque};

use log::trace;
use tactics_core::{
    CellCoord, Direction, Faction, ReachableSet, RosterView, TerrainView, UnitId,
};

const UNKNOWN_COST: u32 = u32::MAX;

/// Breadth-first movement range calculator.
///
/// The cost buffer and work queue are retained between computations so that
/// repeated selections do not reallocate.
#[derive(Clone, Debug, Default)]
pub struct Reachability {
    costs: Vec<u32>,
    queue: VecDeque<(CellCoord, u32)>,
}

impl Reachability {
    /// Creates a new calculator with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the cells `unit` can end its move on using its own budget.
    ///
    /// Returns `None` when the unit is not present in `roster`.
    pub fn compute(
        &mut self,
        terrain: TerrainView<'_>,
        roster: &RosterView,
        unit: UnitId,
    ) -> Option<ReachableSet> {
        let budget = roster.get(unit)?.movement_budget;
        self.compute_with_budget(terrain, roster, unit, budget)
    }

    /// Computes the reachable cells for `unit` with an explicit budget.
    ///
    /// Cells held by hostile units are impassable for every actor. Cells held
    /// by friendly units may be crossed and are reported as members; whether
    /// such a cell is a legal final destination is decided at commit time.
    pub fn compute_with_budget(
        &mut self,
        terrain: TerrainView<'_>,
        roster: &RosterView,
        unit: UnitId,
        budget: u32,
    ) -> Option<ReachableSet> {
        let acting = roster.get(unit)?;
        let origin = acting.cell;
        let (columns, rows) = terrain.dimensions();
        let width = usize::try_from(columns).unwrap_or(0);
        let cell_count = width
            .checked_mul(usize::try_from(rows).unwrap_or(0))
            .unwrap_or(0);

        let mut reachable = BTreeSet::new();
        self.queue.clear();
        self.costs.clear();
        self.costs.resize(cell_count, UNKNOWN_COST);

        let Some(origin_index) = index(&terrain, width, origin) else {
            return Some(ReachableSet::new(unit, origin, budget, reachable));
        };
        self.costs[origin_index] = 0;
        self.queue.push_back((origin, 0));

        while let Some((cell, cost)) = self.queue.pop_front() {
            if cost >= budget {
                continue;
            }

            let next_cost = cost + 1;
            for neighbor in Direction::ALL
                .into_iter()
                .filter_map(|direction| cell.step(direction))
            {
                if !is_traversable(&terrain, roster, neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(&terrain, width, neighbor) else {
                    continue;
                };

                if self.costs[neighbor_index] <= next_cost {
                    continue;
                }

                self.costs[neighbor_index] = next_cost;
                self.queue.push_back((neighbor, next_cost));
                let _ = reachable.insert(neighbor);
            }
        }

        trace!(
            "unit {} at {:?} reaches {} cells with budget {}",
            unit.get(),
            origin,
            reachable.len(),
            budget
        );
        Some(ReachableSet::new(unit, origin, budget, reachable))
    }

    /// Cost recorded for `cell` by the most recent computation.
    ///
    /// Returns `None` for cells that were not reached or lie outside the grid.
    #[must_use]
    pub fn cost(&self, terrain: TerrainView<'_>, cell: CellCoord) -> Option<u32> {
        let width = usize::try_from(terrain.dimensions().0).ok()?;
        let index = index(&terrain, width, cell)?;
        self.costs
            .get(index)
            .copied()
            .filter(|cost| *cost != UNKNOWN_COST)
    }
}

fn is_traversable(terrain: &TerrainView<'_>, roster: &RosterView, cell: CellCoord) -> bool {
    terrain.is_passable(cell) && roster.occupant_faction(cell) != Some(Faction::Hostile)
}

fn index(terrain: &TerrainView<'_>, width: usize, cell: CellCoord) -> Option<usize> {
    if !terrain.is_in_bounds(cell) {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
