//! Battle layouts describing the terrain and starting roster of a battle.

use tactics_core::{CellCoord, Faction};
use thiserror::Error;

/// Number of tile columns on the default battlefield.
pub const DEFAULT_COLUMNS: u32 = 20;
/// Number of tile rows on the default battlefield.
pub const DEFAULT_ROWS: u32 = 11;
/// Movement budget granted to every unit on the default battlefield.
pub const DEFAULT_MOVEMENT_BUDGET: u32 = 5;

/// Rectangle of impassable terrain anchored at its upper-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockedRegion {
    origin: CellCoord,
    width: u32,
    height: u32,
}

impl BlockedRegion {
    /// Creates a blocked region spanning `width` columns and `height` rows.
    #[must_use]
    pub const fn new(origin: CellCoord, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Iterator over every cell covered by the region.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.width;
        (0..self.height).flat_map(move |dy| {
            (0..width).filter_map(move |dx| {
                let column = origin.column().checked_add(dx)?;
                let row = origin.row().checked_add(dy)?;
                Some(CellCoord::new(column, row))
            })
        })
    }
}

/// Starting position and attributes of a single unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitPlacement {
    /// Cell the unit starts the battle on.
    pub cell: CellCoord,
    /// Allegiance of the unit.
    pub faction: Faction,
    /// Number of orthogonal steps the unit may take per move.
    pub movement_budget: u32,
}

impl UnitPlacement {
    /// Places a unit with the default movement budget.
    #[must_use]
    pub const fn new(cell: CellCoord, faction: Faction) -> Self {
        Self {
            cell,
            faction,
            movement_budget: DEFAULT_MOVEMENT_BUDGET,
        }
    }

    /// Overrides the movement budget of the placement.
    #[must_use]
    pub const fn with_budget(mut self, movement_budget: u32) -> Self {
        self.movement_budget = movement_budget;
        self
    }
}

/// Fixed description of a battle supplied when the world is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleLayout {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Impassable terrain regions. Cells outside the grid are ignored.
    pub blocked: Vec<BlockedRegion>,
    /// Starting roster; unit identifiers follow placement order.
    pub units: Vec<UnitPlacement>,
}

impl BattleLayout {
    /// Creates an all-open layout with no units.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            blocked: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Adds an impassable region to the layout.
    #[must_use]
    pub fn with_blocked(mut self, region: BlockedRegion) -> Self {
        self.blocked.push(region);
        self
    }

    /// Adds a unit placement to the layout.
    #[must_use]
    pub fn with_unit(mut self, placement: UnitPlacement) -> Self {
        self.units.push(placement);
        self
    }

    /// Checks the layout against the battle invariants.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(LayoutError::EmptyGrid);
        }
        if !roster_fits(self.units.len()) {
            return Err(LayoutError::TooManyUnits {
                count: self.units.len(),
            });
        }

        let mut seen: Vec<CellCoord> = Vec::with_capacity(self.units.len());
        for (index, unit) in self.units.iter().enumerate() {
            if unit.movement_budget == 0 {
                return Err(LayoutError::ZeroBudget { index });
            }
            if unit.cell.column() >= self.columns || unit.cell.row() >= self.rows {
                return Err(LayoutError::OutOfBounds {
                    index,
                    cell: unit.cell,
                });
            }
            if self.is_blocked(unit.cell) {
                return Err(LayoutError::BlockedStart {
                    index,
                    cell: unit.cell,
                });
            }
            if seen.contains(&unit.cell) {
                return Err(LayoutError::SharedStart {
                    index,
                    cell: unit.cell,
                });
            }
            seen.push(unit.cell);
        }

        Ok(())
    }

    pub(crate) fn is_blocked(&self, cell: CellCoord) -> bool {
        self.blocked
            .iter()
            .any(|region| region.cells().any(|blocked| blocked == cell))
    }
}

/// Unit identifiers are `u32`, so the roster must be addressable by one.
fn roster_fits(count: usize) -> bool {
    u32::try_from(count).is_ok()
}

impl Default for BattleLayout {
    /// The 20×11 battlefield with a 3×3 wall west of the friendly line.
    fn default() -> Self {
        Self::open(DEFAULT_COLUMNS, DEFAULT_ROWS)
            .with_blocked(BlockedRegion::new(CellCoord::new(1, 2), 3, 3))
            .with_blocked(BlockedRegion::new(CellCoord::new(9, 6), 2, 3))
            .with_unit(UnitPlacement::new(CellCoord::new(4, 5), Faction::Friendly))
            .with_unit(UnitPlacement::new(CellCoord::new(3, 7), Faction::Friendly))
            .with_unit(UnitPlacement::new(CellCoord::new(14, 4), Faction::Hostile))
            .with_unit(UnitPlacement::new(CellCoord::new(15, 6), Faction::Hostile))
    }
}

/// Reasons a battle layout cannot be turned into a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The grid has no columns or no rows.
    #[error("battle grid must have at least one column and one row")]
    EmptyGrid,
    /// More units were placed than unit identifiers can address.
    #[error("{count} units exceed the identifier range")]
    TooManyUnits {
        /// Number of placements in the layout.
        count: usize,
    },
    /// A unit was given a movement budget of zero.
    #[error("unit {index} has a zero movement budget")]
    ZeroBudget {
        /// Position of the offending placement.
        index: usize,
    },
    /// A unit starts outside the grid.
    #[error("unit {index} starts outside the grid at {cell:?}")]
    OutOfBounds {
        /// Position of the offending placement.
        index: usize,
        /// Requested starting cell.
        cell: CellCoord,
    },
    /// A unit starts on impassable terrain.
    #[error("unit {index} starts on blocked terrain at {cell:?}")]
    BlockedStart {
        /// Position of the offending placement.
        index: usize,
        /// Requested starting cell.
        cell: CellCoord,
    },
    /// Two units start on the same cell.
    #[error("unit {index} shares its starting cell {cell:?}")]
    SharedStart {
        /// Position of the later placement.
        index: usize,
        /// Requested starting cell.
        cell: CellCoord,
    },
}
