#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tactics movement engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battle world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`TerrainView`] and [`RosterView`], and respond exclusively
//! with new command batches.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a unit relocate to a destination drawn from a reachable set.
    ///
    /// The set is moved into the command so it cannot back a second commit.
    CommitMove {
        /// Reachable set computed when the unit was selected.
        set: ReachableSet,
        /// Cell the unit should end its move on.
        destination: CellCoord,
    },
    /// Signals that the visual relocation of a unit completed.
    FinishRelocation {
        /// Identifier of the unit whose relocation finished.
        unit: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a unit's logical position changed and its relocation began.
    UnitRelocated {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before the commit.
        from: CellCoord,
        /// Cell the unit occupies after the commit.
        to: CellCoord,
    },
    /// Reports that a move commit was refused without changing any state.
    MoveRejected {
        /// Identifier of the unit named by the commit.
        unit: UnitId,
        /// Destination requested by the commit.
        destination: CellCoord,
        /// Specific reason the commit failed.
        reason: MoveRejection,
    },
    /// Confirms that a unit finished relocating and accepts orders again.
    RelocationFinished {
        /// Identifier of the unit that became idle.
        unit: UnitId,
    },
}

/// Reasons a move commit may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveRejection {
    /// No unit with the provided identifier exists.
    #[error("unit is not on the roster")]
    UnknownUnit,
    /// The reachable set was computed from a position the unit no longer holds.
    #[error("reachable set no longer matches the unit's position")]
    StaleSelection,
    /// The unit is still relocating from a previous commit.
    #[error("unit is busy relocating")]
    Busy,
    /// The destination lies outside the grid or on blocked terrain.
    #[error("destination is outside the grid or blocked")]
    Impassable,
    /// The destination is not a member of the reachable set.
    #[error("destination is not reachable")]
    Unreachable,
    /// Another unit currently stands on the destination.
    #[error("destination is occupied")]
    Occupied,
}

/// Allegiance of a unit, controlling pass-through and blocking rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Units controlled by the player.
    Friendly,
    /// Units opposing the player.
    Hostile,
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Cardinal movement directions. Diagonal steps are never taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell one step away in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative coordinate
    /// space. Upper bounds are the caller's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Terrain flag attached to every grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Units may stand on and cross the cell.
    #[default]
    Open,
    /// Impassable terrain such as walls.
    Blocked,
}

/// Read-only view into the dense terrain grid.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    tiles: &'a [Tile],
    columns: u32,
    rows: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided row-major tile slice.
    #[must_use]
    pub fn new(tiles: &'a [Tile], columns: u32, rows: u32) -> Self {
        Self {
            tiles,
            columns,
            rows,
        }
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn is_in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether units may occupy or cross the cell.
    ///
    /// Cells outside the grid are never passable.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.tile(cell) == Some(Tile::Open)
    }

    /// Terrain stored for the cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Provides the dimensions of the underlying terrain grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.is_in_bounds(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Grid cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Allegiance of the unit.
    pub faction: Faction,
    /// Number of orthogonal steps the unit may take per move.
    pub movement_budget: u32,
    /// Indicates whether a relocation is still in flight.
    pub busy: bool,
}

/// Read-only snapshot describing every unit on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct RosterView {
    snapshots: Vec<UnitSnapshot>,
}

impl RosterView {
    /// Creates a new roster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for `unit`.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Returns the unit standing on `cell`, if any.
    ///
    /// Scans the whole roster; rosters hold tens of units.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<&UnitSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Returns the faction of the unit standing on `cell`, if any.
    #[must_use]
    pub fn occupant_faction(&self, cell: CellCoord) -> Option<Faction> {
        self.occupant(cell).map(|snapshot| snapshot.faction)
    }

    /// Number of units captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Cells a unit can end its move on, computed from one occupancy snapshot.
///
/// The origin cell is never a member. Sets are immutable once built; a new
/// selection or any unit movement requires a fresh computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachableSet {
    unit: UnitId,
    origin: CellCoord,
    budget: u32,
    cells: BTreeSet<CellCoord>,
}

impl ReachableSet {
    /// Creates a reachable set for `unit` starting at `origin`.
    #[must_use]
    pub fn new(unit: UnitId, origin: CellCoord, budget: u32, cells: BTreeSet<CellCoord>) -> Self {
        Self {
            unit,
            origin,
            budget,
            cells,
        }
    }

    /// Unit the set was computed for.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        self.unit
    }

    /// Cell the unit occupied when the set was computed.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Movement budget used for the computation.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.budget
    }

    /// Reports whether `cell` is a legal destination.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Iterator over member cells ordered by column, then row.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Number of member cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether every member of `self` also belongs to `other`.
    #[must_use]
    pub fn is_subset(&self, other: &ReachableSet) -> bool {
        self.cells.is_subset(&other.cells)
    }
}
