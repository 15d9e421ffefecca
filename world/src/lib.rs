#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the tactics movement engine.

mod layout;

pub use layout::{
    BattleLayout, BlockedRegion, LayoutError, UnitPlacement, DEFAULT_COLUMNS,
    DEFAULT_MOVEMENT_BUDGET, DEFAULT_ROWS,
};

use log::debug;
use tactics_core::{
    CellCoord, Command, Event, Faction, MoveRejection, ReachableSet, Tile, UnitId,
};

/// Represents the authoritative battle state.
#[derive(Debug)]
pub struct World {
    terrain: Terrain,
    units: Vec<Unit>,
    occupancy: OccupancyIndex,
    tick_index: u64,
}

impl World {
    /// Creates the default battle ready for play.
    #[must_use]
    pub fn new() -> Self {
        Self::build(&BattleLayout::default())
    }

    /// Creates a battle from the provided layout after validating it.
    pub fn from_layout(layout: &BattleLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self::build(layout))
    }

    fn build(layout: &BattleLayout) -> Self {
        let terrain = Terrain::from_layout(layout);
        let units: Vec<Unit> = layout
            .units
            .iter()
            .enumerate()
            .filter_map(|(index, placement)| {
                let id = u32::try_from(index).ok()?;
                Some(Unit {
                    id: UnitId::new(id),
                    cell: placement.cell,
                    faction: placement.faction,
                    movement_budget: placement.movement_budget,
                    busy: false,
                })
            })
            .collect();
        let mut occupancy = OccupancyIndex::new(layout.columns, layout.rows);
        occupancy.fill_with(&units);

        Self {
            terrain,
            units,
            occupancy,
            tick_index: 0,
        }
    }

    fn unit_mut(&mut self, unit: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|candidate| candidate.id == unit)
    }

    fn commit(
        &mut self,
        set: &ReachableSet,
        destination: CellCoord,
    ) -> Result<CellCoord, MoveRejection> {
        let unit_id = set.unit();
        let occupant = self.occupancy.occupant(destination);
        let passable = self.terrain.is_passable(destination);
        let unit = self
            .units
            .iter_mut()
            .find(|candidate| candidate.id == unit_id)
            .ok_or(MoveRejection::UnknownUnit)?;

        if unit.busy {
            return Err(MoveRejection::Busy);
        }
        if set.origin() != unit.cell {
            return Err(MoveRejection::StaleSelection);
        }
        if !passable {
            return Err(MoveRejection::Impassable);
        }
        if !set.contains(destination) {
            return Err(MoveRejection::Unreachable);
        }
        if occupant.is_some_and(|other| other != unit_id) {
            return Err(MoveRejection::Occupied);
        }

        let from = unit.cell;
        unit.busy = true;
        unit.cell = destination;
        self.occupancy.vacate(from);
        self.occupancy.occupy(unit_id, destination);
        Ok(from)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::CommitMove { set, destination } => {
            let unit = set.unit();
            match world.commit(&set, destination) {
                Ok(from) => {
                    debug!(
                        "unit {} relocating from {:?} to {:?}",
                        unit.get(),
                        from,
                        destination
                    );
                    out_events.push(Event::UnitRelocated {
                        unit,
                        from,
                        to: destination,
                    });
                }
                Err(reason) => {
                    debug!(
                        "unit {} move to {:?} rejected: {reason}",
                        unit.get(),
                        destination
                    );
                    out_events.push(Event::MoveRejected {
                        unit,
                        destination,
                        reason,
                    });
                }
            }
        }
        Command::FinishRelocation { unit } => {
            if let Some(state) = world.unit_mut(unit) {
                if state.busy {
                    state.busy = false;
                    debug!("unit {} finished relocating", unit.get());
                    out_events.push(Event::RelocationFinished { unit });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tactics_core::{CellCoord, Faction, RosterView, TerrainView, UnitId, UnitSnapshot};

    use super::World;

    /// Exposes a read-only view of the terrain grid.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        TerrainView::new(
            &world.terrain.tiles,
            world.terrain.columns,
            world.terrain.rows,
        )
    }

    /// Captures a read-only view of every unit on the battlefield.
    #[must_use]
    pub fn roster_view(world: &World) -> RosterView {
        RosterView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures the state of a single unit.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world
            .units
            .iter()
            .find(|candidate| candidate.id == unit)
            .map(|unit| unit.snapshot())
    }

    /// Identifier of the unit standing on `cell`, read from the occupancy index.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<UnitId> {
        world.occupancy.occupant(cell)
    }

    /// Faction of the unit standing on `cell`, read from the occupancy index.
    #[must_use]
    pub fn occupant_faction(world: &World, cell: CellCoord) -> Option<Faction> {
        let occupant = world.occupancy.occupant(cell)?;
        world
            .units
            .iter()
            .find(|unit| unit.id == occupant)
            .map(|unit| unit.faction)
    }

    /// Number of ticks processed since the battle started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    cell: CellCoord,
    faction: Faction,
    movement_budget: u32,
    busy: bool,
}

impl Unit {
    fn snapshot(&self) -> tactics_core::UnitSnapshot {
        tactics_core::UnitSnapshot {
            id: self.id,
            cell: self.cell,
            faction: self.faction,
            movement_budget: self.movement_budget,
            busy: self.busy,
        }
    }
}

#[derive(Clone, Debug)]
struct Terrain {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Terrain {
    fn from_layout(layout: &BattleLayout) -> Self {
        let capacity = cell_capacity(layout.columns, layout.rows);
        let mut tiles = vec![Tile::Open; capacity];
        for region in &layout.blocked {
            for cell in region.cells() {
                if let Some(index) = index(layout.columns, layout.rows, cell) {
                    if let Some(slot) = tiles.get_mut(index) {
                        *slot = Tile::Blocked;
                    }
                }
            }
        }

        Self {
            columns: layout.columns,
            rows: layout.rows,
            tiles,
        }
    }

    fn is_passable(&self, cell: CellCoord) -> bool {
        index(self.columns, self.rows, cell)
            .and_then(|index| self.tiles.get(index))
            .is_some_and(|tile| *tile == Tile::Open)
    }
}

/// Dense Cell→Unit index kept in sync with every position mutation.
#[derive(Clone, Debug)]
struct OccupancyIndex {
    columns: u32,
    rows: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyIndex {
    fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; cell_capacity(columns, rows)],
        }
    }

    fn fill_with(&mut self, units: &[Unit]) {
        self.cells.fill(None);
        for unit in units {
            self.occupy(unit.id, unit.cell);
        }
    }

    fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        index(self.columns, self.rows, cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = index(self.columns, self.rows, cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(unit);
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = index(self.columns, self.rows, cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }
}

fn cell_capacity(columns: u32, rows: u32) -> usize {
    let capacity_u64 = u64::from(columns) * u64::from(rows);
    usize::try_from(capacity_u64).unwrap_or(0)
}

fn index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, time::Duration};

    use super::*;

    fn corridor_world() -> World {
        let layout = BattleLayout::open(6, 1)
            .with_unit(UnitPlacement::new(CellCoord::new(0, 0), Faction::Friendly))
            .with_unit(UnitPlacement::new(CellCoord::new(2, 0), Faction::Friendly))
            .with_unit(UnitPlacement::new(CellCoord::new(5, 0), Faction::Hostile));
        World::from_layout(&layout).expect("valid layout")
    }

    fn set_for(unit: u32, origin: CellCoord, cells: &[CellCoord]) -> ReachableSet {
        let cells: BTreeSet<CellCoord> = cells.iter().copied().collect();
        ReachableSet::new(UnitId::new(unit), origin, 5, cells)
    }

    #[test]
    fn new_world_matches_default_layout() {
        let world = World::new();
        let terrain = query::terrain_view(&world);

        assert_eq!(terrain.dimensions(), (DEFAULT_COLUMNS, DEFAULT_ROWS));
        assert!(!terrain.is_passable(CellCoord::new(2, 3)));
        assert!(terrain.is_passable(CellCoord::new(4, 5)));
        assert_eq!(query::roster_view(&world).len(), 4);
        assert_eq!(
            query::occupant_faction(&world, CellCoord::new(4, 5)),
            Some(Faction::Friendly)
        );
    }

    #[test]
    fn invalid_layout_is_refused() {
        let layout = BattleLayout::open(3, 3).with_unit(UnitPlacement::new(
            CellCoord::new(7, 0),
            Faction::Friendly,
        ));

        assert!(matches!(
            World::from_layout(&layout),
            Err(LayoutError::OutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn tick_emits_time_advanced() {
        let mut world = World::new();
        let mut events = Vec::new();
        let dt = Duration::from_millis(16);

        apply(&mut world, Command::Tick { dt }, &mut events);

        assert_eq!(events, vec![Event::TimeAdvanced { dt }]);
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn commit_updates_position_and_occupancy_immediately() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(1, 0);

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, origin, &[destination]),
                destination,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitRelocated {
                unit: UnitId::new(0),
                from: origin,
                to: destination,
            }]
        );
        let unit = query::unit(&world, UnitId::new(0)).expect("unit exists");
        assert_eq!(unit.cell, destination);
        assert!(unit.busy);
        assert_eq!(query::occupant(&world, origin), None);
        assert_eq!(query::occupant(&world, destination), Some(UnitId::new(0)));
    }

    #[test]
    fn commit_rejects_friendly_occupied_destination() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(2, 0);

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, origin, &[CellCoord::new(1, 0), destination]),
                destination,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                unit: UnitId::new(0),
                destination,
                reason: MoveRejection::Occupied,
            }]
        );
        assert_eq!(
            query::unit(&world, UnitId::new(0)).map(|unit| unit.cell),
            Some(origin)
        );
    }

    #[test]
    fn commit_rejects_destination_outside_set() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        let destination = CellCoord::new(1, 0);

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, CellCoord::new(0, 0), &[]),
                destination,
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::MoveRejected {
                reason: MoveRejection::Unreachable,
                ..
            }]
        ));
    }

    #[test]
    fn commit_rejects_forged_set_pointing_off_the_grid() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(50, 50);

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, origin, &[destination]),
                destination,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                unit: UnitId::new(0),
                destination,
                reason: MoveRejection::Impassable,
            }]
        );
        let unit = query::unit(&world, UnitId::new(0)).expect("unit exists");
        assert_eq!(unit.cell, origin);
        assert!(!unit.busy);
        assert_eq!(query::occupant(&world, origin), Some(UnitId::new(0)));
    }

    #[test]
    fn commit_rejects_forged_set_pointing_into_a_wall() {
        let layout = BattleLayout::open(3, 3)
            .with_blocked(BlockedRegion::new(CellCoord::new(1, 1), 1, 1))
            .with_unit(UnitPlacement::new(CellCoord::new(0, 1), Faction::Friendly));
        let mut world = World::from_layout(&layout).expect("valid layout");
        let mut events = Vec::new();
        let wall = CellCoord::new(1, 1);

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, CellCoord::new(0, 1), &[wall]),
                destination: wall,
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::MoveRejected {
                reason: MoveRejection::Impassable,
                ..
            }]
        ));
        assert_eq!(query::occupant(&world, wall), None);
        assert_eq!(
            query::unit(&world, UnitId::new(0)).map(|unit| unit.cell),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn commit_rejects_busy_unit_until_relocation_finishes() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        let first = CellCoord::new(1, 0);

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, CellCoord::new(0, 0), &[first]),
                destination: first,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, first, &[CellCoord::new(0, 0)]),
                destination: CellCoord::new(0, 0),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::MoveRejected {
                reason: MoveRejection::Busy,
                ..
            }]
        ));
        events.clear();

        apply(
            &mut world,
            Command::FinishRelocation {
                unit: UnitId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::RelocationFinished {
                unit: UnitId::new(0)
            }]
        );
        assert_eq!(
            query::unit(&world, UnitId::new(0)).map(|unit| unit.busy),
            Some(false)
        );
    }

    #[test]
    fn commit_rejects_set_from_stale_origin() {
        let mut world = corridor_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(0, CellCoord::new(3, 0), &[CellCoord::new(4, 0)]),
                destination: CellCoord::new(4, 0),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::MoveRejected {
                reason: MoveRejection::StaleSelection,
                ..
            }]
        ));
    }

    #[test]
    fn commit_rejects_unknown_unit() {
        let mut world = corridor_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::CommitMove {
                set: set_for(42, CellCoord::new(0, 0), &[CellCoord::new(1, 0)]),
                destination: CellCoord::new(1, 0),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::MoveRejected {
                reason: MoveRejection::UnknownUnit,
                ..
            }]
        ));
    }

    #[test]
    fn finishing_idle_unit_is_a_no_op() {
        let mut world = corridor_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FinishRelocation {
                unit: UnitId::new(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FinishRelocation {
                unit: UnitId::new(9),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }
}
