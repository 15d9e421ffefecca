#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection controller that turns grid taps into move commands.
//!
//! A single [`Selection`] value owns the battle's selection slot. Tapping an
//! idle friendly unit computes its reachable set; tapping one of the
//! highlighted cells emits [`Command::CommitMove`] and releases the slot.

use log::debug;
use tactics_core::{
    CellCoord, Command, Event, Faction, ReachableSet, RosterView, TerrainView, UnitId,
    UnitSnapshot,
};
use tactics_system_reachability::Reachability;

/// Input snapshot distilled from an adapter-provided tap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TapInput {
    /// Grid cell tapped on this frame, already converted from screen space.
    pub cell: Option<CellCoord>,
}

impl TapInput {
    /// Creates an input describing a tap on `cell`.
    #[must_use]
    pub const fn at(cell: CellCoord) -> Self {
        Self { cell: Some(cell) }
    }
}

/// Observable state of the selection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPhase {
    /// No unit is selected.
    Idle,
    /// A unit is selected and its reachable cells are highlighted.
    Selected {
        /// Identifier of the selected unit.
        unit: UnitId,
    },
}

/// Selection-slot state machine driven by taps and world events.
#[derive(Debug, Default)]
pub struct Selection {
    reachability: Reachability,
    selected: Option<ReachableSet>,
}

impl Selection {
    /// Creates a controller with an empty selection slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the latest tap to emit move commands.
    ///
    /// Taps outside the grid are ignored. A move is only committed to a vacant
    /// member of the reachable set; any other tap clears the selection. Any
    /// relocation reported in `events` discards the current selection because
    /// its reachable set was computed against a roster that no longer exists.
    pub fn handle(
        &mut self,
        events: &[Event],
        tap: TapInput,
        terrain: TerrainView<'_>,
        roster: &RosterView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::UnitRelocated { unit, .. } = event {
                if self.selected.take().is_some() {
                    debug!("selection discarded after unit {} moved", unit.get());
                }
            }
        }

        let Some(cell) = tap.cell else {
            return;
        };
        if !terrain.is_in_bounds(cell) {
            return;
        }

        let Some(set) = self.selected.take() else {
            self.select_at(cell, terrain, roster);
            return;
        };

        if cell == set.origin() {
            debug!("unit {} deselected", set.unit().get());
            return;
        }

        if roster.occupant(cell).is_some_and(is_selectable) {
            self.select_at(cell, terrain, roster);
            return;
        }

        if set.contains(cell) && roster.occupant(cell).is_none() {
            out.push(Command::CommitMove {
                set,
                destination: cell,
            });
        }
    }

    /// Reports whether a unit is currently selected.
    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        match &self.selected {
            Some(set) => SelectionPhase::Selected { unit: set.unit() },
            None => SelectionPhase::Idle,
        }
    }

    /// Reachable set of the selected unit, for highlighting.
    #[must_use]
    pub fn highlighted(&self) -> Option<&ReachableSet> {
        self.selected.as_ref()
    }

    /// Releases the selection slot.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    fn select_at(&mut self, cell: CellCoord, terrain: TerrainView<'_>, roster: &RosterView) {
        let Some(unit) = roster.occupant(cell).filter(|unit| is_selectable(unit)) else {
            return;
        };

        self.selected = self.reachability.compute(terrain, roster, unit.id);
        if let Some(set) = &self.selected {
            debug!(
                "unit {} selected at {:?} with {} reachable cells",
                unit.id.get(),
                cell,
                set.len()
            );
        }
    }
}

fn is_selectable(unit: &UnitSnapshot) -> bool {
    unit.faction == Faction::Friendly && !unit.busy
}
