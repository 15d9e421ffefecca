//! Text rendering of the battlefield for terminal output.

use std::fmt::Write as _;

use tactics_core::{CellCoord, Faction, ReachableSet, RosterView, TerrainView};

/// Renders the grid one row per line.
///
/// `#` marks blocked terrain, `F`/`H` mark idle friendly and hostile units,
/// `f`/`h` mark units that are still relocating, `*` marks highlighted
/// destinations and `.` marks open ground.
pub(crate) fn render(
    terrain: TerrainView<'_>,
    roster: &RosterView,
    highlighted: Option<&ReachableSet>,
) -> String {
    let (columns, rows) = terrain.dimensions();
    let mut board = String::new();

    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            board.push(glyph(cell, terrain, roster, highlighted));
        }
        board.push('\n');
    }

    if let Some(set) = highlighted {
        let _ = writeln!(
            board,
            "unit {} at ({}, {}) reaches {} cells",
            set.unit().get(),
            set.origin().column(),
            set.origin().row(),
            set.len()
        );
    }

    board
}

fn glyph(
    cell: CellCoord,
    terrain: TerrainView<'_>,
    roster: &RosterView,
    highlighted: Option<&ReachableSet>,
) -> char {
    if let Some(unit) = roster.occupant(cell) {
        return match (unit.faction, unit.busy) {
            (Faction::Friendly, false) => 'F',
            (Faction::Friendly, true) => 'f',
            (Faction::Hostile, false) => 'H',
            (Faction::Hostile, true) => 'h',
        };
    }
    if !terrain.is_passable(cell) {
        return '#';
    }
    if highlighted.is_some_and(|set| set.contains(cell)) {
        return '*';
    }
    '.'
}
