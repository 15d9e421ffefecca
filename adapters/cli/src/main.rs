#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays grid taps against the default battle.

mod board;
mod input;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tactics_core::{CellCoord, Command, Event};
use tactics_system_relocation::{Config, Relocation};
use tactics_system_selection::{Selection, TapInput};
use tactics_world::{self as world, query, BattleLayout, World};

/// Upper bound on idle frames simulated after the last tap.
const MAX_SETTLE_FRAMES: u32 = 1_000;

/// Replays taps on the tactics battlefield and prints the board after each.
#[derive(Debug, Parser)]
#[command(name = "tactics", version)]
struct Args {
    /// Grid cell to tap, written as `column,row`. Repeat to tap several cells.
    #[arg(long = "tap", value_parser = input::parse_cell)]
    taps: Vec<CellCoord>,
    /// Simulated milliseconds that elapse after each tap.
    #[arg(long = "tick-ms", default_value_t = 100)]
    tick_ms: u64,
    /// Duration of each relocation animation in milliseconds.
    #[arg(long = "relocation-ms", default_value_t = 300)]
    relocation_ms: u64,
    /// Movement budget assigned to every unit instead of the default.
    #[arg(long)]
    budget: Option<u32>,
}

/// Owns the world and the systems that react to it.
struct Session {
    world: World,
    selection: Selection,
    relocation: Relocation,
    pending: Vec<Event>,
    dt: Duration,
}

impl Session {
    fn new(args: &Args) -> Result<Self> {
        let mut layout = BattleLayout::default();
        if let Some(budget) = args.budget {
            for unit in &mut layout.units {
                unit.movement_budget = budget;
            }
        }
        let world = World::from_layout(&layout).context("invalid battle layout")?;

        Ok(Self {
            world,
            selection: Selection::new(),
            relocation: Relocation::new(Config::new(Duration::from_millis(args.relocation_ms))),
            pending: Vec::new(),
            dt: Duration::from_millis(args.tick_ms),
        })
    }

    /// Processes one tap, advances time and resolves finished relocations.
    fn frame(&mut self, tap: TapInput) -> Vec<Event> {
        let mut events = Vec::new();

        let mut commands = Vec::new();
        self.selection.handle(
            &self.pending,
            tap,
            query::terrain_view(&self.world),
            &query::roster_view(&self.world),
            &mut commands,
        );
        self.apply_all(commands, &mut events);
        self.apply_all(vec![Command::Tick { dt: self.dt }], &mut events);

        let mut commands = Vec::new();
        self.relocation.handle(&events, &mut commands);
        self.apply_all(commands, &mut events);

        self.pending = events.clone();
        events
    }

    fn apply_all(&mut self, commands: Vec<Command>, out_events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, out_events);
        }
    }

    fn render(&self) -> String {
        board::render(
            query::terrain_view(&self.world),
            &query::roster_view(&self.world),
            self.selection.highlighted(),
        )
    }
}

/// Entry point for the tactics command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();

    let args = Args::parse();
    if args.tick_ms == 0 && !args.taps.is_empty() {
        warn!("tick-ms is zero; relocations will never finish");
    }
    let mut session = Session::new(&args)?;
    if query::roster_view(&session.world).is_empty() {
        warn!("battle has no units to select");
    }
    println!("{}", session.render());

    for cell in &args.taps {
        let events = session.frame(TapInput::at(*cell));
        println!("tap ({}, {})", cell.column(), cell.row());
        for event in &events {
            report(event);
        }
        println!("{}", session.render());
    }

    let mut settle_frames = 0;
    while !session.relocation.is_idle() && settle_frames < MAX_SETTLE_FRAMES {
        for event in session.frame(TapInput::default()) {
            report(&event);
        }
        settle_frames += 1;
    }
    if !session.relocation.is_idle() {
        warn!("relocations still in flight after {settle_frames} frames");
    }

    Ok(())
}

fn report(event: &Event) {
    match event {
        Event::UnitRelocated { unit, from, to } => info!(
            "unit {} moved ({}, {}) -> ({}, {})",
            unit.get(),
            from.column(),
            from.row(),
            to.column(),
            to.row()
        ),
        Event::MoveRejected {
            unit,
            destination,
            reason,
        } => info!(
            "unit {} cannot move to ({}, {}): {reason}",
            unit.get(),
            destination.column(),
            destination.row()
        ),
        Event::RelocationFinished { unit } => info!("unit {} is ready", unit.get()),
        Event::TimeAdvanced { .. } => {}
    }
}
