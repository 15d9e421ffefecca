use std::time::Duration;

use tactics_core::{CellCoord, Command, Event, Faction, ReachableSet, UnitId};
use tactics_system_relocation::{Config, Relocation, DEFAULT_RELOCATION_DURATION};
use tactics_world::{self as world, query, BattleLayout, UnitPlacement, World};

fn committed_world() -> (World, Vec<Event>) {
    let layout = BattleLayout::open(5, 5)
        .with_unit(UnitPlacement::new(CellCoord::new(0, 0), Faction::Friendly));
    let mut world = World::from_layout(&layout).expect("valid layout");
    let destination = CellCoord::new(2, 0);
    let set = ReachableSet::new(
        UnitId::new(0),
        CellCoord::new(0, 0),
        5,
        [CellCoord::new(1, 0), destination].into_iter().collect(),
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::CommitMove { set, destination },
        &mut events,
    );
    (world, events)
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

#[test]
fn busy_clears_only_after_animation_completes() {
    let (mut world, events) = committed_world();
    let unit = UnitId::new(0);
    let mut relocation = Relocation::default();
    let mut commands = Vec::new();

    relocation.handle(&events, &mut commands);
    assert!(commands.is_empty(), "relocation just started");
    let snapshot = query::unit(&world, unit).expect("unit exists");
    assert_eq!(snapshot.cell, CellCoord::new(2, 0), "logical move is immediate");
    assert!(snapshot.busy);

    let events = tick(&mut world, 200);
    relocation.handle(&events, &mut commands);
    assert!(commands.is_empty(), "animation still running");
    assert!(query::unit(&world, unit).is_some_and(|unit| unit.busy));

    let events = tick(&mut world, 100);
    relocation.handle(&events, &mut commands);
    assert_eq!(commands, vec![Command::FinishRelocation { unit }]);

    let mut events = Vec::new();
    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(events, vec![Event::RelocationFinished { unit }]);
    assert!(query::unit(&world, unit).is_some_and(|unit| !unit.busy));
    assert!(relocation.is_idle());
}

#[test]
fn progress_tracks_elapsed_time() {
    let (mut world, events) = committed_world();
    let unit = UnitId::new(0);
    let mut relocation = Relocation::new(Config::new(Duration::from_millis(200)));
    let mut commands = Vec::new();

    relocation.handle(&events, &mut commands);
    assert_eq!(relocation.progress(unit), Some(0.0));

    let events = tick(&mut world, 100);
    relocation.handle(&events, &mut commands);
    let progress = relocation.progress(unit).expect("in flight");
    assert!((progress - 0.5).abs() < 1e-6);
    let eased = relocation.eased_progress(unit).expect("in flight");
    assert!((eased - 0.875).abs() < 1e-6);

    let track = relocation.tracks().next().expect("one track");
    assert_eq!(track.from, CellCoord::new(0, 0));
    assert_eq!(track.to, CellCoord::new(2, 0));
    assert!(commands.is_empty());
}

#[test]
fn finished_units_are_reported_in_identifier_order() {
    let mut relocation = Relocation::default();
    let mut commands = Vec::new();

    relocation.handle(
        &[
            Event::UnitRelocated {
                unit: UnitId::new(7),
                from: CellCoord::new(0, 0),
                to: CellCoord::new(0, 1),
            },
            Event::UnitRelocated {
                unit: UnitId::new(2),
                from: CellCoord::new(3, 3),
                to: CellCoord::new(3, 4),
            },
            Event::TimeAdvanced {
                dt: DEFAULT_RELOCATION_DURATION,
            },
        ],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::FinishRelocation {
                unit: UnitId::new(2)
            },
            Command::FinishRelocation {
                unit: UnitId::new(7)
            },
        ]
    );
}
