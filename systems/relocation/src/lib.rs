#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Relocation timer that finishes committed moves once their animation ends.
//!
//! The world updates a unit's logical cell the moment a commit is accepted.
//! This system tracks the visual interpolation that follows and emits
//! [`Command::FinishRelocation`] when it completes, which clears the unit's
//! busy flag.

use std::time::Duration;

use log::trace;
use tactics_core::{CellCoord, Command, Event, UnitId};

/// Duration of a single relocation animation.
pub const DEFAULT_RELOCATION_DURATION: Duration = Duration::from_millis(300);

/// Configuration for the relocation timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    duration: Duration,
}

impl Config {
    /// Creates a configuration with an explicit animation duration.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Time each relocation takes to complete.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RELOCATION_DURATION)
    }
}

/// Progress of one in-flight relocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track {
    /// Unit being relocated.
    pub unit: UnitId,
    /// Cell the unit left.
    pub from: CellCoord,
    /// Cell the unit is moving to.
    pub to: CellCoord,
    elapsed: Duration,
}

/// Pure system that reacts to relocation events and emits completion commands.
#[derive(Debug, Default)]
pub struct Relocation {
    config: Config,
    tracks: Vec<Track>,
}

impl Relocation {
    /// Creates a new relocation timer.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tracks: Vec::new(),
        }
    }

    /// Consumes world events and emits finish commands for completed moves.
    ///
    /// Finished units are reported in identifier order. A relocation started
    /// and advanced within the same batch counts the time that follows it.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::UnitRelocated { unit, from, to } => {
                    self.tracks.retain(|track| track.unit != *unit);
                    self.tracks.push(Track {
                        unit: *unit,
                        from: *from,
                        to: *to,
                        elapsed: Duration::ZERO,
                    });
                }
                Event::TimeAdvanced { dt } => {
                    for track in &mut self.tracks {
                        track.elapsed = track.elapsed.saturating_add(*dt);
                    }
                }
                _ => {}
            }
        }

        let duration = self.config.duration();
        let mut finished: Vec<UnitId> = self
            .tracks
            .iter()
            .filter(|track| track.elapsed >= duration)
            .map(|track| track.unit)
            .collect();
        if finished.is_empty() {
            return;
        }

        finished.sort();
        self.tracks.retain(|track| track.elapsed < duration);
        for unit in finished {
            trace!("relocation of unit {} complete", unit.get());
            out.push(Command::FinishRelocation { unit });
        }
    }

    /// Linear completion fraction in `[0, 1]` for an in-flight relocation.
    #[must_use]
    pub fn progress(&self, unit: UnitId) -> Option<f32> {
        let track = self.tracks.iter().find(|track| track.unit == unit)?;
        let duration = self.config.duration();
        if duration.is_zero() {
            return Some(1.0);
        }
        let fraction = track.elapsed.as_secs_f32() / duration.as_secs_f32();
        Some(fraction.clamp(0.0, 1.0))
    }

    /// Completion fraction with a cubic ease-out applied.
    #[must_use]
    pub fn eased_progress(&self, unit: UnitId) -> Option<f32> {
        self.progress(unit).map(ease_out_cubic)
    }

    /// Iterator over all in-flight relocations.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Reports whether any relocation is still animating.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    let inverse = 1.0 - t;
    1.0 - inverse * inverse * inverse
}
