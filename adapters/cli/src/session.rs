//! Headless host loop that plays a match between scripted opponents.

use std::time::Duration;

use anyhow::{Context, Result};
use artillery_core::{Command, Event, GameSnapshot, Phase};
use artillery_system_opponents::{Opponents, ScriptedTurns};
use artillery_world::{self as world, query, World};
use tracing::{info, trace, warn};

use crate::settings::MatchFile;

/// Final state of a headless match.
#[derive(Debug)]
pub(crate) struct Outcome {
    /// Owned copy of the world when the loop stopped.
    pub(crate) snapshot: GameSnapshot,
    /// Terrain at the end of the match as a transfer string.
    pub(crate) terrain: String,
    /// Ticks simulated.
    pub(crate) ticks: usize,
    /// Projectiles fired across the match.
    pub(crate) shots: usize,
    /// Cleared when the tick budget ran out before the match ended.
    pub(crate) completed: bool,
}

/// Drives the world with fixed ticks until the match is over or `max_ticks`
/// ticks have elapsed.
pub(crate) fn run(file: MatchFile, tick: Duration, max_ticks: usize) -> Result<Outcome> {
    let mut opponents = Opponents::new(&file.players, file.config.rules.seed);
    let mut world =
        World::new(file.config, file.players).context("invalid match configuration")?;
    let mut pacing = ScriptedTurns::new();

    let mut events = Vec::new();
    let mut commands = Vec::new();
    let mut shots = 0;
    let mut ticks = 0;
    world::apply(&mut world, Command::StartMatch, &mut events);

    while ticks < max_ticks {
        let snapshot = query::game_snapshot(&world);
        pacing.handle(
            &events,
            &mut opponents,
            &snapshot,
            query::terrain_view(&world),
            &mut commands,
        );
        shots += record(&mut events);

        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        if query::phase(&world) == Phase::GameOver {
            break;
        }

        world::apply(&mut world, Command::Tick { dt: tick }, &mut events);
        ticks += 1;
    }
    shots += record(&mut events);

    let completed = query::phase(&world) == Phase::GameOver;
    if completed {
        info!(ticks, shots, winner = ?query::winner(&world), "match finished");
    } else {
        pacing.stop();
        warn!(ticks, round = query::round(&world), "tick budget exhausted before the match ended");
    }

    Ok(Outcome {
        snapshot: query::game_snapshot(&world),
        terrain: crate::terrain_transfer::encode(query::terrain_view(&world)),
        ticks,
        shots,
        completed,
    })
}

fn record(events: &mut Vec<Event>) -> usize {
    let mut fired = 0;
    for event in events.drain(..) {
        if matches!(event, Event::ProjectileFired { .. }) {
            fired += 1;
        }
        trace!(?event);
    }
    fired
}
