//! Paces scripted decisions so that opponents appear to think before acting.

use std::time::Duration;

use artillery_core::{Command, Event, GameSnapshot, PlayerId, TerrainView};
use tracing::debug;

use crate::{Decision, Opponents};

/// Simulated time a scripted player waits before aiming.
pub const THINK_DELAY: Duration = Duration::from_secs(1);

/// Simulated time a scripted player holds its aim before firing.
pub const HOLD_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Idle,
    Thinking {
        player: PlayerId,
        remaining: Duration,
    },
    Holding {
        player: PlayerId,
        remaining: Duration,
        decision: Decision,
    },
}

/// System that turns `TurnStarted` events for scripted players into `Aim`
/// and `Fire` commands after fixed waits measured in simulated time.
#[derive(Debug)]
pub struct ScriptedTurns {
    stage: Stage,
    stopped: bool,
}

impl Default for ScriptedTurns {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTurns {
    /// Creates an idle pacing system.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: Stage::Idle,
            stopped: false,
        }
    }

    /// Reports whether no scripted turn is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }

    /// Player whose scripted turn is pending, if any.
    #[must_use]
    pub fn pending_player(&self) -> Option<PlayerId> {
        match self.stage {
            Stage::Idle => None,
            Stage::Thinking { player, .. } | Stage::Holding { player, .. } => Some(player),
        }
    }

    /// Cancels any pending wait. No command is emitted afterwards.
    pub fn stop(&mut self) {
        self.stage = Stage::Idle;
        self.stopped = true;
    }

    /// Consumes world events and emits the commands of due scripted turns.
    ///
    /// `snapshot` and `terrain` must describe the world after `events` were
    /// produced.
    pub fn handle(
        &mut self,
        events: &[Event],
        opponents: &mut Opponents,
        snapshot: &GameSnapshot,
        terrain: TerrainView<'_>,
        out: &mut Vec<Command>,
    ) {
        if self.stopped {
            return;
        }

        for event in events {
            match event {
                Event::TurnStarted { player, .. } => {
                    self.stage = if opponents.controls(*player) {
                        Stage::Thinking {
                            player: *player,
                            remaining: THINK_DELAY,
                        }
                    } else {
                        Stage::Idle
                    };
                }
                Event::RoundEnded { .. } | Event::GameOver { .. } => {
                    self.stage = Stage::Idle;
                }
                Event::TimeAdvanced { dt } => {
                    self.advance(*dt, opponents, snapshot, terrain, out);
                }
                _ => {}
            }
        }
    }

    fn advance(
        &mut self,
        mut dt: Duration,
        opponents: &mut Opponents,
        snapshot: &GameSnapshot,
        terrain: TerrainView<'_>,
        out: &mut Vec<Command>,
    ) {
        loop {
            match self.stage {
                Stage::Idle => return,
                Stage::Thinking { player, remaining } => {
                    if dt < remaining {
                        self.stage = Stage::Thinking {
                            player,
                            remaining: remaining - dt,
                        };
                        return;
                    }
                    dt -= remaining;

                    let Some(decision) = opponents.decide(player, snapshot, terrain) else {
                        out.push(Command::PassTurn { player });
                        self.stage = Stage::Idle;
                        return;
                    };
                    out.push(Command::Aim {
                        player,
                        angle: decision.launch_angle(),
                        power: decision.power,
                    });
                    self.stage = Stage::Holding {
                        player,
                        remaining: HOLD_DELAY,
                        decision,
                    };
                }
                Stage::Holding {
                    player,
                    remaining,
                    decision,
                } => {
                    if dt < remaining {
                        self.stage = Stage::Holding {
                            player,
                            remaining: remaining - dt,
                            decision,
                        };
                        return;
                    }

                    self.stage = Stage::Idle;
                    let armed = snapshot
                        .player(player)
                        .map_or(false, |state| state.inventory.count(decision.weapon) > 0);
                    if armed {
                        out.push(Command::Fire {
                            player,
                            angle: decision.launch_angle(),
                            power: decision.power,
                            weapon: decision.weapon,
                        });
                    } else {
                        debug!(player = %player, "scripted player has no ammunition");
                        out.push(Command::PassTurn { player });
                    }
                    return;
                }
            }
        }
    }
}
