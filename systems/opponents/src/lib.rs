#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted opponents that turn read-only match state into aim decisions.
//!
//! Every strategy implements [`Strategy`] and reads a [`DecisionContext`]
//! built from an owned [`GameSnapshot`]. The [`Opponents`] roster owns one
//! strategy and one seeded generator per scripted player, and
//! [`ScriptedTurns`] paces those decisions into commands for the world.

mod aim;
mod pacing;
mod strategies;

use artillery_core::{
    Difficulty, Direction, GameSnapshot, Inventory, PlayerConfig, PlayerId, PlayerKind,
    TankSnapshot, TerrainView, WeaponKind, MAX_ANGLE,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub use aim::{
    direct_aim, line_of_sight, living_enemies, nearest_enemy, select_weapon, solve_trajectory,
    weakest_enemy, Aim, SOLVER_MAX_ELEVATION, SOLVER_MIN_ELEVATION, SOLVER_STEP,
};
pub use pacing::{ScriptedTurns, HOLD_DELAY, THINK_DELAY};
pub use strategies::{
    Adaptive, Arc, Direct, Predictive, PriorityTarget, Random, Selector, Wildcard, CYBORG_ERROR,
};

const SEED_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// Shot chosen by a strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    /// Degrees above the horizon, `[0, 90]`.
    pub elevation: f32,
    /// Firing power, `[0, 100]`.
    pub power: f32,
    /// Side of the tank the barrel points to.
    pub facing: Direction,
    /// Weapon to fire.
    pub weapon: WeaponKind,
}

impl Decision {
    /// Tank aim angle in `[0, 180]` for this elevation and facing.
    #[must_use]
    pub fn launch_angle(&self) -> f32 {
        match self.facing {
            Direction::Right => self.elevation,
            Direction::Left => MAX_ANGLE - self.elevation,
        }
    }
}

/// Everything a strategy may look at when choosing a shot.
#[derive(Clone, Debug)]
pub struct DecisionContext<'a> {
    /// The deciding player's tank.
    pub tank: TankSnapshot,
    /// Every other tank, living or not.
    pub enemies: Vec<TankSnapshot>,
    /// Rounds the deciding player has left.
    pub inventory: Inventory,
    /// Current terrain occupancy.
    pub terrain: TerrainView<'a>,
    /// Wind acceleration of the round.
    pub wind: f32,
    /// Gravity acceleration of the match.
    pub gravity: f32,
}

impl<'a> DecisionContext<'a> {
    /// Builds the context for `player`, or `None` when the player is unknown
    /// or its tank is destroyed.
    #[must_use]
    pub fn for_player(
        snapshot: &GameSnapshot,
        player: PlayerId,
        terrain: TerrainView<'a>,
    ) -> Option<Self> {
        let me = snapshot.player(player)?;
        if !me.tank.alive {
            return None;
        }

        Some(Self {
            tank: me.tank,
            enemies: snapshot
                .tanks()
                .filter(|tank| tank.player != player)
                .copied()
                .collect(),
            inventory: me.inventory.clone(),
            terrain,
            wind: snapshot.wind,
            gravity: snapshot.gravity,
        })
    }
}

/// Decision-making capability shared by every opponent level.
pub trait Strategy: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Chooses the next shot. Must not fail; without a target a safe default
    /// is returned.
    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision;
}

/// Instantiates the strategy behind a difficulty level.
///
/// `rng` is only consumed by [`Difficulty::Unknown`], which draws the level
/// it will imitate.
#[must_use]
pub fn create(difficulty: Difficulty, rng: &mut ChaCha8Rng) -> Box<dyn Strategy> {
    match difficulty {
        Difficulty::Moron => Box::new(Random),
        Difficulty::Shooter => Box::new(Direct),
        Difficulty::Tosser => Box::new(Adaptive::default()),
        Difficulty::Cyborg => Box::new(Predictive::new(CYBORG_ERROR)),
        Difficulty::Poolshark => Box::new(Arc),
        Difficulty::Chooser => Box::new(Selector::default()),
        Difficulty::Spoiler => Box::new(PriorityTarget),
        Difficulty::Unknown => Box::new(Wildcard::new(rng)),
    }
}

/// Instantiates the strategy named by a configuration label. Missing or
/// unrecognised labels aim directly.
#[must_use]
pub fn for_label(label: Option<&str>, rng: &mut ChaCha8Rng) -> Box<dyn Strategy> {
    match label.and_then(Difficulty::from_label) {
        Some(difficulty) => create(difficulty, rng),
        None => Box::new(Direct),
    }
}

struct Opponent {
    player: PlayerId,
    strategy: Box<dyn Strategy>,
    rng: ChaCha8Rng,
}

/// Strategies of every scripted player in a match.
pub struct Opponents {
    roster: Vec<Opponent>,
}

impl Opponents {
    /// Creates a strategy for each scripted player.
    ///
    /// Each opponent draws from its own generator derived from `match_seed`
    /// and its player id, so decisions do not depend on turn interleaving.
    #[must_use]
    pub fn new(players: &[PlayerConfig], match_seed: u64) -> Self {
        let roster = players
            .iter()
            .filter(|config| config.kind == PlayerKind::Scripted)
            .map(|config| {
                let seed = match_seed ^ u64::from(config.id.get()).wrapping_mul(SEED_SPREAD);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let strategy = for_label(config.difficulty.as_deref(), &mut rng);
                debug!(player = %config.id, strategy = strategy.name(), "opponent ready");
                Opponent {
                    player: config.id,
                    strategy,
                    rng,
                }
            })
            .collect();
        Self { roster }
    }

    /// Reports whether `player` is driven by a strategy.
    #[must_use]
    pub fn controls(&self, player: PlayerId) -> bool {
        self.roster.iter().any(|opponent| opponent.player == player)
    }

    /// Name of the strategy driving `player`.
    #[must_use]
    pub fn strategy_name(&self, player: PlayerId) -> Option<&str> {
        self.roster
            .iter()
            .find(|opponent| opponent.player == player)
            .map(|opponent| opponent.strategy.name())
    }

    /// Asks the strategy of `player` for its next shot.
    ///
    /// Returns `None` when `player` is not scripted or has no living tank.
    pub fn decide(
        &mut self,
        player: PlayerId,
        snapshot: &GameSnapshot,
        terrain: TerrainView<'_>,
    ) -> Option<Decision> {
        let opponent = self
            .roster
            .iter_mut()
            .find(|opponent| opponent.player == player)?;
        let context = DecisionContext::for_player(snapshot, player, terrain)?;
        let decision = opponent.strategy.decide(&context, &mut opponent.rng);
        debug!(
            player = %player,
            strategy = opponent.strategy.name(),
            elevation = decision.elevation,
            power = decision.power,
            weapon = decision.weapon.spec().name(),
            "opponent decided"
        );
        Some(decision)
    }
}

impl std::fmt::Debug for Opponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.roster
                    .iter()
                    .map(|opponent| (opponent.player, opponent.strategy.name())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_angle_mirrors_for_left_facing() {
        let mut decision = Decision {
            elevation: 30.0,
            power: 50.0,
            facing: Direction::Right,
            weapon: WeaponKind::Missile,
        };
        assert_eq!(decision.launch_angle(), 30.0);

        decision.facing = Direction::Left;
        assert_eq!(decision.launch_angle(), 150.0);
    }

    #[test]
    fn factory_maps_every_level() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let expected = [
            (Difficulty::Moron, "random"),
            (Difficulty::Shooter, "direct"),
            (Difficulty::Tosser, "adaptive"),
            (Difficulty::Cyborg, "predictive"),
            (Difficulty::Poolshark, "arc"),
            (Difficulty::Chooser, "selector"),
            (Difficulty::Spoiler, "priority"),
            (Difficulty::Unknown, "wildcard"),
        ];
        for (difficulty, name) in expected {
            assert_eq!(create(difficulty, &mut rng).name(), name);
        }
    }

    #[test]
    fn unrecognised_labels_aim_directly() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert_eq!(for_label(Some("grandmaster"), &mut rng).name(), "direct");
        assert_eq!(for_label(None, &mut rng).name(), "direct");
        assert_eq!(for_label(Some("Cyborg"), &mut rng).name(), "predictive");
    }
}
