#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the artillery engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and scripted players submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views such as [`TerrainView`] and [`GameSnapshot`], and
//! respond exclusively with new command batches.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;
mod view;
mod weapons;

pub use config::{
    validate_roster, ConfigError, EconomyConfig, GameConfig, MatchConfig, PhysicsConfig,
    TankConfig, TerrainConfig,
};
pub use view::TerrainView;
pub use weapons::{Inventory, WeaponEffect, WeaponKind, WeaponSpec};

/// Distance from a tank's position within which a projectile counts as a hit.
pub const TANK_RADIUS: f32 = 10.0;

/// Distance from a tank's position to the muzzle where projectiles spawn.
pub const BARREL_LENGTH: f32 = 15.0;

/// Largest aim angle a tank accepts, in degrees from the rightward horizontal.
pub const MAX_ANGLE: f32 = 180.0;

/// Largest elevation an opponent decision reports, in degrees.
pub const MAX_ELEVATION: f32 = 90.0;

/// Largest firing power a tank accepts.
pub const MAX_POWER: f32 = 100.0;

/// Clamps an aim angle into `[0, MAX_ANGLE]`, mapping NaN to zero.
#[must_use]
pub fn clamp_angle(angle: f32) -> f32 {
    if angle.is_nan() {
        return 0.0;
    }
    angle.clamp(0.0, MAX_ANGLE)
}

/// Clamps a firing power into `[0, MAX_POWER]`, mapping NaN to zero.
#[must_use]
pub fn clamp_power(power: f32) -> f32 {
    if power.is_nan() {
        return 0.0;
    }
    power.clamp(0.0, MAX_POWER)
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Sets up the first round and opens the first turn.
    StartMatch,
    /// Adjusts the active player's aim. Values are clamped, never rejected.
    Aim {
        /// Player whose tank is aimed.
        player: PlayerId,
        /// Requested angle in degrees.
        angle: f32,
        /// Requested firing power.
        power: f32,
    },
    /// Drives the active player's tank along the terrain surface.
    MoveTank {
        /// Player whose tank moves.
        player: PlayerId,
        /// Direction of travel.
        direction: Direction,
        /// Horizontal distance to cover, paid for with fuel.
        distance: f32,
    },
    /// Aims and fires one round of the selected weapon.
    Fire {
        /// Player pulling the trigger.
        player: PlayerId,
        /// Launch angle in degrees.
        angle: f32,
        /// Launch power.
        power: f32,
        /// Weapon to fire; one round is consumed from the inventory.
        weapon: WeaponKind,
    },
    /// Forfeits the active player's turn without firing.
    PassTurn {
        /// Player giving up the turn.
        player: PlayerId,
    },
    /// Buys one bundle of a weapon.
    PurchaseWeapon {
        /// Player spending money.
        player: PlayerId,
        /// Weapon bought.
        weapon: WeaponKind,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A round was set up with fresh terrain, tanks and wind.
    RoundStarted {
        /// One-based round number.
        round: u32,
        /// Wind acceleration for the round.
        wind: f32,
        /// Seed the terrain was generated from.
        terrain_seed: u64,
    },
    /// A player may now aim and fire.
    TurnStarted {
        /// Round the turn belongs to.
        round: u32,
        /// Player whose turn opened.
        player: PlayerId,
    },
    /// A tank's aim changed.
    AimAdjusted {
        /// Player whose tank was aimed.
        player: PlayerId,
        /// Clamped angle in degrees.
        angle: f32,
        /// Clamped power.
        power: f32,
    },
    /// A tank drove to a new surface point.
    TankMoved {
        /// Player whose tank moved.
        player: PlayerId,
        /// Position before moving.
        from: Vec2,
        /// Position after moving.
        to: Vec2,
        /// Fuel left after the move.
        fuel_remaining: f32,
    },
    /// A move request was refused.
    MoveRejected {
        /// Player whose request was refused.
        player: PlayerId,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// A projectile left a barrel.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Player who fired.
        player: PlayerId,
        /// Weapon that was fired.
        weapon: WeaponKind,
        /// Muzzle position the projectile spawned at.
        origin: Vec2,
    },
    /// A fire request was refused.
    FireRejected {
        /// Player whose request was refused.
        player: PlayerId,
        /// Weapon that was requested.
        weapon: WeaponKind,
        /// Specific reason the shot failed.
        reason: FireError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A projectile struck terrain or a tank and resolved its effect.
    ProjectileExploded {
        /// Projectile that landed.
        projectile: ProjectileId,
        /// Weapon carried by the projectile.
        weapon: WeaponKind,
        /// Impact point.
        position: Vec2,
        /// Tank struck directly, if any.
        hit: Option<TankId>,
    },
    /// A projectile left the field or timed out without effect.
    ProjectileFizzled {
        /// Projectile that ended.
        projectile: ProjectileId,
        /// Last known position.
        position: Vec2,
    },
    /// A tank lost shield or health.
    TankDamaged {
        /// Tank that was damaged.
        tank: TankId,
        /// Owner of the damaged tank.
        player: PlayerId,
        /// Player whose projectile caused the damage.
        source: PlayerId,
        /// Damage dealt before the shield absorbed its share.
        amount: u32,
        /// Portion absorbed by the shield.
        shield_absorbed: u32,
        /// Health remaining after the hit.
        health: u32,
    },
    /// A tank dropped onto lowered ground.
    TankFell {
        /// Tank that fell.
        tank: TankId,
        /// Owner of the tank.
        player: PlayerId,
        /// Vertical distance dropped.
        distance: f32,
        /// Fall damage applied.
        damage: u32,
    },
    /// A tank's health reached zero.
    TankDestroyed {
        /// Tank that was destroyed.
        tank: TankId,
        /// Owner of the destroyed tank.
        player: PlayerId,
        /// Player credited with the destruction.
        by: PlayerId,
    },
    /// Every projectile of the active turn has resolved.
    TurnResolved {
        /// Player whose shot resolved.
        player: PlayerId,
    },
    /// A player forfeited the turn.
    TurnPassed {
        /// Player who passed.
        player: PlayerId,
    },
    /// A weapon bundle was bought.
    WeaponPurchased {
        /// Buyer.
        player: PlayerId,
        /// Weapon bought.
        weapon: WeaponKind,
        /// Rounds added to the inventory.
        quantity: u32,
        /// Money spent.
        cost: u64,
    },
    /// A purchase request was refused.
    PurchaseRejected {
        /// Player whose request was refused.
        player: PlayerId,
        /// Weapon that was requested.
        weapon: WeaponKind,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// A round finished.
    RoundEnded {
        /// Round that ended.
        round: u32,
        /// Why the round ended.
        reason: RoundEndReason,
    },
    /// Interest was credited at a round boundary.
    InterestPaid {
        /// Player credited.
        player: PlayerId,
        /// Amount added to the player's money.
        amount: u64,
    },
    /// The match is over; no further turns are processed.
    GameOver {
        /// Highest scoring player, first in turn order on ties.
        winner: Option<PlayerId>,
    },
}

/// Reasons a fire request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireError {
    /// The match is not waiting for a shot.
    WrongPhase,
    /// Another player holds the turn.
    NotYourTurn,
    /// The player's tank is destroyed.
    TankDestroyed,
    /// The requested weapon has no rounds left.
    OutOfAmmo,
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveError {
    /// The match is not waiting for the active player.
    WrongPhase,
    /// Another player holds the turn.
    NotYourTurn,
    /// The tank refused: destroyed, out of fuel, out of bounds or too steep.
    Blocked,
}

/// Reasons a purchase request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseError {
    /// No player with the provided identifier exists.
    UnknownPlayer,
    /// The player cannot afford the bundle.
    InsufficientFunds,
    /// The match is over.
    GameOver,
}

/// Why a round finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundEndReason {
    /// Turn order wrapped after every living player acted.
    AllActed,
    /// At most one tank survived.
    LastTankStanding,
}

/// Stage of the turn/round state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The match has not started yet.
    Setup,
    /// The active player may aim, move and fire.
    Aiming,
    /// Projectiles are in flight.
    Resolving,
    /// The match is over.
    GameOver,
}

/// Horizontal travel or facing direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    Right,
}

impl Direction {
    /// Unit sign of the direction along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Direction pointing from `from` toward `to`; ties face right.
    #[must_use]
    pub fn toward(from: Vec2, to: Vec2) -> Self {
        if to.x < from.x {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
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

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unique identifier assigned to a tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TankId(u32);

impl TankId {
    /// Creates a new tank identifier with the provided numeric value.
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

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
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

/// Display color assigned to a player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Who controls a player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// Commands arrive from an input adapter.
    #[default]
    Human,
    /// Commands are produced by an opponent strategy.
    #[serde(alias = "ai")]
    Scripted,
}

/// Named opponent difficulty levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Random angle and power.
    Moron,
    /// Aims straight at the nearest enemy.
    Shooter,
    /// Perturbs its previous shot each turn.
    Tosser,
    /// Solves the ballistic equation with a small error.
    Cyborg,
    /// Lobs steep shots over obstacles.
    Poolshark,
    /// Picks a direct or lobbed shot depending on line of sight.
    Chooser,
    /// Solves the ballistic equation flawlessly against the weakest enemy.
    Spoiler,
    /// Secretly behaves like one of the other levels.
    Unknown,
}

impl Difficulty {
    /// Every difficulty level in menu order.
    pub const ALL: [Difficulty; 8] = [
        Self::Moron,
        Self::Shooter,
        Self::Tosser,
        Self::Cyborg,
        Self::Poolshark,
        Self::Chooser,
        Self::Spoiler,
        Self::Unknown,
    ];

    /// Lowercase label used in configuration files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Moron => "moron",
            Self::Shooter => "shooter",
            Self::Tosser => "tosser",
            Self::Cyborg => "cyborg",
            Self::Poolshark => "poolshark",
            Self::Chooser => "chooser",
            Self::Spoiler => "spoiler",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a label case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.label().eq_ignore_ascii_case(label))
    }
}

/// Static description of a participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Unique identifier of the player.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display color.
    #[serde(default)]
    pub color: Color,
    /// Human or scripted control.
    #[serde(default)]
    pub kind: PlayerKind,
    /// Difficulty label of a scripted player; unrecognised labels fall back
    /// to direct fire.
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// In-flight projectile state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier assigned when the projectile was fired.
    pub id: ProjectileId,
    /// Weapon carried by the projectile.
    pub weapon: WeaponKind,
    /// Current position; `y` grows downward.
    pub position: Vec2,
    /// Current velocity in units per second.
    pub velocity: Vec2,
    /// Flight direction in radians, `atan2(vy, vx)`.
    pub angle: f32,
    /// Player who fired the projectile.
    pub owner: PlayerId,
    /// Seconds spent airborne.
    pub airtime: f32,
}

/// Immutable representation of a single tank's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    /// Identifier allocated to the tank at round setup.
    pub id: TankId,
    /// Owner of the tank.
    pub player: PlayerId,
    /// Position on the terrain surface.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Health at round start.
    pub max_health: u32,
    /// Damage buffer consumed before health.
    pub shield: u32,
    /// Fuel available for movement.
    pub fuel: f32,
    /// Aim angle in degrees, `[0, 180]`.
    pub angle: f32,
    /// Firing power, `[0, 100]`.
    pub power: f32,
    /// Cleared once health reaches zero.
    pub alive: bool,
}

/// Immutable representation of a participant used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Static player description.
    pub config: PlayerConfig,
    /// Current tank state.
    pub tank: TankSnapshot,
    /// Money available for purchases.
    pub money: u64,
    /// Remaining ammunition.
    pub inventory: Inventory,
    /// Cumulative score across rounds.
    pub score: u64,
    /// Enemy tanks destroyed.
    pub kills: u32,
    /// Times this player's tank was destroyed.
    pub deaths: u32,
}

/// Owned copy of the authoritative match state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// One-based round number.
    pub round: u32,
    /// Configured number of rounds.
    pub rounds: u32,
    /// Index of the active player in turn order.
    pub current_player_index: usize,
    /// Current stage of the state machine.
    pub phase: Phase,
    /// Participants in turn order.
    pub players: Vec<PlayerSnapshot>,
    /// Wind acceleration of the round.
    pub wind: f32,
    /// Gravity acceleration of the match.
    pub gravity: f32,
    /// Terrain columns.
    pub terrain_width: u32,
    /// Terrain rows.
    pub terrain_height: u32,
    /// Projectiles in flight.
    pub projectiles: Vec<Projectile>,
    /// Set once the match is over.
    pub game_over: bool,
    /// Winner once the match is over.
    pub winner: Option<PlayerId>,
}

impl GameSnapshot {
    /// Player holding the current turn.
    #[must_use]
    pub fn current_player(&self) -> Option<&PlayerSnapshot> {
        self.players.get(self.current_player_index)
    }

    /// Looks up a player by identifier.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|player| player.config.id == id)
    }

    /// Iterator over every tank in turn order.
    pub fn tanks(&self) -> impl Iterator<Item = &TankSnapshot> {
        self.players.iter().map(|player| &player.tank)
    }

    /// Number of tanks still alive.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.tanks().filter(|tank| tank.alive).count()
    }
}
