//! Per-run configuration and its validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PlayerConfig, PlayerId};

/// Complete set of constants that parameterise a match.
///
/// Every section falls back to its [`Default`] when omitted from a config
/// file, so an empty document describes a playable match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round count, master seed and terrain seeding policy.
    #[serde(rename = "match")]
    pub rules: MatchConfig,
    /// Gravity and wind bounds.
    pub physics: PhysicsConfig,
    /// Money and interest.
    pub economy: EconomyConfig,
    /// Terrain dimensions and generation parameters.
    pub terrain: TerrainConfig,
    /// Tank loadout applied at every round setup.
    pub tank: TankConfig,
}

/// Round count and randomness policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of rounds before the match ends.
    pub rounds: u32,
    /// Seed of the match RNG driving wind and per-round terrain seeds.
    pub seed: u64,
    /// When set, each round draws a fresh terrain seed from the match RNG;
    /// otherwise every round reuses [`TerrainConfig::seed`].
    pub reseed_terrain: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            seed: 0x5eed_a271_11e7_0001,
            reseed_terrain: true,
        }
    }
}

/// Environmental forces applied to projectiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in units per second squared.
    pub gravity: f32,
    /// Lower bound of the per-round wind draw.
    pub wind_min: f32,
    /// Upper bound of the per-round wind draw.
    pub wind_max: f32,
    /// Accepted for compatibility with existing config files; wind is
    /// redrawn once per round and never drifts.
    pub wind_change_rate: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            wind_min: -2.0,
            wind_max: 2.0,
            wind_change_rate: 0.1,
        }
    }
}

/// Money supply of the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Money every player starts with.
    pub starting_money: u64,
    /// Fraction of current money paid out at each round boundary.
    pub interest_rate: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: 10_000,
            interest_rate: 0.1,
        }
    }
}

/// Dimensions and generator parameters of the battlefield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of cell columns.
    pub width: u32,
    /// Number of cell rows.
    pub height: u32,
    /// Generator seed used when rounds do not reseed.
    pub seed: u64,
    /// Midpoint displacement roughness; halves at every recursion level.
    pub roughness: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            seed: 12_345,
            roughness: 0.7,
        }
    }
}

/// Loadout of a freshly placed tank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    /// Health at round start.
    pub max_health: u32,
    /// Fuel at round start.
    pub starting_fuel: f32,
    /// Shield at round start.
    pub starting_shield: u32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            starting_fuel: 50.0,
            starting_shield: 0,
        }
    }
}

/// Reasons a configuration or roster is rejected before a match starts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The match must last at least one round.
    #[error("match must have at least one round")]
    ZeroRounds,
    /// The terrain grid is too small to place tanks on.
    #[error("terrain must be at least 2x1 cells, got {width}x{height}")]
    InvalidTerrainSize {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The wind bounds are inverted.
    #[error("wind range is inverted: min {min} > max {max}")]
    InvalidWindRange {
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },
    /// A floating point setting is NaN or infinite.
    #[error("`{field}` must be a finite number")]
    NonFinite {
        /// Name of the offending setting.
        field: &'static str,
    },
    /// A setting that must not be negative is negative.
    #[error("`{field}` must not be negative")]
    Negative {
        /// Name of the offending setting.
        field: &'static str,
    },
    /// Tanks would start the round already destroyed.
    #[error("tank max health must be positive")]
    ZeroHealth,
    /// A duel needs at least two participants.
    #[error("at least two players are required, got {count}")]
    TooFewPlayers {
        /// Number of configured players.
        count: usize,
    },
    /// Two roster entries share an identifier.
    #[error("player id {0} appears more than once")]
    DuplicatePlayer(PlayerId),
}

impl GameConfig {
    /// Checks that the configuration describes a playable match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }

        if self.terrain.width < 2 || self.terrain.height == 0 {
            return Err(ConfigError::InvalidTerrainSize {
                width: self.terrain.width,
                height: self.terrain.height,
            });
        }

        for (field, value) in [
            ("physics.gravity", self.physics.gravity),
            ("physics.wind_min", self.physics.wind_min),
            ("physics.wind_max", self.physics.wind_max),
            ("physics.wind_change_rate", self.physics.wind_change_rate),
            ("terrain.roughness", self.terrain.roughness),
            ("tank.starting_fuel", self.tank.starting_fuel),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        let interest_rate = self.economy.interest_rate;
        if !interest_rate.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "economy.interest_rate",
            });
        }
        if interest_rate < 0.0 {
            return Err(ConfigError::Negative {
                field: "economy.interest_rate",
            });
        }

        if self.physics.wind_min > self.physics.wind_max {
            return Err(ConfigError::InvalidWindRange {
                min: self.physics.wind_min,
                max: self.physics.wind_max,
            });
        }

        for (field, value) in [
            ("terrain.roughness", self.terrain.roughness),
            ("tank.starting_fuel", self.tank.starting_fuel),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field });
            }
        }

        if self.tank.max_health == 0 {
            return Err(ConfigError::ZeroHealth);
        }

        Ok(())
    }
}

/// Checks that the roster has enough uniquely identified players.
pub fn validate_roster(players: &[PlayerConfig]) -> Result<(), ConfigError> {
    if players.len() < 2 {
        return Err(ConfigError::TooFewPlayers {
            count: players.len(),
        });
    }

    let mut seen = BTreeSet::new();
    for player in players {
        if !seen.insert(player.id) {
            return Err(ConfigError::DuplicatePlayer(player.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PlayerKind};

    fn player(id: u32) -> PlayerConfig {
        PlayerConfig {
            id: PlayerId::new(id),
            name: format!("Player {id}"),
            color: Color::from_rgb(255, 0, 0),
            kind: PlayerKind::Human,
            difficulty: None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_wind_is_rejected() {
        let mut config = GameConfig::default();
        config.physics.wind_min = 3.0;
        config.physics.wind_max = 1.0;

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidWindRange { min: 3.0, max: 1.0 })
        );
    }

    #[test]
    fn nan_gravity_is_rejected() {
        let mut config = GameConfig::default();
        config.physics.gravity = f32::NAN;

        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "physics.gravity"
            })
        );
    }

    #[test]
    fn degenerate_terrain_is_rejected() {
        let mut config = GameConfig::default();
        config.terrain.width = 1;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTerrainSize { width: 1, .. })
        ));
    }

    #[test]
    fn roster_requires_unique_ids() {
        assert_eq!(
            validate_roster(&[player(1)]),
            Err(ConfigError::TooFewPlayers { count: 1 })
        );
        assert_eq!(
            validate_roster(&[player(1), player(2), player(1)]),
            Err(ConfigError::DuplicatePlayer(PlayerId::new(1)))
        );
        assert_eq!(validate_roster(&[player(1), player(2)]), Ok(()));
    }
}
