//! Tank entity: aiming, fuel-limited driving, damage and falling.

use artillery_core::{
    clamp_angle, clamp_power, Direction, PlayerId, TankConfig, TankId, TankSnapshot,
};
use glam::Vec2;

use crate::terrain::Terrain;

/// Height a resting tank keeps above the surface row beneath it.
pub const PLACEMENT_CLEARANCE: f32 = 5.0;

/// Falls shorter than this are harmless.
pub const FALL_DAMAGE_THRESHOLD: f32 = 20.0;

/// Damage per unit fallen beyond [`FALL_DAMAGE_THRESHOLD`].
pub const FALL_DAMAGE_FACTOR: f32 = 2.0;

/// Steepest slope, in degrees, a tank can drive up or down.
pub const MAX_CLIMB_DEGREES: f32 = 45.0;

const DEFAULT_ANGLE: f32 = 45.0;
const DEFAULT_POWER: f32 = 50.0;

/// Outcome of a single hit on a tank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Damage {
    /// Portion soaked up by the shield.
    pub absorbed: u32,
    /// Health actually removed.
    pub health_lost: u32,
    /// Set when this hit destroyed the tank.
    pub destroyed: bool,
}

/// A player's tank for the current round.
#[derive(Clone, Debug, PartialEq)]
pub struct Tank {
    id: TankId,
    player: PlayerId,
    position: Vec2,
    health: u32,
    max_health: u32,
    shield: u32,
    fuel: f32,
    angle: f32,
    power: f32,
    alive: bool,
}

impl Tank {
    /// Creates a tank with the configured loadout at `position`.
    #[must_use]
    pub fn new(id: TankId, player: PlayerId, position: Vec2, config: &TankConfig) -> Self {
        Self {
            id,
            player,
            position,
            health: config.max_health,
            max_health: config.max_health,
            shield: config.starting_shield,
            fuel: config.starting_fuel,
            angle: DEFAULT_ANGLE,
            power: DEFAULT_POWER,
            alive: config.max_health > 0,
        }
    }

    /// Identifier of the tank.
    #[must_use]
    pub const fn id(&self) -> TankId {
        self.id
    }

    /// Owner of the tank.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Remaining shield.
    #[must_use]
    pub const fn shield(&self) -> u32 {
        self.shield
    }

    /// Remaining fuel.
    #[must_use]
    pub const fn fuel(&self) -> f32 {
        self.fuel
    }

    /// Aim angle in degrees.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Firing power.
    #[must_use]
    pub const fn power(&self) -> f32 {
        self.power
    }

    /// Reports whether the tank still has health.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Sets the aim angle, clamped to `[0, 180]`.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = clamp_angle(angle);
    }

    /// Sets the firing power, clamped to `[0, 100]`.
    pub fn set_power(&mut self, power: f32) {
        self.power = clamp_power(power);
    }

    /// Drives along the surface, paying `distance` in fuel.
    ///
    /// Returns `false` without changing anything when the tank is destroyed,
    /// lacks the fuel, would leave the field, or faces a slope steeper than
    /// [`MAX_CLIMB_DEGREES`].
    pub fn drive(&mut self, direction: Direction, distance: f32, terrain: &Terrain) -> bool {
        if !self.alive || self.fuel <= 0.0 {
            return false;
        }
        if !distance.is_finite() || distance <= 0.0 || distance > self.fuel {
            return false;
        }

        let target_x = self.position.x + direction.sign() * distance;
        if target_x < 0.0 || target_x >= terrain.width() as f32 {
            return false;
        }

        let target_y = resting_height(terrain, target_x);
        let slope = (target_y - self.position.y).abs().atan2(distance).to_degrees();
        if slope > MAX_CLIMB_DEGREES {
            return false;
        }

        self.position = Vec2::new(target_x, target_y);
        self.fuel = (self.fuel - distance).max(0.0);
        true
    }

    /// Muzzle position for the current aim.
    #[must_use]
    pub fn barrel_tip(&self, length: f32) -> Vec2 {
        let angle = self.angle.to_radians();
        self.position + Vec2::new(angle.cos() * length, -angle.sin() * length)
    }

    /// Applies a hit, draining the shield before health.
    pub fn take_damage(&mut self, amount: u32) -> Damage {
        if !self.alive {
            return Damage::default();
        }

        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        let health_lost = self.health.min(amount - absorbed);
        self.health -= health_lost;

        let destroyed = self.health == 0;
        if destroyed {
            self.alive = false;
        }

        Damage {
            absorbed,
            health_lost,
            destroyed,
        }
    }

    /// Drops the tank onto the surface if the ground below it was lowered.
    ///
    /// Returns the distance fallen. Damage for the fall is left to the caller
    /// so that it can be attributed; see [`fall_damage`].
    pub fn settle_onto(&mut self, terrain: &Terrain) -> Option<f32> {
        if !self.alive {
            return None;
        }

        let rest = resting_height(terrain, self.position.x);
        if rest <= self.position.y {
            return None;
        }

        let distance = rest - self.position.y;
        self.position.y = rest;
        Some(distance)
    }

    /// Captures an immutable copy of the tank.
    #[must_use]
    pub fn snapshot(&self) -> TankSnapshot {
        TankSnapshot {
            id: self.id,
            player: self.player,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            shield: self.shield,
            fuel: self.fuel,
            angle: self.angle,
            power: self.power,
            alive: self.alive,
        }
    }
}

/// Height a tank rests at when parked above column `x`.
#[must_use]
pub fn resting_height(terrain: &Terrain, x: f32) -> f32 {
    terrain.view().surface_below(x) - PLACEMENT_CLEARANCE
}

/// Damage dealt by a fall of `distance` units.
#[must_use]
pub fn fall_damage(distance: f32) -> u32 {
    if !(distance > FALL_DAMAGE_THRESHOLD) {
        return 0;
    }
    ((distance - FALL_DAMAGE_THRESHOLD) * FALL_DAMAGE_FACTOR).floor() as u32
}
