//! Targeting, line-of-sight, ballistic solving and weapon choice shared by
//! every strategy.

use artillery_core::{
    Direction, Inventory, TankSnapshot, TerrainView, WeaponKind, MAX_ELEVATION, MAX_POWER,
};
use glam::Vec2;

/// Lowest elevation tried by [`solve_trajectory`].
pub const SOLVER_MIN_ELEVATION: u32 = 15;
/// Highest elevation tried by [`solve_trajectory`].
pub const SOLVER_MAX_ELEVATION: u32 = 75;
/// Elevation increment between solver candidates.
pub const SOLVER_STEP: usize = 5;

/// Elevation and power pair, before a facing is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aim {
    /// Degrees above the horizon, `[0, 90]`.
    pub elevation: f32,
    /// Firing power, `[0, 100]`.
    pub power: f32,
}

impl Aim {
    /// Creates an aim, clamping both components into range.
    #[must_use]
    pub fn clamped(elevation: f32, power: f32) -> Self {
        Self {
            elevation: clamp_or_zero(elevation, MAX_ELEVATION),
            power: clamp_or_zero(power, MAX_POWER),
        }
    }
}

fn clamp_or_zero(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// Closest living enemy by straight-line distance; ties keep the earlier tank.
#[must_use]
pub fn nearest_enemy<'a>(
    me: &TankSnapshot,
    enemies: &'a [TankSnapshot],
) -> Option<&'a TankSnapshot> {
    let mut best: Option<(&TankSnapshot, f32)> = None;
    for enemy in living(me, enemies) {
        let distance = me.position.distance_squared(enemy.position);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((enemy, distance));
        }
    }
    best.map(|(enemy, _)| enemy)
}

/// Living enemy with the least health; ties keep the earlier tank.
#[must_use]
pub fn weakest_enemy<'a>(
    me: &TankSnapshot,
    enemies: &'a [TankSnapshot],
) -> Option<&'a TankSnapshot> {
    let mut best: Option<&TankSnapshot> = None;
    for enemy in living(me, enemies) {
        if best.map_or(true, |weakest| enemy.health < weakest.health) {
            best = Some(enemy);
        }
    }
    best
}

/// Number of living enemies.
#[must_use]
pub fn living_enemies(me: &TankSnapshot, enemies: &[TankSnapshot]) -> usize {
    living(me, enemies).count()
}

fn living<'a>(
    me: &TankSnapshot,
    enemies: &'a [TankSnapshot],
) -> impl Iterator<Item = &'a TankSnapshot> + 'a {
    let player = me.player;
    enemies
        .iter()
        .filter(move |enemy| enemy.alive && enemy.player != player)
}

/// Walks the segment from `from` toward `to` one cell at a time and reports
/// whether no sample lands in solid ground. The end point itself is not
/// sampled.
#[must_use]
pub fn line_of_sight(from: Vec2, to: Vec2, terrain: TerrainView<'_>) -> bool {
    let delta = to - from;
    let steps = delta.x.abs().max(delta.y.abs());
    if !(steps > 0.0) || !steps.is_finite() {
        return true;
    }

    let increment = delta / steps;
    let samples = steps.ceil() as u32;
    (0..samples).all(|index| {
        let sample = from + increment * index as f32;
        !terrain.is_solid(sample.x.floor() as i32, sample.y.floor() as i32)
    })
}

/// Aims straight at the target with power proportional to distance.
#[must_use]
pub fn direct_aim(from: Vec2, to: Vec2) -> Aim {
    let delta = to - from;
    let elevation = (-delta.y).atan2(delta.x.abs()).to_degrees();
    Aim::clamped(elevation, from.distance(to) / 5.0)
}

/// Searches for an elevation whose ballistic arc from the muzzle reaches `to`.
///
/// Candidates run from [`SOLVER_MIN_ELEVATION`] to [`SOLVER_MAX_ELEVATION`]
/// and the first whose required launch speed is a valid power wins. The
/// muzzle sits `barrel` units from `from` along each candidate's barrel.
/// Wind is not modelled. Returns `None` without gravity or without any
/// reachable candidate.
#[must_use]
pub fn solve_trajectory(from: Vec2, to: Vec2, gravity: f32, barrel: f32) -> Option<Aim> {
    if !(gravity > 0.0) || !from.is_finite() || !to.is_finite() {
        return None;
    }

    let sign = Direction::toward(from, to).sign();
    for elevation in (SOLVER_MIN_ELEVATION..=SOLVER_MAX_ELEVATION).step_by(SOLVER_STEP) {
        let elevation = elevation as f32;
        let (sin, cos) = elevation.to_radians().sin_cos();
        let muzzle = from + Vec2::new(sign * cos * barrel, -sin * barrel);

        let run = (to.x - muzzle.x).abs();
        let rise = muzzle.y - to.y;
        let denominator = 2.0 * cos * cos * (run * (sin / cos) - rise);
        let speed_sq = gravity * run * run / denominator;
        if !(speed_sq > 0.0) || !speed_sq.is_finite() {
            continue;
        }

        let power = speed_sq.sqrt();
        if power <= MAX_POWER {
            return Some(Aim { elevation, power });
        }
    }

    None
}

/// Picks the weapon to fire from the rounds on hand.
///
/// Prefers the cheap direct-fire missile, then a baby nuke when several
/// enemies remain, then whatever is first in stock.
#[must_use]
pub fn select_weapon(inventory: &Inventory, enemy_count: usize) -> WeaponKind {
    if inventory.count(WeaponKind::BabyMissile) > 0 {
        return WeaponKind::BabyMissile;
    }
    if enemy_count > 1 && inventory.count(WeaponKind::BabyNuke) > 0 {
        return WeaponKind::BabyNuke;
    }
    inventory
        .available()
        .next()
        .unwrap_or(WeaponKind::BabyMissile)
}
