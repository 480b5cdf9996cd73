#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure collision queries between projectiles, tanks and terrain.

use artillery_core::{Projectile, TankId, TankSnapshot, TerrainView, TANK_RADIUS};
use glam::Vec2;

/// Outcome of testing a projectile against the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collision {
    /// The projectile is still in free flight.
    None,
    /// The projectile left the side or bottom of the field and fizzles.
    Boundary,
    /// The projectile entered solid ground.
    Terrain,
    /// The projectile reached a living enemy tank.
    Tank(TankId),
}

impl Collision {
    /// Reports whether the projectile's flight is over.
    #[must_use]
    pub const fn ends_flight(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Reports whether the impact resolves the projectile's weapon effect.
    #[must_use]
    pub const fn detonates(self) -> bool {
        matches!(self, Self::Terrain | Self::Tank(_))
    }
}

/// Tests a projectile against every tank and then against the terrain.
///
/// Tank hits take precedence: a projectile arriving at a tank that is also
/// touching the ground resolves as a tank hit. The firing player's own tank
/// and destroyed tanks are ignored. Leaving the field through the sides or the
/// bottom is a [`Collision::Boundary`]; the open sky above the field is not.
#[must_use]
pub fn check(
    projectile: &Projectile,
    terrain: TerrainView<'_>,
    tanks: &[TankSnapshot],
) -> Collision {
    if let Some(tank) = tank_hit(projectile, tanks) {
        return Collision::Tank(tank);
    }

    let position = projectile.position;
    let (width, height) = terrain.dimensions();
    if !position.is_finite()
        || position.x < 0.0
        || position.x >= width as f32
        || position.y >= height as f32
    {
        return Collision::Boundary;
    }

    if terrain.solid_at(position) {
        return Collision::Terrain;
    }

    Collision::None
}

fn tank_hit(projectile: &Projectile, tanks: &[TankSnapshot]) -> Option<TankId> {
    let radius_sq = TANK_RADIUS * TANK_RADIUS;
    tanks
        .iter()
        .filter(|tank| tank.alive && tank.player != projectile.owner)
        .find(|tank| tank.position.distance_squared(projectile.position) <= radius_sq)
        .map(|tank| tank.id)
}

/// Damage dealt at `target` by an explosion at `center`.
///
/// Falls off linearly from `max_damage` at the center to zero at `radius`,
/// rounding down; anything at or beyond the radius is untouched.
#[must_use]
pub fn damage(target: Vec2, center: Vec2, max_damage: u32, radius: f32) -> u32 {
    if !(radius > 0.0) {
        return 0;
    }

    let distance = target.distance(center);
    if !(distance < radius) {
        return 0;
    }

    let falloff = 1.0 - distance / radius;
    (max_damage as f32 * falloff).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use artillery_core::{PlayerId, ProjectileId, WeaponKind};

    fn flat_terrain(width: u32, height: u32, surface: u32) -> Vec<bool> {
        let mut cells = vec![false; (width * height) as usize];
        for row in surface..height {
            for column in 0..width {
                cells[(row * width + column) as usize] = true;
            }
        }
        cells
    }

    fn projectile_at(x: f32, y: f32, owner: u32) -> Projectile {
        Projectile {
            id: ProjectileId::new(1),
            weapon: WeaponKind::Missile,
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            angle: 0.0,
            owner: PlayerId::new(owner),
            airtime: 0.0,
        }
    }

    fn tank(id: u32, player: u32, x: f32, y: f32, alive: bool) -> TankSnapshot {
        TankSnapshot {
            id: TankId::new(id),
            player: PlayerId::new(player),
            position: Vec2::new(x, y),
            health: 100,
            max_health: 100,
            shield: 0,
            fuel: 0.0,
            angle: 45.0,
            power: 50.0,
            alive,
        }
    }

    #[test]
    fn tank_hit_wins_over_terrain_graze() {
        let cells = flat_terrain(100, 50, 30);
        let terrain = TerrainView::new(&cells, 100, 50);
        let tanks = [tank(7, 2, 50.0, 30.0, true)];

        let outcome = check(&projectile_at(52.0, 31.0, 1), terrain, &tanks);
        assert_eq!(outcome, Collision::Tank(TankId::new(7)));
    }

    #[test]
    fn own_and_destroyed_tanks_are_ignored() {
        let cells = flat_terrain(100, 50, 30);
        let terrain = TerrainView::new(&cells, 100, 50);
        let tanks = [tank(1, 1, 50.0, 20.0, true), tank(2, 2, 50.0, 20.0, false)];

        let outcome = check(&projectile_at(50.0, 20.0, 1), terrain, &tanks);
        assert_eq!(outcome, Collision::None);
    }

    #[test]
    fn solid_ground_and_field_edges_end_flight() {
        let cells = flat_terrain(100, 50, 30);
        let terrain = TerrainView::new(&cells, 100, 50);

        assert_eq!(check(&projectile_at(10.0, 35.0, 1), terrain, &[]), Collision::Terrain);
        assert_eq!(check(&projectile_at(-0.5, 10.0, 1), terrain, &[]), Collision::Boundary);
        assert_eq!(check(&projectile_at(100.0, 10.0, 1), terrain, &[]), Collision::Boundary);
        assert_eq!(check(&projectile_at(10.0, 50.0, 1), terrain, &[]), Collision::Boundary);
        assert_eq!(check(&projectile_at(10.0, -500.0, 1), terrain, &[]), Collision::None);
    }

    #[test]
    fn only_terrain_and_tank_hits_detonate() {
        assert!(Collision::Terrain.detonates());
        assert!(Collision::Tank(TankId::new(1)).detonates());
        assert!(!Collision::Boundary.detonates());
        assert!(Collision::Boundary.ends_flight());
        assert!(!Collision::None.ends_flight());
    }

    #[test]
    fn damage_falls_off_linearly() {
        let center = Vec2::new(0.0, 0.0);
        assert_eq!(damage(center, center, 100, 50.0), 100);
        assert_eq!(damage(Vec2::new(25.0, 0.0), center, 100, 50.0), 50);
        assert_eq!(damage(Vec2::new(0.0, 50.0), center, 100, 50.0), 0);
        assert_eq!(damage(Vec2::new(80.0, 0.0), center, 100, 50.0), 0);
    }

    #[test]
    fn damage_is_monotonic_and_rounds_down() {
        let center = Vec2::new(10.0, 10.0);
        let mut previous = u32::MAX;
        for step in 0..=60 {
            let target = center + Vec2::new(step as f32, 0.0);
            let dealt = damage(target, center, 73, 50.0);
            assert!(dealt <= previous);
            previous = dealt;
        }
        assert_eq!(damage(center + Vec2::new(10.0, 0.0), center, 73, 50.0), 58);
    }

    #[test]
    fn zero_radius_never_damages() {
        let center = Vec2::new(1.0, 1.0);
        assert_eq!(damage(center, center, 100, 0.0), 0);
    }
}
