#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure projectile ballistics: launch decomposition, integration and preview.
//!
//! Every function returns new values and never touches shared state, so the
//! world may call [`step`] once per tick per projectile and the opponents may
//! call [`predict`] freely while planning a shot.

use artillery_core::{PlayerId, Projectile, ProjectileId, WeaponKind};
use glam::Vec2;

/// Preview positions beyond this distance below the top edge or from the left
/// edge end a [`Trajectory`] early.
pub const PREVIEW_LIMIT: f32 = 2_000.0;

/// Constant accelerations acting on every projectile plus the integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    /// Downward acceleration.
    pub gravity: f32,
    /// Horizontal acceleration; positive blows toward increasing x.
    pub wind: f32,
    /// Integration step in seconds.
    pub dt: f32,
}

impl Environment {
    /// Creates a new environment description.
    #[must_use]
    pub const fn new(gravity: f32, wind: f32, dt: f32) -> Self {
        Self { gravity, wind, dt }
    }
}

/// Initial velocity of a shot fired at `angle_deg` with `power`.
///
/// Angles are measured counter-clockwise from the rightward horizontal, and
/// negative y points up the screen.
#[must_use]
pub fn launch_velocity(angle_deg: f32, power: f32) -> Vec2 {
    let angle = angle_deg.to_radians();
    Vec2::new(angle.cos() * power, -angle.sin() * power)
}

/// Creates a projectile leaving `origin` at the provided angle and power.
#[must_use]
pub fn spawn(
    id: ProjectileId,
    weapon: WeaponKind,
    origin: Vec2,
    angle_deg: f32,
    power: f32,
    owner: PlayerId,
) -> Projectile {
    Projectile {
        id,
        weapon,
        position: origin,
        velocity: launch_velocity(angle_deg, power),
        angle: angle_deg.to_radians(),
        owner,
        airtime: 0.0,
    }
}

/// Advances a projectile by one integration step.
///
/// Velocity is updated first and the new velocity moves the projectile, which
/// keeps the integrator stable for the coarse steps used by headless hosts.
#[must_use]
pub fn step(projectile: &Projectile, environment: Environment) -> Projectile {
    let dt = environment.dt;
    let velocity =
        projectile.velocity + Vec2::new(environment.wind * dt, environment.gravity * dt);
    let position = projectile.position + velocity * dt;

    Projectile {
        position,
        velocity,
        angle: velocity.y.atan2(velocity.x),
        airtime: projectile.airtime + dt,
        ..*projectile
    }
}

/// Lazily samples the positions of a hypothetical shot.
///
/// The returned iterator is finite and cheap to clone; cloning it before
/// consumption restarts the preview from the muzzle.
#[must_use]
pub fn predict(
    origin: Vec2,
    angle_deg: f32,
    power: f32,
    environment: Environment,
    max_steps: usize,
) -> Trajectory {
    Trajectory {
        projectile: spawn(
            ProjectileId::new(0),
            WeaponKind::Tracer,
            origin,
            angle_deg,
            power,
            PlayerId::new(0),
        ),
        environment,
        remaining: max_steps,
        finished: false,
    }
}

/// Iterator over preview positions produced by [`predict`].
#[derive(Clone, Debug)]
pub struct Trajectory {
    projectile: Projectile,
    environment: Environment,
    remaining: usize,
    finished: bool,
}

impl Iterator for Trajectory {
    type Item = Vec2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining == 0 {
            return None;
        }

        let position = self.projectile.position;
        self.remaining -= 1;
        self.projectile = step(&self.projectile, self.environment);
        if leaves_preview(self.projectile.position) {
            self.finished = true;
        }

        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (usize::from(self.remaining > 0), Some(self.remaining))
        }
    }
}

fn leaves_preview(position: Vec2) -> bool {
    !position.is_finite() || position.y > PREVIEW_LIMIT || position.x.abs() > PREVIEW_LIMIT
}
