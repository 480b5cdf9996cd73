//! Concrete opponent strategies, from coin-flip aiming to ballistic solving.

use artillery_core::{
    Difficulty, Direction, TankSnapshot, BARREL_LENGTH, MAX_ELEVATION, MAX_POWER,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{
    aim::{
        direct_aim, line_of_sight, living_enemies, nearest_enemy, select_weapon, solve_trajectory,
        weakest_enemy, Aim,
    },
    create, Decision, DecisionContext, Strategy,
};

const FALLBACK_ELEVATION: f32 = 45.0;
const FALLBACK_POWER: f32 = 50.0;
const DIRECT_POWER_DIVISOR: f32 = 5.0;
const ARC_POWER_DIVISOR: f32 = 4.0;
const ARC_MIN_ELEVATION: f32 = 60.0;
const ARC_MAX_ELEVATION: f32 = 80.0;
const ADAPTIVE_SPREAD: f32 = 10.0;

/// Aim error applied by the [`Difficulty::Cyborg`] opponent.
pub const CYBORG_ERROR: f32 = 2.0;

fn conclude(context: &DecisionContext<'_>, target: &TankSnapshot, aim: Aim) -> Decision {
    Decision {
        elevation: aim.elevation,
        power: aim.power,
        facing: Direction::toward(context.tank.position, target.position),
        weapon: select_weapon(
            &context.inventory,
            living_enemies(&context.tank, &context.enemies),
        ),
    }
}

fn fallback(context: &DecisionContext<'_>) -> Decision {
    Decision {
        elevation: FALLBACK_ELEVATION,
        power: FALLBACK_POWER,
        facing: Direction::Right,
        weapon: select_weapon(&context.inventory, 0),
    }
}

fn jitter(rng: &mut ChaCha8Rng, magnitude: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * magnitude
}

fn ballistic(
    context: &DecisionContext<'_>,
    target: &TankSnapshot,
    error: f32,
    rng: &mut ChaCha8Rng,
) -> Aim {
    let from = context.tank.position;
    match solve_trajectory(from, target.position, context.gravity, BARREL_LENGTH) {
        Some(aim) if error > 0.0 => {
            let elevation = aim.elevation + jitter(rng, error);
            let power = aim.power + jitter(rng, error);
            Aim::clamped(elevation, power)
        }
        Some(aim) => aim,
        None => direct_aim(from, target.position),
    }
}

/// Picks elevation and power uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct Random;

impl Strategy for Random {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let aim = Aim::clamped(
            rng.gen_range(0.0..=MAX_ELEVATION),
            rng.gen_range(0.0..=MAX_POWER),
        );
        match nearest_enemy(&context.tank, &context.enemies) {
            Some(target) => conclude(context, target, aim),
            None => fallback(context),
        }
    }
}

/// Points the barrel straight at the nearest enemy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Direct;

impl Strategy for Direct {
    fn name(&self) -> &str {
        "direct"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, _rng: &mut ChaCha8Rng) -> Decision {
        let Some(target) = nearest_enemy(&context.tank, &context.enemies) else {
            return fallback(context);
        };
        conclude(context, target, direct_aim(context.tank.position, target.position))
    }
}

/// Opens at a fixed elevation and nudges its previous shot by a random
/// amount every turn afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct Adaptive {
    last: Option<Aim>,
}

impl Adaptive {
    /// Shot the strategy will perturb next, if it has fired before.
    #[must_use]
    pub const fn last(&self) -> Option<Aim> {
        self.last
    }
}

impl Strategy for Adaptive {
    fn name(&self) -> &str {
        "adaptive"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let Some(target) = nearest_enemy(&context.tank, &context.enemies) else {
            return fallback(context);
        };

        let aim = match self.last {
            None => {
                let distance = context.tank.position.distance(target.position);
                Aim::clamped(FALLBACK_ELEVATION, distance / DIRECT_POWER_DIVISOR)
            }
            Some(previous) => {
                let elevation = previous.elevation + jitter(rng, ADAPTIVE_SPREAD);
                let power = previous.power + jitter(rng, ADAPTIVE_SPREAD);
                Aim::clamped(elevation, power)
            }
        };
        self.last = Some(aim);
        conclude(context, target, aim)
    }
}

/// Solves the ballistic arc to the nearest enemy, then misses by up to
/// half of `error` in elevation and power.
#[derive(Clone, Copy, Debug)]
pub struct Predictive {
    error: f32,
}

impl Predictive {
    /// Creates a solver with the provided aim error.
    #[must_use]
    pub fn new(error: f32) -> Self {
        Self {
            error: error.max(0.0),
        }
    }

    /// Aim error of the solver.
    #[must_use]
    pub const fn error(&self) -> f32 {
        self.error
    }
}

impl Strategy for Predictive {
    fn name(&self) -> &str {
        "predictive"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let Some(target) = nearest_enemy(&context.tank, &context.enemies) else {
            return fallback(context);
        };
        let aim = ballistic(context, target, self.error, rng);
        conclude(context, target, aim)
    }
}

/// Solves flawlessly against whichever living enemy has the least health.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityTarget;

impl Strategy for PriorityTarget {
    fn name(&self) -> &str {
        "priority"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let Some(target) = weakest_enemy(&context.tank, &context.enemies) else {
            return fallback(context);
        };
        let aim = ballistic(context, target, 0.0, rng);
        conclude(context, target, aim)
    }
}

/// Lobs steep shots with power scaled by distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Arc;

impl Strategy for Arc {
    fn name(&self) -> &str {
        "arc"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let Some(target) = nearest_enemy(&context.tank, &context.enemies) else {
            return fallback(context);
        };
        let distance = context.tank.position.distance(target.position);
        let aim = Aim::clamped(
            rng.gen_range(ARC_MIN_ELEVATION..ARC_MAX_ELEVATION),
            distance / ARC_POWER_DIVISOR,
        );
        conclude(context, target, aim)
    }
}

/// Fires directly when the nearest enemy is in plain view and lobs otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct Selector {
    direct: Direct,
    arc: Arc,
}

impl Strategy for Selector {
    fn name(&self) -> &str {
        "selector"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let Some(target) = nearest_enemy(&context.tank, &context.enemies) else {
            return fallback(context);
        };
        if line_of_sight(context.tank.position, target.position, context.terrain) {
            self.direct.decide(context, rng)
        } else {
            self.arc.decide(context, rng)
        }
    }
}

/// Behaves like a concrete level chosen at random when the opponent is
/// created.
pub struct Wildcard {
    inner: Box<dyn Strategy>,
}

impl Wildcard {
    /// Picks one of the concrete difficulty levels and delegates to it.
    #[must_use]
    pub fn new(rng: &mut ChaCha8Rng) -> Self {
        let concrete = &Difficulty::ALL[..Difficulty::ALL.len() - 1];
        let chosen = concrete[rng.gen_range(0..concrete.len())];
        Self {
            inner: create(chosen, rng),
        }
    }

    /// Name of the strategy decisions are delegated to.
    #[must_use]
    pub fn disguise(&self) -> &str {
        self.inner.name()
    }
}

impl std::fmt::Debug for Wildcard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wildcard")
            .field("inner", &self.inner.name())
            .finish()
    }
}

impl Strategy for Wildcard {
    fn name(&self) -> &str {
        "wildcard"
    }

    fn decide(&mut self, context: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        self.inner.decide(context, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artillery_core::{Inventory, PlayerId, TankId, TerrainView, WeaponKind};
    use glam::Vec2;
    use rand::SeedableRng;

    const WIDTH: u32 = 400;
    const HEIGHT: u32 = 200;

    fn tank(player: u32, x: f32, health: u32) -> TankSnapshot {
        TankSnapshot {
            id: TankId::new(player),
            player: PlayerId::new(player),
            position: Vec2::new(x, 145.0),
            health,
            max_health: 100,
            shield: 0,
            fuel: 0.0,
            angle: 45.0,
            power: 50.0,
            alive: true,
        }
    }

    fn open_field() -> Vec<bool> {
        let mut cells = vec![false; (WIDTH * HEIGHT) as usize];
        for row in 150..HEIGHT {
            for column in 0..WIDTH {
                cells[(row * WIDTH + column) as usize] = true;
            }
        }
        cells
    }

    fn context<'a>(
        cells: &'a [bool],
        me: TankSnapshot,
        enemies: Vec<TankSnapshot>,
    ) -> DecisionContext<'a> {
        DecisionContext {
            tank: me,
            enemies,
            inventory: Inventory::starting(),
            terrain: TerrainView::new(cells, WIDTH, HEIGHT),
            wind: 0.0,
            gravity: 0.5,
        }
    }

    #[test]
    fn direct_aims_level_across_flat_ground() {
        let cells = open_field();
        let context = context(&cells, tank(1, 300.0, 100), vec![tank(2, 100.0, 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let decision = Direct.decide(&context, &mut rng);

        assert_eq!(decision.elevation, 0.0);
        assert_eq!(decision.power, 40.0);
        assert_eq!(decision.facing, Direction::Left);
        assert_eq!(decision.weapon, WeaponKind::BabyMissile);
        assert_eq!(decision.launch_angle(), 180.0);
    }

    #[test]
    fn no_target_yields_the_safe_default() {
        let cells = open_field();
        let mut dead = tank(2, 100.0, 0);
        dead.alive = false;
        let context = context(&cells, tank(1, 300.0, 100), vec![dead]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(Random),
            Box::new(Direct),
            Box::new(Adaptive::default()),
            Box::new(Predictive::new(CYBORG_ERROR)),
            Box::new(PriorityTarget),
            Box::new(Arc),
            Box::new(Selector::default()),
        ];
        for strategy in &mut strategies {
            let decision = strategy.decide(&context, &mut rng);
            assert_eq!(decision.elevation, 45.0, "{}", strategy.name());
            assert_eq!(decision.power, 50.0, "{}", strategy.name());
            assert_eq!(decision.facing, Direction::Right, "{}", strategy.name());
        }
    }

    #[test]
    fn adaptive_perturbs_its_previous_shot() {
        let cells = open_field();
        let context = context(&cells, tank(1, 100.0, 100), vec![tank(2, 300.0, 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut adaptive = Adaptive::default();

        let first = adaptive.decide(&context, &mut rng);
        assert_eq!((first.elevation, first.power), (45.0, 40.0));

        for _ in 0..20 {
            let previous = adaptive.last().expect("fired before");
            let next = adaptive.decide(&context, &mut rng);
            assert!((next.elevation - previous.elevation).abs() <= ADAPTIVE_SPREAD / 2.0 + 1e-3);
            assert!((next.power - previous.power).abs() <= ADAPTIVE_SPREAD / 2.0 + 1e-3);
            assert!((0.0..=90.0).contains(&next.elevation));
        }
    }

    #[test]
    fn predictive_error_stays_bounded() {
        let cells = open_field();
        let context = context(&cells, tank(1, 100.0, 100), vec![tank(2, 300.0, 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let exact = PriorityTarget.decide(&context, &mut rng);

        let mut cyborg = Predictive::new(CYBORG_ERROR);
        for _ in 0..20 {
            let noisy = cyborg.decide(&context, &mut rng);
            assert!((noisy.elevation - exact.elevation).abs() <= CYBORG_ERROR / 2.0 + 1e-3);
            assert!((noisy.power - exact.power).abs() <= CYBORG_ERROR / 2.0 + 1e-3);
        }
    }

    #[test]
    fn priority_target_prefers_the_weakest() {
        let cells = open_field();
        let context = context(
            &cells,
            tank(1, 200.0, 100),
            vec![tank(2, 250.0, 90), tank(3, 50.0, 10)],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(PriorityTarget.decide(&context, &mut rng).facing, Direction::Left);
        assert_eq!(Direct.decide(&context, &mut rng).facing, Direction::Right);
    }

    #[test]
    fn arc_lobs_steeply() {
        let cells = open_field();
        let context = context(&cells, tank(1, 100.0, 100), vec![tank(2, 300.0, 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..20 {
            let decision = Arc.decide(&context, &mut rng);
            assert!((ARC_MIN_ELEVATION..ARC_MAX_ELEVATION).contains(&decision.elevation));
            assert_eq!(decision.power, 50.0);
        }
    }

    #[test]
    fn selector_lobs_over_a_ridge() {
        let mut cells = open_field();
        let context_open = context(&cells, tank(1, 100.0, 100), vec![tank(2, 300.0, 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(Selector::default().decide(&context_open, &mut rng).elevation, 0.0);

        for row in 100..150 {
            for column in 195..205 {
                cells[(row * WIDTH + column) as usize] = true;
            }
        }
        let context_blocked = context(&cells, tank(1, 100.0, 100), vec![tank(2, 300.0, 100)]);
        let lob = Selector::default().decide(&context_blocked, &mut rng);
        assert!(lob.elevation >= ARC_MIN_ELEVATION);
    }

    #[test]
    fn wildcard_picks_a_concrete_level() {
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let wildcard = Wildcard::new(&mut rng);
            assert_ne!(wildcard.disguise(), "wildcard");
            assert_eq!(wildcard.name(), "wildcard");
        }
    }
}
