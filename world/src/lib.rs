#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for the artillery engine.
//!
//! The world owns the terrain, every player's tank, money and inventory, the
//! projectiles in flight and the turn/round state machine. It changes only in
//! response to [`apply`], and reports everything that happened as [`Event`]
//! values.

mod tank;
mod terrain;

use std::time::Duration;

use artillery_core::{
    validate_roster, Command, ConfigError, Direction, Event, FireError, GameConfig, Inventory,
    MoveError, Phase, PlayerConfig, PlayerId, Projectile, ProjectileId, PurchaseError,
    RoundEndReason, TankId, TankSnapshot, WeaponEffect, WeaponKind, BARREL_LENGTH,
};
use artillery_system_ballistics::{self as ballistics, Environment};
use artillery_system_collision::{self as collision, Collision};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use tank::{
    fall_damage, resting_height, Damage, Tank, FALL_DAMAGE_FACTOR, FALL_DAMAGE_THRESHOLD,
    MAX_CLIMB_DEGREES, PLACEMENT_CLEARANCE,
};
pub use terrain::Terrain;

/// Money credited for destroying an enemy tank.
pub const KILL_BONUS_MONEY: u64 = 500;

/// Score credited for destroying an enemy tank.
pub const KILL_BONUS_SCORE: u64 = 1_000;

/// Projectiles airborne for longer than this many seconds fizzle.
pub const MAX_FLIGHT_SECONDS: f32 = 600.0;

/// Longest integration step taken inside a single tick.
const MAX_INTEGRATION_STEP: f32 = 0.05;

/// Added before flooring interest so decimal rates such as 0.35 pay whole
/// amounts despite their binary representation.
const INTEREST_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug)]
struct Player {
    config: PlayerConfig,
    tank: Tank,
    money: u64,
    inventory: Inventory,
    score: u64,
    kills: u32,
    deaths: u32,
}

/// Represents the authoritative artillery match state.
#[derive(Clone, Debug)]
pub struct World {
    config: GameConfig,
    players: Vec<Player>,
    terrain: Terrain,
    terrain_seed: u64,
    projectiles: Vec<Projectile>,
    phase: Phase,
    round: u32,
    current: usize,
    wind: f32,
    winner: Option<PlayerId>,
    rng: ChaCha8Rng,
    next_tank: u32,
    next_projectile: u32,
}

impl World {
    /// Creates a match for the provided roster, ready for
    /// [`Command::StartMatch`].
    ///
    /// Tanks are laid out on the configured terrain seed so the field can be
    /// inspected before the first round is set up.
    pub fn new(config: GameConfig, roster: Vec<PlayerConfig>) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_roster(&roster)?;

        let terrain_seed = config.terrain.seed;
        let terrain = Terrain::generate(
            config.terrain.width,
            config.terrain.height,
            terrain_seed,
            config.terrain.roughness,
        );
        let rng = ChaCha8Rng::seed_from_u64(config.rules.seed);
        let starting_money = config.economy.starting_money;

        let mut world = Self {
            players: Vec::with_capacity(roster.len()),
            terrain,
            terrain_seed,
            projectiles: Vec::new(),
            phase: Phase::Setup,
            round: 0,
            current: 0,
            wind: 0.0,
            winner: None,
            rng,
            next_tank: 0,
            next_projectile: 0,
            config,
        };

        let count = roster.len();
        for (index, player) in roster.into_iter().enumerate() {
            let tank = world.place_tank(index, count, player.id);
            world.players.push(Player {
                config: player,
                tank,
                money: starting_money,
                inventory: Inventory::starting(),
                score: 0,
                kills: 0,
                deaths: 0,
            });
        }

        Ok(world)
    }

    fn place_tank(&mut self, index: usize, count: usize, player: PlayerId) -> Tank {
        let spacing = self.terrain.width() as f32 / (count + 1) as f32;
        let x = (spacing * (index + 1) as f32).floor();
        let y = resting_height(&self.terrain, x);
        let id = TankId::new(self.next_tank);
        self.next_tank = self.next_tank.wrapping_add(1);
        Tank::new(id, player, Vec2::new(x, y), &self.config.tank)
    }

    fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.config.id == id)
    }

    fn current_player(&self) -> Option<PlayerId> {
        self.players.get(self.current).map(|player| player.config.id)
    }

    fn alive_count(&self) -> usize {
        self.players
            .iter()
            .filter(|player| player.tank.is_alive())
            .count()
    }

    fn tank_snapshots(&self) -> Vec<TankSnapshot> {
        self.players
            .iter()
            .map(|player| player.tank.snapshot())
            .collect()
    }

    fn setup_round(&mut self, round: u32, out_events: &mut Vec<Event>) {
        self.round = round;
        self.terrain_seed = if self.config.rules.reseed_terrain {
            self.rng.gen()
        } else {
            self.config.terrain.seed
        };
        self.terrain = Terrain::generate(
            self.config.terrain.width,
            self.config.terrain.height,
            self.terrain_seed,
            self.config.terrain.roughness,
        );

        let (wind_min, wind_max) = (self.config.physics.wind_min, self.config.physics.wind_max);
        self.wind = if wind_min < wind_max {
            self.rng.gen_range(wind_min..=wind_max)
        } else {
            wind_min
        };

        let count = self.players.len();
        for index in 0..count {
            let id = self.players[index].config.id;
            let tank = self.place_tank(index, count, id);
            self.players[index].tank = tank;
        }
        self.projectiles.clear();
        self.current = 0;
        self.phase = Phase::Aiming;

        info!(
            round,
            wind = self.wind,
            terrain_seed = self.terrain_seed,
            "round started"
        );
        out_events.push(Event::RoundStarted {
            round,
            wind: self.wind,
            terrain_seed: self.terrain_seed,
        });
        self.open_turn(out_events);
    }

    fn open_turn(&mut self, out_events: &mut Vec<Event>) {
        if let Some(player) = self.current_player() {
            debug!(round = self.round, %player, "turn started");
            out_events.push(Event::TurnStarted {
                round: self.round,
                player,
            });
        }
    }

    fn advance_turn(&mut self, out_events: &mut Vec<Event>) {
        let count = self.players.len();
        let start = self.current;
        let mut next = start;
        loop {
            next = (next + 1) % count;
            if next == start || self.players[next].tank.is_alive() {
                break;
            }
        }

        if next <= start {
            self.end_round(RoundEndReason::AllActed, out_events);
            return;
        }

        self.current = next;
        self.phase = Phase::Aiming;
        self.open_turn(out_events);
    }

    fn end_round(&mut self, reason: RoundEndReason, out_events: &mut Vec<Event>) {
        info!(round = self.round, ?reason, "round ended");
        out_events.push(Event::RoundEnded {
            round: self.round,
            reason,
        });

        let next = self.round.saturating_add(1);
        if next > self.config.rules.rounds {
            self.finish_match(out_events);
            return;
        }

        let rate = self.config.economy.interest_rate;
        for player in &mut self.players {
            let amount = (player.money as f64 * rate + INTEREST_TOLERANCE).floor() as u64;
            if amount == 0 {
                continue;
            }
            player.money = player.money.saturating_add(amount);
            out_events.push(Event::InterestPaid {
                player: player.config.id,
                amount,
            });
        }

        self.setup_round(next, out_events);
    }

    fn finish_match(&mut self, out_events: &mut Vec<Event>) {
        let mut winner: Option<&Player> = None;
        for player in &self.players {
            if winner.map_or(true, |best| player.score > best.score) {
                winner = Some(player);
            }
        }

        self.winner = winner.map(|player| player.config.id);
        self.phase = Phase::GameOver;
        self.projectiles.clear();
        info!(winner = ?self.winner, "match over");
        out_events.push(Event::GameOver {
            winner: self.winner,
        });
    }

    fn conclude_turn(&mut self, out_events: &mut Vec<Event>) {
        if let Some(player) = self.current_player() {
            out_events.push(Event::TurnResolved { player });
        }

        if self.alive_count() <= 1 {
            self.end_round(RoundEndReason::LastTankStanding, out_events);
        } else {
            self.advance_turn(out_events);
        }
    }

    fn fire(
        &mut self,
        player: PlayerId,
        angle: f32,
        power: f32,
        weapon: WeaponKind,
    ) -> Result<Projectile, FireError> {
        if self.phase != Phase::Aiming {
            return Err(FireError::WrongPhase);
        }
        if self.current_player() != Some(player) {
            return Err(FireError::NotYourTurn);
        }

        let shooter = &mut self.players[self.current];
        if !shooter.tank.is_alive() {
            return Err(FireError::TankDestroyed);
        }
        if !shooter.inventory.take(weapon) {
            return Err(FireError::OutOfAmmo);
        }

        shooter.tank.set_angle(angle);
        shooter.tank.set_power(power);
        let origin = shooter.tank.barrel_tip(BARREL_LENGTH);
        let projectile = ballistics::spawn(
            ProjectileId::new(self.next_projectile),
            weapon,
            origin,
            shooter.tank.angle(),
            shooter.tank.power(),
            player,
        );
        self.next_projectile = self.next_projectile.wrapping_add(1);
        self.projectiles.push(projectile);
        self.phase = Phase::Resolving;
        Ok(projectile)
    }

    fn drive(
        &mut self,
        player: PlayerId,
        direction: Direction,
        distance: f32,
    ) -> Result<(Vec2, Vec2, f32), MoveError> {
        if self.phase != Phase::Aiming {
            return Err(MoveError::WrongPhase);
        }
        if self.current_player() != Some(player) {
            return Err(MoveError::NotYourTurn);
        }

        let tank = &mut self.players[self.current].tank;
        let from = tank.position();
        if !tank.drive(direction, distance, &self.terrain) {
            return Err(MoveError::Blocked);
        }
        Ok((from, tank.position(), tank.fuel()))
    }

    fn purchase(
        &mut self,
        player: PlayerId,
        weapon: WeaponKind,
    ) -> Result<(u32, u64), PurchaseError> {
        if self.phase == Phase::GameOver {
            return Err(PurchaseError::GameOver);
        }
        let index = self
            .player_index(player)
            .ok_or(PurchaseError::UnknownPlayer)?;

        let spec = weapon.spec();
        let buyer = &mut self.players[index];
        if buyer.money < spec.cost() {
            return Err(PurchaseError::InsufficientFunds);
        }
        buyer.money -= spec.cost();
        buyer.inventory.add(weapon, spec.bundle_size());
        Ok((spec.bundle_size(), spec.cost()))
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        let steps = (seconds / MAX_INTEGRATION_STEP).ceil().max(1.0) as u32;
        let environment = Environment::new(
            self.config.physics.gravity,
            self.wind,
            seconds / steps as f32,
        );

        let mut in_flight = std::mem::take(&mut self.projectiles);
        for _ in 0..steps {
            if in_flight.is_empty() {
                break;
            }

            let mut survivors = Vec::with_capacity(in_flight.len());
            for projectile in in_flight {
                let moved = ballistics::step(&projectile, environment);
                let tanks = self.tank_snapshots();
                match collision::check(&moved, self.terrain.view(), &tanks) {
                    Collision::None if moved.airtime > MAX_FLIGHT_SECONDS => {
                        debug!(projectile = moved.id.get(), "projectile timed out");
                        self.fizzle(moved, out_events);
                    }
                    Collision::None => survivors.push(moved),
                    Collision::Boundary => self.fizzle(moved, out_events),
                    Collision::Terrain => self.detonate(moved, None, out_events),
                    Collision::Tank(tank) => self.detonate(moved, Some(tank), out_events),
                }
            }
            in_flight = survivors;
        }
        self.projectiles = in_flight;

        if self.projectiles.is_empty() {
            self.conclude_turn(out_events);
        }
    }

    fn fizzle(&mut self, projectile: Projectile, out_events: &mut Vec<Event>) {
        out_events.push(Event::ProjectileFizzled {
            projectile: projectile.id,
            position: projectile.position,
        });
    }

    fn detonate(
        &mut self,
        projectile: Projectile,
        hit: Option<TankId>,
        out_events: &mut Vec<Event>,
    ) {
        let center = projectile.position;
        let spec = projectile.weapon.spec();
        debug!(
            projectile = projectile.id.get(),
            weapon = spec.name(),
            x = center.x,
            y = center.y,
            "projectile exploded"
        );
        out_events.push(Event::ProjectileExploded {
            projectile: projectile.id,
            weapon: projectile.weapon,
            position: center,
            hit,
        });

        let shooter = projectile.owner;
        match spec.effect() {
            WeaponEffect::Tracer => {}
            WeaponEffect::Dirt => self.terrain.add_mass(center, spec.blast_radius()),
            WeaponEffect::Riot => {
                self.terrain.explode(center, spec.blast_radius());
                self.resync_tanks(shooter, out_events);
            }
            WeaponEffect::Blast => {
                self.terrain.explode(center, spec.blast_radius());
                for index in 0..self.players.len() {
                    let tank = &self.players[index].tank;
                    if !tank.is_alive() {
                        continue;
                    }
                    let amount = collision::damage(
                        tank.position(),
                        center,
                        spec.damage(),
                        spec.blast_radius(),
                    );
                    if amount > 0 {
                        self.damage_tank(index, amount, shooter, out_events);
                    }
                }
                self.resync_tanks(shooter, out_events);
            }
        }
    }

    fn resync_tanks(&mut self, shooter: PlayerId, out_events: &mut Vec<Event>) {
        for index in 0..self.players.len() {
            let tank = &mut self.players[index].tank;
            let Some(distance) = tank.settle_onto(&self.terrain) else {
                continue;
            };

            let damage = fall_damage(distance);
            out_events.push(Event::TankFell {
                tank: tank.id(),
                player: tank.player(),
                distance,
                damage,
            });
            if damage > 0 {
                self.damage_tank(index, damage, shooter, out_events);
            }
        }
    }

    fn damage_tank(
        &mut self,
        index: usize,
        amount: u32,
        shooter: PlayerId,
        out_events: &mut Vec<Event>,
    ) {
        let victim = &mut self.players[index];
        let hit = victim.tank.take_damage(amount);
        let victim_id = victim.config.id;
        let tank_id = victim.tank.id();
        out_events.push(Event::TankDamaged {
            tank: tank_id,
            player: victim_id,
            source: shooter,
            amount,
            shield_absorbed: hit.absorbed,
            health: victim.tank.health(),
        });
        if hit.destroyed {
            victim.deaths = victim.deaths.saturating_add(1);
        }

        let credited = shooter != victim_id;
        if credited {
            if let Some(attacker) = self.player_index(shooter) {
                let attacker = &mut self.players[attacker];
                attacker.money = attacker.money.saturating_add(u64::from(amount));
                attacker.score = attacker.score.saturating_add(u64::from(amount));
                if hit.destroyed {
                    attacker.kills = attacker.kills.saturating_add(1);
                    attacker.money = attacker.money.saturating_add(KILL_BONUS_MONEY);
                    attacker.score = attacker.score.saturating_add(KILL_BONUS_SCORE);
                }
            }
        }

        if hit.destroyed {
            info!(victim = %victim_id, by = %shooter, "tank destroyed");
            out_events.push(Event::TankDestroyed {
                tank: tank_id,
                player: victim_id,
                by: shooter,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartMatch => {
            if world.phase != Phase::Setup {
                debug!(phase = ?world.phase, "match already started");
                return;
            }
            world.setup_round(1, out_events);
        }
        Command::Aim {
            player,
            angle,
            power,
        } => {
            if world.phase != Phase::Aiming || world.current_player() != Some(player) {
                debug!(%player, "ignoring aim outside the player's turn");
                return;
            }
            let tank = &mut world.players[world.current].tank;
            tank.set_angle(angle);
            tank.set_power(power);
            out_events.push(Event::AimAdjusted {
                player,
                angle: tank.angle(),
                power: tank.power(),
            });
        }
        Command::MoveTank {
            player,
            direction,
            distance,
        } => match world.drive(player, direction, distance) {
            Ok((from, to, fuel_remaining)) => out_events.push(Event::TankMoved {
                player,
                from,
                to,
                fuel_remaining,
            }),
            Err(reason) => {
                debug!(%player, ?reason, "move rejected");
                out_events.push(Event::MoveRejected { player, reason });
            }
        },
        Command::Fire {
            player,
            angle,
            power,
            weapon,
        } => match world.fire(player, angle, power, weapon) {
            Ok(projectile) => {
                debug!(
                    %player,
                    weapon = weapon.spec().name(),
                    angle = projectile.angle.to_degrees(),
                    "projectile fired"
                );
                out_events.push(Event::ProjectileFired {
                    projectile: projectile.id,
                    player,
                    weapon,
                    origin: projectile.position,
                });
            }
            Err(reason) => {
                debug!(%player, ?reason, "fire rejected");
                out_events.push(Event::FireRejected {
                    player,
                    weapon,
                    reason,
                });
            }
        },
        Command::PassTurn { player } => {
            if world.phase != Phase::Aiming || world.current_player() != Some(player) {
                debug!(%player, "ignoring pass outside the player's turn");
                return;
            }
            out_events.push(Event::TurnPassed { player });
            world.advance_turn(out_events);
        }
        Command::PurchaseWeapon { player, weapon } => match world.purchase(player, weapon) {
            Ok((quantity, cost)) => out_events.push(Event::WeaponPurchased {
                player,
                weapon,
                quantity,
                cost,
            }),
            Err(reason) => out_events.push(Event::PurchaseRejected {
                player,
                weapon,
                reason,
            }),
        },
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            if world.phase == Phase::Resolving {
                world.advance_projectiles(dt, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use artillery_core::{
        GameConfig, GameSnapshot, Inventory, Phase, PlayerId, PlayerSnapshot, TankSnapshot,
        TerrainView,
    };

    use super::World;

    /// Captures an owned copy of the complete match state.
    #[must_use]
    pub fn game_snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            round: world.round,
            rounds: world.config.rules.rounds,
            current_player_index: world.current,
            phase: world.phase,
            players: world
                .players
                .iter()
                .map(|player| PlayerSnapshot {
                    config: player.config.clone(),
                    tank: player.tank.snapshot(),
                    money: player.money,
                    inventory: player.inventory.clone(),
                    score: player.score,
                    kills: player.kills,
                    deaths: player.deaths,
                })
                .collect(),
            wind: world.wind,
            gravity: world.config.physics.gravity,
            terrain_width: world.terrain.width(),
            terrain_height: world.terrain.height(),
            projectiles: world.projectiles.clone(),
            game_over: world.phase == Phase::GameOver,
            winner: world.winner,
        }
    }

    /// Exposes a read-only view of the terrain occupancy grid.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        world.terrain.view()
    }

    /// Seed the current terrain was generated from.
    #[must_use]
    pub fn terrain_seed(world: &World) -> u64 {
        world.terrain_seed
    }

    /// Captures every tank in turn order.
    #[must_use]
    pub fn tanks(world: &World) -> Vec<TankSnapshot> {
        world.tank_snapshots()
    }

    /// Retrieves a copy of a player's remaining ammunition.
    #[must_use]
    pub fn inventory(world: &World, player: PlayerId) -> Option<Inventory> {
        world
            .player_index(player)
            .map(|index| world.players[index].inventory.clone())
    }

    /// Current stage of the state machine.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Player holding the turn, if the match has started.
    #[must_use]
    pub fn current_player(world: &World) -> Option<PlayerId> {
        match world.phase {
            Phase::Aiming | Phase::Resolving => world.current_player(),
            Phase::Setup | Phase::GameOver => None,
        }
    }

    /// One-based number of the round in progress; zero before the match.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Wind acceleration of the current round.
    #[must_use]
    pub fn wind(world: &World) -> f32 {
        world.wind
    }

    /// Configuration the match was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Reports whether the match is decided: at most one tank is alive or
    /// the configured rounds have been played.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.phase == Phase::GameOver || world.alive_count() <= 1
    }

    /// Winner of a finished match.
    #[must_use]
    pub fn winner(world: &World) -> Option<PlayerId> {
        world.winner
    }
}
