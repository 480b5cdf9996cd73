//! Weapon catalogue and per-player ammunition inventory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Types of munitions a tank can fire.
///
/// Declaration order doubles as the deterministic iteration order of an
/// [`Inventory`], so cheap direct-fire weapons come first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponKind {
    /// Cheap, small direct-fire missile.
    BabyMissile,
    /// Standard missile.
    Missile,
    /// Small area weapon with a wide blast.
    BabyNuke,
    /// Large area weapon.
    Nuke,
    /// Small roller; simulated as a regular blast on impact.
    BabyRoller,
    /// Clears a small dirt disk without damaging tanks.
    RiotCharge,
    /// Clears a large dirt disk without damaging tanks.
    RiotBomb,
    /// Adds a small disk of dirt.
    DirtClod,
    /// Adds a medium disk of dirt.
    DirtBall,
    /// Adds a large disk of dirt.
    TonOfDirt,
    /// Harmless marker shot used to read the trajectory.
    Tracer,
}

impl WeaponKind {
    /// Every weapon in catalogue order.
    pub const ALL: [WeaponKind; 11] = [
        Self::BabyMissile,
        Self::Missile,
        Self::BabyNuke,
        Self::Nuke,
        Self::BabyRoller,
        Self::RiotCharge,
        Self::RiotBomb,
        Self::DirtClod,
        Self::DirtBall,
        Self::TonOfDirt,
        Self::Tracer,
    ];

    /// Static properties of the weapon.
    #[must_use]
    pub const fn spec(self) -> WeaponSpec {
        use WeaponEffect::{Blast, Dirt, Riot, Tracer};

        match self {
            Self::BabyMissile => WeaponSpec::new("Baby Missile", 400, 10, 20.0, 30, Blast),
            Self::Missile => WeaponSpec::new("Missile", 1_875, 5, 30.0, 50, Blast),
            Self::BabyNuke => WeaponSpec::new("Baby Nuke", 10_000, 3, 60.0, 80, Blast),
            Self::Nuke => WeaponSpec::new("Nuke", 12_000, 1, 100.0, 100, Blast),
            Self::BabyRoller => WeaponSpec::new("Baby Roller", 5_000, 10, 20.0, 30, Blast),
            Self::RiotCharge => WeaponSpec::new("Riot Charge", 2_000, 10, 30.0, 0, Riot),
            Self::RiotBomb => WeaponSpec::new("Riot Bomb", 5_000, 5, 50.0, 0, Riot),
            Self::DirtClod => WeaponSpec::new("Dirt Clod", 5_000, 10, 20.0, 0, Dirt),
            Self::DirtBall => WeaponSpec::new("Dirt Ball", 5_000, 5, 35.0, 0, Dirt),
            Self::TonOfDirt => WeaponSpec::new("Ton of Dirt", 6_750, 2, 60.0, 0, Dirt),
            Self::Tracer => WeaponSpec::new("Tracer", 10, 20, 0.0, 0, Tracer),
        }
    }
}

/// What happens to the battlefield when a projectile lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponEffect {
    /// Carves a crater and damages tanks with linear falloff.
    Blast,
    /// Carves a crater without damaging tanks.
    Riot,
    /// Deposits a disk of dirt.
    Dirt,
    /// Leaves the battlefield untouched.
    Tracer,
}

/// Immutable catalogue entry describing a weapon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponSpec {
    name: &'static str,
    cost: u64,
    bundle_size: u32,
    blast_radius: f32,
    damage: u32,
    effect: WeaponEffect,
}

impl WeaponSpec {
    const fn new(
        name: &'static str,
        cost: u64,
        bundle_size: u32,
        blast_radius: f32,
        damage: u32,
        effect: WeaponEffect,
    ) -> Self {
        Self {
            name,
            cost,
            bundle_size,
            blast_radius,
            damage,
            effect,
        }
    }

    /// Human readable weapon name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Price of one bundle.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    /// Rounds added to the inventory per purchase.
    #[must_use]
    pub const fn bundle_size(&self) -> u32 {
        self.bundle_size
    }

    /// Radius of the terrain disk and damage area.
    #[must_use]
    pub const fn blast_radius(&self) -> f32 {
        self.blast_radius
    }

    /// Damage dealt at the explosion center.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Battlefield effect applied on impact.
    #[must_use]
    pub const fn effect(&self) -> WeaponEffect {
        self.effect
    }
}

/// Remaining ammunition per weapon, keyed uniquely by [`WeaponKind`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    counts: BTreeMap<WeaponKind, u32>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loadout every player starts a match with.
    #[must_use]
    pub fn starting() -> Self {
        let mut inventory = Self::new();
        for (weapon, count) in [
            (WeaponKind::BabyMissile, 20),
            (WeaponKind::Missile, 10),
            (WeaponKind::BabyNuke, 3),
            (WeaponKind::Nuke, 1),
            (WeaponKind::BabyRoller, 5),
            (WeaponKind::Tracer, 10),
        ] {
            inventory.add(weapon, count);
        }
        inventory
    }

    /// Remaining rounds of the provided weapon.
    #[must_use]
    pub fn count(&self, weapon: WeaponKind) -> u32 {
        self.counts.get(&weapon).copied().unwrap_or(0)
    }

    /// Adds rounds of the provided weapon.
    pub fn add(&mut self, weapon: WeaponKind, count: u32) {
        let slot = self.counts.entry(weapon).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Consumes one round, returning `false` when none remain.
    pub fn take(&mut self, weapon: WeaponKind) -> bool {
        match self.counts.get_mut(&weapon) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Weapons with at least one round left, in catalogue order.
    pub fn available(&self) -> impl Iterator<Item = WeaponKind> + '_ {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(weapon, _)| *weapon)
    }

    /// Reports whether every weapon is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_stops_at_zero() {
        let mut inventory = Inventory::new();
        inventory.add(WeaponKind::Nuke, 1);

        assert!(inventory.take(WeaponKind::Nuke));
        assert!(!inventory.take(WeaponKind::Nuke));
        assert!(!inventory.take(WeaponKind::Missile));
        assert_eq!(inventory.count(WeaponKind::Nuke), 0);
    }

    #[test]
    fn available_skips_exhausted_weapons_in_catalogue_order() {
        let mut inventory = Inventory::new();
        inventory.add(WeaponKind::Tracer, 2);
        inventory.add(WeaponKind::Missile, 0);
        inventory.add(WeaponKind::BabyMissile, 1);

        let available: Vec<_> = inventory.available().collect();
        assert_eq!(available, vec![WeaponKind::BabyMissile, WeaponKind::Tracer]);
    }

    #[test]
    fn starting_loadout_matches_catalogue() {
        let inventory = Inventory::starting();
        assert_eq!(inventory.count(WeaponKind::BabyMissile), 20);
        assert_eq!(inventory.count(WeaponKind::Nuke), 1);
        assert_eq!(inventory.count(WeaponKind::DirtClod), 0);
        assert!(!inventory.is_empty());
    }

    #[test]
    fn tracer_has_no_blast() {
        let spec = WeaponKind::Tracer.spec();
        assert_eq!(spec.effect(), WeaponEffect::Tracer);
        assert_eq!(spec.damage(), 0);
    }
}
