use std::time::Duration;

use artillery_core::{
    Color, Command, Event, GameConfig, Inventory, PlayerConfig, PlayerId, PlayerKind,
};
use artillery_system_opponents::{Opponents, ScriptedTurns};
use artillery_world::{self as world, query, World};

const SCRIPTED: PlayerId = PlayerId::new(1);

fn player(id: u32, kind: PlayerKind) -> PlayerConfig {
    PlayerConfig {
        id: PlayerId::new(id),
        name: format!("Gunner {id}"),
        color: Color::default(),
        kind,
        difficulty: Some("spoiler".to_owned()),
    }
}

struct Harness {
    world: World,
    opponents: Opponents,
    pacing: ScriptedTurns,
    events: Vec<Event>,
}

impl Harness {
    fn new(first: PlayerKind) -> Self {
        let mut config = GameConfig::default();
        config.terrain.width = 400;
        config.terrain.height = 200;
        let roster = vec![player(1, first), player(2, PlayerKind::Human)];
        let opponents = Opponents::new(&roster, config.rules.seed);
        let mut world = World::new(config, roster).expect("valid world");
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartMatch, &mut events);

        Self {
            world,
            opponents,
            pacing: ScriptedTurns::new(),
            events,
        }
    }

    fn pump(&mut self) -> Vec<Command> {
        let snapshot = query::game_snapshot(&self.world);
        self.pump_with(|_| {}, snapshot)
    }

    fn pump_with(
        &mut self,
        edit: impl FnOnce(&mut artillery_core::GameSnapshot),
        mut snapshot: artillery_core::GameSnapshot,
    ) -> Vec<Command> {
        edit(&mut snapshot);
        let mut commands = Vec::new();
        self.pacing.handle(
            &self.events,
            &mut self.opponents,
            &snapshot,
            query::terrain_view(&self.world),
            &mut commands,
        );
        self.events.clear();
        commands
    }

    fn tick(&mut self, millis: u64) {
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut self.events,
        );
    }
}

#[test]
fn scripted_player_thinks_then_aims_then_fires() {
    let mut harness = Harness::new(PlayerKind::Scripted);
    assert!(harness.pump().is_empty());
    assert_eq!(harness.pacing.pending_player(), Some(SCRIPTED));

    harness.tick(900);
    assert!(harness.pump().is_empty());

    harness.tick(100);
    let aimed = harness.pump();
    assert_eq!(aimed.len(), 1);
    assert!(matches!(&aimed[0], Command::Aim { player, .. } if *player == SCRIPTED));

    harness.tick(499);
    assert!(harness.pump().is_empty());

    harness.tick(1);
    let fired = harness.pump();
    assert_eq!(fired.len(), 1);
    let Command::Fire { player, angle, .. } = &fired[0] else {
        panic!("expected a shot, got {fired:?}");
    };
    assert_eq!(*player, SCRIPTED);
    let Command::Aim {
        angle: aimed_angle, ..
    } = &aimed[0]
    else {
        unreachable!();
    };
    assert_eq!(angle, aimed_angle);
    assert!(harness.pacing.is_idle());
}

#[test]
fn one_long_tick_carries_through_both_waits() {
    let mut harness = Harness::new(PlayerKind::Scripted);
    let _ = harness.pump();

    harness.tick(1_500);
    let commands = harness.pump();

    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], Command::Aim { .. }));
    assert!(matches!(commands[1], Command::Fire { .. }));
}

#[test]
fn human_turns_are_left_alone() {
    let mut harness = Harness::new(PlayerKind::Human);
    assert!(harness.pump().is_empty());
    assert!(harness.pacing.is_idle());

    harness.tick(5_000);
    assert!(harness.pump().is_empty());
}

#[test]
fn empty_inventory_passes_the_turn() {
    let mut harness = Harness::new(PlayerKind::Scripted);
    let _ = harness.pump();
    harness.tick(1_000);
    let _ = harness.pump();

    harness.tick(500);
    let snapshot = query::game_snapshot(&harness.world);
    let commands = harness.pump_with(
        |snapshot| {
            for player in &mut snapshot.players {
                player.inventory = Inventory::new();
            }
        },
        snapshot,
    );

    assert_eq!(commands, vec![Command::PassTurn { player: SCRIPTED }]);
}

#[test]
fn stop_cancels_pending_waits() {
    let mut harness = Harness::new(PlayerKind::Scripted);
    let _ = harness.pump();
    harness.tick(1_000);
    assert_eq!(harness.pump().len(), 1);

    harness.pacing.stop();
    harness.tick(5_000);

    assert!(harness.pump().is_empty());
    assert!(harness.pacing.is_idle());
}
