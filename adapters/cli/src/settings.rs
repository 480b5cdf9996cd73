//! Match file loading and command-line overrides.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use artillery_core::{Color, Difficulty, GameConfig, PlayerConfig, PlayerId, PlayerKind};
use serde::Deserialize;

/// Contents of a TOML match file: the game configuration sections plus the
/// roster.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct MatchFile {
    /// Engine configuration.
    #[serde(flatten)]
    pub(crate) config: GameConfig,
    /// Participants in turn order.
    #[serde(default)]
    pub(crate) players: Vec<PlayerConfig>,
}

/// Values given on the command line that replace file settings.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) rounds: Option<u32>,
    pub(crate) difficulties: Vec<String>,
}

impl MatchFile {
    /// Reads and parses a match file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read match file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse match file at {}", path.display()))
    }

    /// Parses match file contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid match file toml")
    }

    /// Applies command-line overrides and fills in the default roster.
    ///
    /// Difficulty overrides are assigned to scripted players in turn order.
    /// Every player must be scripted, since nothing reads input.
    pub(crate) fn resolve(mut self, overrides: &Overrides) -> Result<Self> {
        if let Some(seed) = overrides.seed {
            self.config.rules.seed = seed;
            self.config.terrain.seed = seed;
        }
        if let Some(rounds) = overrides.rounds {
            self.config.rules.rounds = rounds;
        }
        if self.players.is_empty() {
            self.players = default_roster();
        }

        for label in &overrides.difficulties {
            if Difficulty::from_label(label).is_none() {
                bail!(
                    "unknown difficulty `{label}`; expected one of {}",
                    Difficulty::ALL.map(Difficulty::label).join(", ")
                );
            }
        }
        let scripted = self
            .players
            .iter_mut()
            .filter(|player| player.kind == PlayerKind::Scripted);
        for (player, label) in scripted.zip(&overrides.difficulties) {
            player.difficulty = Some(label.clone());
        }

        if let Some(human) = self
            .players
            .iter()
            .find(|player| player.kind == PlayerKind::Human)
        {
            bail!(
                "player {} ({}) is human; headless matches need scripted players",
                human.id,
                human.name
            );
        }

        Ok(self)
    }
}

fn default_roster() -> Vec<PlayerConfig> {
    [
        ("Crimson", Color::from_rgb(0xc8, 0x2a, 0x36), Difficulty::Cyborg),
        ("Azure", Color::from_rgb(0x58, 0x47, 0xff), Difficulty::Chooser),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, color, difficulty), id)| PlayerConfig {
        id: PlayerId::new(id),
        name: name.to_owned(),
        color,
        kind: PlayerKind::Scripted,
        difficulty: Some(difficulty.label().to_owned()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_describes_a_default_match() {
        let file = MatchFile::parse("")
            .expect("empty file parses")
            .resolve(&Overrides::default())
            .expect("default roster is scripted");

        assert_eq!(file.config, GameConfig::default());
        assert_eq!(file.players.len(), 2);
    }

    #[test]
    fn sections_and_roster_are_read() {
        let contents = r#"
            [match]
            rounds = 3
            reseed_terrain = false

            [physics]
            gravity = 0.8

            [terrain]
            width = 320

            [[players]]
            id = 4
            name = "North"
            kind = "ai"
            difficulty = "poolshark"

            [[players]]
            id = 9
            name = "South"
            kind = "scripted"
        "#;

        let file = MatchFile::parse(contents).expect("valid toml");

        assert_eq!(file.config.rules.rounds, 3);
        assert!(!file.config.rules.reseed_terrain);
        assert_eq!(file.config.physics.gravity, 0.8);
        assert_eq!(file.config.terrain.width, 320);
        assert_eq!(file.config.terrain.height, 600);
        assert_eq!(file.players[0].id, PlayerId::new(4));
        assert_eq!(file.players[0].kind, PlayerKind::Scripted);
        assert_eq!(file.players[1].difficulty, None);
    }

    #[test]
    fn overrides_replace_file_values() {
        let overrides = Overrides {
            seed: Some(99),
            rounds: Some(1),
            difficulties: vec!["moron".to_owned()],
        };

        let file = MatchFile::default()
            .resolve(&overrides)
            .expect("valid overrides");

        assert_eq!(file.config.rules.seed, 99);
        assert_eq!(file.config.terrain.seed, 99);
        assert_eq!(file.config.rules.rounds, 1);
        assert_eq!(file.players[0].difficulty.as_deref(), Some("moron"));
        assert_eq!(file.players[1].difficulty.as_deref(), Some("chooser"));
    }

    #[test]
    fn human_players_and_unknown_levels_are_refused() {
        let contents = r#"
            [[players]]
            id = 1
            name = "Me"

            [[players]]
            id = 2
            name = "Bot"
            kind = "ai"
        "#;
        let file = MatchFile::parse(contents).expect("valid toml");
        assert!(file.resolve(&Overrides::default()).is_err());

        let overrides = Overrides {
            difficulties: vec!["grandmaster".to_owned()],
            ..Overrides::default()
        };
        assert!(MatchFile::default().resolve(&overrides).is_err());
    }
}
