//! Gameplay tunables, optionally overridden from a TOML file.
//!
//! Every field has a compiled-in default, so a config file only needs the
//! keys it wants to change:
//!
//! ```toml
//! player_lives = 5
//! invader_fire_chance = 0.02
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::GameResult;

/// The formation never marches faster than this, whatever the config says.
pub const MOVE_DELAY_FLOOR_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Player ───────────────────────────────────────────────────────────
    pub player_lives: u32,
    pub player_speed: i32,
    pub fire_cooldown_ms: u64,

    // ── Formation ────────────────────────────────────────────────────────
    pub initial_move_delay_ms: u64,
    pub min_move_delay_ms: u64,
    pub level_delay_step_ms: u64,
    pub invader_step_px: i32,
    pub invader_descend_px: i32,
    pub invader_fire_chance: f64,

    // ── Mystery ship ─────────────────────────────────────────────────────
    pub mystery_min_delay_ms: u64,
    pub mystery_max_delay_ms: u64,
    pub mystery_points: Vec<u32>,

    // ── Timers ───────────────────────────────────────────────────────────
    pub level_transition_ms: u64,
    pub respawn_pause_ms: u64,
    pub game_over_lockout_ms: u64,
    pub explosion_lifetime_ms: u64,
    pub name_entry_debounce_ms: u64,

    // ── High scores ──────────────────────────────────────────────────────
    pub high_score_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_lives: 3,
            player_speed: 5,
            fire_cooldown_ms: 500,
            initial_move_delay_ms: 1000,
            min_move_delay_ms: 100,
            level_delay_step_ms: 100,
            invader_step_px: 1,
            invader_descend_px: 20,
            invader_fire_chance: 0.01,
            mystery_min_delay_ms: 15_000,
            mystery_max_delay_ms: 30_000,
            mystery_points: vec![50, 100, 150, 300],
            level_transition_ms: 2000,
            respawn_pause_ms: 1000,
            game_over_lockout_ms: 2000,
            explosion_lifetime_ms: 500,
            name_entry_debounce_ms: 150,
            high_score_capacity: 10,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let mut config: GameConfig = toml::from_str(text)?;
        config.sanitize();
        Ok(config)
    }

    pub fn load(path: &Path) -> GameResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Starting move-delay of the formation on a given level.
    /// Level 1 starts at the initial delay; later levels start faster.
    pub fn level_start_delay(&self, level: u32) -> u64 {
        if level <= 1 {
            return self.initial_move_delay_ms;
        }
        self.initial_move_delay_ms
            .saturating_sub(self.level_delay_step_ms * level as u64)
            .max(self.min_move_delay_ms)
    }

    fn sanitize(&mut self) {
        if self.mystery_points.is_empty() {
            self.mystery_points = GameConfig::default().mystery_points;
        }
        if self.mystery_max_delay_ms < self.mystery_min_delay_ms {
            self.mystery_max_delay_ms = self.mystery_min_delay_ms;
        }
        self.min_move_delay_ms = self.min_move_delay_ms.max(MOVE_DELAY_FLOOR_MS);
        self.initial_move_delay_ms = self.initial_move_delay_ms.max(self.min_move_delay_ms);
        self.invader_fire_chance = self.invader_fire_chance.clamp(0.0, 1.0);
        self.high_score_capacity = self.high_score_capacity.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("player_lives = 5\n").unwrap();
        assert_eq!(config.player_lives, 5);
        assert_eq!(config.fire_cooldown_ms, 500);
        assert_eq!(config.mystery_points, vec![50, 100, 150, 300]);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("player_lives = \"many\"").is_err());
    }

    #[test]
    fn level_start_delay_shrinks_to_floor() {
        let config = GameConfig::default();
        assert_eq!(config.level_start_delay(1), 1000);
        assert_eq!(config.level_start_delay(2), 800);
        assert_eq!(config.level_start_delay(5), 500);
        assert_eq!(config.level_start_delay(40), 100);
    }

    #[test]
    fn empty_point_table_falls_back() {
        let config = GameConfig::from_toml_str("mystery_points = []").unwrap();
        assert!(!config.mystery_points.is_empty());
    }
}
