//! Tunable simulation parameters.
//! This module exists to keep pacing and distance constants out of gameplay code.
//! It does not own content tables (traits, pets, biomes); see `content`.

use serde::{Deserialize, Serialize};

/// How the combat step picks opponents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Engagement {
    /// One engaged monster at a time.
    Single,
    /// Legacy multi-engagement: up to `cap` nearest monsters trade blows.
    Batch { cap: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulated milliseconds per `advance()` call.
    pub tick_ms: u64,
    /// World units the player runs per tick while in `Running`.
    pub run_speed: f64,
    pub engage_distance: f64,
    pub engagement: Engagement,

    pub max_monsters: usize,
    pub spawn_interval_ms: u64,
    pub spawn_jitter_ms: u64,
    pub spawn_ahead: f64,
    pub spawn_ahead_jitter: f64,
    pub despawn_behind: f64,
    pub death_settle_ms: u64,

    pub transition_ms: u64,
    pub combat_exit_delay_ms: u64,
    pub levelup_display_ms: u64,
    pub shake_decay: f64,
    pub death_shake: f64,

    pub player_attack_anim_ms: u64,
    pub monster_attack_anim_ms: u64,

    pub damage_text_window_ms: u64,
    pub trait_notification_ms: u64,
    pub bonus_notification_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            run_speed: 2.0,
            engage_distance: 50.0,
            engagement: Engagement::Single,
            max_monsters: 5,
            spawn_interval_ms: 2000,
            spawn_jitter_ms: 1000,
            spawn_ahead: 600.0,
            spawn_ahead_jitter: 200.0,
            despawn_behind: 300.0,
            death_settle_ms: 600,
            transition_ms: 500,
            combat_exit_delay_ms: 500,
            levelup_display_ms: 2000,
            shake_decay: 0.9,
            death_shake: 8.0,
            player_attack_anim_ms: 300,
            monster_attack_anim_ms: 400,
            damage_text_window_ms: 1000,
            trait_notification_ms: 5000,
            bonus_notification_ms: 3000,
        }
    }
}

impl SimConfig {
    /// Distance at which a running player stops to fight.
    pub fn engagement_range(&self) -> f64 {
        self.engage_distance * 1.5
    }

    pub fn batch_cap(&self) -> Option<usize> {
        match self.engagement {
            Engagement::Single => None,
            Engagement::Batch { cap } => Some(cap.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let parsed: SimConfig =
            serde_json::from_str(r#"{"tick_ms": 8, "engagement": {"mode": "batch", "cap": 3}}"#)
                .expect("config should parse");
        assert_eq!(parsed.tick_ms, 8);
        assert_eq!(parsed.batch_cap(), Some(3));
        assert_eq!(parsed.max_monsters, SimConfig::default().max_monsters);
    }

    #[test]
    fn zero_batch_cap_still_engages_one() {
        let config = SimConfig { engagement: Engagement::Batch { cap: 0 }, ..SimConfig::default() };
        assert_eq!(config.batch_cap(), Some(1));
        assert_eq!(SimConfig::default().batch_cap(), None);
    }
}
