//! Bounded, time-stamped record of hits and dodges for floating combat text.
//! This module exists so combat can report events without knowing about rendering.
//! It does not own damage math; see `combat`.

use std::collections::VecDeque;

use serde::Serialize;

pub const MONSTER_HIT_CAP: usize = 20;
pub const PLAYER_HIT_CAP: usize = 20;
pub const DODGE_CAP: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonsterHit {
    pub monster: u64,
    pub amount: i32,
    pub at: u64,
    pub position: f64,
    pub critical: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerHit {
    pub amount: i32,
    pub at: u64,
    pub position: f64,
    pub special: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dodge {
    pub at: u64,
    pub position: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DamageLog {
    monster_hits: VecDeque<MonsterHit>,
    player_hits: VecDeque<PlayerHit>,
    dodges: VecDeque<Dodge>,
}

fn push_capped<T>(events: &mut VecDeque<T>, event: T, cap: usize) {
    events.push_back(event);
    while events.len() > cap {
        events.pop_front();
    }
}

fn within<T>(events: &VecDeque<T>, at: impl Fn(&T) -> u64, now: u64, window_ms: u64) -> Vec<T>
where
    T: Clone,
{
    events.iter().filter(|event| now.saturating_sub(at(event)) < window_ms).cloned().collect()
}

impl DamageLog {
    pub fn log_monster_hit(&mut self, hit: MonsterHit) {
        push_capped(&mut self.monster_hits, hit, MONSTER_HIT_CAP);
    }

    pub fn log_player_hit(&mut self, hit: PlayerHit) {
        push_capped(&mut self.player_hits, hit, PLAYER_HIT_CAP);
    }

    pub fn log_dodge(&mut self, dodge: Dodge) {
        push_capped(&mut self.dodges, dodge, DODGE_CAP);
    }

    pub fn monster_hits(&self, now: u64, window_ms: u64) -> Vec<MonsterHit> {
        within(&self.monster_hits, |hit| hit.at, now, window_ms)
    }

    pub fn player_hits(&self, now: u64, window_ms: u64) -> Vec<PlayerHit> {
        within(&self.player_hits, |hit| hit.at, now, window_ms)
    }

    pub fn dodges(&self, now: u64, window_ms: u64) -> Vec<Dodge> {
        within(&self.dodges, |dodge| dodge.at, now, window_ms)
    }

    pub fn latest_player_damage(&self) -> i32 {
        self.player_hits.back().map_or(0, |hit| hit.amount)
    }

    pub fn dodge_count(&self) -> usize {
        self.dodges.len()
    }

    /// Drops every event older than `max_age_ms`.
    pub fn prune(&mut self, now: u64, max_age_ms: u64) {
        let fresh = |at: u64| now.saturating_sub(at) < max_age_ms;
        self.monster_hits.retain(|hit| fresh(hit.at));
        self.player_hits.retain(|hit| fresh(hit.at));
        self.dodges.retain(|dodge| fresh(dodge.at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_keep_the_newest_events() {
        let mut log = DamageLog::default();
        for at in 0..15 {
            log.log_dodge(Dodge { at, position: 0.0 });
        }
        let kept = log.dodges(15, 1000);
        assert_eq!(kept.len(), DODGE_CAP);
        assert_eq!(kept.first().map(|dodge| dodge.at), Some(5));
    }

    #[test]
    fn window_and_prune_drop_old_events() {
        let mut log = DamageLog::default();
        log.log_player_hit(PlayerHit { amount: 4, at: 0, position: 0.0, special: None });
        log.log_player_hit(PlayerHit { amount: 7, at: 900, position: 0.0, special: None });
        assert_eq!(log.player_hits(1000, 1000).len(), 1);
        assert_eq!(log.latest_player_damage(), 7);

        log.prune(1800, 1000);
        assert_eq!(log.player_hits(1800, 10_000).len(), 1);
        log.prune(1900, 1000);
        assert!(log.player_hits(1900, 10_000).is_empty());
    }
}
