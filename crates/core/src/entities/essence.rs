use serde::Serialize;

use crate::types::MonsterCategory;

pub const DROP_START_HEIGHT: f64 = 32.0;
pub const DROP_REMOVE_AFTER_MS: u64 = 800;
const GROUNDED_HEIGHT: f64 = 2.0;
const GROUNDED_PICKUP_RANGE: f64 = 32.0;
const AIRBORNE_PICKUP_RANGE: f64 = 20.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EssenceDrop {
    pub position: f64,
    /// Height above the ground; falls one unit per tick.
    pub y: f64,
    pub collected_at: Option<u64>,
    pub source: MonsterCategory,
}

impl EssenceDrop {
    pub fn new(position: f64, source: MonsterCategory) -> Self {
        Self { position, y: DROP_START_HEIGHT, collected_at: None, source }
    }

    pub fn is_collected(&self) -> bool {
        self.collected_at.is_some()
    }

    pub fn collect(&mut self, now: u64) {
        if self.collected_at.is_none() {
            self.collected_at = Some(now);
        }
    }

    /// Falls, then auto-collects when the player is close. True when collected this call.
    pub fn update(&mut self, player_position: f64, now: u64) -> bool {
        if self.is_collected() {
            return false;
        }
        if self.y > 0.0 {
            self.y = (self.y - 1.0).max(0.0);
        }
        let distance = (self.position - player_position).abs();
        let grounded = self.y <= GROUNDED_HEIGHT;
        if (distance < GROUNDED_PICKUP_RANGE && grounded) || distance < AIRBORNE_PICKUP_RANGE {
            self.collect(now);
            return true;
        }
        false
    }

    pub fn should_remove(&self, now: u64) -> bool {
        self.collected_at.is_some_and(|at| now.saturating_sub(at) > DROP_REMOVE_AFTER_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_drop_collects_while_airborne() {
        let mut drop = EssenceDrop::new(100.0, MonsterCategory::Wolf);
        assert!(drop.update(90.0, 16));
        assert!(!drop.update(90.0, 32), "a drop is only collected once");
        assert!(!drop.should_remove(800));
        assert!(drop.should_remove(817));
    }

    #[test]
    fn mid_range_drop_waits_for_the_ground() {
        let mut drop = EssenceDrop::new(125.0, MonsterCategory::Slime);
        let mut ticks = 0;
        while !drop.update(100.0, ticks * 16) {
            ticks += 1;
            assert!(ticks < 64, "drop should land and be collected");
        }
        assert!(drop.y <= GROUNDED_HEIGHT);
    }

    #[test]
    fn far_drop_stays_on_the_ground() {
        let mut drop = EssenceDrop::new(500.0, MonsterCategory::Goblin);
        for tick in 0..100 {
            assert!(!drop.update(0.0, tick * 16));
        }
        assert_eq!(drop.y, 0.0);
    }
}
