//! Game-mode state machine with epoch-guarded deferred transitions.
//! This module exists to own mode bookkeeping: previous mode, transition timing,
//! camera shake, engagement, and the queue of delayed transitions.
//! It does not decide when to fight or level; the orchestrator calls in.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::rng::SimRng;
use crate::types::{GameMode, MonsterId};

const SHAKE_FLOOR: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeferredKind {
    CombatExit,
    /// Resume from the level-up display that began at `started`.
    LevelUpResume { started: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredTransition {
    pub due: u64,
    pub epoch: u64,
    pub kind: DeferredKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModeMachine {
    mode: GameMode,
    previous: GameMode,
    transition_started: u64,
    transition_ms: u64,
    shake: f64,
    shake_offset: (f64, f64),
    engaged: Option<MonsterId>,
    combat_exit_pending: bool,
    levelup_return: GameMode,
    levelup_started: Option<u64>,
    deferred: Vec<DeferredTransition>,
    epoch: u64,
}

impl ModeMachine {
    pub fn new(epoch: u64, transition_ms: u64) -> Self {
        Self {
            mode: GameMode::Running,
            previous: GameMode::Running,
            transition_started: 0,
            transition_ms,
            shake: 0.0,
            shake_offset: (0.0, 0.0),
            engaged: None,
            combat_exit_pending: false,
            levelup_return: GameMode::Running,
            levelup_started: None,
            deferred: Vec::new(),
            epoch,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn previous(&self) -> GameMode {
        self.previous
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn engaged(&self) -> Option<MonsterId> {
        self.engaged
    }

    pub fn combat_exit_pending(&self) -> bool {
        self.combat_exit_pending
    }

    pub fn levelup_return(&self) -> GameMode {
        self.levelup_return
    }

    pub fn levelup_started(&self) -> Option<u64> {
        self.levelup_started
    }

    pub fn shake(&self) -> f64 {
        self.shake
    }

    pub fn camera_offset(&self) -> (f64, f64) {
        self.shake_offset
    }

    pub fn pending_transitions(&self) -> &[DeferredTransition] {
        &self.deferred
    }

    pub fn progress(&self, now: u64) -> f64 {
        if self.transition_ms == 0 {
            return 1.0;
        }
        (now.saturating_sub(self.transition_started) as f64 / self.transition_ms as f64).min(1.0)
    }

    pub fn is_transitioning(&self, now: u64) -> bool {
        self.progress(now) < 1.0
    }

    /// The mode whose per-tick behavior applies, looking through the level-up overlay.
    pub fn behavior_mode(&self) -> GameMode {
        match self.mode {
            GameMode::LevelUp => self.levelup_return,
            mode => mode,
        }
    }

    pub fn transition_to(&mut self, mode: GameMode, now: u64) {
        if mode == self.mode {
            return;
        }
        info!(from = ?self.mode, to = ?mode, now, "mode transition");
        self.previous = self.mode;
        self.mode = mode;
        self.transition_started = now;
    }

    pub fn pulse_shake(&mut self, intensity: f64) {
        self.shake = self.shake.max(intensity);
    }

    pub fn decay_shake(&mut self, rng: &mut SimRng, decay: f64) {
        if self.shake <= 0.0 {
            return;
        }
        let intensity = self.shake;
        self.shake_offset =
            ((rng.next_f64() - 0.5) * intensity, (rng.next_f64() - 0.5) * intensity);
        self.shake *= decay;
        if self.shake < SHAKE_FLOOR {
            self.shake = 0.0;
            self.shake_offset = (0.0, 0.0);
        }
    }

    pub fn enter_combat(&mut self, monster: MonsterId, now: u64) {
        self.transition_to(GameMode::Combat, now);
        self.engaged = Some(monster);
        self.combat_exit_pending = false;
    }

    /// Moves engagement to another monster without a mode transition.
    pub fn retarget(&mut self, monster: MonsterId) {
        self.engaged = Some(monster);
    }

    /// Queues the delayed return to running. Re-requests while pending are ignored.
    pub fn schedule_combat_exit(&mut self, now: u64, delay_ms: u64) -> bool {
        if self.combat_exit_pending {
            return false;
        }
        self.combat_exit_pending = true;
        self.schedule(now + delay_ms, DeferredKind::CombatExit);
        true
    }

    /// Applies a due combat exit, retargeting any overlay that would resume into combat.
    pub fn finish_combat_exit(&mut self, now: u64) {
        self.combat_exit_pending = false;
        self.engaged = None;
        if self.levelup_return == GameMode::Combat {
            self.levelup_return = GameMode::Running;
        }
        match self.mode {
            GameMode::Combat => self.transition_to(GameMode::Running, now),
            GameMode::TraitSelect if self.previous == GameMode::Combat => {
                self.previous = GameMode::Running;
            }
            _ => {}
        }
    }

    pub fn enter_level_up(&mut self, now: u64, display_ms: u64) {
        if self.mode != GameMode::LevelUp {
            self.levelup_return = match self.mode {
                GameMode::Combat => GameMode::Combat,
                _ => GameMode::Running,
            };
        }
        self.transition_to(GameMode::LevelUp, now);
        self.levelup_started = Some(now);
        self.schedule(now + display_ms, DeferredKind::LevelUpResume { started: now });
    }

    pub fn levelup_display_active(&self, now: u64, display_ms: u64) -> bool {
        self.levelup_started.is_some_and(|at| now.saturating_sub(at) < display_ms)
    }

    /// Applies a due level-up resume if it belongs to the current display.
    pub fn finish_level_up(&mut self, started: u64, now: u64) -> bool {
        if self.mode != GameMode::LevelUp || self.levelup_started != Some(started) {
            return false;
        }
        self.transition_to(self.levelup_return, now);
        true
    }

    pub fn enter_trait_select(&mut self, now: u64) {
        self.transition_to(GameMode::TraitSelect, now);
    }

    /// Leaves trait selection toward the recorded previous mode.
    pub fn resume_from_trait_select(&mut self, now: u64, display_ms: u64) {
        if self.mode != GameMode::TraitSelect {
            return;
        }
        let target = match self.previous {
            GameMode::LevelUp if !self.levelup_display_active(now, display_ms) => {
                self.levelup_return
            }
            GameMode::Combat if self.engaged.is_none() => GameMode::Running,
            GameMode::TraitSelect | GameMode::Dead => GameMode::Running,
            previous => previous,
        };
        self.transition_to(target, now);
    }

    pub fn enter_dead(&mut self, now: u64) {
        self.transition_to(GameMode::Dead, now);
        self.engaged = None;
        self.combat_exit_pending = false;
        self.invalidate_deferred();
    }

    /// Repairs a combat mode that lost its engaged monster.
    pub fn force_running(&mut self, now: u64) {
        self.engaged = None;
        self.combat_exit_pending = false;
        self.deferred.retain(|token| token.kind != DeferredKind::CombatExit);
        self.transition_to(GameMode::Running, now);
    }

    pub fn invalidate_deferred(&mut self) {
        self.epoch += 1;
        self.deferred.clear();
    }

    /// Removes and returns the transitions due at `now`; stale-epoch tokens are discarded.
    pub fn take_due(&mut self, now: u64) -> Vec<DeferredKind> {
        let epoch = self.epoch;
        let mut due = Vec::new();
        self.deferred.retain(|token| {
            if token.epoch != epoch {
                return false;
            }
            if token.due <= now {
                due.push(token.kind);
                return false;
            }
            true
        });
        due
    }

    fn schedule(&mut self, due: u64, kind: DeferredKind) {
        self.deferred.push(DeferredTransition { due, epoch: self.epoch, kind });
    }
}
