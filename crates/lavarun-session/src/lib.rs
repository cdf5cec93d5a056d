pub mod campaign;
pub mod config;
pub mod controller;
pub mod levels;

use serde::{Deserialize, Serialize};

use lavarun_core::{ActorId, ActorKind, Level, Obstacle, ObstacleMap, Status};

use config::{GameConfig, SessionConfig};
use controller::{ControllerConfig, PlayerInput, drive_player};

/// Most sub-steps simulated by one update. Time beyond that is dropped.
pub const MAX_SUBSTEPS: u64 = 1000;

/// Events emitted by a session during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { actor: ActorId },
    StatusChanged(Status),
    /// The finish delay ran out; the level is over.
    Finished(Status),
}

/// Drives one level: input, actor motion, collisions and the finish delay.
#[derive(Debug, Clone)]
pub struct Session {
    level: Level,
    settings: SessionConfig,
    controller: ControllerConfig,
    elapsed: f64,
}

impl Session {
    pub fn new(level: Level, config: &GameConfig) -> Self {
        let settings = config.session.clone().sanitized();
        Self {
            level: level.with_finish_delay(settings.finish_delay),
            settings,
            controller: config.controller.clone(),
            elapsed: 0.0,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.level.is_finished()
    }

    /// Advance by `dt` seconds, split into equal sub-steps of at most
    /// `max_step`. At most [`MAX_SUBSTEPS`] sub-steps run per call.
    ///
    /// Non-finite or non-positive `dt`, and any update after the level is
    /// finished, does nothing.
    pub fn update(&mut self, dt: f64, input: &PlayerInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !dt.is_finite() || dt <= 0.0 || self.level.is_finished() {
            return events;
        }

        let max_step = self.settings.max_step;
        let budget = max_step * MAX_SUBSTEPS as f64;
        if dt > budget {
            tracing::debug!(dt, budget, "update longer than the sub-step budget, clamping");
        }
        let dt = dt.min(budget);
        let steps = ((dt / max_step).ceil() as u64).clamp(1, MAX_SUBSTEPS);
        let step = dt / steps as f64;
        for _ in 0..steps {
            if self.level.is_finished() {
                break;
            }
            self.step(step, input, &mut events);
        }
        events
    }

    fn step(&mut self, step: f64, input: &PlayerInput, events: &mut Vec<GameEvent>) {
        let status_before = self.level.status();

        drive_player(&mut self.level, input, step, &self.controller);
        self.level.act_all(step);

        if let Some(player) = self.level.player().cloned() {
            if self.level.obstacle_at(player.pos, player.size()) == Some(Obstacle::Lava) {
                self.level.player_touched(Obstacle::Lava, None);
            }
            let other = self.level.actor_at(&player).map(|a| (a.kind(), a.id()));
            if let Some((kind, id)) = other {
                self.level.player_touched(kind, Some(id));
                if kind == ActorKind::Coin && self.level.actor(id).is_none() {
                    events.push(GameEvent::CoinCollected { actor: id });
                }
            }
        }

        self.level.tick_finish_delay(step);
        self.elapsed += step;

        if let Some(status) = self.level.status() {
            if status_before.is_none() {
                tracing::debug!(%status, elapsed = self.elapsed, "level status changed");
                events.push(GameEvent::StatusChanged(status));
            }
            if self.level.is_finished() {
                events.push(GameEvent::Finished(status));
            }
        }
    }
}
