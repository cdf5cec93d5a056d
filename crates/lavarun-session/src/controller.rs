use serde::{Deserialize, Serialize};

use lavarun_core::{Actor, Level, Obstacle, ObstacleMap, Vector};

/// Horizontal run speed (tiles/s).
pub const MOVE_SPEED: f64 = 7.0;
/// Downward acceleration (tiles/s^2, `y` grows downward).
pub const GRAVITY: f64 = 30.0;
/// Upward speed given by a jump.
pub const JUMP_SPEED: f64 = 17.0;

/// Player movement tuning, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub move_speed: f64,
    pub gravity: f64,
    pub jump_speed: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            gravity: GRAVITY,
            jump_speed: JUMP_SPEED,
        }
    }
}

/// Held keys for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl PlayerInput {
    pub const RIGHT: PlayerInput = PlayerInput {
        left: false,
        right: true,
        jump: false,
    };
}

/// Move the level's player for one sub-step and report what it bumped into.
///
/// Each axis moves separately. A blocked move leaves the position unchanged
/// and the obstacle is passed to [`Level::player_touched`]. Landing with
/// `jump` held launches the player upward.
pub fn drive_player(
    level: &mut Level,
    input: &PlayerInput,
    step: f64,
    tuning: &ControllerConfig,
) -> Vec<Obstacle> {
    let Some(player) = level.player() else {
        return Vec::new();
    };
    let size = player.size();
    let mut pos = player.pos;
    let mut speed = player.speed;
    let mut touched = Vec::new();

    speed.x = 0.0;
    if input.left {
        speed.x -= tuning.move_speed;
    }
    if input.right {
        speed.x += tuning.move_speed;
    }
    let next = pos + Vector::new(speed.x * step, 0.0);
    match level.obstacle_at(next, size) {
        Some(obstacle) => touched.push(obstacle),
        None => pos = next,
    }

    speed.y += step * tuning.gravity;
    let next = pos + Vector::new(0.0, speed.y * step);
    match level.obstacle_at(next, size) {
        Some(obstacle) => {
            touched.push(obstacle);
            speed.y = if input.jump && speed.y > 0.0 {
                -tuning.jump_speed
            } else {
                0.0
            };
        },
        None => pos = next,
    }

    if let Some(player) = level.player_mut() {
        player.pos = pos;
        player.speed = speed;
    }
    for &obstacle in &touched {
        level.player_touched(obstacle, None);
    }
    touched
}

/// Whether the player is standing on something solid.
pub fn is_grounded(level: &Level, player: &Actor) -> bool {
    let below = player.pos + Vector::new(0.0, 0.01);
    level.obstacle_at(below, player.size()).is_some()
}
