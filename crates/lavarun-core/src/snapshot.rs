use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::grid::Grid;
use crate::level::{Level, Status};
use crate::vector::Vector;

/// Maximum encoded snapshot size in bytes.
pub const MAX_SNAPSHOT_SIZE: usize = 1024 * 1024; // 1 MiB

#[derive(Debug)]
pub enum SnapshotError {
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
    /// Decoded fine but describes an impossible level.
    InvalidState(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "snapshot too large: {size} bytes (max {MAX_SNAPSHOT_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
            Self::InvalidState(e) => write!(f, "invalid snapshot: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Everything a renderer needs to draw one frame of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub grid: Grid,
    pub actors: Vec<Actor>,
    pub status: Option<Status>,
    pub finish_delay: f64,
}

impl LevelSnapshot {
    pub fn capture(level: &Level) -> Self {
        Self {
            grid: level.grid().clone(),
            actors: level.actors().to_vec(),
            status: level.status(),
            finish_delay: level.finish_delay(),
        }
    }

    /// Rebuild a level in exactly the captured state. Actors created later
    /// in this process get ids above every restored one.
    pub fn restore(self) -> Level {
        let mut level = Level::from_parts(self.grid, Vec::new(), self.status, self.finish_delay);
        for actor in self.actors {
            actor.id().reserve();
            level.add_actor(actor);
        }
        level
    }

    /// MessagePack encoding.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let bytes =
            rmp_serde::to_vec(self).map_err(|e| SnapshotError::SerializeError(e.to_string()))?;
        if bytes.len() > MAX_SNAPSHOT_SIZE {
            return Err(SnapshotError::PayloadTooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() > MAX_SNAPSHOT_SIZE {
            return Err(SnapshotError::PayloadTooLarge(bytes.len()));
        }
        let snapshot: Self = rmp_serde::from_slice(bytes)
            .map_err(|e| SnapshotError::DeserializeError(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        for actor in &self.actors {
            for v in [actor.pos, actor.size(), actor.speed] {
                Vector::try_new(v.x, v.y)
                    .map_err(|e| SnapshotError::InvalidState(format!("actor {}: {e}", actor.id().0)))?;
            }
        }
        if !self.finish_delay.is_finite() {
            return Err(SnapshotError::InvalidState(format!(
                "finish delay must be finite: {}",
                self.finish_delay
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::grid::Obstacle;
    use crate::parser::LevelParser;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_level() -> Level {
        LevelParser::default().parse_with_rng(
            &["x  o  x", "x @ = x", "x!!!!!x"],
            &mut StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn capture_reflects_level() {
        let level = sample_level();
        let snap = LevelSnapshot::capture(&level);
        assert_eq!(snap.grid.width(), 7);
        assert_eq!(snap.actors.len(), 3);
        assert_eq!(snap.status, None);
    }

    #[test]
    fn encoded_snapshot_restores_same_level() {
        let mut level = sample_level();
        level.act_all(0.3);
        level.player_touched(Obstacle::Lava, None);
        level.tick_finish_delay(0.25);

        let bytes = LevelSnapshot::capture(&level).encode().unwrap();
        let restored = LevelSnapshot::decode(&bytes).unwrap().restore();
        assert_eq!(restored, level);
        assert_eq!(restored.width(), level.width());
    }

    #[test]
    fn restored_ids_are_never_reused() {
        let high = ActorId(1 << 40);
        let mut level = sample_level();
        level.add_actor(Actor::at(Vector::new(1.0, 0.0)).with_id(high));
        let bytes = LevelSnapshot::capture(&level).encode().unwrap();

        let mut restored = LevelSnapshot::decode(&bytes).unwrap().restore();
        let newcomer = Actor::at(Vector::new(1.0, 0.0));
        assert!(newcomer.id() > high);

        restored.add_actor(newcomer.clone());
        assert_eq!(restored.actor_at(&newcomer).map(Actor::id), Some(high));
    }

    #[test]
    fn non_finite_actor_is_rejected() {
        let mut snap = LevelSnapshot::capture(&sample_level());
        snap.actors[0].pos = Vector::new(f64::NAN, 0.0);
        let bytes = snap.encode().unwrap();
        assert!(matches!(
            LevelSnapshot::decode(&bytes),
            Err(SnapshotError::InvalidState(_))
        ));
    }

    #[test]
    fn non_finite_finish_delay_is_rejected() {
        let mut snap = LevelSnapshot::capture(&sample_level());
        snap.finish_delay = f64::INFINITY;
        let bytes = snap.encode().unwrap();
        assert!(matches!(
            LevelSnapshot::decode(&bytes),
            Err(SnapshotError::InvalidState(_))
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = LevelSnapshot::decode(&[0xc1, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, SnapshotError::DeserializeError(_)));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let bytes = vec![0u8; MAX_SNAPSHOT_SIZE + 1];
        assert!(matches!(
            LevelSnapshot::decode(&bytes),
            Err(SnapshotError::PayloadTooLarge(_))
        ));
    }
}
