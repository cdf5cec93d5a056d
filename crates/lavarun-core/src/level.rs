use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorId, ActorKind};
use crate::grid::{Grid, Obstacle, ObstacleMap};
use crate::vector::Vector;

/// Seconds a level keeps running after it is won or lost.
pub const DEFAULT_FINISH_DELAY: f64 = 1.0;

/// Terminal outcome of a level. Once set it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Won,
    Lost,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Won => f.write_str("won"),
            Status::Lost => f.write_str("lost"),
        }
    }
}

/// Something the player came into contact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touched {
    Obstacle(Obstacle),
    Actor(ActorKind),
}

impl From<Obstacle> for Touched {
    fn from(obstacle: Obstacle) -> Self {
        Touched::Obstacle(obstacle)
    }
}

impl From<ActorKind> for Touched {
    fn from(kind: ActorKind) -> Self {
        Touched::Actor(kind)
    }
}

/// A playable level: static grid, live actors and the win/lose state.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    grid: Grid,
    actors: Vec<Actor>,
    status: Option<Status>,
    finish_delay: f64,
}

impl Level {
    pub fn new(grid: Grid, actors: Vec<Actor>) -> Self {
        Self {
            grid,
            actors,
            status: None,
            finish_delay: DEFAULT_FINISH_DELAY,
        }
    }

    pub fn with_finish_delay(mut self, finish_delay: f64) -> Self {
        self.finish_delay = finish_delay;
        self
    }

    pub(crate) fn from_parts(
        grid: Grid,
        actors: Vec<Actor>,
        status: Option<Status>,
        finish_delay: f64,
    ) -> Self {
        Self {
            grid,
            actors,
            status,
            finish_delay,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id() == id)
    }

    /// Ids of every live actor, in list order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.iter().map(Actor::id).collect()
    }

    /// First player in the actor list.
    pub fn player(&self) -> Option<&Actor> {
        self.actors.iter().find(|a| a.kind() == ActorKind::Player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.kind() == ActorKind::Player)
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn finish_delay(&self) -> f64 {
        self.finish_delay
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some() && self.finish_delay <= 0.0
    }

    /// Count down the finish delay. Does nothing until the level has a status.
    pub fn tick_finish_delay(&mut self, dt: f64) {
        if self.status.is_some() {
            self.finish_delay -= dt;
        }
    }

    /// First other actor in list order whose box overlaps `actor`.
    pub fn actor_at(&self, actor: &Actor) -> Option<&Actor> {
        self.actors.iter().find(|other| actor.is_intersect(other))
    }

    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Remove the actor with this id, if it is still present.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let index = self.actors.iter().position(|a| a.id() == id)?;
        Some(self.actors.remove(index))
    }

    pub fn no_more_actors(&self, kind: ActorKind) -> bool {
        !self.actors.iter().any(|a| a.kind() == kind)
    }

    /// Advance one actor against this level's grid. Returns false when the
    /// actor is no longer in the level.
    pub fn act(&mut self, id: ActorId, time: f64) -> bool {
        let Level { grid, actors, .. } = self;
        match actors.iter_mut().find(|a| a.id() == id) {
            Some(actor) => {
                actor.act(time, grid);
                true
            },
            None => false,
        }
    }

    /// Advance every actor present at the start of the call, in list order.
    ///
    /// Drivers that remove actors between `act` calls should walk an
    /// [`actor_ids`](Self::actor_ids) list the same way: a removed actor is
    /// skipped and no survivor acts twice.
    pub fn act_all(&mut self, time: f64) {
        for id in self.actor_ids() {
            self.act(id, time);
        }
    }

    /// Apply a player contact to the win/lose state.
    ///
    /// Lava and fireballs lose the level. A coin is removed and the level is
    /// won once no coins remain. Anything else, or any touch after the
    /// level already has a status, is ignored.
    pub fn player_touched(&mut self, touched: impl Into<Touched>, actor: Option<ActorId>) {
        if self.status.is_some() {
            return;
        }
        match touched.into() {
            Touched::Obstacle(Obstacle::Lava) | Touched::Actor(ActorKind::Fireball) => {
                self.status = Some(Status::Lost);
                tracing::debug!("player touched a hazard, level lost");
            },
            Touched::Actor(ActorKind::Coin) => {
                if let Some(id) = actor
                    && self.remove_actor(id).is_some()
                {
                    tracing::debug!(coin = id.0, "coin collected");
                }
                if self.no_more_actors(ActorKind::Coin) {
                    self.status = Some(Status::Won);
                    tracing::debug!("last coin collected, level won");
                }
            },
            Touched::Obstacle(Obstacle::Wall)
            | Touched::Actor(ActorKind::Player | ActorKind::Actor) => {},
        }
    }
}

impl ObstacleMap for Level {
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Option<Obstacle> {
        self.grid.obstacle_at(pos, size)
    }
}
