use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::ObstacleMap;
use crate::vector::Vector;

/// Player bounding box.
pub const PLAYER_SIZE: Vector = Vector::new(0.8, 1.5);
/// Player spawn offset from its grid cell (stands half a tile taller).
pub const PLAYER_SPAWN_OFFSET: Vector = Vector::new(0.0, -0.5);
/// Coin bounding box.
pub const COIN_SIZE: Vector = Vector::new(0.6, 0.6);
/// Coin spawn offset from its grid cell.
pub const COIN_SPAWN_OFFSET: Vector = Vector::new(0.2, 0.1);
/// Coin bobbing phase advance per second.
pub const COIN_SPRING_SPEED: f64 = 8.0;
/// Coin bobbing amplitude.
pub const COIN_SPRING_DIST: f64 = 0.07;
/// Every fireball occupies exactly one tile.
pub const FIREBALL_SIZE: Vector = Vector::new(1.0, 1.0);
pub const HORIZONTAL_FIREBALL_SPEED: Vector = Vector::new(2.0, 0.0);
pub const VERTICAL_FIREBALL_SPEED: Vector = Vector::new(0.0, 2.0);
pub const FIRE_RAIN_SPEED: Vector = Vector::new(0.0, 3.0);

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an actor. Clones of an actor share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl ActorId {
    fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Keep ids handed out from now on above `self`.
    pub(crate) fn reserve(self) {
        NEXT_ACTOR_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

/// Per-variant discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Actor,
    Player,
    Coin,
    Fireball,
}

impl ActorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorKind::Actor => "actor",
            ActorKind::Player => "player",
            ActorKind::Coin => "coin",
            ActorKind::Fireball => "fireball",
        }
    }
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical bobbing state of a coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub starting_pos: Vector,
    /// Phase accumulator in radians.
    pub phase: f64,
}

impl Spring {
    pub fn update(&mut self, time: f64) {
        self.phase += COIN_SPRING_SPEED * time;
    }

    pub fn offset(&self) -> Vector {
        Vector::new(0.0, self.phase.sin() * COIN_SPRING_DIST)
    }

    /// Advance the phase and return the resulting position.
    pub fn next_position(&mut self, time: f64) -> Vector {
        self.update(time);
        self.starting_pos + self.offset()
    }
}

/// What a fireball does when its next position is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleResponse {
    /// Reverse speed and stay put.
    Bounce,
    /// Teleport back to the spawn position, keeping speed.
    Respawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fireball {
    pub starting_pos: Vector,
    pub on_obstacle: ObstacleResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Plain actor with no autonomous motion.
    Inert,
    /// Moved by the input controller, never by `act`.
    Player,
    Coin(Spring),
    Fireball(Fireball),
}

/// A moving entity with an axis-aligned bounding box.
///
/// `size` is fixed at construction; only `pos` and `speed` change while the
/// simulation runs. Bounds are always derived from the current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    pub pos: Vector,
    size: Vector,
    pub speed: Vector,
    behavior: Behavior,
}

impl Actor {
    pub fn new(pos: Vector, size: Vector, speed: Vector) -> Self {
        Self::with_behavior(pos, size, speed, Behavior::Inert)
    }

    /// Plain actor with a unit box and no speed.
    pub fn at(pos: Vector) -> Self {
        Self::new(pos, Vector::new(1.0, 1.0), Vector::ZERO)
    }

    fn with_behavior(pos: Vector, size: Vector, speed: Vector, behavior: Behavior) -> Self {
        Self {
            id: ActorId::next(),
            pos,
            size,
            speed,
            behavior,
        }
    }

    /// Player standing on grid cell `cell`.
    pub fn player(cell: Vector) -> Self {
        Self::with_behavior(
            cell + PLAYER_SPAWN_OFFSET,
            PLAYER_SIZE,
            Vector::ZERO,
            Behavior::Player,
        )
    }

    /// Coin in grid cell `cell` with a random starting phase in `[0, 2π)`.
    pub fn coin<R: Rng + ?Sized>(cell: Vector, rng: &mut R) -> Self {
        Self::coin_with_phase(cell, rng.random_range(0.0..TAU))
    }

    pub fn coin_with_phase(cell: Vector, phase: f64) -> Self {
        let pos = cell + COIN_SPAWN_OFFSET;
        Self::with_behavior(
            pos,
            COIN_SIZE,
            Vector::ZERO,
            Behavior::Coin(Spring {
                starting_pos: pos,
                phase,
            }),
        )
    }

    /// Bouncing fireball with an arbitrary speed.
    pub fn fireball(pos: Vector, speed: Vector) -> Self {
        Self::fireball_with(pos, speed, ObstacleResponse::Bounce)
    }

    pub fn horizontal_fireball(pos: Vector) -> Self {
        Self::fireball(pos, HORIZONTAL_FIREBALL_SPEED)
    }

    pub fn vertical_fireball(pos: Vector) -> Self {
        Self::fireball(pos, VERTICAL_FIREBALL_SPEED)
    }

    /// Falling fireball that restarts from its spawn point when it lands.
    pub fn fire_rain(pos: Vector) -> Self {
        Self::fireball_with(pos, FIRE_RAIN_SPEED, ObstacleResponse::Respawn)
    }

    fn fireball_with(pos: Vector, speed: Vector, on_obstacle: ObstacleResponse) -> Self {
        Self::with_behavior(
            pos,
            FIREBALL_SIZE,
            speed,
            Behavior::Fireball(Fireball {
                starting_pos: pos,
                on_obstacle,
            }),
        )
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn size(&self) -> Vector {
        self.size
    }

    pub fn kind(&self) -> ActorKind {
        match self.behavior {
            Behavior::Inert => ActorKind::Actor,
            Behavior::Player => ActorKind::Player,
            Behavior::Coin(_) => ActorKind::Coin,
            Behavior::Fireball(_) => ActorKind::Fireball,
        }
    }

    pub fn spring(&self) -> Option<&Spring> {
        match &self.behavior {
            Behavior::Coin(spring) => Some(spring),
            _ => None,
        }
    }

    pub fn left(&self) -> f64 {
        self.pos.x
    }

    pub fn right(&self) -> f64 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f64 {
        self.pos.y
    }

    pub fn bottom(&self) -> f64 {
        self.pos.y + self.size.y
    }

    /// Open-interval AABB overlap. Touching edges do not count and an actor
    /// never intersects itself.
    pub fn is_intersect(&self, other: &Actor) -> bool {
        if self.id == other.id {
            return false;
        }
        other.left() < self.right()
            && other.right() > self.left()
            && other.top() < self.bottom()
            && other.bottom() > self.top()
    }

    /// Position after moving at the current speed for `time`.
    pub fn next_position(&self, time: f64) -> Vector {
        self.pos + self.speed * time
    }

    /// Advance this actor by `time`, consulting `map` for obstacles.
    pub fn act<M: ObstacleMap + ?Sized>(&mut self, time: f64, map: &M) {
        match self.behavior {
            Behavior::Inert | Behavior::Player => {},
            Behavior::Coin(ref mut spring) => {
                self.pos = spring.next_position(time);
            },
            Behavior::Fireball(_) => {
                let next = self.next_position(time);
                if map.obstacle_at(next, self.size).is_some() {
                    self.handle_obstacle();
                } else {
                    self.pos = next;
                }
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: ActorId) -> Self {
        self.id = id;
        self
    }

    /// Fireball reaction to a blocked move. No-op for other variants.
    pub fn handle_obstacle(&mut self) {
        if let Behavior::Fireball(fireball) = self.behavior {
            match fireball.on_obstacle {
                ObstacleResponse::Bounce => self.speed = self.speed.revert(),
                ObstacleResponse::Respawn => self.pos = fireball.starting_pos,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Obstacle};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Map that reports the same answer for every query.
    struct Everywhere(Option<Obstacle>);

    impl ObstacleMap for Everywhere {
        fn obstacle_at(&self, _pos: Vector, _size: Vector) -> Option<Obstacle> {
            self.0
        }
    }

    #[test]
    fn plain_actor_defaults() {
        let a = Actor::at(Vector::new(3.0, 4.0));
        assert_eq!(a.size(), Vector::new(1.0, 1.0));
        assert_eq!(a.speed, Vector::ZERO);
        assert_eq!(a.kind(), ActorKind::Actor);
        assert_eq!((a.left(), a.right(), a.top(), a.bottom()), (3.0, 4.0, 4.0, 5.0));
    }

    #[test]
    fn bounds_follow_position() {
        let mut a = Actor::at(Vector::ZERO);
        a.pos = Vector::new(10.0, 20.0);
        assert_eq!(a.right(), 11.0);
        assert_eq!(a.bottom(), 21.0);
    }

    #[test]
    fn never_intersects_itself() {
        let a = Actor::at(Vector::ZERO);
        assert!(!a.is_intersect(&a));
        assert!(!a.is_intersect(&a.clone()), "clones share identity");
    }

    #[test]
    fn overlapping_boxes_intersect() {
        let a = Actor::at(Vector::ZERO);
        let b = Actor::at(Vector::new(0.5, 0.5));
        assert!(a.is_intersect(&b));
        assert!(b.is_intersect(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Actor::at(Vector::ZERO);
        let right = Actor::at(Vector::new(1.0, 0.0));
        let below = Actor::at(Vector::new(0.0, 1.0));
        assert!(!a.is_intersect(&right));
        assert!(!a.is_intersect(&below));
    }

    #[test]
    fn contained_box_intersects() {
        let outer = Actor::new(Vector::ZERO, Vector::new(5.0, 5.0), Vector::ZERO);
        let inner = Actor::new(Vector::new(1.0, 1.0), Vector::new(0.5, 0.5), Vector::ZERO);
        assert!(outer.is_intersect(&inner));
        assert!(inner.is_intersect(&outer));
    }

    #[test]
    fn player_spawn_offset_and_size() {
        let p = Actor::player(Vector::new(0.0, 1.0));
        assert_eq!(p.pos, Vector::new(0.0, 0.5));
        assert_eq!(p.size(), PLAYER_SIZE);
        assert_eq!(p.kind(), ActorKind::Player);
    }

    #[test]
    fn player_act_does_nothing() {
        let mut p = Actor::player(Vector::new(2.0, 2.0));
        p.speed = Vector::new(5.0, 0.0);
        let before = p.clone();
        p.act(1.0, &Everywhere(None));
        assert_eq!(p, before);
    }

    #[test]
    fn coin_spawn_offset_and_phase_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let c = Actor::coin(Vector::new(1.0, 1.0), &mut rng);
            assert_eq!(c.pos, Vector::new(1.2, 1.1));
            assert_eq!(c.size(), COIN_SIZE);
            let phase = c.spring().map(|s| s.phase).unwrap_or(-1.0);
            assert!((0.0..TAU).contains(&phase), "phase {phase} out of range");
        }
    }

    #[test]
    fn coin_bobs_vertically_only() {
        let mut c = Actor::coin_with_phase(Vector::new(3.0, 3.0), 0.0);
        let start = c.pos;
        c.act(0.1, &Everywhere(Some(Obstacle::Wall)));
        assert_eq!(c.pos.x, start.x);
        let expected = start.y + (COIN_SPRING_SPEED * 0.1).sin() * COIN_SPRING_DIST;
        assert!((c.pos.y - expected).abs() < 1e-12);
        assert!((c.spring().map(|s| s.phase).unwrap_or(0.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn coin_stays_near_start() {
        let mut c = Actor::coin_with_phase(Vector::ZERO, 1.0);
        for _ in 0..100 {
            c.act(0.05, &Everywhere(None));
            assert!((c.pos.y - COIN_SPAWN_OFFSET.y).abs() <= COIN_SPRING_DIST + 1e-12);
        }
    }

    #[test]
    fn fireball_variant_speeds() {
        let h = Actor::horizontal_fireball(Vector::ZERO);
        let v = Actor::vertical_fireball(Vector::ZERO);
        let r = Actor::fire_rain(Vector::ZERO);
        assert_eq!(h.speed, Vector::new(2.0, 0.0));
        assert_eq!(v.speed, Vector::new(0.0, 2.0));
        assert_eq!(r.speed, Vector::new(0.0, 3.0));
        for f in [&h, &v, &r] {
            assert_eq!(f.kind(), ActorKind::Fireball);
            assert_eq!(f.size(), FIREBALL_SIZE);
        }
    }

    #[test]
    fn fireball_moves_when_free() {
        let mut f = Actor::vertical_fireball(Vector::new(1.0, 1.0));
        f.act(0.5, &Everywhere(None));
        assert_eq!(f.pos, Vector::new(1.0, 2.0));
        assert_eq!(f.speed, Vector::new(0.0, 2.0));
    }

    #[test]
    fn horizontal_fireball_bounces_off_wall() {
        let mut f = Actor::horizontal_fireball(Vector::ZERO);
        f.act(1.0, &Everywhere(Some(Obstacle::Wall)));
        assert_eq!(f.pos, Vector::ZERO, "blocked fireball must not move");
        assert_eq!(f.speed, Vector::new(-2.0, 0.0));
    }

    #[test]
    fn fire_rain_respawns_instead_of_bouncing() {
        let mut f = Actor::fire_rain(Vector::new(4.0, 0.0));
        f.act(1.0, &Everywhere(None));
        assert_eq!(f.pos, Vector::new(4.0, 3.0));
        f.act(1.0, &Everywhere(Some(Obstacle::Lava)));
        assert_eq!(f.pos, Vector::new(4.0, 0.0));
        assert_eq!(f.speed, FIRE_RAIN_SPEED, "fire rain keeps falling");
    }

    #[test]
    fn fireball_bounces_between_walls() {
        // x....x with the fireball starting next to the left wall.
        let grid = Grid::new(vec![vec![
            Some(Obstacle::Wall),
            None,
            None,
            None,
            None,
            Some(Obstacle::Wall),
        ]]);
        let mut f = Actor::horizontal_fireball(Vector::new(1.0, 0.0));
        let mut max_x: f64 = 0.0;
        for _ in 0..40 {
            f.act(0.25, &grid);
            max_x = max_x.max(f.pos.x);
            assert!(f.left() >= 1.0 && f.right() <= 5.0, "escaped at {:?}", f.pos);
        }
        assert_eq!(max_x, 4.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn actor() -> impl Strategy<Value = Actor> {
            (-20.0f64..20.0, -20.0f64..20.0, 0.1f64..5.0, 0.1f64..5.0).prop_map(|(x, y, w, h)| {
                Actor::new(Vector::new(x, y), Vector::new(w, h), Vector::ZERO)
            })
        }

        proptest! {
            #[test]
            fn intersection_is_symmetric(a in actor(), b in actor()) {
                prop_assert_eq!(a.is_intersect(&b), b.is_intersect(&a));
            }

            #[test]
            fn actor_never_intersects_itself(a in actor()) {
                prop_assert!(!a.is_intersect(&a));
            }
        }
    }
}
