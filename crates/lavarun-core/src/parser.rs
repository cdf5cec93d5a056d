use std::collections::HashMap;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::error::ContractError;
use crate::grid::{Grid, Obstacle};
use crate::level::Level;
use crate::vector::Vector;

/// Builds an actor standing in the given grid cell.
pub type SpawnFn = fn(Vector, &mut StdRng) -> Actor;

/// Named actor variants a level symbol can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Player,
    Coin,
    HorizontalFireball,
    VerticalFireball,
    FireRain,
}

impl SpawnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SpawnKind::Player => "player",
            SpawnKind::Coin => "coin",
            SpawnKind::HorizontalFireball => "horizontal_fireball",
            SpawnKind::VerticalFireball => "vertical_fireball",
            SpawnKind::FireRain => "fire_rain",
        }
    }

    pub fn spawn_fn(self) -> SpawnFn {
        match self {
            SpawnKind::Player => spawn_player as SpawnFn,
            SpawnKind::Coin => spawn_coin as SpawnFn,
            SpawnKind::HorizontalFireball => spawn_horizontal_fireball as SpawnFn,
            SpawnKind::VerticalFireball => spawn_vertical_fireball as SpawnFn,
            SpawnKind::FireRain => spawn_fire_rain as SpawnFn,
        }
    }
}

impl FromStr for SpawnKind {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(SpawnKind::Player),
            "coin" => Ok(SpawnKind::Coin),
            "horizontal_fireball" => Ok(SpawnKind::HorizontalFireball),
            "vertical_fireball" => Ok(SpawnKind::VerticalFireball),
            "fire_rain" => Ok(SpawnKind::FireRain),
            other => Err(ContractError::UnknownActorKind(other.to_string())),
        }
    }
}

fn spawn_player(cell: Vector, _rng: &mut StdRng) -> Actor {
    Actor::player(cell)
}

fn spawn_coin(cell: Vector, rng: &mut StdRng) -> Actor {
    Actor::coin(cell, rng)
}

fn spawn_horizontal_fireball(cell: Vector, _rng: &mut StdRng) -> Actor {
    Actor::horizontal_fireball(cell)
}

fn spawn_vertical_fireball(cell: Vector, _rng: &mut StdRng) -> Actor {
    Actor::vertical_fireball(cell)
}

fn spawn_fire_rain(cell: Vector, _rng: &mut StdRng) -> Actor {
    Actor::fire_rain(cell)
}

/// The standard actor symbols: `@ o = | v`.
pub fn default_actor_symbols() -> HashMap<char, SpawnKind> {
    HashMap::from([
        ('@', SpawnKind::Player),
        ('o', SpawnKind::Coin),
        ('=', SpawnKind::HorizontalFireball),
        ('|', SpawnKind::VerticalFireball),
        ('v', SpawnKind::FireRain),
    ])
}

/// The standard obstacle symbols: `x` wall, `!` lava.
pub fn default_obstacle_symbols() -> HashMap<char, Obstacle> {
    HashMap::from([('x', Obstacle::Wall), ('!', Obstacle::Lava)])
}

/// Turns rows of level text into a [`Level`].
///
/// Row index is the grid `y`, character index the grid `x`. Unknown
/// symbols are empty tiles and rows are never padded.
#[derive(Debug, Clone)]
pub struct LevelParser {
    actors: HashMap<char, SpawnFn>,
    obstacles: HashMap<char, Obstacle>,
}

impl Default for LevelParser {
    fn default() -> Self {
        Self::with_kinds(&default_actor_symbols(), default_obstacle_symbols())
    }
}

impl LevelParser {
    /// Parser with the given actor dictionary and the standard obstacles.
    pub fn new(actors: HashMap<char, SpawnFn>) -> Self {
        Self::with_symbols(actors, default_obstacle_symbols())
    }

    pub fn with_symbols(actors: HashMap<char, SpawnFn>, obstacles: HashMap<char, Obstacle>) -> Self {
        Self { actors, obstacles }
    }

    pub fn with_kinds(actors: &HashMap<char, SpawnKind>, obstacles: HashMap<char, Obstacle>) -> Self {
        let actors = actors
            .iter()
            .map(|(&symbol, kind)| (symbol, kind.spawn_fn()))
            .collect();
        Self::with_symbols(actors, obstacles)
    }

    /// Build a parser from string-keyed tables, as read from configuration.
    pub fn from_symbols(
        actors: &HashMap<String, String>,
        obstacles: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let actors = actors
            .iter()
            .map(|(symbol, kind)| -> Result<(char, SpawnKind), ContractError> {
                Ok((single_char(symbol)?, kind.parse()?))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        let obstacles = obstacles
            .iter()
            .map(|(symbol, tag)| -> Result<(char, Obstacle), ContractError> {
                Ok((single_char(symbol)?, tag.parse()?))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self::with_kinds(&actors, obstacles))
    }

    pub fn actor_from_symbol(&self, symbol: char) -> Option<SpawnFn> {
        self.actors.get(&symbol).copied()
    }

    pub fn obstacle_from_symbol(&self, symbol: char) -> Option<Obstacle> {
        self.obstacles.get(&symbol).copied()
    }

    /// Obstacle grid. Actor symbols leave their cell empty.
    pub fn create_grid<S: AsRef<str>>(&self, rows: &[S]) -> Grid {
        let rows = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .chars()
                    .map(|symbol| match self.actor_from_symbol(symbol) {
                        Some(_) => None,
                        None => self.obstacle_from_symbol(symbol),
                    })
                    .collect()
            })
            .collect();
        Grid::new(rows)
    }

    /// Actors in row-major order, each spawned at its cell coordinates.
    pub fn create_actors<S: AsRef<str>>(&self, rows: &[S], rng: &mut StdRng) -> Vec<Actor> {
        let mut actors = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.as_ref().chars().enumerate() {
                if let Some(spawn) = self.actor_from_symbol(symbol) {
                    actors.push(spawn(Vector::new(x as f64, y as f64), rng));
                }
            }
        }
        actors
    }

    /// Parse with coin phases drawn from an OS-seeded generator.
    pub fn parse<S: AsRef<str>>(&self, rows: &[S]) -> Level {
        self.parse_with_rng(rows, &mut StdRng::from_os_rng())
    }

    /// Parse with a caller-supplied generator for reproducible coin phases.
    pub fn parse_with_rng<S: AsRef<str>>(&self, rows: &[S], rng: &mut StdRng) -> Level {
        let level = Level::new(self.create_grid(rows), self.create_actors(rows, rng));
        tracing::debug!(
            width = level.width(),
            height = level.height(),
            actors = level.actors().len(),
            "parsed level"
        );
        level
    }
}

fn single_char(symbol: &str) -> Result<char, ContractError> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ContractError::SymbolNotChar(symbol.to_string())),
    }
}
