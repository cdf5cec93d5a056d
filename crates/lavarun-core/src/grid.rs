use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::vector::Vector;

/// Static tile tags that change actor physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Obstacle {
    Wall,
    Lava,
}

impl Obstacle {
    pub fn as_str(self) -> &'static str {
        match self {
            Obstacle::Wall => "wall",
            Obstacle::Lava => "lava",
        }
    }
}

impl std::fmt::Display for Obstacle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Obstacle {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wall" => Ok(Obstacle::Wall),
            "lava" => Ok(Obstacle::Lava),
            other => Err(ContractError::UnknownObstacle(other.to_string())),
        }
    }
}

/// Anything that can answer "what blocks this box?".
pub trait ObstacleMap {
    /// Obstacle occupying the box at `pos` with extent `size`, if any.
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Option<Obstacle>;
}

/// Sparse tile grid. Rows may differ in length; missing cells are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<Option<Obstacle>>>", into = "Vec<Vec<Option<Obstacle>>>")]
pub struct Grid {
    rows: Vec<Vec<Option<Obstacle>>>,
    /// Longest row, computed once.
    width: usize,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Option<Obstacle>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Empty grid with `height` rows of `width` cells.
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(vec![vec![None; width]; height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Option<Obstacle>>] {
        &self.rows
    }

    /// Tile at integer cell coordinates. Out-of-range cells are empty.
    pub fn get(&self, x: i64, y: i64) -> Option<Obstacle> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .flatten()
    }
}

impl From<Vec<Vec<Option<Obstacle>>>> for Grid {
    fn from(rows: Vec<Vec<Option<Obstacle>>>) -> Self {
        Self::new(rows)
    }
}

impl From<Grid> for Vec<Vec<Option<Obstacle>>> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}

impl ObstacleMap for Grid {
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Option<Obstacle> {
        let far = pos + size;
        // Sizes may be negative, so the extents are sorted per axis.
        let (min_x, max_x) = (pos.x.min(far.x), pos.x.max(far.x));
        let (min_y, max_y) = (pos.y.min(far.y), pos.y.max(far.y));

        if !pos.is_finite() || !far.is_finite() {
            return Some(Obstacle::Wall);
        }
        if max_x > self.width as f64 || min_x < 0.0 || min_y < 0.0 {
            return Some(Obstacle::Wall);
        }
        if max_y > self.height() as f64 {
            return Some(Obstacle::Lava);
        }

        let (x_start, x_end) = (min_x.floor() as i64, max_x.floor() as i64);
        let (y_start, y_end) = (min_y.floor() as i64, max_y.floor() as i64);
        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let Some(tile) = self.get(x, y) else {
                    continue;
                };
                // A wall the box only grazes along its far edge does not block.
                let grazed = x as f64 == max_x || y as f64 == max_y;
                if tile == Obstacle::Wall && grazed {
                    continue;
                }
                return Some(tile);
            }
        }
        None
    }
}
