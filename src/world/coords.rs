//! Coordinates and grid utilities
//!
//! Points are shared between floor-local and dungeon-global space; grids
//! are column-major (`grid[x][y]`) sparse arrays.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point
    pub fn manhattan(&self, other: &Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Straight-line distance to another point
    pub fn euclidean(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// The four orthogonal neighbours (east, west, south, north)
    pub fn neighbors4(&self) -> [Point; 4] {
        [
            Point::new(self.x + 1, self.y),
            Point::new(self.x - 1, self.y),
            Point::new(self.x, self.y + 1),
            Point::new(self.x, self.y - 1),
        ]
    }

    /// Grid indices, if both components are non-negative
    pub fn as_index(&self) -> Option<(usize, usize)> {
        if self.x < 0 || self.y < 0 {
            None
        } else {
            Some((self.x as usize, self.y as usize))
        }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive `[min, max]` range for randomized quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Uniform sample; a reversed range yields `min`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Sparse column-major grid
pub type Grid<T> = Vec<Vec<Option<T>>>;

/// Width and height of a grid
pub fn grid_dims<T>(grid: &Grid<T>) -> (usize, usize) {
    let width = grid.len();
    let height = grid.first().map_or(0, |column| column.len());
    (width, height)
}

/// Grow a grid to at least `width` x `height`, keeping every existing cell
/// at its coordinates. Grids are never shrunk.
pub fn resize_grid<T>(mut grid: Grid<T>, width: usize, height: usize) -> Grid<T> {
    let (old_width, old_height) = grid_dims(&grid);
    let width = width.max(old_width);
    let height = height.max(old_height);
    if width == old_width && height == old_height {
        return grid;
    }

    for column in &mut grid {
        column.resize_with(height, || None);
    }
    grid.resize_with(width, || {
        let mut column = Vec::with_capacity(height);
        column.resize_with(height, || None);
        column
    });
    grid
}
