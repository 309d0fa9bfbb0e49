use serde::{Deserialize, Serialize};

/// A discrete cell on the planning grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Cell containing a continuous position (cell centers sit on integer coordinates)
    pub fn from_position(fpos_x: f32, fpos_y: f32) -> Self {
        Cell::new(fpos_x.round() as i32, fpos_y.round() as i32)
    }

    /// Calculate Euclidean distance squared (avoid sqrt for performance)
    pub fn distance_squared(&self, other: &Cell) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Calculate Euclidean distance
    pub fn distance(&self, other: &Cell) -> f32 {
        (self.distance_squared(other) as f32).sqrt()
    }

    /// True when the two cells touch diagonally
    pub fn is_diagonal_to(&self, other: &Cell) -> bool {
        (self.x - other.x).abs() == 1 && (self.y - other.y).abs() == 1
    }

    /// Continuous coordinates of the cell center
    pub fn center(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

/// Static passability of the map, owned by whoever loads it
pub trait MapPassability {
    /// Grid width in cells
    fn cols(&self) -> i32;

    /// Grid height in cells
    fn rows(&self) -> i32;

    /// Whether the map itself lets anything stand on (x, y)
    fn map_passable(&self, x: i32, y: i32) -> bool;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.cols() && y >= 0 && y < self.rows()
    }
}

/// Static map: a row-major field of blocked flags
#[derive(Clone, Debug)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    blocked: Vec<bool>,
}

impl Grid {
    /// Create a `cols` x `rows` grid with every cell free
    pub fn new(rows: i32, cols: i32) -> Self {
        Grid {
            rows,
            cols,
            blocked: vec![false; (rows.max(0) * cols.max(0)) as usize],
        }
    }

    /// Create a grid with specific blocked cells
    pub fn with_blocked(rows: i32, cols: i32, blocked: &[Cell]) -> Self {
        let mut grid = Self::new(rows, cols);
        for cell in blocked {
            grid.set_blocked(cell.x, cell.y, true);
        }
        grid
    }

    /// Parse a grid from text rows: '#' is blocked, anything else is free
    pub fn from_ascii(text: &str) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        let rows = lines.len() as i32;
        let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;

        let mut grid = Self::new(rows, cols);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                grid.set_blocked(x as i32, y as i32, ch == '#');
            }
        }
        grid
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y).then(|| (x + y * self.cols) as usize)
    }

    /// Out-of-bounds cells count as blocked
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(true, |i| self.blocked[i])
    }

    /// Block or free (x, y); ignored outside the grid
    pub fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(i) = self.index(x, y) {
            self.blocked[i] = blocked;
        }
    }
}

impl MapPassability for Grid {
    fn cols(&self) -> i32 {
        self.cols
    }

    fn rows(&self) -> i32 {
        self.rows
    }

    fn map_passable(&self, x: i32, y: i32) -> bool {
        !self.is_blocked(x, y)
    }
}
