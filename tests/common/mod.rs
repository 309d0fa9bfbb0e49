#![allow(dead_code)]

use std::collections::HashMap;
use tilepath::{Cell, Grid, MapPassability};

/// Parse a test layout
/// Format:
/// - '#': blocked cell
/// - '.': free cell
/// - any letter: free cell with a marker (returned by position)
pub fn parse_layout(layout: &str) -> (Grid, HashMap<char, Vec<Cell>>) {
    let lines: Vec<&str> = layout
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    let rows = lines.len() as i32;
    let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;

    let mut grid = Grid::new(rows, cols);
    let mut markers: HashMap<char, Vec<Cell>> = HashMap::new();

    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            match ch {
                '#' => grid.set_blocked(x as i32, y as i32, true),
                '.' => {}
                c => markers.entry(c).or_default().push(Cell::new(x as i32, y as i32)),
            }
        }
    }

    (grid, markers)
}

/// Visualize a path on a grid
pub fn visualize_path(grid: &Grid, path: &[Cell], start: Cell) -> String {
    let mut result = String::new();
    result.push_str(&format!("\nPath: {}\n", tilepath::format_path(path)));
    result.push_str(&format!(
        "Length: {} steps, Cost: {:.2}\n\n",
        path.len(),
        path_cost(path, start)
    ));

    let dest = path.first().copied();
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let cell = Cell::new(x, y);
            let symbol = if cell == start {
                'S' // Start
            } else if Some(cell) == dest {
                'D' // Destination
            } else if path.contains(&cell) {
                '*' // Path
            } else if grid.is_blocked(x, y) {
                '█' // Blocked
            } else {
                '.' // Free
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}

/// Total Euclidean cost walking from `start` along a destination-first path
pub fn path_cost(path: &[Cell], start: Cell) -> f32 {
    let mut total = 0.0;
    let mut previous = start;
    for cell in path.iter().rev() {
        total += previous.distance(cell);
        previous = *cell;
    }
    total
}

/// Check that every step is to a neighbor and no diagonal clips a blocked corner
pub fn assert_walkable(grid: &Grid, path: &[Cell], start: Cell) {
    let mut previous = start;
    for cell in path.iter().rev() {
        let dx = (cell.x - previous.x).abs();
        let dy = (cell.y - previous.y).abs();
        assert!(dx <= 1 && dy <= 1 && (dx + dy) > 0, "non-adjacent step {:?} -> {:?}", previous, cell);
        assert!(grid.map_passable(cell.x, cell.y), "step into blocked {:?}", cell);

        if previous.is_diagonal_to(cell) {
            assert!(
                grid.map_passable(previous.x, cell.y) && grid.map_passable(cell.x, previous.y),
                "diagonal {:?} -> {:?} cuts a corner",
                previous,
                cell
            );
        }
        previous = *cell;
    }
}
