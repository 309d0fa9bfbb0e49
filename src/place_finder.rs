use crate::grid::{Cell, MapPassability};
use crate::passability::Passability;
use crate::{TileError, TileResult};
use log::trace;
use std::collections::HashSet;

/// Default search radius around a requested target, in cells
pub const DEFAULT_PLACE_RADIUS: f32 = 5.0;

/// Find the nearest passable cell to (x, y)
///
/// Breadth-first over the 4-neighborhood in the order down, left, right, up.
/// Candidates further than `radius` from (x, y) are neither accepted nor expanded.
pub fn place_finder<M: MapPassability + ?Sized>(
    oracle: &Passability<'_, M>,
    x: i32,
    y: i32,
    radius: f32,
) -> Option<Cell> {
    let origin = Cell::new(x, y);
    let mut searched: HashSet<Cell> = HashSet::new();
    let mut neighbors: Vec<Cell> = vec![origin];

    let mut i = 0;
    while i < neighbors.len() {
        let candidate = neighbors[i];
        i += 1;

        if !searched.insert(candidate) {
            continue;
        }

        if candidate.distance(&origin) > radius {
            continue;
        }

        if oracle.is_passable(candidate.x, candidate.y) {
            trace!("place_finder ({},{}) -> ({},{})", x, y, candidate.x, candidate.y);
            return Some(candidate);
        }

        // Requests may come from anywhere in the i32 range; drop steps past its edge
        let (cx, cy) = (candidate.x, candidate.y);
        let around = [
            cy.checked_sub(1).map(|ny| Cell::new(cx, ny)),
            cx.checked_sub(1).map(|nx| Cell::new(nx, cy)),
            cx.checked_add(1).map(|nx| Cell::new(nx, cy)),
            cy.checked_add(1).map(|ny| Cell::new(cx, ny)),
        ];
        neighbors.extend(around.into_iter().flatten());
    }

    trace!("place_finder ({},{}) found nothing within {}", x, y, radius);
    None
}

/// Largest search radius worth configuring for a `cols` x `rows` map
///
/// Beyond the map diagonal every in-bounds cell is already reachable; the
/// default radius is always accepted so tiny maps keep working.
pub fn max_place_radius(cols: i32, rows: i32) -> f32 {
    (cols.max(0) as f32).hypot(rows.max(0) as f32).max(DEFAULT_PLACE_RADIUS)
}

/// Reject radii that are negative, not a number or larger than the map needs
pub fn check_place_radius(radius: f32, cols: i32, rows: i32) -> TileResult<()> {
    let max = max_place_radius(cols, rows);
    if radius >= 0.0 && radius <= max {
        Ok(())
    } else {
        Err(TileError::InvalidConfig(format!(
            "place radius must be within 0..={}, got {}",
            max, radius
        )))
    }
}

/// Number of cells within `radius` of any cell (the most targets a search can try)
pub fn cells_within_radius(radius: f32) -> usize {
    if radius < 0.0 {
        return 0;
    }
    let r = radius.floor() as i32;
    let limit = radius * radius;
    let mut count = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= limit {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DrawBox, Entity, EntityId};
    use crate::grid::Grid;
    use crate::occupation::OccupationTracker;
    use crate::passability::Exclusion;

    #[test]
    fn test_free_target_is_returned_as_is() {
        let grid = Grid::new(20, 20);
        let occupation = OccupationTracker::new();
        let exclusion = Exclusion::new();
        let oracle = Passability::new(&grid, &occupation, None, &exclusion);

        assert_eq!(place_finder(&oracle, 7, 9, 5.0), Some(Cell::new(7, 9)));
    }

    #[test]
    fn test_down_is_tried_first() {
        let grid = Grid::with_blocked(20, 20, &[Cell::new(5, 5)]);
        let occupation = OccupationTracker::new();
        let exclusion = Exclusion::new();
        let oracle = Passability::new(&grid, &occupation, None, &exclusion);

        assert_eq!(place_finder(&oracle, 5, 5, 5.0), Some(Cell::new(5, 4)));
    }

    #[test]
    fn test_self_cell_is_skipped() {
        let grid = Grid::new(20, 20);
        let occupation = OccupationTracker::new();
        let exclusion = Exclusion::new();
        let entity = Entity::movable(EntityId(0), "a", Cell::new(3, 3), 2.0, DrawBox::default());
        let oracle = Passability::new(&grid, &occupation, Some(&entity), &exclusion);

        assert_eq!(place_finder(&oracle, 3, 3, 5.0), Some(Cell::new(3, 2)));
    }

    #[test]
    fn test_radius_exhausted_is_none() {
        // Everything blocked except a cell six columns away
        let mut grid = Grid::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                grid.set_blocked(x, y, true);
            }
        }
        grid.set_blocked(16, 10, false);

        let occupation = OccupationTracker::new();
        let exclusion = Exclusion::new();
        let oracle = Passability::new(&grid, &occupation, None, &exclusion);

        assert_eq!(place_finder(&oracle, 10, 10, 5.0), None);
        assert_eq!(place_finder(&oracle, 10, 10, 6.0), Some(Cell::new(16, 10)));
    }

    #[test]
    fn test_targets_at_i32_limits() {
        let grid = Grid::new(20, 20);
        let occupation = OccupationTracker::new();
        let exclusion = Exclusion::new();
        let oracle = Passability::new(&grid, &occupation, None, &exclusion);

        assert_eq!(place_finder(&oracle, i32::MAX, 0, 5.0), None);
        assert_eq!(place_finder(&oracle, i32::MIN, i32::MIN, 5.0), None);
        assert_eq!(place_finder(&oracle, 3, i32::MAX, 5.0), None);
    }

    #[test]
    fn test_max_place_radius() {
        assert!((max_place_radius(30, 40) - 50.0).abs() < 1e-4);
        assert_eq!(max_place_radius(1, 1), DEFAULT_PLACE_RADIUS);
    }

    #[test]
    fn test_cells_within_radius() {
        assert_eq!(cells_within_radius(0.0), 1);
        assert_eq!(cells_within_radius(1.0), 5);
        assert_eq!(cells_within_radius(1.5), 9);
        assert_eq!(cells_within_radius(5.0), 81);
    }
}
