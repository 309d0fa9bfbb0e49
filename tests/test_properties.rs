mod common;

use proptest::prelude::*;
use tilepath::{Cell, Grid, World};

const SIZE: i32 = 12;

fn build_grid(blocked: &[bool], free: Cell) -> Grid {
    let mut grid = Grid::new(SIZE, SIZE);
    for (i, &is_blocked) in blocked.iter().enumerate() {
        if is_blocked {
            grid.set_blocked(i as i32 % SIZE, i as i32 / SIZE, true);
        }
    }
    grid.set_blocked(free.x, free.y, false);
    grid
}

proptest! {
    #[test]
    fn planned_paths_are_walkable_and_repeatable(
        blocked in prop::collection::vec(proptest::bool::weighted(0.3), (SIZE * SIZE) as usize),
        sx in 0..SIZE,
        sy in 0..SIZE,
        tx in -2..SIZE + 2,
        ty in -2..SIZE + 2,
    ) {
        let start = Cell::new(sx, sy);
        let grid = build_grid(&blocked, start);

        let mut world = World::new(grid.clone());
        let a = world.spawn_movable(start).unwrap();
        let plan = world.plan(a, tx, ty);

        prop_assert!(plan.attempts <= 81, "took {} attempts", plan.attempts);
        common::assert_walkable(&grid, &plan.path, start);
        prop_assert!(!plan.path.contains(&start));

        if let Some(dest) = plan.path.first() {
            prop_assert!(dest.distance(&Cell::new(tx, ty)) <= 5.0);
            prop_assert_eq!(plan.target, Some(*dest));
        }

        let mut again = World::new(grid);
        let b = again.spawn_movable(start).unwrap();
        prop_assert_eq!(again.plan(b, tx, ty), plan);
    }

    #[test]
    fn self_cell_is_never_passable(x in 0..SIZE, y in 0..SIZE) {
        let mut world = World::new(Grid::new(SIZE, SIZE));
        let a = world.spawn_movable(Cell::new(x, y)).unwrap();
        prop_assert!(!world.is_passable(a, x, y));
    }

    #[test]
    fn arrival_snaps_without_overshoot(
        dx in -1..=1i32,
        dy in -1..=1i32,
        extra in 0.0f32..3.0,
    ) {
        prop_assume!(dx != 0 || dy != 0);

        let start = Cell::new(5, 5);
        let waypoint = Cell::new(5 + dx, 5 + dy);
        let mut world = World::new(Grid::new(SIZE, SIZE));
        let a = world.spawn_movable(start).unwrap();
        world.move_entity(a, waypoint.x, waypoint.y).unwrap();
        prop_assert_eq!(world.move_next(a), Some(waypoint));

        let speed = world.entity(a).unwrap().speed;
        let delta = start.distance(&waypoint) / speed + extra;
        world.tick(delta);

        let entity = world.entity(a).unwrap();
        prop_assert_eq!((entity.fpos_x, entity.fpos_y), waypoint.center());
    }
}
