use crate::entity::Step;
use crate::grid::{Cell, MapPassability};
use crate::world::World;
use log::debug;

impl<M: MapPassability> World<M> {
    /// Advance every movable entity by `delta_time` seconds
    ///
    /// Entities are processed in ID order and each one finishes its arrival
    /// handling (re-planning, occupation) before the next is moved.
    pub fn tick(&mut self, delta_time: f32) {
        for index in 0..self.entities.len() {
            if let Step::Arrived(cell) = self.entities[index].update(delta_time) {
                self.arrive(index, cell);
            }
        }
    }

    /// Tick until every entity is idle; returns the number of ticks run
    pub fn run_until_idle(&mut self, delta_time: f32, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.all_idle() {
            self.tick(delta_time);
            ticks += 1;
        }
        ticks
    }

    /// Handle an entity snapping onto a waypoint
    fn arrive(&mut self, index: usize, cell: Cell) {
        let id = self.entities[index].id;
        let final_cell = self.entities[index].move_end();

        if final_cell == cell {
            if let Some(motion) = self.entities[index].motion.as_mut() {
                motion.clear_path();
            }
            debug!("entity {} arrived at ({},{})", id, cell.x, cell.y);
            self.occupation.set_occupation(id, vec![cell]);
            return;
        }

        // Not there yet: plan again from here, the world may have changed
        let path = self.find_path(id, final_cell.x, final_cell.y);
        let Some(motion) = self.entities[index].motion.as_mut() else {
            return;
        };
        motion.set_move_path(path);

        let mut cells = vec![cell];
        if motion.next != cell {
            cells.push(motion.next);
        }
        debug!(
            "entity {} at ({},{}) heading for ({},{}), occupation {:?}",
            id, cell.x, cell.y, final_cell.x, final_cell.y, cells
        );
        self.occupation.set_occupation(id, cells);
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{Cell, Grid};
    use crate::world::World;

    #[test]
    fn test_tick_without_paths_is_noop() {
        let mut world = World::new(Grid::new(10, 10));
        let a = world.spawn_movable(Cell::new(2, 2)).unwrap();
        world.tick(0.5);
        let entity = world.entity(a).unwrap();
        assert_eq!((entity.fpos_x, entity.fpos_y), (2.0, 2.0));
        assert_eq!(world.occupation(a), &[Cell::new(2, 2)]);
    }

    #[test]
    fn test_walks_to_destination_and_releases_trail() {
        let mut world = World::new(Grid::new(10, 10));
        let a = world.spawn_movable(Cell::new(1, 1)).unwrap();
        world.move_entity(a, 4, 1).unwrap();

        let ticks = world.run_until_idle(0.1, 1000);
        assert!(ticks < 1000);

        let entity = world.entity(a).unwrap();
        assert_eq!((entity.fpos_x, entity.fpos_y), (4.0, 1.0));
        assert_eq!(world.occupation(a), &[Cell::new(4, 1)]);
        assert!(world.is_idle(a));
    }

    #[test]
    fn test_intermediate_arrival_reserves_next_cell() {
        let mut world = World::new(Grid::new(10, 10));
        let a = world.spawn_movable(Cell::new(1, 1)).unwrap();
        world.move_entity(a, 4, 1).unwrap();

        // One full step at 2 cells/s
        world.tick(0.5);
        assert_eq!(world.entity(a).unwrap().cell(), Cell::new(2, 1));
        assert_eq!(world.occupation(a), &[Cell::new(2, 1), Cell::new(3, 1)]);
    }
}
