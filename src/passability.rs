use crate::entity::Entity;
use crate::grid::{Cell, MapPassability};
use crate::occupation::OccupationTracker;
use std::collections::HashSet;

/// Cells forced impassable for the duration of one planning request
#[derive(Debug, Default, Clone)]
pub struct Exclusion {
    cells: HashSet<Cell>,
}

impl Exclusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }
}

/// Answers "may this entity step on (x, y) right now"
///
/// Combines the static map, the request's exclusion set and every other
/// entity's occupation. Holds shared borrows only.
pub struct Passability<'a, M: MapPassability + ?Sized> {
    pub map: &'a M,
    pub occupation: &'a OccupationTracker,
    pub entity: Option<&'a Entity>,
    pub exclusion: &'a Exclusion,
}

impl<'a, M: MapPassability + ?Sized> Passability<'a, M> {
    pub fn new(
        map: &'a M,
        occupation: &'a OccupationTracker,
        entity: Option<&'a Entity>,
        exclusion: &'a Exclusion,
    ) -> Self {
        Passability {
            map,
            occupation,
            entity,
            exclusion,
        }
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        let cell = Cell::new(x, y);

        // The cell the entity stands exactly on never counts, so a request
        // always means real movement; mid-step it may head back to its anchor
        if let Some(entity) = self.entity {
            if entity.stands_on(cell) {
                return false;
            }
        }

        if self.exclusion.contains(&cell) {
            return false;
        }

        if !self.map.in_bounds(x, y) || !self.map.map_passable(x, y) {
            return false;
        }

        !self
            .occupation
            .is_occupied_by_other(cell, self.entity.map(|e| e.id))
    }
}
