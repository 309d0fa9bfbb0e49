use crate::entity::EntityId;
use crate::grid::Cell;
use log::trace;
use std::collections::HashMap;

/// Occupation manager
///
/// Holds the cells every entity currently reserves. Sets are only ever replaced
/// wholesale; two entities may briefly share a cell during the tick a step completes.
#[derive(Debug, Default, Clone)]
pub struct OccupationTracker {
    /// Map from entity ID to the cells it reserves, in the order they were given
    by_entity: HashMap<EntityId, Vec<Cell>>,
    /// Map from cell to every entity reserving it
    by_cell: HashMap<Cell, Vec<EntityId>>,
}

impl OccupationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an entity's occupation set
    pub fn set_occupation(&mut self, entity: EntityId, cells: Vec<Cell>) {
        self.clear_index(entity);

        let mut unique: Vec<Cell> = Vec::with_capacity(cells.len());
        for cell in cells {
            if !unique.contains(&cell) {
                unique.push(cell);
            }
        }

        for cell in &unique {
            self.by_cell.entry(*cell).or_default().push(entity);
        }
        trace!("occupation {:?} -> {:?}", entity, unique);
        self.by_entity.insert(entity, unique);
    }

    /// Drop every reservation held by an entity
    pub fn remove(&mut self, entity: EntityId) {
        self.clear_index(entity);
        self.by_entity.remove(&entity);
    }

    fn clear_index(&mut self, entity: EntityId) {
        if let Some(old) = self.by_entity.get(&entity) {
            for cell in old {
                if let Some(owners) = self.by_cell.get_mut(cell) {
                    owners.retain(|&owner| owner != entity);
                    if owners.is_empty() {
                        self.by_cell.remove(cell);
                    }
                }
            }
        }
    }

    /// Cells reserved by an entity (empty if it has none)
    pub fn occupation(&self, entity: EntityId) -> &[Cell] {
        self.by_entity
            .get(&entity)
            .map(|cells| cells.as_slice())
            .unwrap_or(&[])
    }

    /// Entities reserving a cell
    pub fn owners(&self, cell: Cell) -> &[EntityId] {
        self.by_cell
            .get(&cell)
            .map(|owners| owners.as_slice())
            .unwrap_or(&[])
    }

    /// Check whether anyone other than `entity` reserves the cell
    pub fn is_occupied_by_other(&self, cell: Cell, entity: Option<EntityId>) -> bool {
        self.owners(cell).iter().any(|&owner| Some(owner) != entity)
    }

    /// Cells claimed by more than one entity, sorted for stable output
    pub fn overlaps(&self) -> Vec<(Cell, Vec<EntityId>)> {
        let mut shared: Vec<(Cell, Vec<EntityId>)> = self
            .by_cell
            .iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(cell, owners)| {
                let mut owners = owners.clone();
                owners.sort();
                (*cell, owners)
            })
            .collect();
        shared.sort();
        shared
    }
}
