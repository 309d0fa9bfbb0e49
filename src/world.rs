use crate::config::Config;
use crate::entity::{DrawBox, Entity, EntityClass, EntityDesc, EntityId};
use crate::grid::{Cell, Grid, MapPassability};
use crate::occupation::OccupationTracker;
use crate::passability::{Exclusion, Passability};
use crate::pathfinding::{PathPlanner, Plan};
use crate::place_finder::{self, DEFAULT_PLACE_RADIUS};
use crate::{TileError, TileResult};
use log::{debug, info, warn};

/// Default movement speed in grid units per second
pub const DEFAULT_SPEED: f32 = 2.0;

/// Owns the map, the entities and their occupation
///
/// Everything the planner needs is passed explicitly from here; there is no
/// process-wide state.
pub struct World<M: MapPassability = Grid> {
    pub(crate) map: M,
    /// Sorted by ID
    pub(crate) entities: Vec<Entity>,
    pub(crate) occupation: OccupationTracker,
    pub(crate) planner: PathPlanner,
    descs: Vec<EntityDesc>,
    selected: Vec<EntityId>,
    next_id: u32,
    speed: f32,
    default_draw_box: DrawBox,
}

impl World<Grid> {
    /// Build a world from configuration: map, speed, search radius, descriptions
    pub fn from_config(config: &Config) -> Self {
        let mut world = World::new(config.build_grid());
        world.speed = config.movement.speed;
        world.planner = PathPlanner::new(config.search.place_radius);
        world.default_draw_box = config.selection.default_draw_box;
        for desc in &config.entities {
            world.add_entity_desc(desc.clone());
        }
        world
    }
}

impl<M: MapPassability> World<M> {
    pub fn new(map: M) -> Self {
        World {
            map,
            entities: Vec::new(),
            occupation: OccupationTracker::new(),
            planner: PathPlanner::new(DEFAULT_PLACE_RADIUS),
            descs: Vec::new(),
            selected: Vec::new(),
            next_id: 0,
            speed: DEFAULT_SPEED,
            default_draw_box: DrawBox::default(),
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Mutable access to the static map (e.g. when a wall is built)
    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed used for entities spawned from now on
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn place_radius(&self) -> f32 {
        self.planner.radius()
    }

    /// Change how far around a target free cells are looked for
    pub fn set_place_radius(&mut self, radius: f32) -> TileResult<()> {
        place_finder::check_place_radius(radius, self.map.cols(), self.map.rows())?;
        self.planner = PathPlanner::new(radius);
        Ok(())
    }

    // ---- entity descriptions and spawning ----

    /// Register a description, replacing any with the same name
    pub fn add_entity_desc(&mut self, desc: EntityDesc) {
        match self.descs.iter_mut().find(|d| d.name == desc.name) {
            Some(existing) => *existing = desc,
            None => self.descs.push(desc),
        }
    }

    pub fn entity_desc(&self, name: &str) -> Option<&EntityDesc> {
        self.descs.iter().find(|d| d.name == name)
    }

    /// Spawn an entity from a registered description
    pub fn add_entity_by_name(&mut self, name: &str, cell: Cell) -> TileResult<EntityId> {
        let desc = self
            .entity_desc(name)
            .cloned()
            .ok_or_else(|| TileError::UnknownEntityDesc(name.to_string()))?;

        let id = EntityId(self.next_id);
        let (entity, occupation) = match desc.class {
            EntityClass::Movable => (
                Entity::movable(id, &desc.name, cell, self.speed, desc.draw_box),
                vec![cell],
            ),
            EntityClass::Stand => (
                Entity::stand(id, &desc.name, cell, desc.draw_box),
                footprint_cells(cell, &desc.occupation),
            ),
        };
        self.spawn(entity, occupation)
    }

    /// Spawn an undescribed movable entity on `cell`
    pub fn spawn_movable(&mut self, cell: Cell) -> TileResult<EntityId> {
        let entity = Entity::movable(
            EntityId(self.next_id),
            "movable",
            cell,
            self.speed,
            self.default_draw_box,
        );
        self.spawn(entity, vec![cell])
    }

    /// Spawn an undescribed stand entity covering `cell` plus `footprint` offsets
    pub fn spawn_stand(&mut self, cell: Cell, footprint: &[[i32; 2]]) -> TileResult<EntityId> {
        let entity = Entity::stand(EntityId(self.next_id), "stand", cell, self.default_draw_box);
        self.spawn(entity, footprint_cells(cell, footprint))
    }

    fn spawn(&mut self, entity: Entity, occupation: Vec<Cell>) -> TileResult<EntityId> {
        let cell = entity.cell();
        if !self.map.in_bounds(cell.x, cell.y) {
            return Err(TileError::OutOfBounds { x: cell.x, y: cell.y });
        }

        let id = entity.id;
        for c in &occupation {
            if self.occupation.is_occupied_by_other(*c, Some(id)) {
                warn!("entity {} spawned onto ({},{}) which is already occupied", id, c.x, c.y);
            }
        }

        info!("spawned {} \"{}\" at ({},{})", id, entity.name, cell.x, cell.y);
        self.next_id += 1;
        self.entities.push(entity);
        self.occupation.set_occupation(id, occupation);
        Ok(id)
    }

    // ---- queries ----

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|index| &self.entities[index])
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn movables(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_movable())
    }

    pub fn occupation(&self, id: EntityId) -> &[Cell] {
        self.occupation.occupation(id)
    }

    pub fn occupation_tracker(&self) -> &OccupationTracker {
        &self.occupation
    }

    /// Cells currently claimed by more than one entity
    pub fn occupation_overlaps(&self) -> Vec<(Cell, Vec<EntityId>)> {
        self.occupation.overlaps()
    }

    pub fn move_next(&self, id: EntityId) -> Option<Cell> {
        self.entity(id).map(|e| e.move_next())
    }

    pub fn move_end(&self, id: EntityId) -> Option<Cell> {
        self.entity(id).map(|e| e.move_end())
    }

    pub fn is_idle(&self, id: EntityId) -> bool {
        self.entity(id).map(|e| e.is_idle()).unwrap_or(true)
    }

    pub fn all_idle(&self) -> bool {
        self.entities.iter().all(|e| e.is_idle())
    }

    // ---- occupation ----

    /// Replace an entity's occupation set
    pub fn set_occupation(&mut self, id: EntityId, cells: Vec<Cell>) -> TileResult<()> {
        if self.index_of(id).is_none() {
            return Err(TileError::UnknownEntity(id));
        }
        self.occupation.set_occupation(id, cells);
        Ok(())
    }

    // ---- passability and planning ----

    /// Whether `id` may step on (x, y) right now (unknown IDs ask anonymously)
    pub fn is_passable(&self, id: EntityId, x: i32, y: i32) -> bool {
        let exclusion = Exclusion::new();
        let entity = self.entity(id);
        Passability::new(&self.map, &self.occupation, entity, &exclusion).is_passable(x, y)
    }

    /// Whether (x, y) is free for anybody
    pub fn is_cell_free(&self, x: i32, y: i32) -> bool {
        let exclusion = Exclusion::new();
        Passability::new(&self.map, &self.occupation, None, &exclusion).is_passable(x, y)
    }

    /// Nearest cell around (x, y) that `id` could stand on
    pub fn place_finder(&self, id: EntityId, x: i32, y: i32) -> Option<Cell> {
        let exclusion = Exclusion::new();
        let entity = self.entity(id);
        let oracle = Passability::new(&self.map, &self.occupation, entity, &exclusion);
        place_finder::place_finder(&oracle, x, y, self.planner.radius())
    }

    /// Full planning result for `id` towards (x, y)
    pub fn plan(&mut self, id: EntityId, x: i32, y: i32) -> Plan {
        let Some(index) = self.index_of(id) else {
            warn!("planning requested for unknown entity {}", id);
            return Plan::default();
        };

        let entity = &self.entities[index];
        if !entity.is_movable() {
            warn!("planning requested for stand entity {}", id);
            return Plan::default();
        }

        self.planner.plan(&self.map, &self.occupation, entity, x, y)
    }

    /// Path for `id` towards (x, y), destination first; empty when it cannot move
    pub fn find_path(&mut self, id: EntityId, x: i32, y: i32) -> Vec<Cell> {
        self.plan(id, x, y).path
    }

    // ---- commands ----

    /// Select every movable whose draw box overlaps the rectangle (ax, ay)-(bx, by)
    pub fn select_in_rect(&mut self, ax: f32, ay: f32, bx: f32, by: f32) -> &[EntityId] {
        self.selected = self
            .entities
            .iter()
            .filter(|e| e.is_movable() && e.overlaps_rect(ax, ay, bx, by))
            .map(|e| e.id)
            .collect();
        debug!("selected {:?}", self.selected);
        &self.selected
    }

    /// Replace the selection with explicit IDs (unknown and stand entities dropped)
    pub fn select(&mut self, ids: &[EntityId]) -> &[EntityId] {
        let selected: Vec<EntityId> = ids
            .iter()
            .copied()
            .filter(|&id| self.entity(id).map(|e| e.is_movable()).unwrap_or(false))
            .collect();
        self.selected = selected;
        &self.selected
    }

    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    /// Send every selected entity towards (x, y)
    pub fn move_selection(&mut self, x: i32, y: i32) {
        info!("move selection ({} entities) to ({},{})", self.selected.len(), x, y);
        let selected = self.selected.clone();
        for id in selected {
            if let Some(index) = self.index_of(id) {
                self.command_move(index, x, y);
            }
        }
    }

    /// Send one entity towards (x, y)
    pub fn move_entity(&mut self, id: EntityId, x: i32, y: i32) -> TileResult<()> {
        let index = self.index_of(id).ok_or(TileError::UnknownEntity(id))?;
        self.command_move(index, x, y);
        Ok(())
    }

    /// Plan, install the path and reserve {current cell, next waypoint}
    fn command_move(&mut self, index: usize, x: i32, y: i32) {
        let id = self.entities[index].id;
        let path = self.find_path(id, x, y);

        let Some(motion) = self.entities[index].motion.as_mut() else {
            return;
        };
        motion.set_move_path(path);

        let mut cells = vec![motion.anchor];
        if motion.next != motion.anchor {
            cells.push(motion.next);
        }
        debug!("entity {} occupation {:?}", id, cells);
        self.occupation.set_occupation(id, cells);
    }
}

/// Cells covered by a footprint anchored at `cell`; an empty footprint covers `cell`
fn footprint_cells(cell: Cell, footprint: &[[i32; 2]]) -> Vec<Cell> {
    if footprint.is_empty() {
        return vec![cell];
    }
    footprint
        .iter()
        .map(|[dx, dy]| Cell::new(cell.x + dx, cell.y + dy))
        .collect()
}
