use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for an entity owned by a [`crate::World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether an entity walks around or just stands on its footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Movable,
    Stand,
}

/// Selection box around an entity, as offsets from its position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for DrawBox {
    fn default() -> Self {
        DrawBox {
            left: -0.5,
            top: -0.5,
            right: 0.5,
            bottom: 0.5,
        }
    }
}

/// Template an entity can be spawned from by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDesc {
    pub name: String,
    pub class: EntityClass,
    /// Footprint offsets from the spawn cell (stand entities only)
    #[serde(default)]
    pub occupation: Vec<[i32; 2]>,
    #[serde(default)]
    pub draw_box: DrawBox,
}

/// Movement state of a movable entity
///
/// `path` is stored destination-first: the waypoint after `next` is its last
/// element and the final destination is its first.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    /// Last cell the entity fully arrived at
    pub anchor: Cell,
    /// Waypoint the entity is heading to (equals `anchor` when idle)
    pub next: Cell,
    /// Remaining waypoints after `next`
    pub path: Vec<Cell>,
}

impl Motion {
    pub fn new(cell: Cell) -> Self {
        Motion {
            anchor: cell,
            next: cell,
            path: Vec::new(),
        }
    }

    /// Final destination of the current movement
    pub fn move_end(&self) -> Cell {
        self.path.first().copied().unwrap_or(self.next)
    }

    pub fn in_transit(&self) -> bool {
        self.next != self.anchor
    }

    /// Install a planned path (destination-first)
    ///
    /// A step already in progress is finished first; an idle entity starts
    /// heading to the nearest waypoint straight away.
    pub fn set_move_path(&mut self, path: Vec<Cell>) {
        self.path = path;
        if !self.in_transit() {
            if let Some(next) = self.path.pop() {
                self.next = next;
            }
        }
    }

    /// Forget the remaining waypoints and stop at the current one
    pub fn clear_path(&mut self) {
        self.path.clear();
    }
}

/// Result of advancing an entity for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Nothing to do
    Idle,
    /// Still on the way to the current waypoint
    Moving,
    /// Snapped onto this waypoint during the tick
    Arrived(Cell),
}

/// Entity represents an actor on the grid with precise floating-point positioning
#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub class: EntityClass,

    /// Floating-point position (cell centers are integral)
    pub fpos_x: f32,
    pub fpos_y: f32,

    /// Speed in grid units per second
    pub speed: f32,

    pub draw_box: DrawBox,

    /// Movement state (None for stand entities)
    pub motion: Option<Motion>,
}

impl Entity {
    /// Create a new movable entity standing on `cell`
    pub fn movable(id: EntityId, name: &str, cell: Cell, speed: f32, draw_box: DrawBox) -> Self {
        let (fpos_x, fpos_y) = cell.center();
        Entity {
            id,
            name: name.to_string(),
            class: EntityClass::Movable,
            fpos_x,
            fpos_y,
            speed,
            draw_box,
            motion: Some(Motion::new(cell)),
        }
    }

    /// Create a new stand entity anchored at `cell`
    pub fn stand(id: EntityId, name: &str, cell: Cell, draw_box: DrawBox) -> Self {
        let (fpos_x, fpos_y) = cell.center();
        Entity {
            id,
            name: name.to_string(),
            class: EntityClass::Stand,
            fpos_x,
            fpos_y,
            speed: 0.0,
            draw_box,
            motion: None,
        }
    }

    pub fn is_movable(&self) -> bool {
        self.motion.is_some()
    }

    /// Discrete cell the entity currently stands in
    pub fn cell(&self) -> Cell {
        Cell::from_position(self.fpos_x, self.fpos_y)
    }

    /// True when the entity sits exactly on the center of `cell`
    pub fn stands_on(&self, cell: Cell) -> bool {
        (self.fpos_x, self.fpos_y) == cell.center()
    }

    /// Waypoint the entity is heading to, or its own cell when it has none
    pub fn move_next(&self) -> Cell {
        self.motion.as_ref().map(|m| m.next).unwrap_or_else(|| self.cell())
    }

    /// Final destination, or its own cell when it has none
    pub fn move_end(&self) -> Cell {
        self.motion
            .as_ref()
            .map(|m| m.move_end())
            .unwrap_or_else(|| self.cell())
    }

    pub fn is_idle(&self) -> bool {
        match &self.motion {
            Some(motion) => !motion.in_transit() && motion.path.is_empty(),
            None => true,
        }
    }

    /// Check whether the draw box overlaps the rectangle spanned by two corners
    pub fn overlaps_rect(&self, ax: f32, ay: f32, bx: f32, by: f32) -> bool {
        let lhs_left = ax.min(bx);
        let lhs_right = ax.max(bx);
        let lhs_top = ay.min(by);
        let lhs_bottom = ay.max(by);

        let rhs_left = self.fpos_x + self.draw_box.left;
        let rhs_right = self.fpos_x + self.draw_box.right;
        let rhs_top = self.fpos_y + self.draw_box.top;
        let rhs_bottom = self.fpos_y + self.draw_box.bottom;

        rhs_left < lhs_right && rhs_right > lhs_left && rhs_top < lhs_bottom && rhs_bottom > lhs_top
    }

    /// Move the entity towards its current waypoint (call once per frame)
    pub fn update(&mut self, delta_time: f32) -> Step {
        let Some(motion) = self.motion.as_mut() else {
            return Step::Idle;
        };

        let (dest_x, dest_y) = motion.next.center();

        // Calculate direction vector
        let dx = dest_x - self.fpos_x;
        let dy = dest_y - self.fpos_y;

        // Calculate distance
        let distance = (dx * dx + dy * dy).sqrt();
        if distance == 0.0 {
            return Step::Idle;
        }

        // Snap when the waypoint is within this frame's reach
        let movement_this_frame = self.speed * delta_time;
        if distance <= movement_this_frame {
            self.fpos_x = dest_x;
            self.fpos_y = dest_y;
            motion.anchor = motion.next;
            return Step::Arrived(motion.next);
        }

        // Normalize direction and move
        let dir_x = dx / distance;
        let dir_y = dy / distance;

        self.fpos_x += dir_x * movement_this_frame;
        self.fpos_y += dir_y * movement_this_frame;

        Step::Moving
    }
}
