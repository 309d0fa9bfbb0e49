use crate::entity::Entity;
use crate::grid::{Cell, MapPassability};
use crate::occupation::OccupationTracker;
use crate::passability::{Exclusion, Passability};
use crate::place_finder::{cells_within_radius, place_finder, DEFAULT_PLACE_RADIUS};
use log::{debug, trace, warn};

/// Number of expansions traced in detail per search
const TRACE_EXPANSIONS: usize = 10;

/// A node in the pathfinding search
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g: f32,
    h: f32,
    f: f32,
    opened: bool,
    closed: bool,
    parent: Option<usize>,
    /// Search generation this node was last reset for
    stamp: u32,
}

impl SearchNode {
    fn fresh(stamp: u32) -> Self {
        SearchNode {
            g: 0.0,
            h: 0.0,
            f: 0.0,
            opened: false,
            closed: false,
            parent: None,
            stamp,
        }
    }
}

/// Dense node grid indexed by (x, y), reused across searches
///
/// Nodes are lazily reset through a generation stamp instead of clearing the
/// whole grid before every search.
#[derive(Debug, Default)]
pub struct SearchArena {
    cols: i32,
    rows: i32,
    nodes: Vec<SearchNode>,
    stamp: u32,
}

impl SearchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a new search over a `cols` x `rows` grid
    fn begin(&mut self, cols: i32, rows: i32) {
        if cols != self.cols || rows != self.rows {
            self.cols = cols;
            self.rows = rows;
            self.nodes = vec![SearchNode::fresh(0); (cols.max(0) * rows.max(0)) as usize];
            self.stamp = 0;
        }

        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            for node in &mut self.nodes {
                *node = SearchNode::fresh(0);
            }
            self.stamp = 1;
        }
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.x + cell.y * self.cols) as usize
    }

    fn cell(&self, index: usize) -> Cell {
        let id = index as i32;
        Cell::new(id % self.cols, id / self.cols)
    }

    fn node(&self, index: usize) -> SearchNode {
        let node = self.nodes[index];
        if node.stamp == self.stamp {
            node
        } else {
            SearchNode::fresh(self.stamp)
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut SearchNode {
        let stamp = self.stamp;
        let node = &mut self.nodes[index];
        if node.stamp != stamp {
            *node = SearchNode::fresh(stamp);
        }
        node
    }

    /// Walk parents from `goal` back to the start; the start itself is left out
    fn reconstruct(&self, goal: usize) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut current = goal;
        while let Some(parent) = self.node(current).parent {
            path.push(self.cell(current));
            current = parent;
        }
        path
    }
}

/// Outcome of one A* run towards an already resolved target
#[derive(Debug, Clone, PartialEq)]
enum Search {
    Found(Vec<Cell>),
    /// Open list ran dry after expanding more than the start
    Exhausted,
    /// The start had no enterable neighbor at all
    Boxed,
}

/// Result of a full planning request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    /// Destination first, next waypoint last
    pub path: Vec<Cell>,
    /// Free cell the path leads to, if one was found
    pub target: Option<Cell>,
    /// Number of resolve-and-search rounds it took
    pub attempts: usize,
}

impl Plan {
    fn empty(attempts: usize) -> Self {
        Plan {
            path: Vec::new(),
            target: None,
            attempts,
        }
    }
}

/// Grid A* planner with a pooled node arena
#[derive(Debug)]
pub struct PathPlanner {
    arena: SearchArena,
    radius: f32,
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_PLACE_RADIUS)
    }
}

impl PathPlanner {
    pub fn new(radius: f32) -> Self {
        PathPlanner {
            arena: SearchArena::new(),
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Most resolve-and-search rounds a single request may take
    pub fn max_attempts(&self) -> usize {
        cells_within_radius(self.radius).max(1)
    }

    /// Plan a path for `entity` towards (target_x, target_y)
    ///
    /// The target is first resolved to the nearest free cell. When A* cannot
    /// connect to it, that cell is excluded and the request retried, up to
    /// [`Self::max_attempts`] rounds. Every failure yields an empty path.
    pub fn plan<M: MapPassability + ?Sized>(
        &mut self,
        map: &M,
        occupation: &OccupationTracker,
        entity: &Entity,
        target_x: i32,
        target_y: i32,
    ) -> Plan {
        let start = entity.move_next();
        if !map.in_bounds(start.x, start.y) {
            warn!("entity {} starts outside the grid at ({},{})", entity.id, start.x, start.y);
            return Plan::empty(0);
        }

        let max_attempts = self.max_attempts();
        let mut exclusion = Exclusion::new();
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            let oracle = Passability::new(map, occupation, Some(entity), &exclusion);

            let Some(resolved) = place_finder(&oracle, target_x, target_y, self.radius) else {
                debug!(
                    "entity {}: no free cell near ({},{}) after {} attempt(s)",
                    entity.id, target_x, target_y, attempts
                );
                return Plan::empty(attempts);
            };

            if resolved == start {
                return Plan::empty(attempts);
            }

            let outcome = search(&mut self.arena, &oracle, start, resolved);
            match outcome {
                Search::Found(path) => {
                    debug!("entity {}: path {}", entity.id, format_path(&path));
                    return Plan {
                        path,
                        target: Some(resolved),
                        attempts,
                    };
                }
                Search::Boxed => {
                    debug!("entity {}: boxed in at ({},{})", entity.id, start.x, start.y);
                    return Plan::empty(attempts);
                }
                Search::Exhausted => {
                    trace!(
                        "entity {}: ({},{}) unreachable, excluding it",
                        entity.id, resolved.x, resolved.y
                    );
                    exclusion.insert(resolved);
                }
            }
        }

        warn!(
            "entity {}: gave up on ({},{}) after {} attempts",
            entity.id, target_x, target_y, attempts
        );
        Plan::empty(attempts)
    }
}

/// Neighbors of `cell` in expansion order; diagonals need both flanking cells free
fn neighbors<M: MapPassability + ?Sized>(oracle: &Passability<'_, M>, cell: Cell) -> Vec<Cell> {
    let (x, y) = (cell.x, cell.y);
    let up = oracle.is_passable(x, y - 1);
    let left = oracle.is_passable(x - 1, y);
    let right = oracle.is_passable(x + 1, y);
    let down = oracle.is_passable(x, y + 1);

    let mut result = Vec::with_capacity(8);
    if up && left && oracle.is_passable(x - 1, y - 1) {
        result.push(Cell::new(x - 1, y - 1));
    }
    if up {
        result.push(Cell::new(x, y - 1));
    }
    if up && right && oracle.is_passable(x + 1, y - 1) {
        result.push(Cell::new(x + 1, y - 1));
    }
    if left {
        result.push(Cell::new(x - 1, y));
    }
    if right {
        result.push(Cell::new(x + 1, y));
    }
    if down && left && oracle.is_passable(x - 1, y + 1) {
        result.push(Cell::new(x - 1, y + 1));
    }
    if down {
        result.push(Cell::new(x, y + 1));
    }
    if down && right && oracle.is_passable(x + 1, y + 1) {
        result.push(Cell::new(x + 1, y + 1));
    }
    result
}

/// A* from `start` to `goal`; closed nodes are never reopened
fn search<M: MapPassability + ?Sized>(
    arena: &mut SearchArena,
    oracle: &Passability<'_, M>,
    start: Cell,
    goal: Cell,
) -> Search {
    arena.begin(oracle.map.cols(), oracle.map.rows());

    let start_index = arena.index(start);
    arena.node_mut(start_index).opened = true;

    // Kept sorted by f, highest first, so the best node is popped from the back
    let mut open_list: Vec<usize> = vec![start_index];
    let mut expanded = 0;

    while let Some(current) = open_list.pop() {
        arena.node_mut(current).closed = true;
        let cell = arena.cell(current);

        if cell == goal {
            return Search::Found(arena.reconstruct(current));
        }

        expanded += 1;
        let g = arena.node(current).g;
        if expanded <= TRACE_EXPANSIONS {
            trace!("[A*] expanding ({},{}) g={:.2}", cell.x, cell.y, g);
        }

        let mut changed = false;
        for neighbor in neighbors(oracle, cell) {
            let index = arena.index(neighbor);
            let node = arena.node_mut(index);
            if node.closed {
                continue;
            }

            let ng = g + cell.distance(&neighbor);
            if !node.opened || ng < node.g {
                node.g = ng;
                node.h = neighbor.distance(&goal);
                node.f = node.g + node.h;
                node.parent = Some(current);

                if !node.opened {
                    node.opened = true;
                    open_list.push(index);
                }
                changed = true;
            }
        }

        if changed {
            let nodes = &arena.nodes;
            open_list.sort_by(|&a, &b| nodes[b].f.total_cmp(&nodes[a].f));
        }
    }

    trace!("[A*] open list exhausted after {} expansions", expanded);
    if expanded <= 1 {
        Search::Boxed
    } else {
        Search::Exhausted
    }
}

/// Format path for display
pub fn format_path(path: &[Cell]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    let mut result = String::new();
    for (i, cell) in path.iter().enumerate() {
        if i > 0 {
            result.push_str(" <- ");
        }
        result.push_str(&format!("({},{})", cell.x, cell.y));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DrawBox, EntityId};
    use crate::grid::Grid;

    fn walker(x: i32, y: i32) -> Entity {
        Entity::movable(EntityId(0), "walker", Cell::new(x, y), 2.0, DrawBox::default())
    }

    #[test]
    fn test_arena_resets_between_searches() {
        let grid = Grid::new(10, 10);
        let occupation = OccupationTracker::new();
        let mut planner = PathPlanner::default();

        let first = planner.plan(&grid, &occupation, &walker(1, 1), 5, 1);
        let second = planner.plan(&grid, &occupation, &walker(1, 1), 5, 1);
        assert_eq!(first, second);
        assert_eq!(first.path.len(), 4);
    }

    #[test]
    fn test_arena_resizes_for_new_grid() {
        let occupation = OccupationTracker::new();
        let mut planner = PathPlanner::default();

        let small = Grid::new(5, 5);
        assert_eq!(planner.plan(&small, &occupation, &walker(0, 0), 4, 4).path.len(), 4);

        let large = Grid::new(30, 30);
        assert_eq!(planner.plan(&large, &occupation, &walker(0, 0), 20, 0).path.len(), 20);
    }

    #[test]
    fn test_path_excludes_start_and_ends_at_target() {
        let grid = Grid::new(10, 10);
        let occupation = OccupationTracker::new();
        let mut planner = PathPlanner::default();

        let plan = planner.plan(&grid, &occupation, &walker(2, 2), 2, 6);
        assert_eq!(plan.path.first(), Some(&Cell::new(2, 6)));
        assert_eq!(plan.path.last(), Some(&Cell::new(2, 3)));
        assert!(!plan.path.contains(&Cell::new(2, 2)));
        assert_eq!(plan.target, Some(Cell::new(2, 6)));
        assert_eq!(plan.attempts, 1);
    }

    #[test]
    fn test_diagonal_blocked_by_corner() {
        // Moving from (0,0) to (1,1) must not squeeze between two walls
        let grid = Grid::from_ascii(
            "
            .#.
            #..
            ...
            ",
        );
        let occupation = OccupationTracker::new();
        let exclusion = Exclusion::new();
        let oracle = Passability::new(&grid, &occupation, None, &exclusion);

        assert!(neighbors(&oracle, Cell::new(0, 0)).is_empty());
        assert!(neighbors(&oracle, Cell::new(1, 1)).contains(&Cell::new(2, 2)));
        assert!(!neighbors(&oracle, Cell::new(1, 1)).contains(&Cell::new(0, 0)));
    }

    #[test]
    fn test_unreachable_target_is_excluded_and_retried() {
        // Target (5,1) sits in a sealed pocket; the next free cell is outside it
        let grid = Grid::from_ascii(
            "
            ....###.
            ....#.#.
            ....###.
            ........
            ",
        );
        let occupation = OccupationTracker::new();
        let mut planner = PathPlanner::default();

        let plan = planner.plan(&grid, &occupation, &walker(0, 3), 5, 1);
        assert!(plan.attempts >= 2);
        let target = plan.target.expect("a reachable fallback cell");
        assert_ne!(target, Cell::new(5, 1));
        assert_eq!(plan.path.first(), Some(&target));
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[]), "No path");
        assert_eq!(format_path(&[Cell::new(2, 0), Cell::new(1, 0)]), "(2,0) <- (1,0)");
    }
}
