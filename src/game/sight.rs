//! Line of Sight
//!
//! Grid DDA raycast between two sprites. The ray walks from the source's node
//! one cell-boundary crossing at a time along axis-aligned links, so a query
//! costs O(Manhattan distance in cells). Occlusion is whole-cell: a
//! collidable cell blocks, anything inside a passable cell does not.

use tracing::warn;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::vec2::Vec2;
use crate::grid::node::{Direction, NodeId};
use crate::grid::spatial::SpatialGrid;
use crate::game::entity::Sprite;

// =============================================================================
// GRID RAY
// =============================================================================

/// Iterator over the nodes a ray passes through.
///
/// Yields the start node, then each node entered at a grid-line crossing.
/// Ends when the next step would leave the grid, or immediately after the
/// start node if the direction is zero.
#[derive(Clone, Debug)]
pub struct GridRay<'a> {
    grid: &'a SpatialGrid,
    node: Option<NodeId>,
    started: bool,
    step_x: i8,
    step_y: i8,
    t_max_x: f32,
    t_max_y: f32,
    t_delta_x: f32,
    t_delta_y: f32,
    remaining: u32,
}

/// Per-axis DDA setup: (step, distance to first crossing, distance between crossings).
fn axis_setup(origin: f32, dir: f32, cell: i64, cell_size: f32) -> (i8, f32, f32) {
    if dir < 0.0 {
        let edge = cell as f32 * cell_size;
        (-1, (edge - origin) / dir, cell_size / -dir)
    } else if dir > 0.0 {
        let edge = (cell + 1) as f32 * cell_size;
        (1, (edge - origin) / dir, cell_size / dir)
    } else {
        // Never cross on this axis
        (0, f32::INFINITY, 0.0)
    }
}

impl<'a> GridRay<'a> {
    /// Cast from `origin` (inside `start`) toward `toward`.
    pub fn new(grid: &'a SpatialGrid, start: NodeId, origin: Vec2, toward: Vec2) -> Self {
        let dir = toward.sub(origin).normalize();
        let (col, row) = grid.cell_of(origin.x, origin.y);
        let size = grid.cell_size();

        let (step_x, t_max_x, t_delta_x) = axis_setup(origin.x, dir.x, col, size);
        let (step_y, t_max_y, t_delta_y) = axis_setup(origin.y, dir.y, row, size);

        Self {
            grid,
            node: Some(start),
            started: false,
            step_x,
            step_y,
            t_max_x,
            t_max_y,
            t_delta_x,
            t_delta_y,
            remaining: step_budget(grid.width(), grid.height()),
        }
    }

    /// Does this ray move at all?
    pub fn is_degenerate(&self) -> bool {
        self.step_x == 0 && self.step_y == 0
    }

    fn advance(&mut self, current: NodeId) -> Option<NodeId> {
        if self.is_degenerate() || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        // Strict comparison: exact corner crossings step Y
        let dir = if self.t_max_x < self.t_max_y {
            self.t_max_x += self.t_delta_x;
            if self.step_x < 0 { Direction::West } else { Direction::East }
        } else {
            self.t_max_y += self.t_delta_y;
            if self.step_y < 0 { Direction::North } else { Direction::South }
        };

        #[cfg(feature = "debug-tracing")]
        trace!("ray {} -> {:?}", current, dir);

        self.grid.neighbor(current, dir)
    }
}

/// Upper bound on steps: a ray crosses every column and every row at most once.
fn step_budget(width: u32, height: u32) -> u32 {
    width.saturating_add(height).saturating_add(2)
}

impl Iterator for GridRay<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.node?;
        if !self.started {
            self.started = true;
            return Some(current);
        }
        self.node = self.advance(current);
        self.node
    }
}

// =============================================================================
// CAN SEE
// =============================================================================

/// Can `source` see `target` through the grid?
///
/// True when both share a node, or when the ray from source to target reaches
/// the target's node before any collidable node or the map edge. Unregistered
/// sprites see and are seen by nothing.
pub fn can_see(grid: &SpatialGrid, source: &Sprite, target: &Sprite) -> bool {
    let (Some(start), Some(goal)) = (source.current_node, target.current_node) else {
        return false;
    };

    if start == goal {
        return true;
    }

    if source.position == target.position {
        // Same point, different nodes: membership is stale upstream
        warn!(
            "{} and {} share position {} but are registered in {} and {}",
            source.id, target.id, source.position, start, goal
        );
        return false;
    }

    for node in GridRay::new(grid, start, source.position, target.position) {
        if node == goal {
            return true;
        }
        if grid.node(node).collidable() {
            return false;
        }
    }

    // Walked off the loaded map
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::config::GridConfig;
    use crate::game::entity::EntityId;
    use crate::game::membership::update_grid_membership;

    fn at_cell(grid: &mut SpatialGrid, id: u32, col: i64, row: i64) -> Sprite {
        let node = grid.node_at_cell(col, row).unwrap();
        let mut sprite = Sprite::new("dude", grid.cell_center(node));
        sprite.id = EntityId(id);
        update_grid_membership(grid, &mut sprite);
        sprite
    }

    fn corridor(wall: (usize, usize)) -> SpatialGrid {
        let mut rows = vec![vec!['.'; 5]; 5];
        rows[wall.1][wall.0] = '#';
        let rows: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        SpatialGrid::from_rows(&refs, 60.0).unwrap()
    }

    #[test]
    fn test_wall_in_corridor_blocks() {
        let mut g = corridor((2, 2));
        let s = at_cell(&mut g, 1, 0, 2);
        let t = at_cell(&mut g, 2, 4, 2);
        assert!(!can_see(&g, &s, &t));
        assert!(!can_see(&g, &t, &s));
    }

    #[test]
    fn test_wall_off_corridor_does_not_block() {
        let mut g = corridor((2, 0));
        let s = at_cell(&mut g, 1, 0, 2);
        let t = at_cell(&mut g, 2, 4, 2);
        assert!(can_see(&g, &s, &t));
        assert!(can_see(&g, &t, &s));
    }

    #[test]
    fn test_same_node_always_visible() {
        let mut g = SpatialGrid::from_rows(&["###", "#.#", "###"], 60.0).unwrap();
        let a = at_cell(&mut g, 1, 1, 1);
        let mut b = Sprite::new("dude", a.position.add(Vec2::new(10.0, -5.0)));
        b.id = EntityId(2);
        update_grid_membership(&mut g, &mut b);
        assert!(can_see(&g, &a, &b));
    }

    #[test]
    fn test_vertical_ray() {
        let mut g = SpatialGrid::from_rows(&[".", ".", "#", "."], 60.0).unwrap();
        let top = at_cell(&mut g, 1, 0, 0);
        let mid = at_cell(&mut g, 2, 0, 1);
        let bottom = at_cell(&mut g, 3, 0, 3);
        assert!(can_see(&g, &top, &mid));
        assert!(can_see(&g, &mid, &top));
        assert!(!can_see(&g, &top, &bottom));
        assert!(!can_see(&g, &bottom, &top));
    }

    #[test]
    fn test_diagonal_tie_steps_y_first() {
        // Exact corner crossing from (0,0) to (1,1) goes through (0,1)
        let mut g = SpatialGrid::from_rows(&[".#", ".."], 60.0).unwrap();
        let s = at_cell(&mut g, 1, 0, 0);
        let t = at_cell(&mut g, 2, 1, 1);
        let cells: Vec<(u32, u32)> = GridRay::new(&g, s.current_node.unwrap(), s.position, t.position)
            .take(3)
            .map(|n| g.coords(n))
            .collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 1)]);
        assert!(can_see(&g, &s, &t));

        let mut g = SpatialGrid::from_rows(&["..", "#."], 60.0).unwrap();
        let s = at_cell(&mut g, 1, 0, 0);
        let t = at_cell(&mut g, 2, 1, 1);
        assert!(!can_see(&g, &s, &t));
    }

    #[test]
    fn test_step_budget_saturates() {
        assert_eq!(step_budget(128, 128), 258);
        assert_eq!(step_budget(u32::MAX, 1), u32::MAX);
        assert_eq!(step_budget(u32::MAX, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_ray_walks_axis_aligned_links() {
        let g = SpatialGrid::new(&GridConfig::new(4, 4, 10.0)).unwrap();
        let start = g.node_at_cell(0, 0).unwrap();
        let cells: Vec<(u32, u32)> = GridRay::new(&g, start, Vec2::new(5.0, 5.0), Vec2::new(35.0, 15.0))
            .take_while(|&n| n != g.node_at_cell(3, 1).unwrap())
            .map(|n| g.coords(n))
            .collect();
        for pair in cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let manhattan = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(manhattan, 1, "{:?} -> {:?}", a, b);
        }
        assert_eq!(cells[0], (0, 0));
    }

    #[test]
    fn test_ray_ends_at_edge() {
        let g = SpatialGrid::new(&GridConfig::new(5, 5, 60.0)).unwrap();
        let start = g.node_at_cell(0, 2).unwrap();
        let ray = GridRay::new(&g, start, Vec2::new(30.0, 150.0), Vec2::new(-500.0, 150.0));
        let cells: Vec<NodeId> = ray.collect();
        assert_eq!(cells, vec![start]);
    }

    #[test]
    fn test_degenerate_ray_yields_start_only() {
        let g = SpatialGrid::new(&GridConfig::new(3, 3, 60.0)).unwrap();
        let start = g.node_at_cell(1, 1).unwrap();
        let ray = GridRay::new(&g, start, Vec2::new(90.0, 90.0), Vec2::new(90.0, 90.0));
        assert!(ray.is_degenerate());
        assert_eq!(ray.count(), 1);
    }

    #[test]
    fn test_target_beyond_edge_is_blocked() {
        let mut g = SpatialGrid::new(&GridConfig::new(5, 5, 60.0)).unwrap();
        let s = at_cell(&mut g, 1, 0, 2);
        // Stale target: registered in a far node, positioned off-grid to the west
        let mut t = at_cell(&mut g, 2, 4, 4);
        t.position = Vec2::new(-200.0, 150.0);
        assert!(!can_see(&g, &s, &t));
    }

    #[test]
    fn test_unregistered_sees_nothing() {
        let mut g = SpatialGrid::new(&GridConfig::new(3, 3, 60.0)).unwrap();
        let a = at_cell(&mut g, 1, 0, 0);
        let mut ghost = Sprite::new("dude", Vec2::new(30.0, 30.0));
        ghost.id = EntityId(2);
        assert!(!can_see(&g, &a, &ghost));
        assert!(!can_see(&g, &ghost, &a));
    }

    #[test]
    fn test_stale_same_point_is_blocked() {
        let mut g = SpatialGrid::new(&GridConfig::new(3, 3, 60.0)).unwrap();
        let a = at_cell(&mut g, 1, 0, 0);
        let mut b = at_cell(&mut g, 2, 2, 2);
        b.position = a.position;
        assert!(!can_see(&g, &a, &b));
    }

    #[test]
    fn test_source_inside_collidable_cell_is_blind() {
        let mut g = SpatialGrid::from_rows(&["#.."], 60.0).unwrap();
        let tree = at_cell(&mut g, 1, 0, 0);
        let car = at_cell(&mut g, 2, 2, 0);
        assert!(!can_see(&g, &tree, &car));
        // Target cell is tested before collidability
        let lookout = at_cell(&mut g, 3, 1, 0);
        assert!(can_see(&g, &lookout, &tree));
    }

    proptest! {
        #[test]
        fn prop_clear_grid_is_symmetric(
            a in (0i64..8, 0i64..8, -25.0f32..25.0, -25.0f32..25.0),
            b in (0i64..8, 0i64..8, -25.0f32..25.0, -25.0f32..25.0),
        ) {
            let mut g = SpatialGrid::new(&GridConfig::new(8, 8, 60.0)).unwrap();
            let mut place = |id: u32, (col, row, ox, oy): (i64, i64, f32, f32)| {
                let node = g.node_at_cell(col, row).unwrap();
                let mut s = Sprite::new("car1", g.cell_center(node).add(Vec2::new(ox, oy)));
                s.id = EntityId(id);
                update_grid_membership(&mut g, &mut s);
                s
            };
            let sa = place(1, a);
            let sb = place(2, b);
            prop_assert!(can_see(&g, &sa, &sb));
            prop_assert!(can_see(&g, &sb, &sa));
        }

        #[test]
        fn prop_ray_terminates(
            ox in 0.0f32..600.0, oy in 0.0f32..600.0,
            tx in -2000.0f32..2000.0, ty in -2000.0f32..2000.0,
        ) {
            let g = SpatialGrid::new(&GridConfig::new(10, 10, 60.0)).unwrap();
            let origin = Vec2::new(ox, oy);
            let start = g.node_at(origin).unwrap();
            let count = GridRay::new(&g, start, origin, Vec2::new(tx, ty)).count();
            prop_assert!(count <= 10 + 10 + 3);
        }
    }
}
