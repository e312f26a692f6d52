//! Spatial Grid
//!
//! Fixed-size 2D array of `GridNode`s stored flat in row-major order.
//! Topology is static: neighbor lookups are index arithmetic, bounds-checked
//! into an `Option`. Only per-node occupancy changes after construction.

use tracing::debug;

use crate::config::GridConfig;
use crate::core::vec2::Vec2;
use crate::error::GridError;
use crate::game::entity::EntityId;
use crate::grid::node::{Direction, GridNode, NodeId};

/// Map glyph for a collidable cell in `SpatialGrid::from_rows`.
pub const WALL_GLYPH: char = '#';

/// Map glyph for a clear cell in `SpatialGrid::from_rows`.
pub const OPEN_GLYPH: char = '.';

/// The grid of nodes for one loaded map segment.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    width: u32,
    height: u32,
    cell_size: f32,
    nodes: Vec<GridNode>,
}

impl SpatialGrid {
    /// Create a grid with every cell clear.
    pub fn new(config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let mask = vec![false; config.cell_count()];
        Ok(Self::build(config, &mask))
    }

    /// Create a grid whose collidable cells are given by a row-major mask.
    pub fn with_collision_mask(config: &GridConfig, mask: &[bool]) -> Result<Self, GridError> {
        config.validate()?;
        if mask.len() != config.cell_count() {
            return Err(GridError::MaskSizeMismatch {
                expected: config.cell_count(),
                actual: mask.len(),
            });
        }
        Ok(Self::build(config, mask))
    }

    /// Load a grid from text rows: `#` is collidable, `.` is clear.
    ///
    /// Row 0 is the northmost row.
    pub fn from_rows(rows: &[&str], cell_size: f32) -> Result<Self, GridError> {
        let expected = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut mask = Vec::with_capacity(expected * rows.len());

        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != expected {
                return Err(GridError::RaggedRow { row, expected, actual });
            }
            for (col, glyph) in line.chars().enumerate() {
                match glyph {
                    WALL_GLYPH => mask.push(true),
                    OPEN_GLYPH => mask.push(false),
                    _ => return Err(GridError::UnknownGlyph { glyph, col, row }),
                }
            }
        }

        let config = GridConfig::new(
            u32::try_from(expected).unwrap_or(u32::MAX),
            u32::try_from(rows.len()).unwrap_or(u32::MAX),
            cell_size,
        );
        Self::with_collision_mask(&config, &mask)
    }

    fn build(config: &GridConfig, mask: &[bool]) -> Self {
        let mut nodes = Vec::with_capacity(config.cell_count());
        for row in 0..config.height {
            for col in 0..config.width {
                let idx = row as usize * config.width as usize + col as usize;
                nodes.push(GridNode::new(col, row, mask[idx]));
            }
        }

        debug!(
            "Built {}x{} grid (cell size {}, {} collidable)",
            config.width,
            config.height,
            config.cell_size,
            mask.iter().filter(|&&c| c).count()
        );

        Self {
            width: config.width,
            height: config.height,
            cell_size: config.cell_size,
            nodes,
        }
    }

    /// Columns.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of one cell in world units.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A validated grid always has at least one node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimensions as a config.
    pub fn config(&self) -> GridConfig {
        GridConfig::new(self.width, self.height, self.cell_size)
    }

    /// Borrow a node.
    ///
    /// `NodeId`s are only issued by this grid, so indexing is in range for
    /// any id obtained from it.
    #[inline]
    pub fn node(&self, id: NodeId) -> &GridNode {
        &self.nodes[id.index()]
    }

    /// Borrow a node if the id is in range.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&GridNode> {
        self.nodes.get(id.index())
    }

    /// Mutable access for the membership layer.
    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut GridNode> {
        self.nodes.get_mut(id.index())
    }

    /// Iterate all nodes with their ids in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GridNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    /// Node at integer cell coordinates.
    pub fn node_at_cell(&self, col: i64, row: i64) -> Option<NodeId> {
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return None;
        }
        Some(NodeId((row * self.width as i64 + col) as u32))
    }

    /// Cell coordinates of a node.
    #[inline]
    pub fn coords(&self, id: NodeId) -> (u32, u32) {
        (id.0 % self.width, id.0 / self.width)
    }

    /// Integer cell containing a world coordinate, unbounded.
    #[inline]
    pub fn cell_of(&self, x: f32, y: f32) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Node containing a world coordinate, or `None` outside the loaded map.
    ///
    /// `None` is how a sprite learns it has driven off the loaded world.
    pub fn node_at_world(&self, x: f32, y: f32) -> Option<NodeId> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (col, row) = self.cell_of(x, y);
        self.node_at_cell(col, row)
    }

    /// `node_at_world` for a vector.
    #[inline]
    pub fn node_at(&self, pos: Vec2) -> Option<NodeId> {
        self.node_at_world(pos.x, pos.y)
    }

    /// Neighbor in a direction, or `None` at the edge of the loaded map.
    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        let (col, row) = self.coords(id);
        let (dx, dy) = dir.offset();
        self.node_at_cell(col as i64 + dx, row as i64 + dy)
    }

    /// The node itself followed by its eight neighbors (`Direction::ALL` order).
    pub fn neighborhood(&self, id: NodeId) -> [Option<NodeId>; 9] {
        let mut cells = [None; 9];
        cells[0] = Some(id);
        for (slot, dir) in cells[1..].iter_mut().zip(Direction::ALL) {
            *slot = self.neighbor(id, dir);
        }
        cells
    }

    /// World position of a node's north-west corner.
    pub fn cell_origin(&self, id: NodeId) -> Vec2 {
        let (col, row) = self.coords(id);
        Vec2::new(col as f32 * self.cell_size, row as f32 * self.cell_size)
    }

    /// World position of a node's center.
    pub fn cell_center(&self, id: NodeId) -> Vec2 {
        let half = self.cell_size * 0.5;
        self.cell_origin(id).add(Vec2::new(half, half))
    }

    /// Sum of all occupant-set sizes.
    pub fn occupant_total(&self) -> usize {
        self.nodes.iter().map(GridNode::occupant_count).sum()
    }

    /// Nodes that currently hold this entity. More than one means a leak.
    pub fn nodes_containing(&self, entity: EntityId) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.contains(entity))
            .map(|(id, _)| id)
            .collect()
    }

    /// Drop every occupant.
    pub fn clear_occupants(&mut self) {
        for node in &mut self.nodes {
            node.clear_occupants();
        }
    }
}
