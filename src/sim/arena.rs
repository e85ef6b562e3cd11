//! Arena grid and grid <-> canvas mapping
//!
//! The wall layout is fixed at construction: the outer ring and every cell
//! with an even row and an even column are walls, everything else is empty.
//! Only the pixel mapping changes afterwards (on viewport resize).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{self, Blocked, Rect};
use super::error::{SessionError, SessionResult};
use crate::consts::{SCALE_HEIGHT_ARENA_TO_SCREEN, SCALE_WIDTH_ARENA_TO_SCREEN};

/// Rejection-sampling attempts before falling back to a full scan
const MAX_SAMPLE_ATTEMPTS: usize = 1024;

/// Static cell type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    Wall,
    Empty,
}

/// A grid cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub col: usize,
    pub row: usize,
}

impl GridPos {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Neighbour offset by (dc, dr), or None if it would leave the first quadrant
    pub fn offset(&self, dc: i64, dr: i64) -> Option<GridPos> {
        let col = self.col as i64 + dc;
        let row = self.row as i64 + dr;
        if col < 0 || row < 0 {
            return None;
        }
        Some(GridPos::new(col as usize, row as usize))
    }
}

/// Viewport size in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Pixel rectangle of one grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl CellRect {
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.cell_width, self.cell_height)
    }
}

/// The static wall/empty grid plus its pixel mapping
#[derive(Debug, Clone)]
pub struct Arena {
    rows: usize,
    cols: usize,
    cells: Vec<CellType>,
    viewport: Viewport,
    cell_size: Vec2,
    y_offset: f32,
    /// Cached pixel boxes of every wall cell, rebuilt on resize
    wall_rects: Vec<Rect>,
}

impl Arena {
    /// Build the arena for `rows` x `cols` cells mapped onto `viewport`
    pub fn new(rows: usize, cols: usize, viewport: Viewport) -> SessionResult<Self> {
        if rows < 3 || cols < 3 {
            log::error!("Arena too small: {}x{}", rows, cols);
            return Err(SessionError::InvalidArena { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let border = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;
                let pillar = row % 2 == 0 && col % 2 == 0;
                cells.push(if border || pillar {
                    CellType::Wall
                } else {
                    CellType::Empty
                });
            }
        }

        let mut arena = Self {
            rows,
            cols,
            cells,
            viewport,
            cell_size: Vec2::ZERO,
            y_offset: 0.0,
            wall_rects: Vec::new(),
        };
        arena.rebuild_mapping(viewport);
        Ok(arena)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Size of one cell in canvas units
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    pub fn in_bounds(&self, cell: GridPos) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }

    /// True for cells on the outer wall ring
    pub fn is_border(&self, cell: GridPos) -> bool {
        cell.row == 0 || cell.col == 0 || cell.row == self.rows - 1 || cell.col == self.cols - 1
    }

    /// Static type of a cell. Off-grid cells read as walls.
    pub fn cell_type(&self, row: usize, col: usize) -> CellType {
        if row >= self.rows || col >= self.cols {
            return CellType::Wall;
        }
        self.cells[row * self.cols + col]
    }

    pub fn is_empty(&self, cell: GridPos) -> bool {
        self.cell_type(cell.row, cell.col) == CellType::Empty
    }

    /// Top-left pixel corner and size of a cell. The grid is bottom-aligned
    /// in the viewport.
    pub fn grid_to_canvas(&self, col: usize, row: usize) -> CellRect {
        CellRect {
            x: col as f32 * self.cell_size.x,
            y: self.y_offset + row as f32 * self.cell_size.y,
            cell_width: self.cell_size.x,
            cell_height: self.cell_size.y,
        }
    }

    /// Cell nearest to a canvas point (rounding division), clamped onto the grid
    pub fn canvas_to_grid(&self, x: f32, y: f32) -> GridPos {
        let col = (x / self.cell_size.x).round();
        let row = ((y - self.y_offset) / self.cell_size.y).round();
        GridPos::new(
            col.clamp(0.0, (self.cols - 1) as f32) as usize,
            row.clamp(0.0, (self.rows - 1) as f32) as usize,
        )
    }

    /// Which axes of a move are blocked by static walls
    pub fn wall_collision(&self, moving: &Rect, delta: Vec2) -> Blocked {
        collision::resolve(moving, delta, &self.wall_rects)
    }

    /// Uniformly random empty cell.
    ///
    /// Rejection-samples first; if that keeps missing, picks from a full scan.
    /// Construction guarantees at least one empty cell, so this only returns
    /// None for a degenerate grid.
    pub fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridPos> {
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let row = rng.random_range(0..self.rows);
            let col = rng.random_range(0..self.cols);
            if self.cell_type(row, col) == CellType::Empty {
                return Some(GridPos::new(col, row));
            }
        }
        let empty: Vec<GridPos> = self.empty_cells().collect();
        if empty.is_empty() {
            return None;
        }
        Some(empty[rng.random_range(0..empty.len())])
    }

    /// Every empty cell in row-major order
    pub fn empty_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols)
                .filter(move |&col| self.cell_type(row, col) == CellType::Empty)
                .map(move |col| GridPos::new(col, row))
        })
    }

    /// The arena's centre cell, or the empty cell closest to it (Manhattan)
    pub fn center_empty_cell(&self) -> Option<GridPos> {
        let center = GridPos::new(self.cols / 2, self.rows / 2);
        if self.is_empty(center) {
            return Some(center);
        }
        self.empty_cells().min_by_key(|c| {
            c.col.abs_diff(center.col) + c.row.abs_diff(center.row)
        })
    }

    /// Recompute the cached pixel mapping for a new viewport. Topology is untouched.
    pub fn rebuild_mapping(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.cell_size = Vec2::new(
            viewport.width * SCALE_WIDTH_ARENA_TO_SCREEN / self.cols as f32,
            viewport.height * SCALE_HEIGHT_ARENA_TO_SCREEN / self.rows as f32,
        );
        self.y_offset = viewport.height - self.cell_size.y * self.rows as f32;

        self.wall_rects.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.cell_type(row, col) == CellType::Wall {
                    self.wall_rects.push(self.grid_to_canvas(col, row).as_rect());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn arena(rows: usize, cols: usize) -> Arena {
        Arena::new(rows, cols, Viewport::new(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let a = arena(11, 21);
        assert_eq!(a.cell_type(0, 5), CellType::Wall);
        assert_eq!(a.cell_type(1, 1), CellType::Empty);
        assert_eq!(a.cell_type(2, 2), CellType::Wall);
        assert_eq!(a.cell_type(2, 3), CellType::Empty);
        assert_eq!(a.cell_type(10, 20), CellType::Wall);
    }

    #[test]
    fn test_rejects_small_grid() {
        assert!(matches!(
            Arena::new(2, 5, Viewport::new(100.0, 100.0)),
            Err(SessionError::InvalidArena { rows: 2, cols: 5 })
        ));
    }

    #[test]
    fn test_grid_is_bottom_aligned() {
        let a = arena(11, 21);
        let last = a.grid_to_canvas(0, 10);
        assert!((last.y + last.cell_height - 600.0).abs() < 1e-3);
        let first = a.grid_to_canvas(0, 0);
        assert!((first.y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_collision_blocks_border() {
        let a = arena(11, 21);
        let cell = a.grid_to_canvas(1, 1);
        let size = a.cell_size() * 0.8;
        let pos = cell.origin() + (a.cell_size() - size) / 2.0;
        let player = Rect::from_pos_size(pos, size);

        // Plenty of room to the left would normally be fine, but the border is right there
        let blocked = a.wall_collision(&player, Vec2::new(-10.0, 0.0));
        assert!(blocked.horizontal);
        let blocked = a.wall_collision(&player, Vec2::new(1.0, 0.0));
        assert!(!blocked.horizontal);
    }

    #[test]
    fn test_random_empty_cell_is_empty() {
        let a = arena(11, 21);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let c = a.random_empty_cell(&mut rng).unwrap();
            assert!(a.is_empty(c));
        }
    }

    #[test]
    fn test_center_empty_cell_avoids_pillar() {
        // 9x13: centre (6, 4) is an even/even pillar
        let a = arena(9, 13);
        let c = a.center_empty_cell().unwrap();
        assert!(a.is_empty(c));
        assert_eq!(c.col.abs_diff(6) + c.row.abs_diff(4), 1);
    }

    #[test]
    fn test_rebuild_mapping_keeps_topology() {
        let mut a = arena(11, 21);
        let walls_before = a.wall_rects.len();
        a.rebuild_mapping(Viewport::new(1600.0, 900.0));
        assert_eq!(a.wall_rects.len(), walls_before);
        assert!((a.cell_size().x - 1600.0 / 21.0).abs() < 1e-3);
        assert_eq!(a.cell_type(2, 2), CellType::Wall);
    }

    proptest! {
        #[test]
        fn prop_wall_rule(rows in 3usize..40, cols in 3usize..40) {
            let a = arena(rows, cols);
            for row in 0..rows {
                for col in 0..cols {
                    let expected_wall = row == 0 || col == 0 || row == rows - 1 || col == cols - 1
                        || (row % 2 == 0 && col % 2 == 0);
                    prop_assert_eq!(a.cell_type(row, col) == CellType::Wall, expected_wall);
                }
            }
        }

        #[test]
        fn prop_canvas_to_grid_inverts_grid_to_canvas(
            rows in 3usize..40,
            cols in 3usize..40,
            w in 100.0f32..4000.0,
            h in 100.0f32..4000.0,
        ) {
            let a = Arena::new(rows, cols, Viewport::new(w, h)).unwrap();
            for row in 0..rows {
                for col in 0..cols {
                    let c = a.grid_to_canvas(col, row);
                    prop_assert_eq!(a.canvas_to_grid(c.x, c.y), GridPos::new(col, row));
                }
            }
        }
    }
}
