//! Enemy pathfinding over the occupancy graph
//!
//! The occupancy grid merges static walls with dynamic obstacles (breakable
//! walls, bombs). Free cells become graph nodes indexed `row * cols + col`,
//! 4-connected. Searches return the path from start to target inclusive, or
//! an empty path when the target is unreachable.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, CellType, GridPos};

const NO_ANCESTOR: usize = usize::MAX;
const DIRS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Enemy difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

/// Percent chances steering path computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPolicy {
    /// Chance to search with BFS; DFS otherwise
    pub bfs: u8,
    /// Chance to head for the player instead of a random free cell
    pub target_player: u8,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn policy(self) -> PathPolicy {
        match self {
            Difficulty::Easy => PathPolicy {
                bfs: 30,
                target_player: 40,
            },
            Difficulty::Medium => PathPolicy {
                bfs: 50,
                target_player: 65,
            },
            Difficulty::Hard => PathPolicy {
                bfs: 70,
                target_player: 90,
            },
        }
    }
}

/// Search strategy picked for one path computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    Bfs,
    Dfs,
}

impl PathPolicy {
    /// Roll the search strategy and whether to target the player
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> (Search, bool) {
        let search = if rng.random_range(0..100u8) < self.bfs {
            Search::Bfs
        } else {
            Search::Dfs
        };
        let target_player = rng.random_range(0..100u8) < self.target_player;
        (search, target_player)
    }
}

/// Which cells are blocked right now
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    blocked: Vec<bool>,
}

impl OccupancyGrid {
    /// Static walls only
    pub fn from_arena(arena: &Arena) -> Self {
        let (rows, cols) = (arena.rows(), arena.cols());
        let mut blocked = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                blocked.push(arena.cell_type(row, col) == CellType::Wall);
            }
        }
        Self { rows, cols, blocked }
    }

    /// Mark a cell as blocked. Off-grid cells are ignored.
    pub fn occupy(&mut self, cell: GridPos) {
        if let Some(i) = self.index(cell) {
            self.blocked[i] = true;
        }
    }

    /// Mark a cell as free. Used for the searcher's own cell so a bomb it
    /// stands on does not trap it.
    pub fn release(&mut self, cell: GridPos) {
        if let Some(i) = self.index(cell) {
            self.blocked[i] = false;
        }
    }

    pub fn is_free(&self, cell: GridPos) -> bool {
        self.index(cell).is_some_and(|i| !self.blocked[i])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Uniformly random free cell
    pub fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridPos> {
        let free: Vec<usize> = (0..self.blocked.len()).filter(|&i| !self.blocked[i]).collect();
        if free.is_empty() {
            return None;
        }
        let i = free[rng.random_range(0..free.len())];
        Some(GridPos::new(i % self.cols, i / self.cols))
    }

    fn index(&self, cell: GridPos) -> Option<usize> {
        (cell.col < self.cols && cell.row < self.rows).then(|| cell.row * self.cols + cell.col)
    }
}

/// 4-connected adjacency lists over free cells
#[derive(Debug, Clone)]
pub struct Graph {
    cols: usize,
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    pub fn from_occupancy(grid: &OccupancyGrid) -> Self {
        let cols = grid.cols();
        let mut adjacency = vec![Vec::new(); grid.rows() * cols];
        for row in 0..grid.rows() {
            for col in 0..cols {
                let cell = GridPos::new(col, row);
                if !grid.is_free(cell) {
                    continue;
                }
                let node = &mut adjacency[row * cols + col];
                for (dc, dr) in DIRS {
                    if let Some(n) = cell.offset(dc, dr).filter(|n| grid.is_free(*n)) {
                        node.push(n.row * cols + n.col);
                    }
                }
            }
        }
        Self { cols, adjacency }
    }

    #[inline]
    pub fn node(&self, cell: GridPos) -> Option<usize> {
        let i = cell.row * self.cols + cell.col;
        (cell.col < self.cols && i < self.adjacency.len()).then_some(i)
    }

    #[inline]
    pub fn cell(&self, node: usize) -> GridPos {
        GridPos::new(node % self.cols, node / self.cols)
    }

    pub fn neighbours(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    fn unwind(&self, prev: &[usize], start: usize, target: usize) -> Vec<GridPos> {
        let mut path = Vec::new();
        let mut node = target;
        while node != start {
            path.push(self.cell(node));
            node = prev[node];
        }
        path.push(self.cell(start));
        path.reverse();
        path
    }
}

/// Shortest path from `start` to `target`, both inclusive
pub fn bfs(graph: &Graph, start: GridPos, target: GridPos) -> Vec<GridPos> {
    let (Some(start), Some(target)) = (graph.node(start), graph.node(target)) else {
        return Vec::new();
    };

    let mut prev = vec![NO_ANCESTOR; graph.adjacency.len()];
    let mut visited = vec![false; graph.adjacency.len()];
    let mut queue = VecDeque::with_capacity(64);
    visited[start] = true;
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        if node == target {
            return graph.unwind(&prev, start, target);
        }
        for &n in graph.neighbours(node) {
            if !visited[n] {
                visited[n] = true;
                prev[n] = node;
                queue.push_back(n);
            }
        }
    }
    Vec::new()
}

/// Some path from `start` to `target` via a stack walk with shuffled
/// neighbour order. Not length-minimal.
pub fn dfs<R: Rng + ?Sized>(
    graph: &Graph,
    start: GridPos,
    target: GridPos,
    rng: &mut R,
) -> Vec<GridPos> {
    let (Some(start), Some(target)) = (graph.node(start), graph.node(target)) else {
        return Vec::new();
    };

    let mut prev = vec![NO_ANCESTOR; graph.adjacency.len()];
    let mut stacked = vec![false; graph.adjacency.len()];
    let mut stack = vec![start];
    stacked[start] = true;
    let mut order: Vec<usize> = Vec::with_capacity(4);

    while let Some(node) = stack.pop() {
        if node == target {
            return graph.unwind(&prev, start, target);
        }
        order.clear();
        order.extend_from_slice(graph.neighbours(node));
        order.shuffle(rng);
        for &n in &order {
            if !stacked[n] {
                stacked[n] = true;
                prev[n] = node;
                stack.push(n);
            }
        }
    }
    Vec::new()
}
