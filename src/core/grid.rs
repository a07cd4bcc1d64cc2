//! Uniform 2D spatial hash over the container's xy face.
//!
//! Buckets live in one flat `entries` array indexed through prefix-sum
//! `offsets` (a counting sort by cell). All buffers are kept between ticks and
//! only resized when the particle or cell count grows.

use crate::core::bounds::Bounds;
use crate::core::particle::Particle;

/// Integer cell coordinate. Ordering is lexicographic on `(gx, gy)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub gx: i32,
    pub gy: i32,
}

impl CellKey {
    pub const fn new(gx: i32, gy: i32) -> Self {
        Self { gx, gy }
    }
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    left: f64,
    top: f64,
    cell_size: f64,
    cols: usize,
    rows: usize,
    /// `offsets[c]..offsets[c + 1]` is the slice of `entries` for cell `c`.
    offsets: Vec<usize>,
    entries: Vec<usize>,
    // scratch reused by `rebuild`
    cell_of: Vec<usize>,
    cursor: Vec<usize>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            cell_size: 1.0,
            cols: 1,
            rows: 1,
            offsets: vec![0, 0],
            entries: Vec::new(),
            cell_of: Vec::new(),
            cursor: Vec::new(),
        }
    }

    /// Re-bin `particles` for the current `bounds`.
    ///
    /// The cell edge is `bounds.width / cells_per_side`, but never smaller than
    /// `min_cell` so that any overlapping pair shares a cell or a neighbor.
    /// Positions outside the box are clamped into the border cells.
    pub fn rebuild(&mut self, bounds: &Bounds, cells_per_side: usize, min_cell: f64, particles: &[Particle]) {
        self.left = bounds.left;
        self.top = bounds.top;
        self.cell_size = (bounds.width / cells_per_side.max(1) as f64).max(min_cell);
        self.cols = ((bounds.width / self.cell_size).ceil() as usize).max(1);
        self.rows = ((bounds.height / self.cell_size).ceil() as usize).max(1);

        let cells = self.cols * self.rows;
        self.offsets.clear();
        self.offsets.resize(cells + 1, 0);
        self.cell_of.clear();

        for p in particles {
            let c = self.index_of(self.key_for(p.r[0], p.r[1]));
            self.cell_of.push(c);
            self.offsets[c + 1] += 1;
        }
        for c in 0..cells {
            self.offsets[c + 1] += self.offsets[c];
        }

        self.cursor.clear();
        self.cursor.extend_from_slice(&self.offsets[..cells]);
        self.entries.clear();
        self.entries.resize(particles.len(), 0);
        for (i, &c) in self.cell_of.iter().enumerate() {
            self.entries[self.cursor[c]] = i;
            self.cursor[c] += 1;
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Cell containing `(x, y)`, clamped into the grid.
    pub fn key_for(&self, x: f64, y: f64) -> CellKey {
        let gx = ((x - self.left) / self.cell_size).floor();
        let gy = ((y - self.top) / self.cell_size).floor();
        CellKey::new(
            clamp_coord(gx, self.cols),
            clamp_coord(gy, self.rows),
        )
    }

    /// Key of the flat cell index `c` (column-major, so flat order matches key order).
    #[inline]
    pub fn key(&self, c: usize) -> CellKey {
        CellKey::new((c / self.rows) as i32, (c % self.rows) as i32)
    }

    /// Flat index of `key`, or `None` when it lies outside the grid.
    #[inline]
    pub fn index(&self, key: CellKey) -> Option<usize> {
        let in_range = key.gx >= 0
            && key.gy >= 0
            && (key.gx as usize) < self.cols
            && (key.gy as usize) < self.rows;
        in_range.then(|| self.index_of(key))
    }

    #[inline]
    fn index_of(&self, key: CellKey) -> usize {
        key.gx as usize * self.rows + key.gy as usize
    }

    /// Particle indices binned into `key`, in ascending order.
    pub fn occupants(&self, key: CellKey) -> &[usize] {
        match self.index(key) {
            Some(c) => self.occupants_at(c),
            None => &[],
        }
    }

    #[inline]
    pub fn occupants_at(&self, c: usize) -> &[usize] {
        &self.entries[self.offsets[c]..self.offsets[c + 1]]
    }

    /// The up-to-8 in-grid neighbors of `key`.
    pub fn neighbors(&self, key: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| CellKey::new(key.gx + dx, key.gy + dy))
            .filter(move |k| self.index(*k).is_some())
    }

    /// Neighbors ordered after `key`; visiting only these pairs each adjacent
    /// cell pair exactly once.
    pub fn forward_neighbors(&self, key: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.neighbors(key).filter(move |k| *k > key)
    }
}

fn clamp_coord(g: f64, len: usize) -> i32 {
    if g.is_nan() || g < 0.0 {
        0
    } else {
        (g as usize).min(len - 1) as i32
    }
}
