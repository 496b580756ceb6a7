//! Arena bounds and spatial indexing for fast neighbor queries.

use crate::vector::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rectangular arena with wrap-around edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Wrap a position back inside the arena (toroidal edges)
    #[inline]
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }

    /// Clamp a position to the arena keeping `margin` from each edge
    #[inline]
    pub fn clamp(&self, p: Vec2, margin: f32) -> Vec2 {
        let mx = margin.min(self.width * 0.5);
        let my = margin.min(self.height * 0.5);
        Vec2::new(p.x.clamp(mx, self.width - mx), p.y.clamp(my, self.height - my))
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }

    /// Uniform random point at least `margin` away from every edge
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R, margin: f32) -> Vec2 {
        let mx = margin.min(self.width * 0.5);
        let my = margin.min(self.height * 0.5);
        let x = if self.width - mx > mx {
            rng.gen_range(mx..self.width - mx)
        } else {
            self.width * 0.5
        };
        let y = if self.height - my > my {
            rng.gen_range(my..self.height - my)
        } else {
            self.height * 0.5
        };
        Vec2::new(x, y)
    }
}

#[inline]
fn wrap_axis(v: f32, extent: f32) -> f32 {
    let w = v.rem_euclid(extent);
    // rem_euclid of a tiny negative value can round up to `extent`
    if w >= extent {
        0.0
    } else {
        w
    }
}

/// Uniform bucket grid over the arena, holding entity indices.
///
/// Rebuilt from a snapshot once per phase; queries return candidates that
/// still need an exact distance check.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// cells[row * cols + col] contains indices of entities in that bucket
    cells: Vec<Vec<usize>>,
}

impl SpatialIndex {
    /// Create a new spatial index covering `arena` with square cells
    pub fn new(arena: Arena, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((arena.width / cell_size).ceil() as usize).max(1);
        let rows = ((arena.height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    #[inline]
    fn cell_coords(&self, p: Vec2) -> (usize, usize) {
        let col = ((p.x / self.cell_size).floor().max(0.0) as usize).min(self.cols - 1);
        let row = ((p.y / self.cell_size).floor().max(0.0) as usize).min(self.rows - 1);
        (col, row)
    }

    /// Insert an entity index at the given position
    #[inline]
    pub fn insert(&mut self, p: Vec2, idx: usize) {
        let (col, row) = self.cell_coords(p);
        self.cells[row * self.cols + col].push(idx);
    }

    /// Rebuild from a list of positions, using the slice index as the id
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.clear();
        for (idx, p) in positions.into_iter().enumerate() {
            self.insert(p, idx);
        }
    }

    /// All indices in buckets overlapping the square around `p` of half-side `radius`
    pub fn query_radius(&self, p: Vec2, radius: f32) -> Vec<usize> {
        let mut results = Vec::new();

        let (col_min, row_min) = self.cell_coords(Vec2::new(p.x - radius, p.y - radius));
        let (col_max, row_max) = self.cell_coords(Vec2::new(p.x + radius, p.y + radius));

        for row in row_min..=row_max {
            for col in col_min..=col_max {
                results.extend_from_slice(&self.cells[row * self.cols + col]);
            }
        }

        results
    }

    /// Count entries in the bucket containing `p`
    #[inline]
    pub fn count_at(&self, p: Vec2) -> usize {
        let (col, row) = self.cell_coords(p);
        self.cells[row * self.cols + col].len()
    }
}
