//! Destructible cell terrain and its procedural generator.

use artillery_core::TerrainView;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ENDPOINT_MIN: f32 = 0.3;
const ENDPOINT_MAX: f32 = 0.7;

/// Dense occupancy grid addressed `y * width + x`, with row zero at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Terrain {
    /// Generates a fractal landscape by recursive midpoint displacement.
    ///
    /// The same `width`, `seed` and `roughness` always yield bit-identical
    /// occupancy. Each column is filled from the bottom up to its profile
    /// height.
    #[must_use]
    pub fn generate(width: u32, height: u32, seed: u64, roughness: f32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let profile = height_profile(width as usize, roughness, &mut rng);

        let mut terrain = Self::empty(width, height);
        for (column, fraction) in profile.into_iter().enumerate() {
            let filled = ((fraction * height as f32).floor() as u32).min(height);
            for row in height - filled..height {
                terrain.set(column as u32, row, true);
            }
        }
        terrain
    }

    /// Creates terrain whose every column is solid from `surface_row` down.
    #[must_use]
    pub fn flat(width: u32, height: u32, surface_row: u32) -> Self {
        let mut terrain = Self::empty(width, height);
        for row in surface_row.min(height)..height {
            for column in 0..width {
                terrain.set(column, row, true);
            }
        }
        terrain
    }

    /// Rebuilds terrain from a row-major occupancy buffer.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<bool>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        (cells.len() == expected).then_some(Self {
            width,
            height,
            cells,
        })
    }

    fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Borrows the occupancy as a read-only view.
    #[must_use]
    pub fn view(&self) -> TerrainView<'_> {
        TerrainView::new(&self.cells, self.width, self.height)
    }

    /// Reports whether a cell is solid; false outside the grid.
    #[must_use]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.view().is_solid(x, y)
    }

    /// Topmost solid row of column `x`; see [`TerrainView::height_at`].
    #[must_use]
    pub fn height_at(&self, x: i32) -> i32 {
        self.view().height_at(x)
    }

    /// Clears every cell whose center lies within `radius` of `center`, then
    /// lets unsupported cells fall.
    pub fn explode(&mut self, center: Vec2, radius: f32) {
        self.fill_disk(center, radius, false);
        self.settle();
    }

    /// Marks every cell whose center lies within `radius` of `center` solid.
    ///
    /// Added mass is self-supporting and never settles on its own.
    pub fn add_mass(&mut self, center: Vec2, radius: f32) {
        self.fill_disk(center, radius, true);
    }

    /// Drops every unsupported cell onto the first obstruction below it.
    pub fn settle(&mut self) {
        let width = self.width as usize;
        for column in 0..width {
            let mut write = self.height as usize;
            for row in (0..self.height as usize).rev() {
                let index = row * width + column;
                if !self.cells[index] {
                    continue;
                }
                write -= 1;
                if write != row {
                    self.cells[write * width + column] = true;
                    self.cells[index] = false;
                }
            }
        }
    }

    fn fill_disk(&mut self, center: Vec2, radius: f32, solid: bool) {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return;
        }
        if self.width == 0 || self.height == 0 {
            return;
        }

        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let min_column = ((center.x - radius).floor() as i64).max(0);
        let max_column = ((center.x + radius).ceil() as i64).min(max_x);
        let min_row = ((center.y - radius).floor() as i64).max(0);
        let max_row = ((center.y + radius).ceil() as i64).min(max_y);

        let radius_sq = radius * radius;
        for row in min_row..=max_row {
            for column in min_column..=max_column {
                let cell_center = Vec2::new(column as f32 + 0.5, row as f32 + 0.5);
                if cell_center.distance_squared(center) <= radius_sq {
                    self.set(column as u32, row as u32, solid);
                }
            }
        }
    }

    fn set(&mut self, column: u32, row: u32, solid: bool) {
        let index = row as usize * self.width as usize + column as usize;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = solid;
        }
    }
}

fn height_profile(width: usize, roughness: f32, rng: &mut ChaCha8Rng) -> Vec<f32> {
    if width == 0 {
        return Vec::new();
    }

    let mut heights = vec![0.0; width];
    heights[0] = rng.gen_range(ENDPOINT_MIN..ENDPOINT_MAX);
    if width == 1 {
        return heights;
    }

    let last = width - 1;
    heights[last] = rng.gen_range(ENDPOINT_MIN..ENDPOINT_MAX);
    displace(&mut heights, 0, last, roughness, rng);
    heights
}

fn displace(heights: &mut [f32], start: usize, end: usize, roughness: f32, rng: &mut ChaCha8Rng) {
    if end - start <= 1 {
        return;
    }

    let mid = (start + end) / 2;
    let spread = ((heights[end] - heights[start]) * roughness).abs();
    let offset = if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    };
    heights[mid] = ((heights[start] + heights[end]) / 2.0 + offset).clamp(0.0, 1.0);

    displace(heights, start, mid, roughness * 0.5, rng);
    displace(heights, mid, end, roughness * 0.5, rng);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_settled(terrain: &Terrain) {
        for column in 0..terrain.width() as i32 {
            for row in 0..terrain.height() as i32 - 1 {
                if terrain.is_solid(column, row) {
                    assert!(
                        terrain.is_solid(column, row + 1),
                        "floating cell at ({column}, {row})"
                    );
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let first = Terrain::generate(200, 120, 99, 0.7);
        let second = Terrain::generate(200, 120, 99, 0.7);
        assert_eq!(first.view().to_bytes(), second.view().to_bytes());

        let other = Terrain::generate(200, 120, 100, 0.7);
        assert_ne!(first.view().to_bytes(), other.view().to_bytes());
    }

    #[test]
    fn generated_columns_are_filled_from_the_bottom() {
        let terrain = Terrain::generate(257, 100, 7, 0.9);
        assert_settled(&terrain);

        for edge in [0, 256] {
            let surface = terrain.height_at(edge);
            assert!((30..=71).contains(&surface), "edge surface {surface}");
        }
    }

    #[test]
    fn degenerate_widths_do_not_panic() {
        let empty = Terrain::generate(0, 10, 1, 0.5);
        assert_eq!(empty.view().solid_count(), 0);

        let single = Terrain::generate(1, 10, 1, 0.5);
        let filled = single.view().solid_count();
        assert!((2..=7).contains(&filled));
    }

    #[test]
    fn zero_roughness_interpolates_between_endpoints() {
        let terrain = Terrain::generate(65, 1_000, 3, 0.0);
        let left = terrain.height_at(0);
        let right = terrain.height_at(64);
        let middle = terrain.height_at(32);
        let (low, high) = (left.min(right), left.max(right));
        assert!(middle >= low - 1 && middle <= high + 1);
    }

    #[test]
    fn explosion_clears_the_disk_and_nothing_else() {
        let mut terrain = Terrain::flat(100, 60, 30);
        let before = terrain.clone();
        let center = Vec2::new(50.0, 30.0);
        let radius = 12.0;

        terrain.explode(center, radius);

        for row in 0..60 {
            for column in 0..100 {
                let cell_center = Vec2::new(column as f32 + 0.5, row as f32 + 0.5);
                let inside = cell_center.distance_squared(center) <= radius * radius;
                if inside {
                    assert!(!terrain.is_solid(column, row));
                } else {
                    assert_eq!(
                        terrain.is_solid(column, row),
                        before.is_solid(column, row),
                        "cell ({column}, {row}) changed"
                    );
                }
            }
        }
        assert_settled(&terrain);
    }

    #[test]
    fn buried_explosion_lets_overhang_collapse() {
        let mut terrain = Terrain::flat(80, 80, 20);
        let before = terrain.view().solid_count();

        terrain.explode(Vec2::new(40.0, 50.0), 10.0);

        assert_settled(&terrain);
        assert!(terrain.view().solid_count() < before);
        assert!(terrain.height_at(40) > 20);
        assert_eq!(terrain.height_at(5), 20);
    }

    #[test]
    fn settle_preserves_column_mass() {
        let mut cells = vec![false; 3 * 6];
        // Column 1 holds isolated cells at rows 0, 2 and 5.
        for row in [0_usize, 2, 5] {
            cells[row * 3 + 1] = true;
        }
        let mut terrain = Terrain::from_cells(3, 6, cells).expect("matching buffer");

        terrain.settle();

        assert_eq!(terrain.height_at(1), 3);
        assert_eq!(terrain.view().solid_count(), 3);
        assert_settled(&terrain);
    }

    #[test]
    fn added_mass_floats_until_disturbed() {
        let mut terrain = Terrain::flat(60, 60, 50);
        terrain.add_mass(Vec2::new(30.0, 10.0), 4.0);

        assert!(terrain.is_solid(30, 10));
        assert!(!terrain.is_solid(30, 20));
        assert_eq!(terrain.height_at(30), 6);
    }

    #[test]
    fn disk_operations_clip_to_the_grid() {
        let mut terrain = Terrain::flat(20, 20, 10);
        terrain.explode(Vec2::new(-5.0, 25.0), 15.0);
        terrain.add_mass(Vec2::new(25.0, 15.0), 8.0);
        terrain.explode(Vec2::new(f32::NAN, 5.0), 3.0);

        assert_eq!(terrain.view().cells().len(), 400);
        assert_settled(&terrain);
    }

    #[test]
    fn mismatched_buffers_are_refused() {
        assert!(Terrain::from_cells(4, 4, vec![false; 15]).is_none());
        assert!(Terrain::from_cells(4, 4, vec![false; 16]).is_some());
    }
}
