//! Read-only views over the terrain occupancy buffer.

use glam::Vec2;

/// Read-only view into the dense terrain occupancy grid.
///
/// Cells are addressed `y * width + x` with `y = 0` at the top of the field.
/// Every query is total: coordinates outside the grid read as empty space and
/// columns outside the grid report a surface at row zero.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    cells: &'a [bool],
    width: u32,
    height: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [bool], width: u32, height: u32) -> Self {
        Self {
            cells,
            width,
            height,
        }
    }

    /// Reports whether the cell at the provided coordinate is solid ground.
    #[must_use]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the cell containing the provided point is solid ground.
    #[must_use]
    pub fn solid_at(&self, point: Vec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.is_solid(point.x.floor() as i32, point.y.floor() as i32)
    }

    /// Row of the topmost solid cell in column `x`.
    ///
    /// Returns the grid height for a column without ground and zero for
    /// columns outside the grid.
    #[must_use]
    pub fn height_at(&self, x: i32) -> i32 {
        let Some(column) = self.column(x) else {
            return 0;
        };

        let width = self.width as usize;
        (0..self.height as usize)
            .find(|row| self.cells.get(row * width + column).copied().unwrap_or(false))
            .map_or(self.height as i32, |row| row as i32)
    }

    /// Surface row beneath a world-space x coordinate.
    #[must_use]
    pub fn surface_below(&self, x: f32) -> f32 {
        if !x.is_finite() {
            return 0.0;
        }
        self.height_at(x.floor() as i32) as f32
    }

    /// Provides the dimensions of the underlying grid as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw occupancy cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &'a [bool] {
        self.cells
    }

    /// Copies the occupancy into a flat byte buffer of length `width * height`,
    /// one byte per cell (`1` solid, `0` empty).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|solid| u8::from(*solid)).collect()
    }

    /// Counts the solid cells in the grid.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|solid| **solid).count()
    }

    fn column(&self, x: i32) -> Option<usize> {
        let column = u32::try_from(x).ok()?;
        (column < self.width).then_some(column as usize)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let column = self.column(x)?;
        let row = u32::try_from(y).ok()?;
        if row >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + column)
    }
}

#[cfg(test)]
mod tests {
    use super::TerrainView;
    use glam::Vec2;

    fn staircase() -> Vec<bool> {
        // 3 columns x 4 rows: column 0 empty, column 1 two cells, column 2 full.
        let mut cells = vec![false; 12];
        for row in 0..4 {
            cells[row * 3 + 2] = true;
        }
        cells[2 * 3 + 1] = true;
        cells[3 * 3 + 1] = true;
        cells
    }

    #[test]
    fn height_at_scans_from_the_top() {
        let cells = staircase();
        let view = TerrainView::new(&cells, 3, 4);

        assert_eq!(view.height_at(0), 4);
        assert_eq!(view.height_at(1), 2);
        assert_eq!(view.height_at(2), 0);
    }

    #[test]
    fn out_of_bounds_queries_fall_back() {
        let cells = staircase();
        let view = TerrainView::new(&cells, 3, 4);

        for x in [i32::MIN, -1, 3, 4, i32::MAX] {
            assert_eq!(view.height_at(x), 0);
            assert!(!view.is_solid(x, 3));
        }
        for y in [i32::MIN, -1, 4, i32::MAX] {
            assert!(!view.is_solid(2, y));
        }
        assert!(!view.solid_at(Vec2::new(f32::NAN, 1.0)));
    }

    #[test]
    fn solid_at_floors_coordinates() {
        let cells = staircase();
        let view = TerrainView::new(&cells, 3, 4);

        assert!(view.solid_at(Vec2::new(1.9, 2.1)));
        assert!(!view.solid_at(Vec2::new(1.9, 1.9)));
    }

    #[test]
    fn bytes_follow_row_major_layout() {
        let cells = staircase();
        let view = TerrainView::new(&cells, 3, 4);
        let bytes = view.to_bytes();

        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[6..9], &[0, 1, 1]);
        assert_eq!(view.solid_count(), 6);
    }
}
