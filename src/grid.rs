//! Quantized 2D vector grids.
//!
//! A [`VectorGrid`] partitions the drawing surface into `cells_x × cells_y`
//! cells, each holding one precomputed force vector. Grid-backed force
//! fields (vortex, nozzle, waves, turbulence) fill the grid once and then
//! sample it by particle position every frame.
//!
//! Grids can be exported as a [`MapObject`] and re-imported later, which is
//! how otherwise random fields (turbulence) are stored and restored.

use crate::error::{ConfigError, Result};
use crate::vector::{Vector, VectorExt};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// A `cells_x × cells_y` grid of vectors covering a `width × height` surface.
///
/// `vectors.len() == cells_x * cells_y` always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorGrid {
    width: f64,
    height: f64,
    cells_x: usize,
    cells_y: usize,
    cell_width: f64,
    cell_height: f64,
    vectors: Vec<Vector>,
}

/// Serializable snapshot of a grid's dimensions and cell vectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObject {
    pub width: f64,
    pub height: f64,
    pub cells_x: usize,
    pub cells_y: usize,
    pub vectors: Vec<Vector>,
}

impl MapObject {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON. Validation happens in [`VectorGrid::set_map_object`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl VectorGrid {
    /// Create a zeroed grid. Cell counts below 1 are raised to 1.
    pub fn new(width: f64, height: f64, cells_x: usize, cells_y: usize) -> Self {
        let cells_x = cells_x.max(1);
        let cells_y = cells_y.max(1);
        let mut grid = Self {
            width,
            height,
            cells_x,
            cells_y,
            cell_width: width / cells_x as f64,
            cell_height: height / cells_y as f64,
            vectors: Vec::new(),
        };
        grid.clear();
        grid
    }

    /// Build a grid from a map object, validating it first.
    pub fn from_map_object(map: MapObject) -> Result<Self> {
        let mut grid = Self::new(1.0, 1.0, 1, 1);
        grid.set_map_object(map)?;
        Ok(grid)
    }

    /// Reset every cell to the zero vector.
    pub fn clear(&mut self) {
        self.vectors.clear();
        self.vectors.resize(self.cells_x * self.cells_y, Vector::ZERO);
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Always false; a grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// All cell vectors in row-major order.
    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    /// Every `(cx, cy)` cell coordinate in row-major order.
    ///
    /// The iterator does not borrow the grid, so cells can be written while iterating.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (cells_x, cells_y) = (self.cells_x, self.cells_y);
        (0..cells_y).flat_map(move |y| (0..cells_x).map(move |x| (x, y)))
    }

    /// Call `f(cx, cy)` for every cell in row-major order.
    pub fn for_each_cell(&self, mut f: impl FnMut(usize, usize)) {
        for (x, y) in self.cells() {
            f(x, y);
        }
    }

    /// Row-major index of cell `(cx, cy)`.
    #[inline]
    pub fn index_from_cell(&self, cx: usize, cy: usize) -> usize {
        cy * self.cells_x + cx
    }

    /// Index of the cell containing pixel position `(x, y)`, if any.
    #[inline]
    pub fn index_from_position(&self, x: f64, y: f64) -> Option<usize> {
        let fx = (x / self.cell_width).floor();
        let fy = (y / self.cell_height).floor();
        if !fx.is_finite() || !fy.is_finite() || fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (ix, iy) = (fx as usize, fy as usize);
        if ix >= self.cells_x || iy >= self.cells_y {
            return None;
        }
        Some(self.index_from_cell(ix, iy))
    }

    /// Vector of the cell containing `(x, y)`; zero outside the grid.
    #[inline]
    pub fn vector_at_position(&self, x: f64, y: f64) -> Vector {
        self.index_from_position(x, y)
            .map(|i| self.vectors[i])
            .unwrap_or(Vector::ZERO)
    }

    /// Vector of cell `(cx, cy)`, or `None` outside the grid.
    pub fn vector_at_cell(&self, cx: usize, cy: usize) -> Option<Vector> {
        if cx >= self.cells_x || cy >= self.cells_y {
            return None;
        }
        self.vectors.get(self.index_from_cell(cx, cy)).copied()
    }

    /// Vector at row-major index `i`.
    pub fn vector_at_index(&self, i: usize) -> Option<Vector> {
        self.vectors.get(i).copied()
    }

    /// Set the vector of the cell containing `(x, y)`. Ignored outside the grid.
    pub fn set_vector_at_position(&mut self, x: f64, y: f64, v: Vector) {
        if let Some(i) = self.index_from_position(x, y) {
            self.vectors[i] = v;
        }
    }

    /// Set the vector of cell `(cx, cy)`. Ignored for out-of-range cells.
    pub fn set_vector_at_cell(&mut self, cx: usize, cy: usize, v: Vector) {
        if cx < self.cells_x && cy < self.cells_y {
            let i = self.index_from_cell(cx, cy);
            self.vectors[i] = v;
        }
    }

    /// Set the vector at row-major index `i`. Ignored out of range.
    pub fn set_vector_at_index(&mut self, i: usize, v: Vector) {
        if let Some(slot) = self.vectors.get_mut(i) {
            *slot = v;
        }
    }

    /// Center of cell `(cx, cy)` in pixels.
    #[inline]
    pub fn cell_center(&self, cx: usize, cy: usize) -> Vector {
        Vector::new(
            cx as f64 * self.cell_width + self.cell_width * 0.5,
            cy as f64 * self.cell_height + self.cell_height * 0.5,
        )
    }

    /// Angle (radians) and squared distance from point `(x, y)` to the center of cell `(cx, cy)`.
    ///
    /// The angle is that of the vector pointing from the point to the cell.
    pub fn angle_dist(&self, cx: usize, cy: usize, x: f64, y: f64) -> (f64, f64) {
        let d = self.cell_center(cx, cy) - Vector::new(x, y);
        (d.heading(), d.length_squared())
    }

    /// Vector from the center of cell `(cx, cy)` to point `(x, y)`.
    pub fn offset_to(&self, cx: usize, cy: usize, x: f64, y: f64) -> Vector {
        Vector::new(x, y) - self.cell_center(cx, cy)
    }

    /// Scale the covered surface and every cell vector by `f`.
    pub fn scale(&mut self, f: f64) {
        self.width *= f;
        self.height *= f;
        self.cell_width = self.width / self.cells_x as f64;
        self.cell_height = self.height / self.cells_y as f64;
        for v in &mut self.vectors {
            *v *= f;
        }
    }

    /// Snapshot of the grid's dimensions and vectors.
    pub fn map_object(&self) -> MapObject {
        MapObject {
            width: self.width,
            height: self.height,
            cells_x: self.cells_x,
            cells_y: self.cells_y,
            vectors: self.vectors.clone(),
        }
    }

    /// Replace this grid's contents with `map`.
    ///
    /// Fails if the cell counts or dimensions are below 1 or the vector count
    /// does not match `cells_x * cells_y`.
    pub fn set_map_object(&mut self, map: MapObject) -> Result<()> {
        if map.cells_x < 1 || map.cells_y < 1 {
            return Err(ConfigError::InvalidMapObject(format!(
                "cells must be at least 1x1, got {}x{}",
                map.cells_x, map.cells_y
            )));
        }
        if !(map.width >= 1.0 && map.height >= 1.0) {
            return Err(ConfigError::InvalidMapObject(format!(
                "size must be at least 1x1, got {}x{}",
                map.width, map.height
            )));
        }
        let expected = map.cells_x.checked_mul(map.cells_y).ok_or_else(|| {
            ConfigError::InvalidMapObject(format!(
                "cell count {}x{} overflows",
                map.cells_x, map.cells_y
            ))
        })?;
        if map.vectors.len() != expected {
            return Err(ConfigError::InvalidMapObject(format!(
                "expected {} vectors, got {}",
                expected,
                map.vectors.len()
            )));
        }

        self.width = map.width;
        self.height = map.height;
        self.cells_x = map.cells_x;
        self.cells_y = map.cells_y;
        self.cell_width = map.width / map.cells_x as f64;
        self.cell_height = map.height / map.cells_y as f64;
        self.vectors = map.vectors;
        Ok(())
    }

    /// Draw the grid as an image: one line per cell, scaled by the vector's
    /// magnitude, with a dot marking empty cells.
    pub fn to_image(&self, fg: Rgba<u8>, bg: Option<Rgba<u8>>) -> RgbaImage {
        let w = self.width.max(1.0).round() as u32;
        let h = self.height.max(1.0).round() as u32;
        let mut img = RgbaImage::from_pixel(w, h, bg.unwrap_or(Rgba([0, 0, 0, 0])));
        let r = self.cell_width * 0.5;

        for (cx, cy) in self.cells() {
            let center = self.cell_center(cx, cy);
            let v = self.vectors[self.index_from_cell(cx, cy)];
            let f = v.length();
            if f > 0.0 {
                let half = Vector::from_angle_mag(v.heading(), r * f);
                draw_line(&mut img, center - half, center + half, fg);
                put(&mut img, center + half, fg);
            } else {
                put(&mut img, center, fg);
            }
        }
        img
    }
}

fn put(img: &mut RgbaImage, p: Vector, color: Rgba<u8>) {
    if p.x >= 0.0 && p.y >= 0.0 {
        let (x, y) = (p.x as u32, p.y as u32);
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, color);
        }
    }
}

/// DDA line into `img`, clipped per pixel.
pub(crate) fn draw_line(img: &mut RgbaImage, a: Vector, b: Vector, color: Rgba<u8>) {
    let d = b - a;
    let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as usize;
    let step = d / steps as f64;
    let mut p = a;
    for _ in 0..=steps {
        put(img, p, color);
        p += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_zeroed() {
        let grid = VectorGrid::new(100.0, 50.0, 4, 2);
        assert_eq!(grid.len(), 8);
        assert!(grid.vectors().iter().all(|v| *v == Vector::ZERO));
        assert_eq!(grid.cell_width(), 25.0);
        assert_eq!(grid.cell_height(), 25.0);
    }

    #[test]
    fn test_zero_cells_are_raised_to_one() {
        let grid = VectorGrid::new(10.0, 10.0, 0, 0);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_position_lookup_non_square_grid() {
        let mut grid = VectorGrid::new(100.0, 50.0, 4, 2);
        grid.set_vector_at_cell(3, 1, Vector::new(1.0, 2.0));
        assert_eq!(grid.index_from_position(80.0, 30.0), Some(7));
        assert_eq!(grid.vector_at_position(80.0, 30.0), Vector::new(1.0, 2.0));
        assert_eq!(grid.index_from_position(100.0, 10.0), None);
        assert_eq!(grid.index_from_position(-1.0, 10.0), None);
        assert_eq!(grid.vector_at_position(500.0, 500.0), Vector::ZERO);
    }

    #[test]
    fn test_clear_resets_cells() {
        let mut grid = VectorGrid::new(10.0, 10.0, 2, 2);
        grid.set_vector_at_index(2, Vector::ONE);
        grid.clear();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.vector_at_index(2), Some(Vector::ZERO));
    }

    #[test]
    fn test_angle_dist_points_from_target_to_cell() {
        let grid = VectorGrid::new(100.0, 100.0, 10, 10);
        // cell (5, 4) center = (55, 45)
        let (angle, dist) = grid.angle_dist(5, 4, 45.0, 45.0);
        assert_eq!(dist, 100.0);
        assert!(angle.abs() < 1e-12);
        assert_eq!(grid.offset_to(5, 4, 45.0, 45.0), Vector::new(-10.0, 0.0));
    }

    #[test]
    fn test_cells_iterates_row_major() {
        let grid = VectorGrid::new(10.0, 10.0, 3, 2);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[3], (0, 1));

        let mut count = 0;
        grid.for_each_cell(|_, _| count += 1);
        assert_eq!(count, 6);
    }

    #[test]
    fn test_map_object_round_trip() {
        let mut grid = VectorGrid::new(120.0, 80.0, 3, 2);
        for (i, (x, y)) in grid.cells().enumerate() {
            grid.set_vector_at_cell(x, y, Vector::new(i as f64, -(y as f64) * 0.5));
        }

        let json = grid.map_object().to_json().unwrap();
        let restored = VectorGrid::from_map_object(MapObject::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_set_map_object_rejects_mismatched_length() {
        let mut grid = VectorGrid::new(10.0, 10.0, 2, 2);
        let mut map = grid.map_object();
        map.vectors.pop();
        assert!(matches!(grid.set_map_object(map), Err(ConfigError::InvalidMapObject(_))));

        let map = MapObject {
            width: 10.0,
            height: 10.0,
            cells_x: 0,
            cells_y: 2,
            vectors: Vec::new(),
        };
        assert!(grid.set_map_object(map).is_err());
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_set_map_object_rejects_overflowing_cells() {
        let mut grid = VectorGrid::new(10.0, 10.0, 2, 2);
        let map = MapObject {
            width: 10.0,
            height: 10.0,
            cells_x: 1 << 32,
            cells_y: 1 << 32,
            vectors: Vec::new(),
        };
        assert!(matches!(grid.set_map_object(map), Err(ConfigError::InvalidMapObject(_))));
        assert_eq!((grid.cells_x(), grid.cells_y()), (2, 2));
        assert_eq!(grid.len(), 4);

        let map = MapObject {
            width: 10.0,
            height: 10.0,
            cells_x: usize::MAX,
            cells_y: 2,
            vectors: Vec::new(),
        };
        assert!(VectorGrid::from_map_object(map).is_err());
    }

    #[test]
    fn test_set_map_object_rejects_bad_sizes() {
        let mut grid = VectorGrid::new(10.0, 10.0, 2, 2);
        for (width, height) in [(0.0, 10.0), (10.0, 0.5), (f64::NAN, 10.0)] {
            let map = MapObject {
                width,
                height,
                cells_x: 2,
                cells_y: 2,
                vectors: vec![Vector::ZERO; 4],
            };
            assert!(matches!(grid.set_map_object(map), Err(ConfigError::InvalidMapObject(_))));
        }

        let map = MapObject {
            width: 10.0,
            height: 10.0,
            cells_x: 2,
            cells_y: 0,
            vectors: Vec::new(),
        };
        assert!(matches!(grid.set_map_object(map), Err(ConfigError::InvalidMapObject(_))));

        let map = MapObject {
            width: 10.0,
            height: 10.0,
            cells_x: 2,
            cells_y: 2,
            vectors: vec![Vector::ZERO; 5],
        };
        assert!(matches!(grid.set_map_object(map), Err(ConfigError::InvalidMapObject(_))));
        assert_eq!(grid.width(), 10.0);
    }

    #[test]
    fn test_map_object_from_json_rejects_malformed_input() {
        let json = r#"{"width": 20, "height": 20, "cellsX": 0, "cellsY": 1, "vectors": []}"#;
        let map = MapObject::from_json(json).unwrap();
        assert!(VectorGrid::from_map_object(map).is_err());

        let json = r#"{"width": 20, "height": 20, "cellsX": 2, "cellsY": 1, "vectors": [[1.0, 0.0]]}"#;
        let map = MapObject::from_json(json).unwrap();
        assert!(VectorGrid::from_map_object(map).is_err());

        assert!(MapObject::from_json(r#"{"width": 20}"#).is_err());
        assert!(MapObject::from_json(r#"{"width": 20, "height": 20, "cellsX": -1, "cellsY": 1, "vectors": []}"#).is_err());
    }

    #[test]
    fn test_vector_at_cell_rejects_out_of_range() {
        let mut grid = VectorGrid::new(30.0, 20.0, 3, 2);
        grid.set_vector_at_cell(0, 1, Vector::new(1.0, 1.0));
        assert_eq!(grid.vector_at_cell(3, 0), None);
        assert_eq!(grid.vector_at_cell(0, 2), None);
        assert_eq!(grid.vector_at_cell(2, 1), Some(Vector::ZERO));
        assert_eq!(grid.vector_at_cell(0, 1), Some(Vector::new(1.0, 1.0)));
    }

    #[test]
    fn test_scale_one_is_noop() {
        let mut grid = VectorGrid::new(64.0, 32.0, 4, 4);
        grid.set_vector_at_cell(1, 1, Vector::new(0.3, 0.7));
        let before = grid.clone();
        grid.scale(1.0);
        assert_eq!(grid, before);

        grid.scale(2.0);
        assert_eq!(grid.cell_width(), 32.0);
        assert_eq!(grid.vector_at_cell(1, 1), Some(Vector::new(0.6, 1.4)));
    }

    #[test]
    fn test_to_image_dimensions() {
        let mut grid = VectorGrid::new(40.0, 20.0, 4, 2);
        grid.set_vector_at_cell(0, 0, Vector::new(1.0, 0.0));
        let img = grid.to_image(Rgba([255, 255, 255, 255]), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(img.dimensions(), (40, 20));
        // horizontal stroke through the first cell's center row
        assert_eq!(img.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
    }
}
