//! Arrays shaped for rendering: 2D heatmap slices and thinned 3D arrow fields

use crate::error::Result;
use crate::field::Field;
use crate::grid::{Axis, Grid};

/// A plane cut out of a scalar volume, normal to `axis`
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapSlice {
    pub axis: Axis,
    pub index: usize,
    pub rows: usize,
    pub cols: usize,
    /// First in-plane coordinate (x for z and y slices, y for x slices)
    pub u: Vec<f64>,
    /// Second in-plane coordinate (y for z slices, z otherwise)
    pub v: Vec<f64>,
    pub values: Vec<f64>,
}

impl HeatmapSlice {
    /// Cut `values` (laid out like `grid`) at `index` along `axis`.
    ///
    /// `None` picks the middle plane. Returns `None` when the index is out of range
    /// or `values` does not match the grid.
    pub fn extract(grid: &Grid, values: &[f64], axis: Axis, index: Option<usize>) -> Option<Self> {
        if values.len() != grid.len() {
            return None;
        }
        let shape = grid.shape();
        let index = index.unwrap_or(shape[axis.index()] / 2);
        if index >= shape[axis.index()] {
            return None;
        }

        let (rows, cols, u_axis, v_axis) = match axis {
            Axis::Z => (shape[0], shape[1], Axis::X, Axis::Y),
            Axis::Y => (shape[0], shape[2], Axis::X, Axis::Z),
            Axis::X => (shape[1], shape[2], Axis::Y, Axis::Z),
        };

        let mut slice = Self {
            axis,
            index,
            rows,
            cols,
            u: Vec::with_capacity(rows * cols),
            v: Vec::with_capacity(rows * cols),
            values: Vec::with_capacity(rows * cols),
        };

        for r in 0..rows {
            for c in 0..cols {
                let (i, j, k) = match axis {
                    Axis::Z => (r, c, index),
                    Axis::Y => (r, index, c),
                    Axis::X => (index, r, c),
                };
                let n = grid.index(i, j, k)?;
                slice.u.push(grid.coords(u_axis)[n]);
                slice.v.push(grid.coords(v_axis)[n]);
                slice.values.push(values[n]);
            }
        }

        Some(slice)
    }

    /// `(min, max)` of the slice values
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// Field vectors at every `stride`-th grid sample along each axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuiverSamples {
    pub positions: Vec<[f64; 3]>,
    pub vectors: Vec<[f64; 3]>,
    pub magnitudes: Vec<f64>,
}

impl QuiverSamples {
    pub fn sample(grid: &Grid, field: &Field, stride: usize) -> Result<Self> {
        field.check_grid(grid)?;
        let stride = stride.max(1);
        let [nx, ny, nz] = grid.shape();

        let mut samples = Self::default();
        for i in (0..nx).step_by(stride) {
            for j in (0..ny).step_by(stride) {
                for k in (0..nz).step_by(stride) {
                    if let (Some(p), Some(b)) = (grid.point(i, j, k), field.at(i, j, k)) {
                        samples.positions.push(p);
                        samples.vectors.push(b);
                        samples.magnitudes.push((b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt());
                    }
                }
            }
        }
        Ok(samples)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::grid::GridRange;

    fn grid() -> Grid {
        let range = GridRange {
            x: (0.0, 2.0),
            y: (0.0, 4.0),
            z: (0.0, 8.0),
        };
        Grid::build(&range, 3).unwrap()
    }

    #[test]
    fn test_z_slice_defaults_to_middle() {
        let grid = grid();
        let values: Vec<f64> = (0..grid.len()).map(|n| n as f64).collect();
        let slice = HeatmapSlice::extract(&grid, &values, Axis::Z, None).unwrap();

        assert_eq!(slice.index, 1);
        assert_eq!((slice.rows, slice.cols), (3, 3));
        // Row-major over (i, j) at k = 1
        assert_eq!(slice.values, vec![1.0, 4.0, 7.0, 10.0, 13.0, 16.0, 19.0, 22.0, 25.0]);
        assert_eq!(slice.u[3], 1.0);
        assert_eq!(slice.v[1], 2.0);
        assert_eq!(slice.value_range(), (1.0, 25.0));
    }

    #[test]
    fn test_x_and_y_slices() {
        let grid = grid();
        let values: Vec<f64> = (0..grid.len()).map(|n| n as f64).collect();

        let x = HeatmapSlice::extract(&grid, &values, Axis::X, Some(2)).unwrap();
        assert_eq!(x.values.first(), Some(&18.0));
        assert_eq!(x.values.last(), Some(&26.0));
        assert_eq!((x.u[8], x.v[8]), (4.0, 8.0));

        let y = HeatmapSlice::extract(&grid, &values, Axis::Y, Some(0)).unwrap();
        assert_eq!(y.values, vec![0.0, 1.0, 2.0, 9.0, 10.0, 11.0, 18.0, 19.0, 20.0]);

        assert!(HeatmapSlice::extract(&grid, &values, Axis::Y, Some(3)).is_none());
        assert!(HeatmapSlice::extract(&grid, &values[1..], Axis::Y, None).is_none());
    }

    #[test]
    fn test_quiver_stride() {
        let grid = grid();
        let field = Field::from_components(grid.shape(), vec![3.0; 27], vec![4.0; 27], vec![0.0; 27]).unwrap();

        let every = QuiverSamples::sample(&grid, &field, 1).unwrap();
        assert_eq!(every.len(), 27);

        let thinned = QuiverSamples::sample(&grid, &field, 2).unwrap();
        assert_eq!(thinned.len(), 8);
        assert_eq!(thinned.positions[7], [2.0, 4.0, 8.0]);
        assert!(thinned.magnitudes.iter().all(|&m| m == 5.0));

        assert_eq!(QuiverSamples::sample(&grid, &field, 0).unwrap().len(), 27);

        let wrong = Field::zeros([2, 2, 2]);
        assert!(matches!(
            QuiverSamples::sample(&grid, &wrong, 1),
            Err(FieldError::ShapeMismatch { .. })
        ));
    }
}
