//! Uniform 3D sampling lattice
//!
//! Coordinates are stored as three full volumes (structure-of-arrays), one per axis,
//! in `ij` meshgrid order: x varies slowest, z fastest. Every field array derived from
//! a grid uses the same flat indexing, `(i * ny + j) * nz + k`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// Cartesian axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Per-axis `(min, max)` sampling bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridRange {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

impl Default for GridRange {
    fn default() -> Self {
        Self::uniform(-10.0, 10.0)
    }
}

impl GridRange {
    /// Same bounds on all three axes
    pub fn uniform(min: f64, max: f64) -> Self {
        Self {
            x: (min, max),
            y: (min, max),
            z: (min, max),
        }
    }

    pub fn axis(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Reject empty, inverted, or non-finite axis ranges
    pub fn validate(&self) -> Result<()> {
        for axis in Axis::ALL {
            let (min, max) = self.axis(axis);
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(FieldError::InvalidRange { axis, min, max });
            }
        }
        Ok(())
    }
}

/// `n` evenly spaced samples over `[start, stop]`, endpoint included.
///
/// A single sample sits at `start`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut samples: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            samples[n - 1] = stop;
            samples
        }
    }
}

/// Number of samples in a volume of the given shape, `None` if it overflows `usize`
pub fn volume_len(shape: [usize; 3]) -> Option<usize> {
    shape[0].checked_mul(shape[1])?.checked_mul(shape[2])
}

/// Regular lattice of sample points, immutable once built
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    shape: [usize; 3],
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl Grid {
    /// Cartesian product of `resolution` samples per axis over `range`
    pub fn build(range: &GridRange, resolution: usize) -> Result<Self> {
        let shape = [resolution; 3];
        let len = match volume_len(shape) {
            Some(len) if len > 0 => len,
            _ => return Err(FieldError::InvalidResolution(resolution)),
        };
        range.validate()?;

        let xs = linspace(range.x.0, range.x.1, resolution);
        let ys = linspace(range.y.0, range.y.1, resolution);
        let zs = linspace(range.z.0, range.z.1, resolution);

        let mut x = Vec::with_capacity(len);
        let mut y = Vec::with_capacity(len);
        let mut z = Vec::with_capacity(len);

        for &xi in &xs {
            for &yj in &ys {
                for &zk in &zs {
                    x.push(xi);
                    y.push(yj);
                    z.push(zk);
                }
            }
        }

        Ok(Self { shape, x, y, z })
    }

    /// Assemble a grid from coordinate volumes already laid out in grid order
    pub fn from_volumes(shape: [usize; 3], x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        // No volume can hold an overflowing sample count
        let expected = volume_len(shape).unwrap_or(usize::MAX);
        for volume in [&x, &y, &z] {
            if volume.len() != expected {
                return Err(FieldError::LengthMismatch {
                    expected,
                    found: volume.len(),
                });
            }
        }
        Ok(Self { shape, x, y, z })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn coords(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Flat offset of sample `(i, j, k)`
    pub fn index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        let [nx, ny, nz] = self.shape;
        (i < nx && j < ny && k < nz).then(|| (i * ny + j) * nz + k)
    }

    pub fn point(&self, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        let n = self.index(i, j, k)?;
        Some([self.x[n], self.y[n], self.z[n]])
    }

    /// Index of the middle sample on each axis (`n / 2`)
    pub fn center_index(&self) -> [usize; 3] {
        self.shape.map(|n| n / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let samples = linspace(-2.0, 2.0, 5);
        assert_eq!(samples, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_build_ij_order() {
        let range = GridRange {
            x: (0.0, 1.0),
            y: (10.0, 12.0),
            z: (-4.0, 4.0),
        };
        let grid = Grid::build(&range, 3).unwrap();
        assert_eq!(grid.shape(), [3, 3, 3]);
        assert_eq!(grid.len(), 27);

        // z varies fastest, x slowest
        assert_eq!(grid.point(0, 0, 0), Some([0.0, 10.0, -4.0]));
        assert_eq!(grid.point(0, 0, 1), Some([0.0, 10.0, 0.0]));
        assert_eq!(grid.point(0, 1, 0), Some([0.0, 11.0, -4.0]));
        assert_eq!(grid.point(1, 0, 0), Some([0.5, 10.0, -4.0]));
        assert_eq!(grid.point(2, 2, 2), Some([1.0, 12.0, 4.0]));
        assert_eq!(grid.index(1, 2, 0), Some(15));
        assert_eq!(grid.point(3, 0, 0), None);
    }

    #[test]
    fn test_resolution_applies_to_every_axis() {
        let range = GridRange {
            x: (-1.0, 1.0),
            y: (-100.0, 100.0),
            z: (0.0, 0.5),
        };
        let grid = Grid::build(&range, 4).unwrap();
        assert_eq!(grid.shape(), [4, 4, 4]);
    }

    #[test]
    fn test_degenerate_range_rejected() {
        let mut range = GridRange::uniform(-1.0, 1.0);
        range.y = (2.0, 2.0);
        match Grid::build(&range, 5) {
            Err(FieldError::InvalidRange { axis, .. }) => assert_eq!(axis, Axis::Y),
            other => panic!("Expected InvalidRange, got {:?}", other),
        }

        range.y = (3.0, -3.0);
        assert!(matches!(Grid::build(&range, 5), Err(FieldError::InvalidRange { .. })));

        range.y = (f64::NAN, 1.0);
        assert!(matches!(Grid::build(&range, 5), Err(FieldError::InvalidRange { .. })));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let range = GridRange::default();
        assert!(matches!(Grid::build(&range, 0), Err(FieldError::InvalidResolution(0))));
    }

    #[test]
    fn test_overflowing_resolution_rejected() {
        let range = GridRange::default();
        assert!(matches!(
            Grid::build(&range, usize::MAX),
            Err(FieldError::InvalidResolution(usize::MAX))
        ));
        // Cube of 2^22 samples per axis overflows a 64-bit count
        assert!(matches!(
            Grid::build(&range, 1 << 22),
            Err(FieldError::InvalidResolution(_))
        ));
        assert_eq!(volume_len([usize::MAX, 2, 1]), None);
        assert_eq!(volume_len([3, 4, 5]), Some(60));
    }

    #[test]
    fn test_from_volumes_checks_length() {
        let err = Grid::from_volumes([2, 1, 1], vec![0.0, 1.0], vec![0.0], vec![0.0, 0.0]);
        assert!(matches!(err, Err(FieldError::LengthMismatch { expected: 2, found: 1 })));
    }

    #[test]
    fn test_from_volumes_overflowing_shape() {
        let err = Grid::from_volumes([usize::MAX, 2, 1], vec![0.0], vec![0.0], vec![0.0]);
        assert!(matches!(err, Err(FieldError::LengthMismatch { expected: usize::MAX, found: 1 })));
    }
}
