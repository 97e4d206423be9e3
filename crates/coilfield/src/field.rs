//! Magnetic field computation using the Biot-Savart law
//!
//! Sums straight-segment contributions from a discretized coil over every sample of a
//! [`Grid`]. No far-field cutoff is applied: each segment touches each grid point.

use std::f64::consts::PI;

use crate::coil::Coil;
use crate::error::{FieldError, Result};
use crate::grid::{volume_len, Grid};

/// Permeability of free space (H/m)
pub const MU0: f64 = 4.0 * PI * 1e-7;

/// Added to every squared source distance so coincident points stay finite
pub const R_SQ_EPSILON: f64 = 1e-12;

/// Sampled vector field, laid out in the same order as the grid that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    shape: [usize; 3],
    bx: Vec<f64>,
    by: Vec<f64>,
    bz: Vec<f64>,
}

impl Field {
    /// All-zero field.
    ///
    /// # Panics
    ///
    /// If the sample count of `shape` overflows `usize`, as `vec!` would.
    pub fn zeros(shape: [usize; 3]) -> Self {
        let len = volume_len(shape).unwrap_or(usize::MAX);
        Self {
            shape,
            bx: vec![0.0; len],
            by: vec![0.0; len],
            bz: vec![0.0; len],
        }
    }

    /// Assemble a field from component volumes already laid out in grid order
    pub fn from_components(shape: [usize; 3], bx: Vec<f64>, by: Vec<f64>, bz: Vec<f64>) -> Result<Self> {
        let expected = volume_len(shape).unwrap_or(usize::MAX);
        for component in [&bx, &by, &bz] {
            if component.len() != expected {
                return Err(FieldError::LengthMismatch {
                    expected,
                    found: component.len(),
                });
            }
        }
        Ok(Self { shape, bx, by, bz })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.bx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bx.is_empty()
    }

    pub fn bx(&self) -> &[f64] {
        &self.bx
    }

    pub fn by(&self) -> &[f64] {
        &self.by
    }

    pub fn bz(&self) -> &[f64] {
        &self.bz
    }

    /// `[Bx, By, Bz]` at sample `(i, j, k)`
    pub fn at(&self, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        let [nx, ny, nz] = self.shape;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        let n = (i * ny + j) * nz + k;
        Some([self.bx[n], self.by[n], self.bz[n]])
    }

    /// |B| per sample, computed on demand
    pub fn magnitude(&self) -> Vec<f64> {
        self.bx
            .iter()
            .zip(&self.by)
            .zip(&self.bz)
            .map(|((bx, by), bz)| (bx * bx + by * by + bz * bz).sqrt())
            .collect()
    }

    /// Largest |B| over all samples (0 for an empty field)
    pub fn max_magnitude(&self) -> f64 {
        self.magnitude().into_iter().fold(0.0, f64::max)
    }

    /// Error unless this field was sampled on a grid of `grid`'s shape
    pub fn check_grid(&self, grid: &Grid) -> Result<()> {
        if self.shape != grid.shape() {
            return Err(FieldError::ShapeMismatch {
                expected: grid.shape(),
                found: self.shape,
            });
        }
        Ok(())
    }

    /// Element-wise `self += other`
    pub fn accumulate(&mut self, other: &Field) -> Result<()> {
        if self.shape != other.shape {
            return Err(FieldError::ShapeMismatch {
                expected: self.shape,
                found: other.shape,
            });
        }
        self.add_samples(other);
        Ok(())
    }

    pub(crate) fn add_samples(&mut self, other: &Field) {
        for (acc, v) in self.bx.iter_mut().zip(&other.bx) {
            *acc += v;
        }
        for (acc, v) in self.by.iter_mut().zip(&other.by) {
            *acc += v;
        }
        for (acc, v) in self.bz.iter_mut().zip(&other.bz) {
            *acc += v;
        }
    }
}

/// Field contributed by one coil at every sample of `grid`.
///
/// For each segment `ds` anchored at point `p`, every grid point gets
/// `μ0 · I · (ds × r) / (|r|² + ε)^(3/2)` with `r = grid_point - p`.
/// Pure: safe to call concurrently for different coils on a shared grid.
pub fn biot_savart(coil: &Coil, grid: &Grid) -> Field {
    let mut field = Field::zeros(grid.shape());
    let scale = MU0 * coil.current();

    let (gx, gy, gz) = (grid.x(), grid.y(), grid.z());

    for (p, ds) in coil.points().iter().zip(coil.segments()) {
        for n in 0..gx.len() {
            // Vector from segment start to field point
            let rx = gx[n] - p.x;
            let ry = gy[n] - p.y;
            let rz = gz[n] - p.z;
            let r_sq = rx * rx + ry * ry + rz * rz + R_SQ_EPSILON;
            let r3 = r_sq.powf(1.5);

            // ds × r
            let cross_x = ds.y * rz - ds.z * ry;
            let cross_y = ds.z * rx - ds.x * rz;
            let cross_z = ds.x * ry - ds.y * rx;

            field.bx[n] += scale * (cross_x / r3);
            field.by[n] += scale * (cross_y / r3);
            field.bz[n] += scale * (cross_z / r3);
        }
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRange;

    fn single_point_grid(p: [f64; 3]) -> Grid {
        Grid::from_volumes([1, 1, 1], vec![p[0]], vec![p[1]], vec![p[2]]).unwrap()
    }

    #[test]
    fn test_single_segment_direction_and_magnitude() {
        // Segment along +x from the origin, field point off-axis
        let coil = Coil::from_xyz(&[[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]], 2.0).unwrap();
        let p = [0.3, 0.8, -0.4];
        let field = biot_savart(&coil, &single_point_grid(p));
        let b = field.at(0, 0, 0).unwrap();

        let ds = [0.5, 0.0, 0.0];
        let dot = |a: [f64; 3], c: [f64; 3]| a[0] * c[0] + a[1] * c[1] + a[2] * c[2];
        let b_norm = dot(b, b).sqrt();
        assert!(b_norm > 0.0);
        assert!(dot(b, ds).abs() / b_norm < 1e-12, "B must be perpendicular to ds");
        assert!(dot(b, p).abs() / b_norm < 1e-12, "B must be perpendicular to r");

        // |ds × r| = 0.5 * sqrt(0.8² + 0.4²)
        let cross_norm = 0.5 * (0.8f64 * 0.8 + 0.4 * 0.4).sqrt();
        let r_sq = dot(p, p) + R_SQ_EPSILON;
        let expected = MU0 * 2.0 * cross_norm / r_sq.powf(1.5);
        assert!((b_norm - expected).abs() <= 1e-12 * expected);
    }

    #[test]
    fn test_right_hand_rule() {
        // Current along +x, point at +y: ds × r points along +z
        let coil = Coil::from_xyz(&[[-0.5, 0.0, 0.0], [0.5, 0.0, 0.0]], 1.0).unwrap();
        let b = biot_savart(&coil, &single_point_grid([-0.5, 1.0, 0.0])).at(0, 0, 0).unwrap();
        assert!(b[2] > 0.0);
        assert!(b[0].abs() < 1e-30 && b[1].abs() < 1e-30);

        // Reversing the current flips the field
        let reversed = Coil::from_xyz(&[[-0.5, 0.0, 0.0], [0.5, 0.0, 0.0]], -1.0).unwrap();
        let b_rev = biot_savart(&reversed, &single_point_grid([-0.5, 1.0, 0.0])).at(0, 0, 0).unwrap();
        assert!((b_rev[2] + b[2]).abs() < 1e-20);
    }

    #[test]
    fn test_coincident_point_stays_finite() {
        let coil = Coil::from_xyz(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], 1.0).unwrap();
        let field = biot_savart(&coil, &single_point_grid([0.0, 0.0, 0.0]));
        for v in field.at(0, 0, 0).unwrap() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_field_scales_with_current() {
        let grid = Grid::build(&GridRange::uniform(-1.0, 1.0), 3).unwrap();
        let path = [[0.0, -0.2, 0.1], [0.3, 0.4, 0.2], [-0.2, 0.1, 0.5]];
        let one = biot_savart(&Coil::from_xyz(&path, 1.0).unwrap(), &grid);
        let three = biot_savart(&Coil::from_xyz(&path, 3.0).unwrap(), &grid);
        let tol = 1e-12 * three.max_magnitude();
        for (a, b) in one.bx().iter().zip(three.bx()) {
            assert!((3.0 * a - b).abs() <= tol);
        }
    }

    #[test]
    fn test_magnitude_and_accumulate() {
        let mut a = Field::from_components([1, 1, 2], vec![3.0, 0.0], vec![4.0, 1.0], vec![0.0, 0.0]).unwrap();
        assert_eq!(a.magnitude(), vec![5.0, 1.0]);
        assert_eq!(a.max_magnitude(), 5.0);

        let b = Field::from_components([1, 1, 2], vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]).unwrap();
        a.accumulate(&b).unwrap();
        assert_eq!(a.at(0, 0, 1), Some([1.0, 2.0, 1.0]));

        let other_shape = Field::zeros([2, 1, 1]);
        assert!(matches!(a.accumulate(&other_shape), Err(FieldError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_components_overflowing_shape() {
        let err = Field::from_components([usize::MAX, usize::MAX, 1], vec![], vec![], vec![]);
        assert!(matches!(err, Err(FieldError::LengthMismatch { expected: usize::MAX, found: 0 })));
    }
}
