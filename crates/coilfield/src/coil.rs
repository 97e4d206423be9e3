//! Discretized current-carrying coils
//!
//! A coil is an ordered point path plus a signed current. Segment displacement
//! vectors are derived once at construction; the point path is never mutated
//! afterwards, so the cached segments cannot go stale.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::error::{FieldError, Result};
use crate::grid::linspace;

/// A discretized current path used as a field source
#[derive(Clone, Debug, PartialEq)]
pub struct Coil {
    points: Vec<Vector3<f64>>,
    segments: Vec<Vector3<f64>>,
    current: f64,
}

impl Coil {
    /// Build a coil from an ordered point path and a current (A).
    ///
    /// Current flows in point order; a negative current reverses it.
    pub fn new(points: Vec<Vector3<f64>>, current: f64) -> Result<Self> {
        if points.len() < 2 {
            return Err(FieldError::InvalidGeometry {
                points: points.len(),
            });
        }

        let segments = points.windows(2).map(|pair| pair[1] - pair[0]).collect();

        Ok(Self {
            points,
            segments,
            current,
        })
    }

    /// Build a coil from raw `[x, y, z]` triples
    pub fn from_xyz(points: &[[f64; 3]], current: f64) -> Result<Self> {
        let points = points.iter().map(|p| Vector3::new(p[0], p[1], p[2])).collect();
        Self::new(points, current)
    }

    /// Helical coil traced by [`helix_points`]
    pub fn helix(params: &HelixParams, current: f64) -> Result<Self> {
        Self::new(helix_points(params)?, current)
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// `segments[i] = points[i + 1] - points[i]`
    pub fn segments(&self) -> &[Vector3<f64>] {
        &self.segments
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

/// Helix generator parameters
#[derive(Clone, Debug, PartialEq)]
pub struct HelixParams {
    pub radius: f64,
    /// Axial extent; z runs from 0 to `height` before the center offset
    pub height: f64,
    pub turns: usize,
    pub points_per_turn: usize,
    pub center: Vector3<f64>,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height: 1.0,
            turns: 1,
            points_per_turn: 100,
            center: Vector3::zeros(),
        }
    }
}

/// Points of a helix about the z axis.
///
/// Produces `turns * points_per_turn` samples with the angle spread evenly over
/// `[0, 2π·turns]` and z spread evenly over `[0, height]` (both endpoints included),
/// then shifted by `center`. A point count that overflows `usize` is rejected as
/// `InvalidGeometry`.
pub fn helix_points(params: &HelixParams) -> Result<Vec<Vector3<f64>>> {
    let n = params
        .turns
        .checked_mul(params.points_per_turn)
        .ok_or(FieldError::InvalidGeometry { points: usize::MAX })?;
    let theta = linspace(0.0, 2.0 * PI * params.turns as f64, n);
    let z = linspace(0.0, params.height, n);

    let points = theta
        .iter()
        .zip(&z)
        .map(|(&t, &z)| {
            Vector3::new(
                params.radius * t.cos() + params.center.x,
                params.radius * t.sin() + params.center.y,
                z + params.center.z,
            )
        })
        .collect();
    Ok(points)
}
