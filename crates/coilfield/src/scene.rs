//! JSON scene descriptions: coil set plus sampling grid

use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::coil::{Coil, HelixParams};
use crate::error::Result;
use crate::grid::GridRange;

/// Top-level scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub coils: Vec<CoilSpec>,
    #[serde(default)]
    pub grid: GridSpec,
}

/// One coil, either generated or given point by point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CoilSpec {
    Helix {
        radius: f64,
        height: f64,
        turns: usize,
        #[serde(default = "default_points_per_turn")]
        points_per_turn: usize,
        #[serde(default)]
        center: [f64; 3],
        current: f64,
    },
    Path {
        points: Vec<[f64; 3]>,
        current: f64,
    },
}

impl CoilSpec {
    pub fn build(&self) -> Result<Coil> {
        match self {
            CoilSpec::Helix {
                radius,
                height,
                turns,
                points_per_turn,
                center,
                current,
            } => {
                let params = HelixParams {
                    radius: *radius,
                    height: *height,
                    turns: *turns,
                    points_per_turn: *points_per_turn,
                    center: Vector3::from(*center),
                };
                Coil::helix(&params, *current)
            }
            CoilSpec::Path { points, current } => Coil::from_xyz(points, *current),
        }
    }
}

/// Sampling grid: per-axis bounds and one resolution shared by all axes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "default_axis_range")]
    pub x: (f64, f64),
    #[serde(default = "default_axis_range")]
    pub y: (f64, f64),
    #[serde(default = "default_axis_range")]
    pub z: (f64, f64),
    #[serde(default = "default_resolution")]
    pub resolution: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            x: default_axis_range(),
            y: default_axis_range(),
            z: default_axis_range(),
            resolution: default_resolution(),
        }
    }
}

impl GridSpec {
    pub fn range(&self) -> GridRange {
        GridRange {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

fn default_points_per_turn() -> usize {
    100
}

fn default_axis_range() -> (f64, f64) {
    (-10.0, 10.0)
}

fn default_resolution() -> usize {
    20
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn build_coils(&self) -> Result<Vec<Coil>> {
        self.coils.iter().map(CoilSpec::build).collect()
    }
}
