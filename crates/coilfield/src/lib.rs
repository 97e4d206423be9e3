//! coilfield: magnetic field of discretized wire coils via the Biot-Savart law
//!
//! This crate provides:
//! - Coil geometry (explicit point paths and a helix generator)
//! - A uniform 3D sampling grid
//! - The per-coil Biot-Savart kernel and a parallel solver that superposes coils
//! - Frame persistence (`.npz` archives of six `.npy` volumes) and index-based playback
//!
//! Units are SI throughout: positions in meters, currents in amperes, field in tesla.

pub mod coil;
pub mod error;
pub mod field;
pub mod grid;
pub mod npy;
pub mod playback;
pub mod scene;
pub mod solver;
pub mod store;
pub mod view;

pub use coil::{helix_points, Coil, HelixParams};
pub use error::{FieldError, Result};
pub use field::{biot_savart, Field, MU0, R_SQ_EPSILON};
pub use grid::{linspace, Axis, Grid, GridRange};
pub use playback::Playback;
pub use scene::{CoilSpec, GridSpec, Scene};
pub use solver::{solve, Solution, Solver, SolverConfig};
pub use store::{frame_key, list_frames, Frame, FrameStore, ARRAY_NAMES, FRAME_EXTENSION};
pub use view::{HeatmapSlice, QuiverSamples};

/// Main entry point: build a scene's coils and solve them on its grid
pub fn solve_scene(scene: &Scene, config: &SolverConfig) -> Result<Solution> {
    let coils = scene.build_coils()?;
    let solver = Solver::new(config)?;
    solver.solve(&coils, &scene.grid.range(), scene.grid.resolution)
}
