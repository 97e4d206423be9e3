//! End-to-end: solve coil scenes, export frames, and play them back

use coilfield::{
    frame_key, list_frames, solve, Coil, FieldError, FrameStore, GridRange, HelixParams, Playback, Solver,
};
use nalgebra::Vector3;
use pretty_assertions::assert_eq;

fn helix(current: f64) -> Coil {
    let params = HelixParams {
        radius: 1.0,
        height: 1.0,
        turns: 2,
        points_per_turn: 50,
        center: Vector3::zeros(),
    };
    Coil::helix(&params, current).unwrap()
}

#[test]
fn export_and_replay_current_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path());
    let solver = Solver::default();
    let range = GridRange::uniform(-2.0, 2.0);

    // Save out of order; playback order follows the keys
    let currents = [1.0, 2.0, 3.0];
    for index in [2usize, 0, 1] {
        let solution = solver.solve(&[helix(currents[index])], &range, 5).unwrap();
        store.save(&frame_key(index), &solution.grid, &solution.field).unwrap();
    }

    assert_eq!(
        list_frames(dir.path()).unwrap(),
        vec!["frame_0000", "frame_0001", "frame_0002"]
    );

    let mut playback = Playback::open(dir.path()).unwrap();
    let mut centers = Vec::new();
    for _ in 0..playback.len() {
        let frame = playback.current().unwrap();
        assert_eq!(frame.grid.shape(), [5, 5, 5]);
        let [i, j, k] = frame.grid.center_index();
        let b = frame.field.at(i, j, k).unwrap();
        centers.push((b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt());
        playback.advance();
    }

    // Field is linear in current
    assert!(centers[0] > 0.0);
    assert!((centers[1] / centers[0] - 2.0).abs() < 1e-9);
    assert!((centers[2] / centers[0] - 3.0).abs() < 1e-9);
}

#[test]
fn round_trip_matches_solver_output() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path());

    let coils = [helix(1.0), helix(-0.5)];
    let solution = solve(&coils, &GridRange::uniform(-1.5, 1.5), 6).unwrap();
    store.save("frame_0000", &solution.grid, &solution.field).unwrap();

    let frame = store.load("frame_0000").unwrap();
    assert_eq!(frame.grid, *solution.grid);
    assert_eq!(frame.field, solution.field);
}

#[test]
fn missing_folder_and_frame_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");

    assert!(matches!(list_frames(&missing), Err(FieldError::Io(_))));
    assert!(matches!(
        FrameStore::new(&missing).load("frame_0000"),
        Err(FieldError::FrameNotFound(_))
    ));
}
