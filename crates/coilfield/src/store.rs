//! Frame persistence
//!
//! A frame is one `.npz` archive (ZIP, deflate) holding six `.npy` volumes:
//! `grid_x`, `grid_y`, `grid_z`, `Bx`, `By`, `Bz`. Keys are file stems inside the
//! store folder, so `frame_0003` lives at `<folder>/frame_0003.npz`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{FieldError, Result};
use crate::field::Field;
use crate::grid::Grid;
use crate::npy;

/// File extension recognized as a frame
pub const FRAME_EXTENSION: &str = "npz";

/// Archive entries in write order
pub const ARRAY_NAMES: [&str; 6] = ["grid_x", "grid_y", "grid_z", "Bx", "By", "Bz"];

/// Zero-padded key for a frame sequence number, e.g. `frame_0007`
pub fn frame_key(index: usize) -> String {
    format!("frame_{:04}", index)
}

/// A stored (grid, field) snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub grid: Grid,
    pub field: Field,
}

/// Folder-backed frame storage
#[derive(Debug, Clone)]
pub struct FrameStore {
    folder: PathBuf,
}

impl FrameStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Archive path for `key`; a trailing `.npz` on the key is ignored.
    ///
    /// Keys name a file directly inside the folder: separators, `..` and a leading
    /// `.` are rejected with `InvalidKey`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let stem = key_stem(key)?;
        Ok(self.folder.join(format!("{}.{}", stem, FRAME_EXTENSION)))
    }

    /// Write one frame under `key`.
    ///
    /// The archive is assembled in a temporary file in the same folder and renamed
    /// into place, so readers only ever see a complete frame under the final name.
    pub fn save(&self, key: &str, grid: &Grid, field: &Field) -> Result<PathBuf> {
        field.check_grid(grid)?;
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.folder)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".frame-")
            .suffix(".tmp")
            .tempfile_in(&self.folder)?;

        {
            let mut zip = ZipWriter::new(BufWriter::new(tmp.as_file_mut()));
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            let shape = grid.shape();
            let volumes = [grid.x(), grid.y(), grid.z(), field.bx(), field.by(), field.bz()];

            for (name, data) in ARRAY_NAMES.iter().zip(volumes) {
                zip.start_file(format!("{}.npy", name), options).map_err(zip_io)?;
                zip.write_all(&npy::encode(&shape, data))?;
            }

            let mut writer = zip.finish().map_err(zip_io)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| FieldError::Io(e.error))?;

        debug!("Saved frame {:?} ({:?} samples)", path, grid.shape());
        Ok(path)
    }

    /// Read back the frame stored under `key`
    pub fn load(&self, key: &str) -> Result<Frame> {
        let path = self.path_for(key)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FieldError::FrameNotFound(path)),
            Err(e) => return Err(e.into()),
        };

        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| FieldError::corrupt(&path, e.to_string()))?;

        let mut shape: Option<[usize; 3]> = None;
        let mut volumes: Vec<Vec<f64>> = Vec::with_capacity(ARRAY_NAMES.len());

        for name in ARRAY_NAMES {
            let mut bytes = Vec::new();
            match archive.by_name(&format!("{}.npy", name)) {
                Ok(mut entry) => {
                    entry
                        .read_to_end(&mut bytes)
                        .map_err(|e| FieldError::corrupt(&path, format!("{}: {}", name, e)))?;
                }
                Err(ZipError::FileNotFound) => {
                    return Err(FieldError::corrupt(&path, format!("missing array {}", name)));
                }
                Err(e) => return Err(FieldError::corrupt(&path, format!("{}: {}", name, e))),
            }

            let array = npy::decode(&bytes)
                .map_err(|reason| FieldError::corrupt(&path, format!("{}: {}", name, reason)))?;
            let array_shape: [usize; 3] = array
                .shape
                .as_slice()
                .try_into()
                .map_err(|_| FieldError::corrupt(&path, format!("{} is not a 3D array", name)))?;

            match shape {
                None => shape = Some(array_shape),
                Some(expected) if expected != array_shape => {
                    return Err(FieldError::corrupt(
                        &path,
                        format!("{} has shape {:?}, expected {:?}", name, array_shape, expected),
                    ));
                }
                Some(_) => {}
            }
            volumes.push(array.data);
        }

        let shape = shape.ok_or_else(|| FieldError::corrupt(&path, "empty frame"))?;
        let [gx, gy, gz, bx, by, bz]: [Vec<f64>; 6] = volumes
            .try_into()
            .map_err(|_| FieldError::corrupt(&path, "incomplete frame"))?;

        let grid = Grid::from_volumes(shape, gx, gy, gz)?;
        let field = Field::from_components(shape, bx, by, bz)?;

        debug!("Loaded frame {:?} ({:?} samples)", path, shape);
        Ok(Frame { grid, field })
    }

    /// Frame keys in this store, lexicographically sorted
    pub fn list_frames(&self) -> Result<Vec<String>> {
        list_frames(&self.folder)
    }

    /// One past the highest `frame_XXXX` index present, 0 when there is none
    pub fn next_index(&self) -> Result<usize> {
        let next = self
            .list_frames()?
            .iter()
            .filter_map(|key| key.strip_prefix("frame_")?.parse::<usize>().ok())
            .max()
            .map_or(0, |max| max + 1);
        Ok(next)
    }
}

/// Every frame key in `folder`, sorted so index → key is stable for unchanged contents
pub fn list_frames(folder: &Path) -> Result<Vec<String>> {
    let mut keys = Vec::new();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(FRAME_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            keys.push(stem.to_string());
        }
    }

    keys.sort();
    Ok(keys)
}

fn key_stem(key: &str) -> Result<&str> {
    let stem = key.strip_suffix(".npz").unwrap_or(key);
    let escapes = stem.contains(['/', '\\']) || stem.contains("..") || stem.starts_with('.');
    if stem.is_empty() || escapes || stem.ends_with(".npz") {
        return Err(FieldError::InvalidKey(key.to_string()));
    }
    Ok(stem)
}

fn zip_io(err: ZipError) -> FieldError {
    match err {
        ZipError::Io(e) => FieldError::Io(e),
        other => FieldError::Io(std::io::Error::other(other)),
    }
}
