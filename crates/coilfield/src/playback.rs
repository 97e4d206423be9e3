//! Index-addressed frame playback
//!
//! Snapshots the key list once at open, so index `n` keeps naming the same frame
//! for the lifetime of the cursor. Timing is left to the caller.

use std::path::PathBuf;

use crate::error::{FieldError, Result};
use crate::store::{Frame, FrameStore};

pub struct Playback {
    store: FrameStore,
    keys: Vec<String>,
    position: usize,
}

impl Playback {
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self> {
        let store = FrameStore::new(folder);
        let keys = store.list_frames()?;
        Ok(Self {
            store,
            keys,
            position: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Load the frame at `index` without moving the cursor
    pub fn load(&self, index: usize) -> Result<Frame> {
        let key = self.key(index).ok_or(FieldError::FrameIndexOutOfRange {
            index,
            len: self.keys.len(),
        })?;
        self.store.load(key)
    }

    pub fn current(&self) -> Result<Frame> {
        self.load(self.position)
    }

    /// Move the cursor to `index`; out-of-range positions are rejected
    pub fn seek(&mut self, index: usize) -> Option<usize> {
        (index < self.keys.len()).then(|| {
            self.position = index;
            index
        })
    }

    /// Step to the next frame, wrapping to the first after the last
    pub fn advance(&mut self) -> usize {
        if !self.keys.is_empty() {
            self.position = (self.position + 1) % self.keys.len();
        }
        self.position
    }
}
