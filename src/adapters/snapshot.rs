//! JSON file snapshot sink.
//!
//! Writes the whole control state to a sibling temp file, then renames
//! over the target. A reader of the snapshot file (the dashboard polls
//! it) therefore never observes a partially written record.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app::ports::SnapshotSink;
use crate::state::ControlState;
use crate::{Error, Result};

pub struct JsonSnapshotSink {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl JsonSnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSink for JsonSnapshotSink {
    fn store(&mut self, state: &ControlState) -> Result<()> {
        let json = serde_json::to_vec(state).map_err(|e| Error::Snapshot(io::Error::other(e)))?;
        fs::write(&self.tmp_path, json).map_err(Error::Snapshot)?;
        // Atomic on POSIX filesystems: the old snapshot stays readable
        // until the rename lands.
        fs::rename(&self.tmp_path, &self.path).map_err(Error::Snapshot)?;
        Ok(())
    }
}
