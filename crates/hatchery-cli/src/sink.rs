//! Observer writing per-tick artifacts to disk.

use crate::profile::PhaseProfile;
use hatchery_core::Result;
use hatchery_world::{write_snapshot, Frame, Observer, Phase, WorldView};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub struct OutputSink {
    output_dir: PathBuf,
    snapshots: bool,
    frames: bool,
    profile: Option<PhaseProfile>,
    written: u64,
}

impl OutputSink {
    /// Creates `output_dir` when anything will be written into it.
    pub fn new(output_dir: PathBuf, snapshots: bool, frames: bool, profile: bool) -> Result<Self> {
        if snapshots || frames {
            fs::create_dir_all(&output_dir)?;
        }
        Ok(Self {
            output_dir,
            snapshots,
            frames,
            profile: profile.then(PhaseProfile::new),
            written: 0,
        })
    }

    pub fn profile(&self) -> Option<&PhaseProfile> {
        self.profile.as_ref()
    }

    /// Number of files written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_snapshot_file(&mut self, view: &WorldView<'_>) -> Result<()> {
        let path = self.output_dir.join(snapshot_name(view.tick));
        let mut writer = BufWriter::new(File::create(&path)?);
        write_snapshot(&mut writer, view)?;
        self.written += 1;
        debug!(tick = view.tick, path = %path.display(), "Snapshot written");
        Ok(())
    }

    fn write_frame_file(&mut self, view: &WorldView<'_>) -> Result<()> {
        let path = self.output_dir.join(frame_name(view.tick));
        fs::write(&path, Frame::capture(view).to_json()?)?;
        self.written += 1;
        debug!(tick = view.tick, path = %path.display(), "Frame written");
        Ok(())
    }
}

impl Observer for OutputSink {
    fn observe(&mut self, view: &WorldView<'_>) -> Result<()> {
        if self.snapshots {
            self.write_snapshot_file(view)?;
        }
        if self.frames {
            self.write_frame_file(view)?;
        }
        Ok(())
    }

    fn phase_finished(&mut self, phase: Phase, elapsed: Duration) {
        if let Some(profile) = self.profile.as_mut() {
            profile.record(phase, elapsed);
        }
    }
}

pub fn snapshot_name(tick: u64) -> String {
    format!("snapshot_{tick:05}.tsv")
}

pub fn frame_name(tick: u64) -> String {
    format!("frame_{tick:05}.json")
}
