//! # Request Workspace
//!
//! A [`Workspace`] is the only filesystem scope a request writes to: the
//! downloaded video and every frame derived from it live under
//! `<root>/<request id>/`. The directory is removed when the guard is dropped,
//! so success, an early `?` return and a panic unwinding through the pipeline
//! all leave nothing behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CoachError, CoachResult};

/// Per-request scratch directory, removed on drop.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create `<base>/<id>` (and `base` if needed).
    ///
    /// `id` must be a single plain path component so a caller-supplied
    /// identifier can never point outside `base`. The leaf directory must not
    /// exist yet: an id already in use by another request is rejected.
    pub fn create(base: &Path, id: &str) -> CoachResult<Self> {
        validate_id(id)?;
        fs::create_dir_all(base).map_err(|e| CoachError::io_at("create workspace root", base, e))?;
        let root = base.join(id);
        match fs::create_dir(&root) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(CoachError::validation(
                    "video_id",
                    "a workspace with this id is already in use",
                    id,
                ));
            }
            Err(e) => return Err(CoachError::io_at("create workspace", &root, e)),
        }
        debug!(workspace = %root.display(), "workspace created");
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory for extracted frames, created on first use.
    pub fn frames_dir(&self) -> CoachResult<PathBuf> {
        let dir = self.root.join("frames");
        fs::create_dir_all(&dir).map_err(|e| CoachError::io_at("create frames dir", &dir, e))?;
        Ok(dir)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!(workspace = %self.root.display(), "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(workspace = %self.root.display(), error = %e, "workspace cleanup failed"),
        }
    }
}

fn validate_id(id: &str) -> CoachResult<()> {
    let plain = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
        && id.len() <= 128;
    if plain {
        Ok(())
    } else {
        Err(CoachError::validation(
            "video_id",
            "must be a single path component of at most 128 characters",
            id,
        ))
    }
}
