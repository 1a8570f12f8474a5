//! Temporary audio artifacts owned by a single pipeline invocation.
//!
//! Every path handed out is tracked from the moment it is assigned, and
//! `cleanup` attempts removal of each tracked path independently. Names
//! combine the process id with a process-wide invocation counter so
//! concurrent invocations never collide on disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

static NEXT_INVOCATION: AtomicU64 = AtomicU64::new(0);

pub struct TempFiles {
    dir: PathBuf,
    stem: String,
    tracked: Vec<PathBuf>,
}

impl TempFiles {
    /// Track temp files under the OS temp directory.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Track temp files under an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let seq = NEXT_INVOCATION.fetch_add(1, Ordering::Relaxed);
        Self {
            dir: dir.into(),
            stem: format!("svarupa_{}_{}", std::process::id(), seq),
            tracked: Vec::new(),
        }
    }

    /// Write `bytes` to a fresh uniquely-named file with the given
    /// extension, and track its path for cleanup.
    ///
    /// The path is tracked even if the write fails, so cleanup still
    /// covers partially created files.
    pub fn create(&mut self, extension: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(format!("{}.{extension}", self.stem));
        self.tracked.push(path.clone());
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Derive a sibling path from `from` by substituting the extension,
    /// and track it for cleanup. No file is created; the caller is
    /// expected to have something else (ffmpeg) write it.
    pub fn derive(&mut self, from: &Path, extension: &str) -> PathBuf {
        let path = from.with_extension(extension);
        self.tracked.push(path.clone());
        path
    }

    /// Remove every tracked file that exists. Each removal is attempted
    /// independently; failures are logged as warnings and never bubble up.
    /// Returns the number of files actually removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.tracked.drain(..) {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove temp file {}: {e}", path.display()),
            }
        }
        removed
    }

    pub fn tracked_paths(&self) -> &[PathBuf] {
        &self.tracked
    }
}

impl Default for TempFiles {
    fn default() -> Self {
        Self::new()
    }
}
