//! Audio transcoding through an external ffmpeg process.
//!
//! Telegram delivers voice messages as OGG Opus; the transcription API
//! wants linear PCM. ffmpeg is treated as an opaque collaborator whose
//! success contract is exit status zero plus an output file on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

#[derive(Debug)]
pub enum DecodeError {
    /// ffmpeg could not be started at all.
    Spawn(std::io::Error),
    /// ffmpeg ran and exited nonzero.
    Failed { code: Option<i32>, stderr: String },
    /// ffmpeg exited zero but produced no output file.
    MissingOutput(PathBuf),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to run ffmpeg: {e}"),
            Self::Failed { code, stderr } => match code {
                Some(code) => write!(f, "ffmpeg exited with status {code}: {stderr}"),
                None => write!(f, "ffmpeg terminated by signal: {stderr}"),
            },
            Self::MissingOutput(path) => {
                write!(f, "ffmpeg produced no output at {}", path.display())
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Convert a compressed voice container to 16 kHz mono 16-bit PCM WAV.
pub fn transcode_to_wav(input: &Path, output: &Path) -> Result<(), DecodeError> {
    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-ar", "16000", "-ac", "1", "-acodec", "pcm_s16le"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(DecodeError::Spawn)?;

    if !result.status.success() {
        return Err(DecodeError::Failed {
            code: result.status.code(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }

    if !output.exists() {
        return Err(DecodeError::MissingOutput(output.to_path_buf()));
    }

    debug!(
        "Decoded {} to PCM at {}",
        input.display(),
        output.display()
    );
    Ok(())
}
