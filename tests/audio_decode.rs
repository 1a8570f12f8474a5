//! Integration tests for ffmpeg audio transcoding.
//!
//! These tests require ffmpeg on PATH.
//!
//! Run with: cargo test --features integ_test --test audio_decode

#[cfg(feature = "integ_test")]
mod tests {
    use std::process::Command;

    use svarupa::decode::{transcode_to_wav, DecodeError};
    use svarupa::tempfiles::TempFiles;

    fn ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Generate a short tone in an OGG container, the same shape a
    /// downloaded voice message has.
    fn generate_test_ogg(path: &std::path::Path) {
        let status = Command::new("ffmpeg")
            .args(["-y", "-f", "lavfi", "-i", "sine=frequency=440:duration=0.3"])
            .arg(path)
            .status()
            .expect("failed to run ffmpeg");
        assert!(status.success(), "ffmpeg could not generate test audio");
    }

    #[test]
    fn test_transcode_produces_wav_output() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not found on PATH");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut files = TempFiles::in_dir(dir.path());

        let ogg = files.create("ogg", b"").unwrap();
        generate_test_ogg(&ogg);
        let wav = files.derive(&ogg, "wav");

        transcode_to_wav(&ogg, &wav).expect("transcode should succeed");
        assert!(wav.exists());
        // 16 kHz mono s16le for 0.3s plus the WAV header is well above this.
        assert!(std::fs::metadata(&wav).unwrap().len() > 1000);

        assert_eq!(files.cleanup(), 2);
    }

    #[test]
    fn test_transcode_rejects_garbage_input() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not found on PATH");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut files = TempFiles::in_dir(dir.path());

        let ogg = files.create("ogg", b"this is not an audio container").unwrap();
        let wav = files.derive(&ogg, "wav");

        let err = transcode_to_wav(&ogg, &wav).expect_err("garbage input must fail");
        assert!(matches!(err, DecodeError::Failed { .. }));

        // The failed output path was assigned but never materialized;
        // cleanup only removes the input.
        assert_eq!(files.cleanup(), 1);
    }

    #[test]
    fn test_transcode_rejects_missing_input() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not found on PATH");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_file.ogg");
        let wav = dir.path().join("no_such_file.wav");

        let err = transcode_to_wav(&missing, &wav).expect_err("missing input must fail");
        assert!(matches!(err, DecodeError::Failed { .. }));
    }
}
