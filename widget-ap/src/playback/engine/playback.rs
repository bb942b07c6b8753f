//! Playlist playback
//!
//! Each file goes through the same episode: mute, open, validate the
//! header, decode the whole file, get the transport to the file's rate,
//! install the buffer, wait, release the buffer. Missing files and bad
//! headers are skipped; anything else ends the playlist.

use super::core::{PlaybackEngine, WaitOutcome};
use super::diagnostics::{PlaybackSummary, SkippedFile};
use crate::audio::buffer::{decode_into_buffer, ensure_complete};
use crate::audio::sink::AudioSink;
use crate::audio::source::AudioSource;
use crate::audio::wav::{self, WavFormat};
use crate::error::{Error, Result};
use crate::playback::state::EngineState;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

impl<S: AudioSink> PlaybackEngine<S> {
    /// Play `paths` in order
    ///
    /// # Returns
    /// Which files were played and which were skipped.
    ///
    /// # Errors
    /// Non-recoverable failures (short decode, allocation failure, sink
    /// errors including a transport fault mid-file). The transport is
    /// stopped before the error is returned.
    pub fn play_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<PlaybackSummary> {
        let mut summary = PlaybackSummary::default();

        for path in paths {
            let path = path.as_ref();
            if self.control.quit_requested() {
                summary.interrupted = true;
                break;
            }

            match self.play_file(path) {
                Ok(outcome) => {
                    summary.played.push(path.to_path_buf());
                    if outcome == WaitOutcome::Quit {
                        summary.interrupted = true;
                        break;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping {}: {}", path.display(), e);
                    summary.skipped.push(SkippedFile {
                        path: PathBuf::from(path),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("Playback of {} failed: {}", path.display(), e);
                    if let Err(stop_err) = self.shutdown() {
                        warn!("Failed to stop transport after error: {}", stop_err);
                    }
                    return Err(e);
                }
            }
        }

        self.shutdown()?;
        Ok(summary)
    }

    /// One file episode; returns how the wait ended
    fn play_file(&mut self, path: &Path) -> Result<WaitOutcome> {
        self.mute();
        info!("Opening {}", path.display());

        let file = File::open(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let header = wav::read_header(&mut reader)?;
        header.log_summary(self.options.verbose);

        let format = WavFormat::try_from(header).map_err(|e| {
            for violation in e.violations() {
                error!("{}: {}", path.display(), violation);
            }
            e
        })?;

        let (buffer, decoded) = decode_into_buffer(&mut reader, &format, self.width())?;
        ensure_complete(&format, decoded)?;
        drop(reader);

        self.prepare_transport(format.sample_rate)?;
        drop(self.pull.swap(AudioSource::Buffered(buffer)));
        self.set_state(EngineState::Playing);
        info!(
            "Playing {} ({} Hz, {}-bit, {:.3}s)",
            path.display(),
            format.sample_rate,
            u32::from(format.bytes_per_sample) * 8,
            format.duration_secs()
        );

        let waited = self.wait();
        self.set_state(EngineState::Draining);

        let released = self.pull.swap(AudioSource::Silence);
        self.report_end_of_file(path, &released);
        drop(released);

        waited
    }
}
