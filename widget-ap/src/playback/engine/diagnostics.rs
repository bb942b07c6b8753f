//! Diagnostics and reporting
//!
//! End-of-file report (read cursor, valid count, packet counter,
//! contention) and the summary returned by a playlist run.

use super::core::PlaybackEngine;
use crate::audio::sink::AudioSink;
use crate::audio::source::AudioSource;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file the playlist could not play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of `PlaybackEngine::play_files`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Files that were decoded and started, in order
    pub played: Vec<PathBuf>,
    /// Files rejected before playback (missing, invalid header)
    pub skipped: Vec<SkippedFile>,
    /// True if a quit request ended the playlist early
    pub interrupted: bool,
}

impl PlaybackSummary {
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Log a one-line summary plus one line per skipped file
    pub fn log(&self) {
        info!(
            "Playlist finished: {} played, {} skipped{}",
            self.played.len(),
            self.skipped.len(),
            if self.interrupted { " (interrupted)" } else { "" }
        );
        for skipped in &self.skipped {
            warn!("  skipped {}: {}", skipped.path.display(), skipped.reason);
        }
    }
}

impl<S: AudioSink> PlaybackEngine<S> {
    /// Report how far playback got through a released source
    pub(super) fn report_end_of_file(&self, path: &Path, released: &AudioSource) {
        let progress = self.pull.progress();
        let (cursor, valid) = released.progress().unwrap_or((0, 0));

        debug!(
            "End of {}: read cursor {}, valid {}, packet {}, contended pulls {}",
            path.display(),
            cursor,
            valid,
            progress.packets,
            progress.contended
        );

        if cursor < valid {
            info!(
                "{} stopped early at sample {} of {}",
                path.display(),
                cursor,
                valid
            );
        }
    }
}
