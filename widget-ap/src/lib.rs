//! # Widget PCM Test Player Library (widget-ap)
//!
//! Real-time PCM source engine for USB Audio Class 2 widget sinks.
//!
//! **Purpose:** Validate canonical PCM WAV files, convert 16/24/32-bit
//! stereo samples to the sink's 3- or 4-byte sub-slot width, and feed the
//! sink through a non-blocking pull callback. A 48-entry sine generator
//! provides a test tone when no files are given.
//!
//! **Architecture:** The sink owns the clock and pulls; the engine only
//! swaps the source behind a shared slot (`playback::SharedPull`).

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
