//! Test helper modules for widget-ap integration tests
//!
//! - wav_fixtures: hand-built canonical headers and hound-written files
//! - capture: decoding bytes captured from a `ClockedSink`

#![allow(dead_code, unused_imports)]

pub mod capture;
pub mod wav_fixtures;

pub use capture::{first_non_silent, frames};
pub use wav_fixtures::{
    canonical_header, ramp_16, write_hound_wav_16, write_hound_wav_24, write_raw_wav, FixtureDir,
};
