//! Audio subsystem
//!
//! WAV parsing, sample conversion, sources, and sinks.

pub mod buffer;
pub mod clocked;
pub mod convert;
pub mod generator;
pub mod output;
pub mod sink;
pub mod source;
pub mod types;
pub mod wav;

pub use buffer::{decode_into_buffer, ensure_complete, SampleBuffer};
pub use clocked::{ClockedSink, SinkCall};
pub use convert::{convert_frame, SampleConverter};
pub use generator::SignalGenerator;
pub use output::CpalSink;
pub use sink::{AudioSink, PullFn};
pub use source::{AudioSource, SourceKind};
pub use types::{PacketCounter, SampleWidth, StereoSample};
pub use wav::{WavFormat, WavHeader};
