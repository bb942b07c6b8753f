//! Audio output using cpal
//!
//! `CpalSink` is the hardware sink: it opens an output device, and on
//! `start()` builds a stereo stream at the requested rate whose data
//! callback runs the installed pull function. The pull path always
//! produces 4-byte left-justified frames; the callback converts them to
//! whatever sample format the device stream uses.

use crate::audio::sink::{AudioSink, PullFn};
use crate::audio::types::SampleWidth;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Device formats we can feed, most preferred first
const FORMAT_PREFERENCE: [SampleFormat; 3] = [SampleFormat::I32, SampleFormat::F32, SampleFormat::I16];

/// Frames converted per pull; larger device buffers are filled in slices
const SCRATCH_FRAMES: usize = 8192;

const CHANNELS: u16 = 2;

/// Hardware sink backed by a cpal output device
pub struct CpalSink {
    device: Device,
    device_name: String,
    sample_rate: u32,
    pull: Option<PullFn>,
    stream: Option<Stream>,
    /// Stream error flag - set by the error callback, cleared on start
    error_flag: Arc<AtomicBool>,
    /// Stream errors since the last start
    error_count: Arc<AtomicU32>,
}

impl CpalSink {
    /// List available audio output devices.
    ///
    /// # Returns
    /// Vector of device names
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open an output device.
    ///
    /// # Arguments
    /// - `device_name`: Optional device name (None = default device)
    ///
    /// # Errors
    /// `Error::AudioOutput` when neither the named device nor a default
    /// device exists.
    ///
    /// # Fallback Behavior
    /// If the requested device is not found, the default device is used.
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let mut devices = host
                    .output_devices()
                    .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?;

                match devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                    Some(dev) => {
                        info!("Found requested audio device: {}", name);
                        dev
                    }
                    None => {
                        warn!("Requested device '{}' not found, falling back to default device", name);
                        host.default_output_device().ok_or_else(|| {
                            Error::AudioOutput(format!(
                                "Device '{}' not found and no default device available",
                                name
                            ))
                        })?
                    }
                }
            }
            None => host
                .default_output_device()
                .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?,
        };

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio device: {}", device_name);

        Ok(Self {
            device,
            device_name,
            sample_rate: 48_000,
            pull: None,
            stream: None,
            error_flag: Arc::new(AtomicBool::new(false)),
            error_count: Arc::new(AtomicU32::new(0)),
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Pick the stream config and format for the current rate
    fn select_config(&self) -> Result<(StreamConfig, SampleFormat)> {
        let rate = self.sample_rate;
        let candidates: Vec<_> = self
            .device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?
            .filter(|c| {
                c.channels() == CHANNELS && c.min_sample_rate().0 <= rate && c.max_sample_rate().0 >= rate
            })
            .collect();

        let formats: Vec<SampleFormat> = candidates.iter().map(|c| c.sample_format()).collect();
        let format = preferred_format(&formats).ok_or_else(|| {
            Error::AudioOutput(format!(
                "Device '{}' has no stereo {} Hz output in a supported format",
                self.device_name, rate
            ))
        })?;

        let config = StreamConfig {
            channels: CHANNELS,
            sample_rate: cpal::SampleRate(rate),
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, format))
    }

    /// Build an output stream for device sample type `T`
    fn build_stream<T>(&self, config: &StreamConfig, pull: PullFn) -> Result<Stream>
    where
        T: SizedSample + FromSample<i32>,
    {
        let error_flag = Arc::clone(&self.error_flag);
        let error_count = Arc::clone(&self.error_count);
        let mut scratch = vec![0u8; SCRATCH_FRAMES * SampleWidth::Four.frame_bytes()];

        self.device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    fill_device_buffer(data, &mut scratch, &*pull);
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                    error_count.fetch_add(1, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
    }
}

/// Fill an interleaved device buffer from the pull function
///
/// Runs on the audio thread. `scratch` is fixed size: a device buffer larger
/// than it is filled in whole-frame slices, one pull per slice.
fn fill_device_buffer<T>(data: &mut [T], scratch: &mut [u8], pull: &dyn Fn(&mut [u8]))
where
    T: SizedSample + FromSample<i32>,
{
    let sample_bytes = SampleWidth::Four.bytes();
    let slice_samples = scratch.len() / SampleWidth::Four.frame_bytes() * usize::from(CHANNELS);
    debug_assert!(slice_samples > 0, "scratch smaller than one frame");

    for slice in data.chunks_mut(slice_samples) {
        let bytes = &mut scratch[..slice.len() * sample_bytes];
        pull(bytes);

        for (out, raw) in slice.iter_mut().zip(bytes.chunks_exact(sample_bytes)) {
            let value = i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            *out = T::from_sample_(value);
        }
    }
}

/// First entry of `FORMAT_PREFERENCE` the device offers
fn preferred_format(available: &[SampleFormat]) -> Option<SampleFormat> {
    FORMAT_PREFERENCE
        .iter()
        .copied()
        .find(|format| available.contains(format))
}

impl AudioSink for CpalSink {
    fn subslot_width(&self) -> SampleWidth {
        SampleWidth::Four
    }

    fn set_sample_rate(&mut self, rate: u32) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::AudioOutput(
                "Cannot change sample rate while the stream is running".to_string(),
            ));
        }
        debug!("Output sample rate set to {} Hz", rate);
        self.sample_rate = rate;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let pull = self
            .pull
            .clone()
            .ok_or_else(|| Error::AudioOutput("No pull source installed".to_string()))?;

        let (config, format) = self.select_config()?;
        self.error_flag.store(false, Ordering::SeqCst);
        self.error_count.store(0, Ordering::SeqCst);
        info!(
            "Starting audio stream: {} Hz, {} channels, {:?}",
            config.sample_rate.0, config.channels, format
        );

        let stream = match format {
            SampleFormat::I32 => self.build_stream::<i32>(&config, pull)?,
            SampleFormat::F32 => self.build_stream::<f32>(&config, pull)?,
            SampleFormat::I16 => self.build_stream::<i16>(&config, pull)?,
            other => {
                return Err(Error::AudioOutput(format!("Unsupported sample format: {:?}", other)));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            let errors = self.error_count.load(Ordering::SeqCst);
            if errors > 0 {
                warn!("Stopping audio stream after {} stream error(s)", errors);
            } else {
                info!("Stopping audio stream");
            }
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        }
        Ok(())
    }

    fn install_pull_source(&mut self, pull: PullFn) {
        self.pull = Some(pull);
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    fn has_failed(&self) -> bool {
        self.error_flag.load(Ordering::SeqCst)
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    /// Pull function writing consecutive i32 values, counting calls
    fn counting_pull<'a>(
        next: &'a Cell<i32>,
        calls: &'a Cell<usize>,
        limit: usize,
    ) -> impl Fn(&mut [u8]) + 'a {
        move |out: &mut [u8]| {
            assert!(out.len() <= limit, "pull asked for {} bytes", out.len());
            calls.set(calls.get() + 1);
            for sample in out.chunks_exact_mut(4) {
                sample.copy_from_slice(&next.get().to_le_bytes());
                next.set(next.get() + 1);
            }
        }
    }

    #[test]
    fn test_device_buffer_larger_than_scratch_is_sliced() {
        // 16-frame scratch, 40-frame device buffer
        let mut scratch = vec![0u8; 16 * SampleWidth::Four.frame_bytes()];
        let (next, calls) = (Cell::new(0), Cell::new(0));
        let pull = counting_pull(&next, &calls, scratch.len());

        let mut data = vec![0i32; 40 * 2];
        fill_device_buffer(&mut data, &mut scratch, &pull);

        assert_eq!(calls.get(), 3);
        assert_eq!(data, (0..80).collect::<Vec<i32>>());
    }

    #[test]
    fn test_device_buffer_within_scratch_is_one_pull() {
        let mut scratch = vec![0u8; 16 * SampleWidth::Four.frame_bytes()];
        let (next, calls) = (Cell::new(0x0001_0000), Cell::new(0));
        let pull = counting_pull(&next, &calls, scratch.len());

        let mut data = vec![0i16; 10 * 2];
        fill_device_buffer(&mut data, &mut scratch, &pull);

        assert_eq!(calls.get(), 1);
        // Left-justified 32-bit keeps its top 16 bits
        assert_eq!(data[0], 1);
        assert_eq!(data[19], 1);
    }

    #[test]
    fn test_format_preference() {
        use SampleFormat::*;
        assert_eq!(preferred_format(&[I16, F32, I32]), Some(I32));
        assert_eq!(preferred_format(&[I16, F32]), Some(F32));
        assert_eq!(preferred_format(&[U8, I16]), Some(I16));
        assert_eq!(preferred_format(&[U16, U8]), None);
        assert_eq!(preferred_format(&[]), None);
    }

    #[test]
    fn test_left_justified_values_convert() {
        // Full-scale 32-bit maps to full-scale device samples
        assert_eq!(i16::from_sample_(i32::MAX), i16::MAX);
        assert_eq!(i16::from_sample_(0x1234_5600_i32), 0x1234);
        assert_eq!(f32::from_sample_(i32::MIN), -1.0);
        assert_eq!(i32::from_sample_(-256_i32), -256);
    }
}
