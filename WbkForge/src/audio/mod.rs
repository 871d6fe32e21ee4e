//! Decoded audio exchange

pub mod wav;

pub use wav::{parse_wav_bytes, read_wav, wav_bytes, write_wav};

/// Interleaved 16-bit PCM with its sample rate and channel count
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PcmAudio {
    /// PCM samples as i16 (interleaved if multichannel)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl PcmAudio {
    #[must_use]
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Number of sample frames (one sample per channel)
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Get duration in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }
}
