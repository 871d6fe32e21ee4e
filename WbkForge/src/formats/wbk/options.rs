//! Options for reading and repacking banks

use super::{PAYLOAD_ALIGNMENT, PCM_SAMPLE_REGION_OFFSET};
use crate::codec::AdpcmStateMode;

/// Options for decoding entry payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// How IMA-ADPCM predictor state is tracked across channels
    pub state_mode: AdpcmStateMode,
    /// Start of the bank-wide raw PCM region
    pub pcm_region_offset: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            state_mode: AdpcmStateMode::Shared,
            pcm_region_offset: PCM_SAMPLE_REGION_OFFSET,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state_mode(mut self, mode: AdpcmStateMode) -> Self {
        self.state_mode = mode;
        self
    }

    #[must_use]
    pub fn with_pcm_region_offset(mut self, offset: usize) -> Self {
        self.pcm_region_offset = offset;
        self
    }
}

/// Options for replacing a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepackOptions {
    /// Boundary every relocated payload starts on
    pub alignment: usize,
    /// How IMA-ADPCM predictor state is tracked when encoding
    pub state_mode: AdpcmStateMode,
}

impl Default for RepackOptions {
    fn default() -> Self {
        Self {
            alignment: PAYLOAD_ALIGNMENT,
            state_mode: AdpcmStateMode::Shared,
        }
    }
}

impl RepackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload alignment. Zero is treated as 1 (no padding).
    #[must_use]
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment.max(1);
        self
    }

    #[must_use]
    pub fn with_state_mode(mut self, mode: AdpcmStateMode) -> Self {
        self.state_mode = mode;
        self
    }

    /// Read options that decode what these options encode
    #[must_use]
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::new().with_state_mode(self.state_mode)
    }
}
