//! Types shared by the WBK reader and repacker

use std::fmt;
use std::str::FromStr;

use crate::audio::PcmAudio;
use crate::error::Error;

/// Codec tag stored in entry descriptors and metadata records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Tag 0. As a replacement request it means "keep the entry's codec".
    Keep,
    /// Raw 8-bit PCM.
    Pcm8,
    /// Raw 16-bit PCM.
    Pcm16,
    /// Reserved ADPCM variant (tag 4), not implemented.
    AdpcmA,
    /// Reserved ADPCM variant (tag 5), not implemented.
    AdpcmB,
    /// 4-bit IMA-ADPCM, one code per byte.
    ImaAdpcm,
    /// Any other tag (3, 6 and anything above 7).
    Other(u8),
}

impl Codec {
    /// Parse a codec from its on-disk tag
    #[must_use]
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Codec::Keep,
            1 => Codec::Pcm8,
            2 => Codec::Pcm16,
            4 => Codec::AdpcmA,
            5 => Codec::AdpcmB,
            7 => Codec::ImaAdpcm,
            other => Codec::Other(other),
        }
    }

    /// Convert to the on-disk tag
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Codec::Keep => 0,
            Codec::Pcm8 => 1,
            Codec::Pcm16 => 2,
            Codec::AdpcmA => 4,
            Codec::AdpcmB => 5,
            Codec::ImaAdpcm => 7,
            Codec::Other(tag) => tag,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Codec::Keep => "keep",
            Codec::Pcm8 => "pcm8",
            Codec::Pcm16 => "pcm16",
            Codec::AdpcmA => "adpcm-a",
            Codec::AdpcmB => "adpcm-b",
            Codec::ImaAdpcm => "ima-adpcm",
            Codec::Other(_) => "unknown",
        }
    }

    /// Raw PCM family (payload lives in the shared sample region)
    #[must_use]
    pub fn is_pcm(self) -> bool {
        matches!(self, Codec::Pcm8 | Codec::Pcm16)
    }

    /// Whether the repacker can produce a payload for this codec
    #[must_use]
    pub fn is_encodable(self) -> bool {
        matches!(self, Codec::ImaAdpcm)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.tag())
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" | "0" => Ok(Codec::Keep),
            "pcm8" | "1" => Ok(Codec::Pcm8),
            "pcm16" | "pcm" | "2" => Ok(Codec::Pcm16),
            "adpcm-a" | "4" => Ok(Codec::AdpcmA),
            "adpcm-b" | "5" => Ok(Codec::AdpcmB),
            "ima" | "ima-adpcm" | "7" => Ok(Codec::ImaAdpcm),
            _ => Err(format!(
                "Invalid codec '{s}'. Valid values: keep, pcm8, pcm16, adpcm-a, adpcm-b, ima"
            )),
        }
    }
}

/// One decoded track
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTrack {
    /// 0-based position in the entry table
    pub index: usize,
    /// Identity hash of the entry
    pub hash: i32,
    /// Codec the payload was stored with
    pub codec: Codec,
    /// Sample rate from the descriptor
    pub sample_rate: u32,
    /// Channel count the samples are interleaved with
    pub channels: u16,
    /// Interleaved 16-bit samples
    pub samples: Vec<i16>,
}

impl DecodedTrack {
    /// Length in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / f32::from(self.channels) / self.sample_rate as f32
    }

    /// Hand the samples over in the WAV exchange shape
    #[must_use]
    pub fn into_pcm(self) -> PcmAudio {
        PcmAudio {
            samples: self.samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// Result of decoding every entry, with support for partial success
#[derive(Debug, Default)]
pub struct BankContents {
    /// Successfully decoded tracks, in entry order
    pub tracks: Vec<DecodedTrack>,
    /// Entries that could not be decoded (0-based index, reason)
    pub errors: Vec<(usize, Error)>,
}

impl BankContents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every entry decoded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries visited (decoded + failed)
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.tracks.len() + self.errors.len()
    }
}

/// Progress information during bank operations
#[derive(Debug, Clone)]
pub struct BankProgress {
    /// Current operation phase
    pub phase: BankPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Entry being processed, if any
    pub current_entry: Option<String>,
}

impl BankProgress {
    #[must_use]
    pub fn new(phase: BankPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_entry: None,
        }
    }

    #[must_use]
    pub fn with_entry(
        phase: BankPhase,
        current: usize,
        total: usize,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_entry: Some(entry.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a bank operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankPhase {
    /// Decoding entry payloads into samples
    DecodingTracks,
    /// Encoding the replacement payload
    EncodingPayload,
    /// Moving the payloads that follow the replaced entry
    RelocatingEntries,
    /// Re-parsing the rebuilt image
    Validating,
    /// Operation complete
    Complete,
}

impl BankPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DecodingTracks => "Decoding tracks",
            Self::EncodingPayload => "Encoding payload",
            Self::RelocatingEntries => "Relocating entries",
            Self::Validating => "Validating",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback type
pub type ProgressCallback<'a> = &'a dyn Fn(&BankProgress);
