//! # `WbkForge`
//!
//! A pure-Rust library for reading and repacking WBK audio banks.
//!
//! ## Supported Codecs
//!
//! - **IMA-ADPCM** - decode and encode, with shared or per-channel predictor state
//! - **Raw PCM** - decode from the bank-wide sample region
//!
//! The reserved ADPCM variants are recognised and rejected with
//! [`Error::UnsupportedCodec`].
//!
//! ## Quick Start
//!
//! ### Extracting Tracks
//!
//! ```no_run
//! use wbkforge::prelude::*;
//!
//! let bank = Bank::open("voice.wbk")?;
//! let contents = bank.read_tracks(&ReadOptions::new(), None);
//! for track in contents.tracks {
//!     let number = track.index + 1;
//!     write_wav(format!("track_{number}.wav"), &track.into_pcm())?;
//! }
//! # Ok::<(), wbkforge::Error>(())
//! ```
//!
//! ### Replacing a Track
//!
//! ```no_run
//! use wbkforge::prelude::*;
//!
//! let bank = Bank::open("voice.wbk")?;
//! let audio = read_wav("new_line.wav")?;
//! let rebuilt = bank.replace(3, &audio, Codec::Keep)?;
//! rebuilt.save("voice_patched.wbk")?;
//! # Ok::<(), wbkforge::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `wbkforge` command-line binary

pub mod audio;
pub mod codec;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::audio::{PcmAudio, read_wav, write_wav};
    pub use crate::codec::AdpcmStateMode;
    pub use crate::error::{Error, Result};
    pub use crate::formats::wbk::{
        Bank, BankContents, BankHeader, BankPhase, BankProgress, Codec, DecodedTrack,
        EntryDescriptor, MetadataRecord, ReadOptions, RepackOptions,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
