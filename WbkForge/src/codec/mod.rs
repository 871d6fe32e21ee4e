//! Audio sample codecs used by WBK banks
//!
//! Only IMA-ADPCM is implemented. Raw PCM entries need no transform and the
//! two reserved ADPCM variants are rejected by the bank reader.

pub mod ima_adpcm;

pub use ima_adpcm::{AdpcmStateMode, ImaDecoder, ImaEncoder, ImaState};
