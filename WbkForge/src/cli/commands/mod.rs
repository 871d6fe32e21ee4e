use clap::Subcommand;
use std::path::PathBuf;

use crate::formats::wbk::Codec;

pub mod execute;
pub mod extract;
pub mod list;
pub mod replace;

#[derive(Subcommand)]
pub enum Commands {
    /// Decode every track of a bank to WAV files named `<prefix><number>.wav`
    Extract {
        /// Source bank file
        bank: PathBuf,

        /// Output file prefix (may include a directory, e.g. `out/track_`)
        prefix: String,

        /// Track IMA-ADPCM predictor state per channel instead of shared
        #[arg(long)]
        per_channel_state: bool,

        /// Decode entries in parallel
        #[arg(long)]
        parallel: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// List entries, metadata records and the bank type
    List {
        /// Source bank file
        bank: PathBuf,
    },

    /// Show the bank header
    Info {
        /// Source bank file
        bank: PathBuf,
    },

    /// Replace one track with the contents of a 16-bit PCM WAV file
    Replace {
        /// Bank file to modify
        bank: PathBuf,

        /// 1-based track number, as used in extracted file names
        index: usize,

        /// Replacement WAV file
        wav: PathBuf,

        /// Output bank (defaults to overwriting the source)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Codec for the new payload (keep, ima)
        #[arg(short, long, default_value = "keep")]
        codec: Codec,

        /// Track IMA-ADPCM predictor state per channel instead of shared
        #[arg(long)]
        per_channel_state: bool,

        /// Payload alignment in bytes
        #[arg(long, default_value_t = crate::formats::wbk::PAYLOAD_ALIGNMENT)]
        alignment: usize,
    },
}
