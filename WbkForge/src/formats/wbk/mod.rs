//! WBK audio bank reader and repacker
//!
//! A bank is a fixed 0x100-byte header, a table of 40-byte entry
//! descriptors, an optional metadata block, and the entry payloads.
//! IMA-ADPCM payloads live at their entry's own offset; raw PCM entries all
//! read from one shared sample region.

mod bank;
mod channels;
mod entry;
mod header;
mod metadata;
mod options;
mod reader;
mod repack;
mod types;

pub use bank::Bank;
pub use channels::{channel_count, set_channel_count};
pub use entry::EntryDescriptor;
pub use header::BankHeader;
pub use metadata::MetadataRecord;
pub use options::{ReadOptions, RepackOptions};
pub use repack::align_up;
pub use types::*;

/// Size of the fixed header; the entry table starts here
pub const HEADER_SIZE: usize = 0x100;

/// Size of one entry descriptor
pub const ENTRY_SIZE: usize = 40;

/// Size of one metadata record
pub const METADATA_RECORD_SIZE: usize = 32;

/// Length of the NUL-padded bank name field
pub const NAME_LENGTH: usize = 32;

/// Length of the NUL-terminated bank type tag after the metadata block
pub const BANK_TYPE_SIZE: usize = 16;

/// Position of the `total_bytes` header field
pub const TOTAL_BYTES_OFFSET: usize = 0x1C;

/// Start of the bank-wide raw PCM sample region
pub const PCM_SAMPLE_REGION_OFFSET: usize = 0x1000;

/// Boundary relocated payloads are padded to
pub const PAYLOAD_ALIGNMENT: usize = 0x8000;
