//! Fixed-size entry descriptor records
//!
//! Layout (40 bytes, little-endian):
//!
//! | Offset | Field |
//! |---|---|
//! | 0 | hash `i32` |
//! | 4 | codec `u8` |
//! | 5 | reserved `u8` |
//! | 6 | channel flags `u8` |
//! | 7 | reserved `u8` |
//! | 8 | sample count `i32` |
//! | 12 | byte count `u32` |
//! | 16 | three unknown `i32` |
//! | 28 | payload offset `u32` |
//! | 32 | sample rate `u16` |
//! | 34 | unknown `i16` |
//! | 36 | unknown `i32` |

use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::channels;
use super::{Codec, ENTRY_SIZE, HEADER_SIZE};
use crate::error::{Error, Result};

/// One entry of the descriptor table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// Identity hash, unique within a bank
    pub hash: i32,
    /// Raw codec tag, see [`EntryDescriptor::codec`]
    pub codec_tag: u8,
    pub reserved_5: u8,
    /// Channel flags; the population count is the channel count
    pub flags: u8,
    pub reserved_7: u8,
    pub num_samples: i32,
    pub num_bytes: u32,
    pub unknown_10: i32,
    pub unknown_14: i32,
    pub unknown_18: i32,
    /// Absolute offset of the payload in the bank image
    pub data_offset: u32,
    pub sample_rate: u16,
    pub unknown_22: i16,
    pub unknown_24: i32,
}

impl EntryDescriptor {
    /// A zeroed descriptor
    #[must_use]
    pub fn new(hash: i32, codec: Codec) -> Self {
        Self {
            hash,
            codec_tag: codec.tag(),
            reserved_5: 0,
            flags: 0,
            reserved_7: 0,
            num_samples: 0,
            num_bytes: 0,
            unknown_10: 0,
            unknown_14: 0,
            unknown_18: 0,
            data_offset: 0,
            sample_rate: 0,
            unknown_22: 0,
            unknown_24: 0,
        }
    }

    /// Table position of entry `index` in a bank image
    #[must_use]
    pub fn table_offset(index: usize) -> usize {
        HEADER_SIZE + index * ENTRY_SIZE
    }

    /// Parse a descriptor from its 40 bytes
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedEof`] if `bytes` is too short.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Self::read_from(&mut cursor).map_err(Error::from_record_read)
    }

    fn read_from(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        Ok(Self {
            hash: cursor.read_i32::<LittleEndian>()?,
            codec_tag: cursor.read_u8()?,
            reserved_5: cursor.read_u8()?,
            flags: cursor.read_u8()?,
            reserved_7: cursor.read_u8()?,
            num_samples: cursor.read_i32::<LittleEndian>()?,
            num_bytes: cursor.read_u32::<LittleEndian>()?,
            unknown_10: cursor.read_i32::<LittleEndian>()?,
            unknown_14: cursor.read_i32::<LittleEndian>()?,
            unknown_18: cursor.read_i32::<LittleEndian>()?,
            data_offset: cursor.read_u32::<LittleEndian>()?,
            sample_rate: cursor.read_u16::<LittleEndian>()?,
            unknown_22: cursor.read_i16::<LittleEndian>()?,
            unknown_24: cursor.read_i32::<LittleEndian>()?,
        })
    }

    /// Serialize to the 40-byte layout
    pub fn to_bytes(&self) -> Result<[u8; ENTRY_SIZE]> {
        let mut out = [0u8; ENTRY_SIZE];
        self.write_to(&mut Cursor::new(&mut out[..]))?;
        Ok(out)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<LittleEndian>(self.hash)?;
        writer.write_u8(self.codec_tag)?;
        writer.write_u8(self.reserved_5)?;
        writer.write_u8(self.flags)?;
        writer.write_u8(self.reserved_7)?;
        writer.write_i32::<LittleEndian>(self.num_samples)?;
        writer.write_u32::<LittleEndian>(self.num_bytes)?;
        writer.write_i32::<LittleEndian>(self.unknown_10)?;
        writer.write_i32::<LittleEndian>(self.unknown_14)?;
        writer.write_i32::<LittleEndian>(self.unknown_18)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        writer.write_u16::<LittleEndian>(self.sample_rate)?;
        writer.write_i16::<LittleEndian>(self.unknown_22)?;
        writer.write_i32::<LittleEndian>(self.unknown_24)?;
        Ok(())
    }

    /// Store this descriptor at table position `index` of `image`
    ///
    /// # Errors
    /// Returns [`Error::MalformedLayout`] if the slot lies outside the image.
    pub fn write_at(&self, image: &mut [u8], index: usize) -> Result<()> {
        let start = Self::table_offset(index);
        let slot = image.get_mut(start..start + ENTRY_SIZE).ok_or_else(|| {
            Error::layout(format!("entry slot {index} at {start:#x} is outside the image"))
        })?;
        slot.copy_from_slice(&self.to_bytes()?);
        Ok(())
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::from_tag(self.codec_tag)
    }

    pub fn set_codec(&mut self, codec: Codec) {
        self.codec_tag = codec.tag();
    }

    #[must_use]
    pub fn channel_count(&self) -> u32 {
        channels::channel_count(self.flags)
    }

    pub fn set_channel_count(&mut self, count: u32) {
        self.flags = channels::set_channel_count(self.flags, count);
    }

    /// Channel count used when decoding the payload
    ///
    /// ADPCM-B payloads are always treated as mono.
    #[must_use]
    pub fn decode_channel_count(&self) -> u32 {
        if self.codec() == Codec::AdpcmB {
            1
        } else {
            self.channel_count()
        }
    }

    /// Number of samples the payload decodes to
    #[must_use]
    pub fn decoded_sample_count(&self) -> u64 {
        let channels = u64::from(self.channel_count());
        match self.codec() {
            Codec::Pcm8 => channels * u64::from(self.num_bytes),
            Codec::Pcm16 => 2 * channels * u64::from(self.num_bytes),
            _ => u64::try_from(self.num_samples).unwrap_or(0),
        }
    }

    /// Inverse of [`EntryDescriptor::decoded_sample_count`]
    ///
    /// Uses the raw population count, dividing by one when no flag is set.
    pub fn set_decoded_sample_count(&mut self, count: u32) {
        let active = self.flags.count_ones().max(1);
        match self.codec() {
            Codec::Pcm8 => self.num_bytes = count / active,
            Codec::Pcm16 => self.num_bytes = count / (2 * active),
            _ => self.num_samples = count as i32,
        }
    }

    /// `1000 * num_bytes / sample_rate`, or 0 without a sample rate
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        1000 * u64::from(self.num_bytes) / u64::from(self.sample_rate)
    }

    #[must_use]
    pub fn bits_per_sample(&self) -> u32 {
        match self.codec() {
            Codec::Pcm8 => 8,
            Codec::Pcm16 | Codec::AdpcmA | Codec::ImaAdpcm => 16,
            Codec::AdpcmB => 4,
            _ => 0,
        }
    }

    #[must_use]
    pub fn block_align(&self) -> u32 {
        let channels = self.channel_count();
        match self.codec() {
            Codec::Pcm8 | Codec::Pcm16 | Codec::AdpcmA | Codec::ImaAdpcm => {
                channels * self.bits_per_sample() / 8
            }
            Codec::AdpcmB => 36 * channels,
            _ => 0,
        }
    }

    /// Decoded payload size in bytes, per codec family
    #[must_use]
    pub fn payload_size(&self) -> u64 {
        match self.codec() {
            Codec::Pcm8 | Codec::Pcm16 => 2 * u64::from(self.num_bytes),
            Codec::AdpcmB => u64::from(self.block_align()) * u64::from(self.num_bytes >> 6),
            Codec::ImaAdpcm => 4 * u64::try_from(self.num_samples).unwrap_or(0),
            _ => u64::from(self.num_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> EntryDescriptor {
        EntryDescriptor {
            hash: 0x1234_5678,
            codec_tag: 7,
            reserved_5: 0xAA,
            flags: 0b11,
            reserved_7: 0xBB,
            num_samples: 4000,
            num_bytes: 8000,
            unknown_10: -1,
            unknown_14: 2,
            unknown_18: 3,
            data_offset: 0x9000,
            sample_rate: 22050,
            unknown_22: -2,
            unknown_24: 99,
        }
    }

    #[test]
    fn test_layout_offsets() {
        let bytes = sample_entry().to_bytes().unwrap();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[0..4], &0x1234_5678i32.to_le_bytes());
        assert_eq!(bytes[4], 7);
        assert_eq!(bytes[6], 0b11);
        assert_eq!(&bytes[12..16], &8000u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &0x9000u32.to_le_bytes());
        assert_eq!(&bytes[32..34], &22050u16.to_le_bytes());
    }

    #[test]
    fn test_read_preserves_unknown_fields() {
        let entry = sample_entry();
        assert_eq!(EntryDescriptor::read(&entry.to_bytes().unwrap()).unwrap(), entry);
    }

    #[test]
    fn test_short_record() {
        assert!(matches!(
            EntryDescriptor::read(&[0u8; 12]),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn test_write_at_table_slot() {
        let mut image = vec![0u8; HEADER_SIZE + 2 * ENTRY_SIZE];
        let entry = sample_entry();
        entry.write_at(&mut image, 1).unwrap();
        assert_eq!(
            EntryDescriptor::read(&image[HEADER_SIZE + ENTRY_SIZE..]).unwrap(),
            entry
        );
        assert!(entry.write_at(&mut image, 2).is_err());
    }

    #[test]
    fn test_derived_attributes_ima() {
        let entry = sample_entry();
        assert_eq!(entry.codec(), Codec::ImaAdpcm);
        assert_eq!(entry.channel_count(), 2);
        assert_eq!(entry.decoded_sample_count(), 4000);
        assert_eq!(entry.bits_per_sample(), 16);
        assert_eq!(entry.block_align(), 4);
        assert_eq!(entry.payload_size(), 16000);
        assert_eq!(entry.duration_ms(), 1000 * 8000 / 22050);
    }

    #[test]
    fn test_derived_attributes_pcm() {
        let mut entry = EntryDescriptor::new(1, Codec::Pcm16);
        entry.flags = 0b1;
        entry.num_bytes = 100;
        assert_eq!(entry.bits_per_sample(), 16);
        assert_eq!(entry.block_align(), 2);
        assert_eq!(entry.decoded_sample_count(), 200);
        assert_eq!(entry.payload_size(), 200);

        entry.set_codec(Codec::Pcm8);
        entry.flags = 0b11;
        assert_eq!(entry.bits_per_sample(), 8);
        assert_eq!(entry.decoded_sample_count(), 200);
    }

    #[test]
    fn test_adpcm_b_is_mono_and_block_sized() {
        let mut entry = EntryDescriptor::new(1, Codec::AdpcmB);
        entry.flags = 0b11;
        entry.num_bytes = 128;
        assert_eq!(entry.decode_channel_count(), 1);
        assert_eq!(entry.block_align(), 72);
        assert_eq!(entry.payload_size(), 144);
    }

    #[test]
    fn test_set_decoded_sample_count() {
        let mut entry = EntryDescriptor::new(1, Codec::Pcm16);
        entry.flags = 0b11;
        entry.set_decoded_sample_count(400);
        assert_eq!(entry.num_bytes, 100);
        assert_eq!(entry.decoded_sample_count(), 400);

        let mut entry = EntryDescriptor::new(1, Codec::ImaAdpcm);
        entry.set_decoded_sample_count(1234);
        assert_eq!(entry.num_samples, 1234);
    }

    #[test]
    fn test_duration_without_rate() {
        let entry = EntryDescriptor::new(1, Codec::ImaAdpcm);
        assert_eq!(entry.duration_ms(), 0);
    }
}
