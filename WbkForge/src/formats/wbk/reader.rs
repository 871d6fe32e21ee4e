//! Per-entry payload decoding with progress callbacks and error recovery

use byteorder::{ByteOrder, LittleEndian};
use rayon::prelude::*;

use super::{
    Bank, BankContents, BankPhase, BankProgress, Codec, DecodedTrack, ProgressCallback,
    ReadOptions,
};
use crate::codec::ima_adpcm;
use crate::error::{Error, Result};

impl Bank {
    /// Decode the entry at 0-based table position `index`
    ///
    /// # Errors
    /// Returns [`Error::InvalidIndex`] for a position outside the table and
    /// [`Error::UnsupportedCodec`] for entries that are neither raw PCM nor
    /// IMA-ADPCM.
    pub fn read_track(&self, index: usize, options: &ReadOptions) -> Result<DecodedTrack> {
        let entry = self.entry(index).ok_or(Error::InvalidIndex {
            index: index + 1,
            count: self.entries().len(),
        })?;
        let codec = entry.codec();
        let channels = entry.decode_channel_count();

        let samples = match codec {
            c if c.is_pcm() => self.read_pcm_region(entry.payload_size(), options),
            Codec::ImaAdpcm => {
                let payload = self.payload_slice(index, entry.data_offset, entry.num_bytes);
                ima_adpcm::decode(payload, channels, options.state_mode)
            }
            other => {
                return Err(Error::UnsupportedCodec {
                    index: Some(index),
                    tag: other.tag(),
                });
            }
        };

        Ok(DecodedTrack {
            index,
            hash: entry.hash,
            codec,
            // The descriptor rate covers all interleaved channels.
            sample_rate: u32::from(entry.sample_rate) / entry.channel_count().max(1),
            channels: entry.channel_count() as u16,
            samples,
        })
    }

    /// Raw PCM lives in one bank-wide region, not at the entry's own offset
    fn read_pcm_region(&self, payload_size: u64, options: &ReadOptions) -> Vec<i16> {
        let raw = self.as_bytes();
        let start = options.pcm_region_offset.min(raw.len());
        let wanted = usize::try_from(payload_size / 4).unwrap_or(usize::MAX).saturating_mul(4);
        let available = (raw.len() - start) / 4 * 4;
        let len = wanted.min(available);
        if len < wanted {
            tracing::warn!(
                "PCM region truncated: wanted {wanted} bytes at {start:#x}, {len} available"
            );
        }

        let mut samples = vec![0i16; len / 2];
        LittleEndian::read_i16_into(&raw[start..start + len], &mut samples);
        samples
    }

    fn payload_slice(&self, index: usize, offset: u32, num_bytes: u32) -> &[u8] {
        let raw = self.as_bytes();
        let start = (offset as usize).min(raw.len());
        let end = start.saturating_add(num_bytes as usize);
        if end > raw.len() {
            tracing::warn!(
                "entry[{index}]: payload {offset:#x}+{num_bytes} runs past end of image ({:#x}), clamping",
                raw.len()
            );
        }
        &raw[start..end.min(raw.len())]
    }

    /// Decode every entry, collecting per-entry failures
    ///
    /// A failing entry never aborts the read; it is recorded in
    /// [`BankContents::errors`] and the remaining entries are still decoded.
    pub fn read_tracks(
        &self,
        options: &ReadOptions,
        progress: Option<ProgressCallback>,
    ) -> BankContents {
        let progress = progress.unwrap_or(&|_| {});
        let total = self.entries().len();
        let mut contents = BankContents::new();

        for (i, entry) in self.entries().iter().enumerate() {
            progress(&BankProgress::with_entry(
                BankPhase::DecodingTracks,
                i + 1,
                total,
                format!("{:#010x}", entry.hash),
            ));

            match self.read_track(i, options) {
                Ok(track) => contents.tracks.push(track),
                Err(e) => {
                    tracing::warn!("Skipping entry {i}: {e}");
                    contents.errors.push((i, e));
                }
            }
        }

        progress(&BankProgress::new(BankPhase::Complete, total, total));
        tracing::info!(
            "Decoded {}/{} tracks from '{}'",
            contents.tracks.len(),
            total,
            self.name()
        );
        contents
    }

    /// Decode every entry on the rayon pool
    ///
    /// Produces the same result as [`Bank::read_tracks`], in entry order.
    pub fn read_tracks_parallel(&self, options: &ReadOptions) -> BankContents {
        let results: Vec<(usize, Result<DecodedTrack>)> = (0..self.entries().len())
            .into_par_iter()
            .map(|i| (i, self.read_track(i, options)))
            .collect();

        let mut contents = BankContents::new();
        for (i, result) in results {
            match result {
                Ok(track) => contents.tracks.push(track),
                Err(e) => contents.errors.push((i, e)),
            }
        }
        contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AdpcmStateMode;
    use crate::formats::wbk::{BankHeader, EntryDescriptor};

    fn build(entries: &[EntryDescriptor], payloads: &[(usize, &[u8])], len: usize) -> Bank {
        let mut image = BankHeader::new("reader", entries.len()).to_bytes().unwrap();
        for entry in entries {
            image.extend_from_slice(&entry.to_bytes().unwrap());
        }
        image.resize(len, 0);
        for (offset, bytes) in payloads {
            image[*offset..*offset + bytes.len()].copy_from_slice(bytes);
        }
        Bank::parse(image).unwrap()
    }

    fn ima_entry(offset: u32, num_bytes: u32, flags: u8) -> EntryDescriptor {
        let mut entry = EntryDescriptor::new(0x55, Codec::ImaAdpcm);
        entry.data_offset = offset;
        entry.num_bytes = num_bytes;
        entry.num_samples = num_bytes as i32;
        entry.flags = flags;
        entry.sample_rate = 22050;
        entry
    }

    #[test]
    fn test_ima_entry_decodes_from_its_offset() {
        let payload = [0x07u8, 0x07, 0x0F, 0x03];
        let bank = build(&[ima_entry(0x400, 4, 0)], &[(0x400, &payload[..])], 0x800);

        let track = bank.read_track(0, &ReadOptions::new()).unwrap();
        assert_eq!(
            track.samples,
            ima_adpcm::decode(&payload, 1, AdpcmStateMode::Shared)
        );
        assert_eq!(track.channels, 1);
        assert_eq!(track.sample_rate, 22050);
    }

    #[test]
    fn test_stereo_rate_is_per_channel() {
        let payload = vec![0x31u8; 22050];
        let entry = ima_entry(0x400, 22050, 0b11);
        assert_eq!(entry.duration_ms(), 1000);
        let bank = build(&[entry], &[(0x400, &payload[..])], 0x6000);

        let track = bank.read_track(0, &ReadOptions::new()).unwrap();
        assert_eq!(track.channels, 2);
        assert_eq!(track.sample_rate, 11025);
        assert!((track.duration_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ima_payload_is_clamped_to_image() {
        let bank = build(&[ima_entry(0x7F0, 0x100, 0)], &[], 0x800);
        let track = bank.read_track(0, &ReadOptions::new()).unwrap();
        assert_eq!(track.samples.len(), 0x10);
    }

    #[test]
    fn test_pcm_reads_shared_region() {
        let mut entry = EntryDescriptor::new(1, Codec::Pcm16);
        entry.flags = 0b1;
        entry.num_bytes = 4;
        entry.data_offset = 0x1800;

        let mut region = Vec::new();
        for sample in [100i16, -100, 200, -200] {
            region.extend_from_slice(&sample.to_le_bytes());
        }
        let bank = build(&[entry], &[(0x1000, region.as_slice())], 0x2000);

        // payload size 8 bytes -> 2 pairs -> 4 samples
        let track = bank.read_track(0, &ReadOptions::new()).unwrap();
        assert_eq!(track.samples, vec![100, -100, 200, -200]);
    }

    #[test]
    fn test_pcm8_also_reads_shared_region() {
        let mut entry = EntryDescriptor::new(1, Codec::Pcm8);
        entry.num_bytes = 2;
        entry.data_offset = 0x1800;
        let region: Vec<u8> = [7i16, -7].iter().flat_map(|s| s.to_le_bytes()).collect();
        let bank = build(&[entry], &[(0x1000, region.as_slice())], 0x2000);

        let track = bank.read_track(0, &ReadOptions::new()).unwrap();
        assert_eq!(track.codec, Codec::Pcm8);
        assert_eq!(track.samples, vec![7, -7]);
    }

    #[test]
    fn test_pcm_short_region_truncates() {
        let mut entry = EntryDescriptor::new(1, Codec::Pcm16);
        entry.num_bytes = 0x100;
        let bank = build(&[entry], &[], 0x1008);
        let track = bank.read_track(0, &ReadOptions::new()).unwrap();
        assert_eq!(track.samples.len(), 4);
    }

    #[test]
    fn test_unsupported_codecs_are_skipped() {
        let mut adpcm_b = EntryDescriptor::new(2, Codec::AdpcmB);
        adpcm_b.data_offset = 0x400;
        let mut reserved = EntryDescriptor::new(3, Codec::Other(6));
        reserved.data_offset = 0x400;
        let entries = [ima_entry(0x400, 8, 0), adpcm_b, reserved];
        let bank = build(&entries, &[], 0x800);

        let contents = bank.read_tracks(&ReadOptions::new(), None);
        assert_eq!(contents.tracks.len(), 1);
        assert_eq!(contents.errors.len(), 2);
        assert_eq!(contents.total_entries(), 3);
        assert!(matches!(
            contents.errors[0],
            (1, Error::UnsupportedCodec { index: Some(1), tag: 5 })
        ));
        assert!(matches!(
            contents.errors[1],
            (2, Error::UnsupportedCodec { index: Some(2), tag: 6 })
        ));
        assert_eq!(bank.entries().len(), 3);
    }

    #[test]
    fn test_progress_reports_each_entry() {
        let entries = [ima_entry(0x400, 4, 0), ima_entry(0x404, 4, 0)];
        let bank = build(&entries, &[], 0x800);
        let seen = std::cell::RefCell::new(Vec::new());
        let callback = |p: &BankProgress| seen.borrow_mut().push((p.phase, p.current));

        bank.read_tracks(&ReadOptions::new(), Some(&callback));
        assert_eq!(
            seen.into_inner(),
            vec![
                (BankPhase::DecodingTracks, 1),
                (BankPhase::DecodingTracks, 2),
                (BankPhase::Complete, 2),
            ]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let payload: Vec<u8> = (0..64u8).collect();
        let entries = [
            ima_entry(0x400, 64, 0b11),
            ima_entry(0x420, 32, 0),
            EntryDescriptor::new(9, Codec::AdpcmA),
        ];
        let bank = build(&entries, &[(0x400, &payload[..])], 0x800);
        let options = ReadOptions::new().with_state_mode(AdpcmStateMode::PerChannel);

        let sequential = bank.read_tracks(&options, None);
        let parallel = bank.read_tracks_parallel(&options);
        assert_eq!(parallel.tracks, sequential.tracks);
        assert_eq!(parallel.errors.len(), 1);
        assert_eq!(parallel.errors[0].0, 2);
    }

    #[test]
    fn test_out_of_range_track() {
        let bank = build(&[], &[], 0x200);
        assert!(matches!(
            bank.read_track(0, &ReadOptions::new()),
            Err(Error::InvalidIndex { index: 1, count: 0 })
        ));
    }
}
