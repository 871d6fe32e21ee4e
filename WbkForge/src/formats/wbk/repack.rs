//! Track replacement
//!
//! The format has no free list and no resizable records, so replacing a
//! payload means rebuilding the image: everything before the target payload
//! is copied verbatim, the new payload is written at the target's original
//! offset, and every later payload is moved to the next alignment boundary
//! with its descriptor patched to match.

use super::{
    Bank, BankHeader, BankPhase, BankProgress, Codec, ProgressCallback, RepackOptions,
};
use crate::audio::PcmAudio;
use crate::codec::ima_adpcm;
use crate::error::{Error, Result};

/// Round `value` up to a multiple of `alignment`
#[must_use]
pub fn align_up(value: usize, alignment: usize) -> usize {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

impl Bank {
    /// Replace the track with 1-based `number` using default options
    ///
    /// `Codec::Keep` re-encodes with the entry's current codec.
    ///
    /// # Errors
    /// See [`Bank::replace_with_options`].
    pub fn replace(&self, number: usize, audio: &PcmAudio, codec: Codec) -> Result<Bank> {
        self.replace_with_options(number, audio, codec, &RepackOptions::default(), None)
    }

    /// Replace the track with 1-based `number`, producing a new bank
    ///
    /// The target keeps its payload offset. Every later payload is relocated
    /// to an `options.alignment` boundary and the header's total size is
    /// updated. The rebuilt image is re-parsed before it is returned.
    ///
    /// # Errors
    /// - [`Error::InvalidIndex`] if `number` is 0 or past the last entry
    /// - [`Error::UnsupportedCodec`] if the resolved codec cannot be encoded
    /// - [`Error::MalformedLayout`] if payload offsets from the target onward
    ///   are out of order or outside the image
    /// - [`Error::UnsupportedWav`] if the sample rate does not fit the entry
    pub fn replace_with_options(
        &self,
        number: usize,
        audio: &PcmAudio,
        codec: Codec,
        options: &RepackOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<Bank> {
        let progress = progress.unwrap_or(&|_| {});
        let entries = self.entries();
        let count = entries.len();
        if number == 0 || number > count {
            return Err(Error::InvalidIndex {
                index: number,
                count,
            });
        }

        let target = number - 1;
        let original = &entries[target];
        let codec = if codec == Codec::Keep {
            original.codec()
        } else {
            codec
        };
        if !codec.is_encodable() {
            return Err(Error::UnsupportedCodec {
                index: Some(target),
                tag: codec.tag(),
            });
        }
        self.check_layout(target)?;

        let channels = u32::from(audio.channels.max(1));
        let frames = audio.samples.len() / channels as usize;
        // Descriptors store the aggregate rate over all channels.
        let stored_rate = audio
            .sample_rate
            .checked_mul(channels)
            .and_then(|rate| u16::try_from(rate).ok())
            .ok_or_else(|| {
                Error::UnsupportedWav(format!(
                    "{} Hz x {channels} channels does not fit an entry descriptor",
                    audio.sample_rate
                ))
            })?;

        tracing::info!(
            "Replacing entry {number}/{count} with {} ({channels} ch, {frames} frames, {} Hz, {} state)",
            codec.as_str(),
            audio.sample_rate,
            options.state_mode.as_str()
        );

        progress(&BankProgress::with_entry(
            BankPhase::EncodingPayload,
            1,
            1,
            format!("{:#010x}", original.hash),
        ));
        let encoded = ima_adpcm::encode(&audio.samples, channels, options.state_mode);
        let encoded_len = u32::try_from(encoded.len())
            .map_err(|_| Error::layout(format!("encoded payload too large: {} bytes", encoded.len())))?;

        let raw = self.as_bytes();
        let start = original.data_offset as usize;
        let mut out = Vec::with_capacity(raw.len() + encoded.len() + options.alignment);
        out.extend_from_slice(&raw[..start]);

        let mut patched = original.clone();
        if patched.codec() != codec {
            patched.set_codec(codec);
        }
        if patched.channel_count() != channels {
            patched.set_channel_count(channels);
        }
        patched.sample_rate = stored_rate;
        patched.num_bytes = encoded_len;
        patched.num_samples = i32::try_from(frames)
            .map_err(|_| Error::layout(format!("too many frames for one entry: {frames}")))?;
        patched.write_at(&mut out, target)?;

        out.extend_from_slice(&encoded);
        out.resize(align_up(out.len(), options.alignment), 0);
        tracing::debug!(
            "entry[{target}]: {encoded_len} bytes at {start:#x}, next payload at {:#x}",
            out.len()
        );

        let later = count - number;
        for (step, index) in (number..count).enumerate() {
            let entry = &entries[index];
            let old_start = entry.data_offset as usize;
            let old_end = entries
                .get(index + 1)
                .map_or(raw.len(), |next| next.data_offset as usize);

            progress(&BankProgress::with_entry(
                BankPhase::RelocatingEntries,
                step + 1,
                later,
                format!("{:#010x}", entry.hash),
            ));

            let mut moved = entry.clone();
            moved.data_offset = u32::try_from(out.len())
                .map_err(|_| Error::layout(format!("bank image too large: {} bytes", out.len())))?;
            moved.write_at(&mut out, index)?;
            tracing::debug!(
                "entry[{index}]: {:#x} -> {:#x} ({} bytes)",
                old_start,
                moved.data_offset,
                old_end - old_start
            );

            out.extend_from_slice(&raw[old_start..old_end]);
            out.resize(align_up(out.len(), options.alignment), 0);
        }

        let total = out.len();
        BankHeader::patch_total_bytes(&mut out, total)?;

        progress(&BankProgress::new(BankPhase::Validating, 1, 1));
        let rebuilt = Bank::parse(out)?;

        progress(&BankProgress::new(BankPhase::Complete, 1, 1));
        tracing::info!("Rebuilt bank: {} -> {} bytes", raw.len(), rebuilt.len());
        Ok(rebuilt)
    }

    /// Payloads from `target` onward must start after the entry table, be in
    /// table order, and lie inside the image.
    fn check_layout(&self, target: usize) -> Result<()> {
        let entries = self.entries();
        let table_end = BankHeader::entry_table_end(entries.len());
        let len = self.len();

        let mut previous = table_end;
        for (index, entry) in entries.iter().enumerate().skip(target) {
            let offset = entry.data_offset as usize;
            if offset < previous {
                return Err(Error::layout(format!(
                    "entry {index} payload at {offset:#x} is before {previous:#x}"
                )));
            }
            if offset > len {
                return Err(Error::layout(format!(
                    "entry {index} payload at {offset:#x} is past end of image ({len:#x})"
                )));
            }
            previous = offset;
        }
        Ok(())
    }
}
