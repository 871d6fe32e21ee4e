//! IMA-ADPCM sample codec
//!
//! Banks store one 4-bit code per byte (the high nibble is ignored on decode
//! and written as zero on encode), so the payload length in bytes equals the
//! number of interleaved samples.
//!
//! The decoder follows the classic ALSA/Intel reference arithmetic. The encoder
//! is the matching successive-approximation coder and advances its state
//! through exactly the same update the decoder applies, so the two state
//! machines never drift apart.

/// Step size for each of the 89 quantizer indices.
pub const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18499, 20350, 22385, 24623, 27086, 29794,
    32767,
];

/// Quantizer index adjustment for each 4-bit code.
pub const INDEX_TABLE: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

/// Highest valid quantizer index.
pub const MAX_STEP_INDEX: i32 = 88;

const SIGN_BIT: u8 = 0x8;
const MAGNITUDE_MASK: u8 = 0x7;

/// How predictor state is tracked across interleaved channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdpcmStateMode {
    /// One predictor advanced over every code regardless of channel.
    ///
    /// This is how existing banks were produced, so it is the default.
    #[default]
    Shared,
    /// An independent predictor per channel; code `i` belongs to channel
    /// `i % channels`.
    PerChannel,
}

impl AdpcmStateMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::PerChannel => "per-channel",
        }
    }
}

/// Predictor state of one IMA-ADPCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImaState {
    /// Last reconstructed sample, always within the i16 range.
    pub predicted: i32,
    /// Current quantizer index, always within `0..=88`.
    pub step_index: i32,
}

impl ImaState {
    /// Apply one 4-bit code and return the reconstructed sample.
    fn apply(&mut self, code: u8) -> i16 {
        let code = code & 0x0F;
        let magnitude = code & MAGNITUDE_MASK;
        let mut step = STEP_TABLE[self.step_index as usize];

        let mut diff = step >> 3;
        let mut bit = 0x4;
        while bit != 0 {
            if magnitude & bit != 0 {
                diff += step;
            }
            bit >>= 1;
            step >>= 1;
        }

        if code & SIGN_BIT != 0 {
            self.predicted -= diff;
        } else {
            self.predicted += diff;
        }
        self.predicted = self.predicted.clamp(i32::from(i16::MIN), i32::from(i16::MAX));

        self.step_index = (self.step_index + INDEX_TABLE[code as usize]).clamp(0, MAX_STEP_INDEX);

        self.predicted as i16
    }

    /// Pick the code that best approximates `sample` from the current state.
    fn quantize(&self, sample: i16) -> u8 {
        let mut diff = i32::from(sample) - self.predicted;
        let mut code = 0u8;
        if diff < 0 {
            code = SIGN_BIT;
            diff = -diff;
        }

        let mut step = STEP_TABLE[self.step_index as usize];
        let mut bit = 0x4;
        while bit != 0 {
            if diff >= step {
                code |= bit;
                diff -= step;
            }
            bit >>= 1;
            step >>= 1;
        }
        code
    }
}

/// Streaming IMA-ADPCM decoder over a single predictor.
#[derive(Debug, Clone, Default)]
pub struct ImaDecoder {
    state: ImaState,
}

impl ImaDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one byte; only its low nibble is used.
    pub fn decode_code(&mut self, byte: u8) -> i16 {
        self.state.apply(byte)
    }

    #[must_use]
    pub fn state(&self) -> ImaState {
        self.state
    }
}

/// Streaming IMA-ADPCM encoder over a single predictor.
#[derive(Debug, Clone, Default)]
pub struct ImaEncoder {
    state: ImaState,
}

impl ImaEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one sample into a byte holding the code in its low nibble.
    pub fn encode_sample(&mut self, sample: i16) -> u8 {
        let code = self.state.quantize(sample);
        self.state.apply(code);
        code
    }

    #[must_use]
    pub fn state(&self) -> ImaState {
        self.state
    }
}

/// Decode a bank payload into interleaved samples, one per input byte.
///
/// `channels` only matters in [`AdpcmStateMode::PerChannel`]; a value of 0 is
/// treated as mono.
#[must_use]
pub fn decode(bytes: &[u8], channels: u32, mode: AdpcmStateMode) -> Vec<i16> {
    let mut decoders = vec![ImaDecoder::new(); lanes(channels, mode)];
    let lane_count = decoders.len();

    bytes
        .iter()
        .enumerate()
        .map(|(i, &byte)| decoders[i % lane_count].decode_code(byte))
        .collect()
}

/// Encode interleaved samples into a bank payload, one byte per sample.
#[must_use]
pub fn encode(samples: &[i16], channels: u32, mode: AdpcmStateMode) -> Vec<u8> {
    let mut encoders = vec![ImaEncoder::new(); lanes(channels, mode)];
    let lane_count = encoders.len();

    samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| encoders[i % lane_count].encode_sample(sample))
        .collect()
}

fn lanes(channels: u32, mode: AdpcmStateMode) -> usize {
    match mode {
        AdpcmStateMode::Shared => 1,
        AdpcmStateMode::PerChannel => channels.max(1) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, freq: f64, rate: f64, amplitude: f64) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f64 / rate;
                (amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16
            })
            .collect()
    }

    fn max_error(a: &[i16], b: &[i16], skip: usize) -> i32 {
        a.iter()
            .zip(b)
            .skip(skip)
            .map(|(&x, &y)| (i32::from(x) - i32::from(y)).abs())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_silence_decodes_to_silence() {
        assert_eq!(decode(&[0u8; 16], 1, AdpcmStateMode::Shared), vec![0i16; 16]);
    }

    #[test]
    fn test_output_length_matches_input() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decode(&bytes, 2, AdpcmStateMode::Shared).len(), 256);
        assert_eq!(decode(&bytes, 2, AdpcmStateMode::PerChannel).len(), 256);
        assert_eq!(encode(&[1, 2, 3], 1, AdpcmStateMode::Shared).len(), 3);
    }

    #[test]
    fn test_high_nibble_is_ignored() {
        let low = decode(&[0x03, 0x0C, 0x07], 1, AdpcmStateMode::Shared);
        let high = decode(&[0xF3, 0xAC, 0x57], 1, AdpcmStateMode::Shared);
        assert_eq!(low, high);
    }

    #[test]
    fn test_first_code_arithmetic() {
        // step 7: diff = 0 + 7 + 3 + 1 = 11 for magnitude 7
        let mut decoder = ImaDecoder::new();
        assert_eq!(decoder.decode_code(0x07), 11);
        assert_eq!(decoder.state().step_index, 8);

        let mut decoder = ImaDecoder::new();
        assert_eq!(decoder.decode_code(0x0F), -11);
    }

    #[test]
    fn test_state_stays_clamped() {
        let mut decoder = ImaDecoder::new();
        for _ in 0..500 {
            decoder.decode_code(0x07);
            let state = decoder.state();
            assert!((0..=MAX_STEP_INDEX).contains(&state.step_index));
            assert!((-32768..=32767).contains(&state.predicted));
        }
        assert_eq!(decoder.state().predicted, 32767);
        assert_eq!(decoder.state().step_index, MAX_STEP_INDEX);

        for _ in 0..500 {
            decoder.decode_code(0x0F);
        }
        assert_eq!(decoder.state().predicted, -32768);

        for _ in 0..500 {
            decoder.decode_code(0x00);
        }
        assert_eq!(decoder.state().step_index, 0);
    }

    #[test]
    fn test_crafted_stream_never_escapes_range() {
        // Pseudo-random bytes from a simple LCG.
        let mut seed = 0x1234_5678u32;
        let mut decoder = ImaDecoder::new();
        for _ in 0..10_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            decoder.decode_code((seed >> 24) as u8);
            let state = decoder.state();
            assert!((0..=MAX_STEP_INDEX).contains(&state.step_index));
            assert!((-32768..=32767).contains(&state.predicted));
        }
    }

    #[test]
    fn test_encoder_tracks_decoder_state() {
        let samples = sine(2048, 330.0, 22050.0, 12000.0);
        let mut encoder = ImaEncoder::new();
        let mut decoder = ImaDecoder::new();
        for &sample in &samples {
            let code = encoder.encode_sample(sample);
            assert!(code <= 0x0F);
            decoder.decode_code(code);
            assert_eq!(encoder.state(), decoder.state());
        }
    }

    #[test]
    fn test_round_trip_sine_shared() {
        let samples = sine(8000, 200.0, 22050.0, 10000.0);
        let decoded = decode(&encode(&samples, 1, AdpcmStateMode::Shared), 1, AdpcmStateMode::Shared);
        assert_eq!(decoded.len(), samples.len());
        assert!(max_error(&samples, &decoded, 64) < 2048);
    }

    #[test]
    fn test_round_trip_sine_per_channel() {
        let left = sine(4000, 200.0, 22050.0, 10000.0);
        let right = sine(4000, 150.0, 22050.0, -6000.0);
        let interleaved: Vec<i16> = left.iter().zip(&right).flat_map(|(&l, &r)| [l, r]).collect();

        let encoded = encode(&interleaved, 2, AdpcmStateMode::PerChannel);
        let decoded = decode(&encoded, 2, AdpcmStateMode::PerChannel);
        assert_eq!(decoded.len(), interleaved.len());
        assert!(max_error(&interleaved, &decoded, 128) < 2048);
    }

    #[test]
    fn test_modes_differ_for_multichannel() {
        let bytes = [0x07, 0x01, 0x07, 0x01];
        let shared = decode(&bytes, 2, AdpcmStateMode::Shared);
        let split = decode(&bytes, 2, AdpcmStateMode::PerChannel);
        assert_ne!(shared, split);
        // Mono input is unaffected by the mode.
        assert_eq!(
            decode(&bytes, 1, AdpcmStateMode::Shared),
            decode(&bytes, 1, AdpcmStateMode::PerChannel)
        );
    }
}
