//! 16-bit PCM WAV reading and writing
//!
//! Files are written with the canonical 44-byte header. Reading walks the
//! RIFF chunk list, so files with extra chunks (LIST, fact, cue) are accepted.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::PcmAudio;
use crate::error::{Error, Result};

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Size of the header [`write_wav`] produces
pub const WAV_HEADER_SIZE: usize = 44;

/// Read a 16-bit PCM WAV file
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be read, [`Error::InvalidWav`]
/// for a broken container, or [`Error::UnsupportedWav`] for anything other
/// than 16-bit integer PCM.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<PcmAudio> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let audio = parse_wav_bytes(&data)?;
    tracing::debug!(
        "Read WAV {}: {} Hz, {} ch, {} frames",
        path.display(),
        audio.sample_rate,
        audio.channels,
        audio.frames()
    );
    Ok(audio)
}

/// Parse a 16-bit PCM WAV image
pub fn parse_wav_bytes(data: &[u8]) -> Result<PcmAudio> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor
        .read_exact(&mut magic)
        .map_err(|_| Error::InvalidWav("file too short".to_string()))?;
    if &magic != RIFF_MAGIC {
        return Err(Error::InvalidWav("missing RIFF".to_string()));
    }
    let _riff_size = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    cursor.read_exact(&mut magic).map_err(truncated)?;
    if &magic != WAVE_MAGIC {
        return Err(Error::InvalidWav("missing WAVE".to_string()));
    }

    let mut format: Option<(u16, u32)> = None;
    let mut samples = None;

    loop {
        let mut chunk_id = [0u8; 4];
        if cursor.read_exact(&mut chunk_id).is_err() {
            break;
        }
        let chunk_size = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
        let chunk_start = cursor.position();

        match &chunk_id {
            b"fmt " => {
                let format_code = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
                let channels = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
                let sample_rate = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
                let _byte_rate = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
                let _block_align = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
                let bits = cursor.read_u16::<LittleEndian>().map_err(truncated)?;

                if format_code != FORMAT_PCM {
                    return Err(Error::UnsupportedWav(format!(
                        "format code {format_code:#06x}, only PCM (1) is supported"
                    )));
                }
                if bits != BITS_PER_SAMPLE {
                    return Err(Error::UnsupportedWav(format!(
                        "{bits}-bit samples, only 16-bit is supported"
                    )));
                }
                if channels == 0 {
                    return Err(Error::InvalidWav("zero channels".to_string()));
                }
                format = Some((channels, sample_rate));
            }
            b"data" => {
                // Tolerate a data chunk whose size overruns the file.
                let available = data.len() as u64 - chunk_start;
                let size = u64::from(chunk_size).min(available) as usize / 2;
                let mut buf = vec![0i16; size];
                cursor
                    .read_i16_into::<LittleEndian>(&mut buf)
                    .map_err(truncated)?;
                samples = Some(buf);
            }
            _ => {}
        }

        // Chunks are word aligned
        let next = (chunk_start + u64::from(chunk_size) + 1) & !1;
        if next >= data.len() as u64 {
            break;
        }
        cursor.seek(SeekFrom::Start(next))?;
    }

    let (channels, sample_rate) =
        format.ok_or_else(|| Error::InvalidWav("missing fmt chunk".to_string()))?;
    let samples = samples.ok_or_else(|| Error::InvalidWav("missing data chunk".to_string()))?;

    Ok(PcmAudio {
        samples,
        sample_rate,
        channels,
    })
}

fn truncated(_: std::io::Error) -> Error {
    Error::InvalidWav("truncated chunk".to_string())
}

/// Encode audio as a 44-byte-header WAV image
pub fn wav_bytes(audio: &PcmAudio) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(WAV_HEADER_SIZE + audio.samples.len() * 2);
    write_to(&mut out, audio)?;
    Ok(out)
}

fn write_to<W: Write>(writer: &mut W, audio: &PcmAudio) -> std::io::Result<()> {
    let channels = audio.channels.max(1);
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = audio.sample_rate * u32::from(block_align);
    let data_size = (audio.samples.len() * 2) as u32;

    writer.write_all(RIFF_MAGIC)?;
    writer.write_u32::<LittleEndian>(36 + data_size)?;
    writer.write_all(WAVE_MAGIC)?;

    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(FORMAT_PCM)?;
    writer.write_u16::<LittleEndian>(channels)?;
    writer.write_u32::<LittleEndian>(audio.sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(BITS_PER_SAMPLE)?;

    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_size)?;
    for &sample in &audio.samples {
        writer.write_i16::<LittleEndian>(sample)?;
    }
    Ok(())
}

/// Write audio to a WAV file
pub fn write_wav<P: AsRef<Path>>(path: P, audio: &PcmAudio) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_to(&mut writer, audio)?;
    writer.flush()?;
    Ok(())
}
