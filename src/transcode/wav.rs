//! In-memory WAV container encoding.
//!
//! Output layout is the canonical 44-byte header (RIFF/WAVE/fmt /data,
//! little-endian, format code 1 = PCM, 16 bits per sample) followed by the
//! raw sample bytes. Total size is always 44 + 2 x sample count.

use std::io::Cursor;

use crate::error::PipelineError;

pub const HEADER_LEN: usize = 44;

/// Placeholder size used in streaming headers before the total length is known.
const UNKNOWN_SIZE: u32 = u32::MAX;

/// Encode 16-bit PCM samples into a complete WAV byte buffer.
pub fn encode(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>, PipelineError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| PipelineError::Decode(format!("failed to create WAV writer: {}", e)))?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| PipelineError::Decode(format!("failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| PipelineError::Decode(format!("failed to finalize WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

/// Build a 44-byte WAV header with placeholder chunk sizes, for framing a
/// live stream whose total length is not yet known. `patch_riff_sizes` fixes
/// the sizes once the recording is complete.
pub fn streaming_header(sample_rate: u32, channels: u16) -> [u8; HEADER_LEN] {
    let byte_rate = sample_rate * channels as u32 * 2;
    let block_align = channels * 2;

    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&UNKNOWN_SIZE.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // format code 1 = PCM
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&16u16.to_le_bytes()); // bits per sample
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&UNKNOWN_SIZE.to_le_bytes());
    header
}

/// Replace placeholder RIFF/data sizes with the actual buffer length.
/// Buffers that are not streaming WAV (different container, or sizes already
/// final) are left untouched.
pub fn patch_riff_sizes(buf: &mut [u8]) {
    if buf.len() < HEADER_LEN || &buf[0..4] != b"RIFF" || &buf[8..12] != b"WAVE" {
        return;
    }
    if &buf[36..40] != b"data" {
        return;
    }

    let riff_size = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let data_size = u32::from_le_bytes([buf[40], buf[41], buf[42], buf[43]]);
    if riff_size != UNKNOWN_SIZE && data_size != UNKNOWN_SIZE {
        return;
    }

    let total = buf.len() as u32;
    buf[4..8].copy_from_slice(&(total - 8).to_le_bytes());
    buf[40..44].copy_from_slice(&(total - HEADER_LEN as u32).to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_layout_is_header_plus_samples() {
        let samples: Vec<i16> = vec![0, 100, -100, i16::MAX, i16::MIN];
        let bytes = encode(&samples, 16000, 1).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + samples.len() * 2);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");

        // format code 1 = PCM, mono, 16kHz, 16-bit
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            16000
        );
        assert_eq!(
            u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
            32000
        );
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16);
    }

    #[test]
    fn streaming_header_patches_to_valid_sizes() {
        let mut buf = streaming_header(16000, 1).to_vec();
        buf.extend_from_slice(&[0u8; 3200]);

        patch_riff_sizes(&mut buf);

        let riff = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let data = u32::from_le_bytes([buf[40], buf[41], buf[42], buf[43]]);
        assert_eq!(riff, buf.len() as u32 - 8);
        assert_eq!(data, 3200);

        // Patched buffer is readable by a standard decoder
        let reader = hound::WavReader::new(std::io::Cursor::new(buf)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 1600);
    }

    #[test]
    fn patch_leaves_finalized_wav_alone() {
        let original = encode(&[1, 2, 3], 8000, 1).unwrap();
        let mut patched = original.clone();
        patch_riff_sizes(&mut patched);
        assert_eq!(original, patched);
    }

    #[test]
    fn patch_ignores_non_riff_buffers() {
        let mut buf = vec![0u8; 64];
        let before = buf.clone();
        patch_riff_sizes(&mut buf);
        assert_eq!(buf, before);
    }
}
