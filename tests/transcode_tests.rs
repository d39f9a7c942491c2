// Integration tests for the transcode stage
//
// These cover the full compressed-bytes -> WAV container path: sample order,
// quantization rails, container well-formedness, and the streaming-header
// finalization used by the microphone backend.

use anyhow::Result;
use voicecap::transcode::{self, pcm, wav};
use voicecap::PipelineError;

/// Build a finalized in-memory WAV from 16-bit samples.
fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    wav::encode(samples, sample_rate, channels).expect("encode fixture WAV")
}

/// Simulate chunked capture: split a buffer into fixed-size chunks and
/// concatenate them back in delivery order, as the session collector does.
fn through_chunks(bytes: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for chunk in bytes.chunks(chunk_size) {
        out.extend_from_slice(chunk);
    }
    out
}

fn read_samples(wav: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let reader = hound::WavReader::new(std::io::Cursor::new(wav.to_vec())).expect("read WAV");
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .expect("read samples");
    (spec, samples)
}

#[test]
fn quantizer_hits_exact_rails() {
    let input = [-1.0f32, -0.5, 0.0, 0.5, 1.0];
    let expected = [-32768i16, -16384, 0, 16384, 32767];
    for (s, e) in input.iter().zip(expected.iter()) {
        assert_eq!(pcm::quantize(*s), *e, "quantize({})", s);
    }
}

#[test]
fn container_is_riff_wave_with_exact_length() -> Result<()> {
    let samples: Vec<i16> = (0..1000).map(|i| (i % 100) as i16).collect();
    let out = transcode::transcode(wav_bytes(&samples, 16000, 1))?;

    assert_eq!(&out[0..4], b"RIFF");
    assert_eq!(&out[8..12], b"WAVE");
    assert_eq!(out.len(), 44 + 2 * samples.len());

    // Header fields round-trip through a standard decoder
    let (spec, decoded) = read_samples(&out);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(decoded.len(), samples.len());

    Ok(())
}

#[test]
fn chunk_order_is_preserved() -> Result<()> {
    // Sequentially numbered samples; values stay below 16384 so the
    // f32 round-trip through the decoder is exact.
    let samples: Vec<i16> = (0..4800).map(|i| (i % 16000) as i16).collect();
    let source = wav_bytes(&samples, 16000, 1);

    // 100ms of PCM16 at 16kHz mono per chunk
    let collected = through_chunks(&source, 3200);
    assert_eq!(collected, source);

    let out = transcode::transcode(collected)?;
    let (_, decoded) = read_samples(&out);

    assert_eq!(decoded, samples, "sample sequence must match chunk order");

    Ok(())
}

#[test]
fn two_seconds_of_silence() -> Result<()> {
    // 2s of all-zero samples at 16kHz mono
    let samples = vec![0i16; 32000];
    let source = wav_bytes(&samples, 16000, 1);

    let out = transcode::transcode(through_chunks(&source, 3200))?;

    assert_eq!(out.len(), 44 + 32000 * 2);
    let data_size = u32::from_le_bytes([out[40], out[41], out[42], out[43]]);
    assert_eq!(data_size, 32000 * 2);

    let (spec, decoded) = read_samples(&out);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(decoded.len(), 32000);
    assert!(decoded.iter().all(|&s| s == 0), "silence stays silent");

    Ok(())
}

#[test]
fn streaming_capture_header_is_finalized() -> Result<()> {
    // The microphone backend frames chunks as a streaming WAV with
    // placeholder sizes; transcode must finalize and decode it.
    let mut source = wav::streaming_header(16000, 1).to_vec();
    for i in 0..1600i16 {
        source.extend_from_slice(&i.to_le_bytes());
    }

    let out = transcode::transcode(source)?;
    let (spec, decoded) = read_samples(&out);

    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(decoded.len(), 1600);
    assert_eq!(decoded[0], 0);
    assert_eq!(decoded[1599], 1599);

    Ok(())
}

#[test]
fn empty_recording_is_decode_error() {
    let err = transcode::transcode(Vec::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Decode(_)));
}

#[test]
fn corrupt_recording_is_decode_error() {
    let err = transcode::transcode(vec![0x17; 4096]).unwrap_err();
    assert!(matches!(err, PipelineError::Decode(_)));
}

#[test]
fn stereo_samples_stay_interleaved() -> Result<()> {
    // Interleaved L/R pairs survive in source order; no downmixing.
    let samples: Vec<i16> = vec![100, -100, 200, -200, 300, -300];
    let out = transcode::transcode(wav_bytes(&samples, 16000, 2))?;

    let (spec, decoded) = read_samples(&out);
    assert_eq!(spec.channels, 2);
    assert_eq!(decoded, samples);

    Ok(())
}
