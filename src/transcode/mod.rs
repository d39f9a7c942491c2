pub mod decode;
pub mod pcm;
pub mod wav;

pub use decode::DecodedAudio;

use crate::error::PipelineError;

/// Convert a complete compressed recording into a PCM16 WAV container.
///
/// Steps: finalize any streaming header, decode to interleaved f32 at the
/// stream's native layout, quantize to 16-bit (asymmetric scaling), and wrap
/// in a 44-byte-header WAV. Channel data stays interleaved in source order;
/// no downmixing is performed (capture is mono, so this is a direct copy).
pub fn transcode(mut compressed: Vec<u8>) -> Result<Vec<u8>, PipelineError> {
    wav::patch_riff_sizes(&mut compressed);

    let decoded = decode::decode(compressed)?;
    let samples = pcm::quantize_all(&decoded.samples);

    wav::encode(&samples, decoded.sample_rate, decoded.channels)
}
