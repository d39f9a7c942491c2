//! Float PCM to 16-bit quantization.
//!
//! The scaling is asymmetric: negative samples scale by 32768, non-negative
//! by 32767, so the positive rail never overflows. Downstream consumers
//! expect exactly this mapping; treat it as a wire contract.

/// Quantize one floating-point sample in [-1.0, 1.0] to signed 16-bit PCM.
/// Out-of-range input is clamped first.
pub fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0).round() as i16
    } else {
        (s * 32767.0).round() as i16
    }
}

/// Quantize an interleaved f32 buffer, preserving sample order.
pub fn quantize_all(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| quantize(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rails_and_midpoints() {
        assert_eq!(quantize(-1.0), -32768);
        assert_eq!(quantize(-0.5), -16384);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 16384);
        assert_eq!(quantize(1.0), 32767);
    }

    #[test]
    fn out_of_range_clamps() {
        assert_eq!(quantize(2.0), 32767);
        assert_eq!(quantize(-2.0), -32768);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn order_preserved() {
        let input = [0.1f32, -0.2, 0.3, -0.4];
        let out = quantize_all(&input);
        assert_eq!(out.len(), 4);
        assert!(out[0] > 0 && out[1] < 0 && out[2] > 0 && out[3] < 0);
        assert_eq!(out[0], quantize(0.1));
        assert_eq!(out[3], quantize(-0.4));
    }
}
