//! Fixed-point / floating-point sample conversion

use crate::types::Sample;

/// Scale between `i16` and float samples
///
/// `|i16::MIN|` rather than `i16::MAX`, so every `i16` survives a round trip.
/// `-32768` maps to exactly `-1.0`; nothing maps to `+1.0`.
pub const S16_CONVERSION_FACTOR: Sample = -(i16::MIN as Sample);

/// Convert signed 16-bit samples to float
pub fn convert_s16_to_f32(dest: &mut [Sample], src: &[i16]) {
    let src = &src[..dest.len()];
    for (d, s) in dest.iter_mut().zip(src) {
        *d = Sample::from(*s) / S16_CONVERSION_FACTOR;
    }
}

/// Convert float samples to signed 16-bit, clamping out-of-range values
///
/// `+1.0` clamps to `32767`.
pub fn convert_f32_to_s16(dest: &mut [i16], src: &[Sample]) {
    let src = &src[..dest.len()];
    for (d, s) in dest.iter_mut().zip(src) {
        *d = (*s * S16_CONVERSION_FACTOR).clamp(i16::MIN as Sample, i16::MAX as Sample) as i16;
    }
}
