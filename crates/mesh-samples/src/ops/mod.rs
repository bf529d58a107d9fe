//! Real-time sample buffer operations
//!
//! Everything in this module is safe to call from the audio callback: no
//! allocation, no locking, no logging, and no state kept between calls.
//!
//! # Conventions
//!
//! - Lengths come from the slices. For `dest`/`src` pairs the destination
//!   length is the number of samples processed and sources must be at least
//!   that long.
//! - Sources and destinations never alias (`&mut` vs `&` borrows). Operations
//!   that work in place take a single `&mut` buffer.
//! - Exact `GAIN_ONE` and `GAIN_ZERO` short-circuit to a copy/no-op or a
//!   clear, so silence stays exactly silent and unity stays bit-exact.
//! - Precondition violations (partial frames, short sources) are caught by
//!   debug assertions; in release builds a short source panics on the slice
//!   bounds check instead of reading out of range.
//!
//! Loops are written as iterator zips over pre-sliced inputs so the compiler
//! can drop the bounds checks and vectorize them.

pub mod convert;
pub mod crossfade;
pub mod gain;
pub mod layout;
pub mod meter;
pub mod mix;
pub mod ramp;

use crate::types::{Sample, SAMPLE_PEAK, SAMPLE_ZERO};

/// Fill a buffer with silence
#[inline]
pub fn clear(buffer: &mut [Sample]) {
    buffer.fill(SAMPLE_ZERO);
}

/// Fill a buffer with a constant value
#[inline]
pub fn fill(buffer: &mut [Sample], value: Sample) {
    buffer.fill(value);
}

/// Copy `src` into `dest`
#[inline]
pub fn copy(dest: &mut [Sample], src: &[Sample]) {
    debug_assert!(src.len() >= dest.len());
    dest.copy_from_slice(&src[..dest.len()]);
}

/// Clamp a sample to the nominal range [-1.0, 1.0]
#[inline]
pub fn clamp_sample(sample: Sample) -> Sample {
    sample.clamp(-SAMPLE_PEAK, SAMPLE_PEAK)
}

/// Copy `src` into `dest`, clamping every sample to the nominal range
pub fn copy_clamp_buffer(dest: &mut [Sample], src: &[Sample]) {
    debug_assert!(src.len() >= dest.len());
    let src = &src[..dest.len()];
    for (d, s) in dest.iter_mut().zip(src) {
        *d = clamp_sample(*s);
    }
}
