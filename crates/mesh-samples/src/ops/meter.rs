//! Level metering
//!
//! Peak, RMS and clip detection over whole buffers. Meters read only; they
//! never modify the buffer.

use bitflags::bitflags;

use crate::types::{Sample, SAMPLE_PEAK, SAMPLE_ZERO};

bitflags! {
    /// Which channels of a stereo buffer clipped
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ClipStatus: u8 {
        const LEFT = 0b01;
        const RIGHT = 0b10;
    }
}

impl ClipStatus {
    pub const NONE: ClipStatus = ClipStatus::empty();
}

/// Per-channel absolute sums of a stereo buffer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelLevels {
    pub abs_left: Sample,
    pub abs_right: Sample,
    pub clipping: ClipStatus,
}

/// Sum `|sample|` per channel of an interleaved stereo buffer and flag each
/// channel holding a sample above full scale
pub fn sum_abs_per_channel(buffer: &[Sample]) -> ChannelLevels {
    let mut abs_left = SAMPLE_ZERO;
    let mut abs_right = SAMPLE_ZERO;
    // Counted rather than or-ed so the loop stays branch free
    let mut clipped_left = 0u32;
    let mut clipped_right = 0u32;

    for frame in buffer.chunks_exact(2) {
        let left = frame[0].abs();
        let right = frame[1].abs();
        abs_left += left;
        abs_right += right;
        clipped_left += u32::from(left > SAMPLE_PEAK);
        clipped_right += u32::from(right > SAMPLE_PEAK);
    }

    let mut clipping = ClipStatus::NONE;
    if clipped_left > 0 {
        clipping |= ClipStatus::LEFT;
    }
    if clipped_right > 0 {
        clipping |= ClipStatus::RIGHT;
    }

    ChannelLevels {
        abs_left,
        abs_right,
        clipping,
    }
}

/// Sum of squared samples, channel agnostic
pub fn sum_squared(buffer: &[Sample]) -> Sample {
    buffer.iter().map(|s| s * s).sum()
}

/// Root mean square of all samples; `0.0` for an empty buffer
pub fn rms(buffer: &[Sample]) -> Sample {
    if buffer.is_empty() {
        return SAMPLE_ZERO;
    }
    (sum_squared(buffer) / buffer.len() as Sample).sqrt()
}

/// Largest `|sample|`; `0.0` for an empty buffer
pub fn max_abs_amplitude(buffer: &[Sample]) -> Sample {
    buffer
        .iter()
        .fold(SAMPLE_ZERO, |max, sample| max.max(sample.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_abs_per_channel() {
        let levels = sum_abs_per_channel(&[0.5, -0.25, -0.5, 0.25]);
        assert_eq!(levels.abs_left, 1.0);
        assert_eq!(levels.abs_right, 0.5);
        assert_eq!(levels.clipping, ClipStatus::NONE);
    }

    #[test]
    fn test_clip_detection() {
        // Exactly full scale is not clipping
        assert_eq!(sum_abs_per_channel(&[1.0, -1.0]).clipping, ClipStatus::NONE);
        assert_eq!(sum_abs_per_channel(&[0.0, -1.01]).clipping, ClipStatus::RIGHT);
        assert_eq!(
            sum_abs_per_channel(&[1.5, 0.0, 0.0, 2.0]).clipping,
            ClipStatus::LEFT | ClipStatus::RIGHT
        );
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.5, -0.5, 0.5, -0.5]), 0.5);
        assert_eq!(sum_squared(&[2.0, -3.0]), 13.0);
    }

    #[test]
    fn test_max_abs_amplitude() {
        assert_eq!(max_abs_amplitude(&[]), 0.0);
        assert_eq!(max_abs_amplitude(&[0.1, -0.9, 0.3]), 0.9);
        // A negative first sample is measured by magnitude too
        assert_eq!(max_abs_amplitude(&[-0.7, 0.2]), 0.7);
    }
}
