//! In-place gain
//!
//! Constant, ramped and per-channel ("alternating") gain applied to a buffer
//! in place. Exact unity gain leaves the buffer untouched and exact zero gain
//! clears it without multiplying.

use super::clear;
use super::ramp::{self, Ramp};
use crate::types::{ChannelCount, Gain, Sample, GAIN_ONE, GAIN_ZERO};

/// Multiply every sample by `gain`
pub fn apply_gain(buffer: &mut [Sample], gain: Gain) {
    if gain == GAIN_ONE {
        return;
    }
    if gain == GAIN_ZERO {
        clear(buffer);
        return;
    }

    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

/// Ramp the gain of an interleaved stereo buffer across its frames
pub fn apply_ramping_gain(buffer: &mut [Sample], ramp: Ramp) {
    apply_ramping_gain_multichannel(buffer, ramp, ChannelCount::STEREO);
}

/// Ramp the gain of an interleaved buffer across its frames
///
/// Every sample of a frame gets the same gain. Stereo and stem layouts take
/// a const-channel fast path with identical results.
pub fn apply_ramping_gain_multichannel(buffer: &mut [Sample], ramp: Ramp, channels: ChannelCount) {
    if ramp.is_flat() {
        apply_gain(buffer, ramp.from);
        return;
    }

    let frames = channels.frames(buffer.len());
    if frames == 0 {
        return;
    }
    let step = ramp.step(frames);
    match channels.count() {
        2 => ramp::scale_frames::<2>(buffer, step),
        8 => ramp::scale_frames::<8>(buffer, step),
        n => ramp::scale_frames_by(buffer, step, n),
    }
}

/// Multiply even samples (left) by `left` and odd samples (right) by `right`
pub fn apply_alternating_gain(buffer: &mut [Sample], left: Gain, right: Gain) {
    // Also covers left == right == GAIN_ONE
    if left == right {
        apply_gain(buffer, left);
        return;
    }

    debug_assert!(buffer.len() % 2 == 0);
    for frame in buffer.chunks_exact_mut(2) {
        frame[0] *= left;
        frame[1] *= right;
    }
}

/// Ramp the left and right channel gains independently
pub fn apply_ramping_alternating_gain(buffer: &mut [Sample], left: Ramp, right: Ramp) {
    if left.is_flat() && right.is_flat() {
        apply_alternating_gain(buffer, left.from, right.from);
        return;
    }

    let frames = ChannelCount::STEREO.frames(buffer.len());
    if frames == 0 {
        return;
    }
    let left = left.step(frames);
    let right = right.step(frames);
    for (i, frame) in buffer.chunks_exact_mut(2).enumerate() {
        frame[0] *= left.gain_at(i);
        frame[1] *= right.gain_at(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_buffer(len: usize) -> Vec<Sample> {
        (0..len).map(|i| ((i as Sample) * 0.13).cos()).collect()
    }

    #[test]
    fn test_unity_gain_is_noop() {
        let original = vec![0.1, -0.7, 1.3, f32::MIN_POSITIVE];
        let mut buffer = original.clone();
        apply_gain(&mut buffer, GAIN_ONE);
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_zero_gain_clears() {
        let mut buffer = vec![0.1, -0.7, 1.3, f32::INFINITY];
        apply_gain(&mut buffer, GAIN_ZERO);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_apply_gain() {
        let mut buffer = [1.0, -0.5, 0.25];
        apply_gain(&mut buffer, 0.5);
        assert_eq!(buffer, [0.5, -0.25, 0.125]);
    }

    #[test]
    fn test_ramping_gain_two_frames() {
        let mut buffer = [1.0, -1.0, 0.5, -0.5];
        apply_ramping_gain(&mut buffer, Ramp::new(0.0, 1.0));
        assert_eq!(buffer, [0.5, -0.5, 0.5, -0.5]);
    }

    #[test]
    fn test_ramping_gain_four_frames() {
        let mut buffer = [1.0; 8];
        apply_ramping_gain(&mut buffer, Ramp::new(0.0, 1.0));
        assert_eq!(buffer, [0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0]);
    }

    #[test]
    fn test_flat_ramp_matches_constant_gain() {
        let mut ramped = ramp_buffer(64);
        let mut constant = ramped.clone();
        apply_ramping_gain(&mut ramped, Ramp::flat(0.7));
        apply_gain(&mut constant, 0.7);
        assert_eq!(ramped, constant);

        let mut silent = ramp_buffer(8);
        apply_ramping_gain(&mut silent, Ramp::flat(0.0));
        assert!(silent.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_empty_ramp_is_noop() {
        let mut buffer: [Sample; 0] = [];
        apply_ramping_gain(&mut buffer, Ramp::new(0.0, 1.0));
    }

    #[test]
    fn test_multichannel_fast_paths_match_generic() {
        for channels in [ChannelCount::STEREO, ChannelCount::STEM] {
            let mut fast = ramp_buffer(128);
            let mut generic = fast.clone();
            let ramp = Ramp::new(0.9, 0.2);

            apply_ramping_gain_multichannel(&mut fast, ramp, channels);
            let step = ramp.step(128 / channels.count());
            ramp::scale_frames_by(&mut generic, step, channels.count());
            assert_eq!(fast, generic);
        }
    }

    #[test]
    fn test_ramp_steps_whole_frames() {
        // 3 channels, 2 frames: every sample of a frame shares the gain
        let mut buffer = [1.0; 6];
        let channels = ChannelCount::new(3).unwrap();
        apply_ramping_gain_multichannel(&mut buffer, Ramp::new(0.0, 1.0), channels);
        assert_eq!(buffer, [0.5, 0.5, 0.5, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_alternating_gain() {
        let mut buffer = [1.0, 1.0, 2.0, 2.0];
        apply_alternating_gain(&mut buffer, 0.5, 0.25);
        assert_eq!(buffer, [0.5, 0.25, 1.0, 0.5]);

        let mut same = [1.0, 2.0];
        apply_alternating_gain(&mut same, 0.0, 0.0);
        assert_eq!(same, [0.0, 0.0]);
    }

    #[test]
    fn test_ramping_alternating_gain() {
        let mut buffer = [1.0; 8];
        apply_ramping_alternating_gain(&mut buffer, Ramp::new(0.0, 1.0), Ramp::flat(0.5));
        assert_eq!(buffer, [0.25, 0.5, 0.5, 0.5, 0.75, 0.5, 1.0, 0.5]);

        let mut flat = [1.0, 1.0];
        apply_ramping_alternating_gain(&mut flat, Ramp::flat(0.5), Ramp::flat(2.0));
        assert_eq!(flat, [0.5, 2.0]);
    }
}
