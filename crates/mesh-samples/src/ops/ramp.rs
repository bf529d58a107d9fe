//! Linear gain ramps
//!
//! A ramp moves a gain from `from` to `to` across the frames of one buffer.
//! With `frames` frames the step is `delta = (to - from) / frames` and frame
//! `i` gets `from + delta * (i + 1)`: the first frame is already one step away
//! from `from` and the last frame lands on `to`. Chaining
//! `Ramp::new(previous.to, next)` across callbacks therefore never repeats a
//! gain value and never jumps.
//!
//! Ramps carry no state between calls. The caller remembers `to` and passes it
//! as the next `from`.
//!
//! The frame kernels in this module are written once over a runtime channel
//! count and once over a const channel count. The const versions are what the
//! stereo and stem entry points use; both compute the gain with the same
//! expression so they produce bit-identical output.

use crate::types::{Gain, Sample, GAIN_ONE, GAIN_ZERO};

/// Start and end gain of a linear ramp across one buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub from: Gain,
    pub to: Gain,
}

impl Ramp {
    #[inline]
    pub const fn new(from: Gain, to: Gain) -> Self {
        Self { from, to }
    }

    /// A ramp that holds `gain` for the whole buffer
    #[inline]
    pub const fn flat(gain: Gain) -> Self {
        Self { from: gain, to: gain }
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.from == self.to
    }

    /// Both ends are exactly unity
    #[inline]
    pub fn is_unity(&self) -> bool {
        self.from == GAIN_ONE && self.to == GAIN_ONE
    }

    /// Both ends are exactly zero
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.from == GAIN_ZERO && self.to == GAIN_ZERO
    }

    /// Per-frame gain sequence for a buffer of `frames` frames
    ///
    /// `frames` must be non-zero.
    #[inline]
    pub fn step(&self, frames: usize) -> RampStep {
        debug_assert!(frames > 0, "ramp over an empty buffer");
        let delta = (self.to - self.from) / frames as Gain;
        RampStep {
            start: self.from + delta,
            delta,
        }
    }

    /// The ramp continuing from this one towards `next`
    #[inline]
    pub fn then(&self, next: Gain) -> Ramp {
        Ramp::new(self.to, next)
    }
}

/// Gain of each frame of a ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep {
    start: Gain,
    delta: Gain,
}

impl RampStep {
    #[inline(always)]
    pub fn gain_at(&self, frame: usize) -> Gain {
        self.start + self.delta * frame as Gain
    }

    #[inline]
    pub fn delta(&self) -> Gain {
        self.delta
    }
}

/// `buffer *= gain(frame)`
#[inline]
pub(crate) fn scale_frames<const CH: usize>(buffer: &mut [Sample], step: RampStep) {
    for (i, frame) in buffer.chunks_exact_mut(CH).enumerate() {
        let gain = step.gain_at(i);
        for sample in frame.iter_mut() {
            *sample *= gain;
        }
    }
}

pub(crate) fn scale_frames_by(buffer: &mut [Sample], step: RampStep, channels: usize) {
    for (i, frame) in buffer.chunks_exact_mut(channels).enumerate() {
        let gain = step.gain_at(i);
        for sample in frame.iter_mut() {
            *sample *= gain;
        }
    }
}

/// `dest = src * gain(frame)`
#[inline]
pub(crate) fn copy_frames<const CH: usize>(dest: &mut [Sample], src: &[Sample], step: RampStep) {
    for (i, (d, s)) in dest.chunks_exact_mut(CH).zip(src.chunks_exact(CH)).enumerate() {
        let gain = step.gain_at(i);
        for c in 0..CH {
            d[c] = s[c] * gain;
        }
    }
}

pub(crate) fn copy_frames_by(dest: &mut [Sample], src: &[Sample], step: RampStep, channels: usize) {
    for (i, (d, s)) in dest
        .chunks_exact_mut(channels)
        .zip(src.chunks_exact(channels))
        .enumerate()
    {
        let gain = step.gain_at(i);
        for (d, s) in d.iter_mut().zip(s) {
            *d = *s * gain;
        }
    }
}

/// `dest += src * gain(frame)`
#[inline]
pub(crate) fn add_frames<const CH: usize>(dest: &mut [Sample], src: &[Sample], step: RampStep) {
    for (i, (d, s)) in dest.chunks_exact_mut(CH).zip(src.chunks_exact(CH)).enumerate() {
        let gain = step.gain_at(i);
        for c in 0..CH {
            d[c] += s[c] * gain;
        }
    }
}

pub(crate) fn add_frames_by(dest: &mut [Sample], src: &[Sample], step: RampStep, channels: usize) {
    for (i, (d, s)) in dest
        .chunks_exact_mut(channels)
        .zip(src.chunks_exact(channels))
        .enumerate()
    {
        let gain = step.gain_at(i);
        for (d, s) in d.iter_mut().zip(s) {
            *d += *s * gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gains(ramp: Ramp, frames: usize) -> Vec<Gain> {
        let step = ramp.step(frames);
        (0..frames).map(|i| step.gain_at(i)).collect()
    }

    #[test]
    fn test_two_frame_ramp() {
        assert_eq!(gains(Ramp::new(0.0, 1.0), 2), vec![0.5, 1.0]);
    }

    #[test]
    fn test_four_frame_ramp() {
        assert_eq!(gains(Ramp::new(0.0, 1.0), 4), vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(gains(Ramp::new(1.0, 0.0), 4), vec![0.75, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_flat_ramp_holds_gain() {
        let ramp = Ramp::flat(0.3);
        assert!(ramp.is_flat());
        assert_eq!(ramp.step(16).delta(), 0.0);
        assert!(gains(ramp, 16).iter().all(|&g| g == 0.3));
    }

    #[test]
    fn test_sentinels() {
        assert!(Ramp::flat(1.0).is_unity());
        assert!(Ramp::flat(0.0).is_silent());
        assert!(!Ramp::new(0.0, 1.0).is_silent());
        assert!(!Ramp::new(1.0, 0.5).is_unity());
    }

    #[test]
    fn test_then_continues_from_end() {
        let ramp = Ramp::new(0.2, 0.8).then(0.4);
        assert_eq!(ramp, Ramp::new(0.8, 0.4));
    }

    #[test]
    fn test_const_and_runtime_kernels_agree() {
        let src: Vec<Sample> = (0..96).map(|i| (i as Sample * 0.37).sin()).collect();

        for channels in [2usize, 8] {
            let frames = 96 / channels;
            let step = Ramp::new(0.1, 0.9).step(frames);

            let mut fixed = src.clone();
            let mut dynamic = src.clone();
            match channels {
                2 => scale_frames::<2>(&mut fixed, step),
                _ => scale_frames::<8>(&mut fixed, step),
            }
            scale_frames_by(&mut dynamic, step, channels);
            assert_eq!(fixed, dynamic);

            let mut fixed = vec![0.25; 96];
            let mut dynamic = vec![0.25; 96];
            match channels {
                2 => add_frames::<2>(&mut fixed, &src, step),
                _ => add_frames::<8>(&mut fixed, &src, step),
            }
            add_frames_by(&mut dynamic, &src, step, channels);
            assert_eq!(fixed, dynamic);

            let mut fixed = vec![0.0; 96];
            let mut dynamic = vec![0.0; 96];
            match channels {
                2 => copy_frames::<2>(&mut fixed, &src, step),
                _ => copy_frames::<8>(&mut fixed, &src, step),
            }
            copy_frames_by(&mut dynamic, &src, step, channels);
            assert_eq!(fixed, dynamic);
        }
    }
}
