//! Common types for Mesh sample processing
//!
//! This module contains the fundamental sample, gain and channel-layout types
//! shared by every buffer primitive, plus the stereo buffer type the engine
//! hands to the mixer.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{SampleError, SampleResult};
use crate::ops;
use crate::ops::meter::ChannelLevels;
use crate::ops::ramp::Ramp;

/// Audio sample type (32-bit float for processing)
pub type Sample = f32;

/// Gain factor applied to samples
pub type Gain = f32;

/// Silence
pub const SAMPLE_ZERO: Sample = 0.0;

/// Nominal peak amplitude. Samples above this magnitude are clipping.
pub const SAMPLE_PEAK: Sample = 1.0;

/// Unity gain. Operations treat an exact `GAIN_ONE` as "pass through".
pub const GAIN_ONE: Gain = 1.0;

/// Silent gain. Operations treat an exact `GAIN_ZERO` as "clear / skip".
pub const GAIN_ZERO: Gain = 0.0;

/// Number of stems in a stem buffer (Vocals, Drums, Bass, Other)
pub const NUM_STEMS: usize = 4;

/// Number of interleaved channels in an interleaved buffer
///
/// Stereo (2) and stem (8 = 4 stereo stems) layouts get dedicated fast paths
/// in the ramp and crossfade code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ChannelCount(usize);

impl ChannelCount {
    pub const MONO: ChannelCount = ChannelCount(1);
    pub const STEREO: ChannelCount = ChannelCount(2);
    /// Four interleaved stereo stems
    pub const STEM: ChannelCount = ChannelCount(NUM_STEMS * 2);

    /// Create a channel count, rejecting zero
    pub const fn new(count: usize) -> Option<Self> {
        if count == 0 {
            None
        } else {
            Some(Self(count))
        }
    }

    /// Number of samples per frame
    #[inline]
    pub const fn count(self) -> usize {
        self.0
    }

    /// Number of complete stereo pairs in a frame
    #[inline]
    pub const fn stereo_pairs(self) -> usize {
        self.0 / 2
    }

    /// Number of frames in a buffer of `len` samples
    ///
    /// A trailing partial frame is a caller bug and is only checked in debug
    /// builds; use [`ChannelCount::checked_frames`] off the audio thread.
    #[inline]
    pub fn frames(self, len: usize) -> usize {
        debug_assert!(
            len % self.0 == 0,
            "buffer of {} samples is not a multiple of {} channels",
            len,
            self.0
        );
        len / self.0
    }

    /// Number of frames in a buffer of `len` samples, or an error if `len`
    /// does not hold a whole number of frames
    pub fn checked_frames(self, len: usize) -> SampleResult<usize> {
        if len % self.0 != 0 {
            return Err(SampleError::ChannelMismatch {
                len,
                channels: self.0,
            });
        }
        Ok(len / self.0)
    }
}

impl Default for ChannelCount {
    fn default() -> Self {
        Self::STEREO
    }
}

impl TryFrom<usize> for ChannelCount {
    type Error = SampleError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        Self::new(count)
            .ok_or_else(|| SampleError::InvalidConfig("channel count must be non-zero".into()))
    }
}

impl From<ChannelCount> for usize {
    fn from(channels: ChannelCount) -> Self {
        channels.0
    }
}

/// Stem identifiers
///
/// In an 8-channel stem buffer, stem `n` occupies channels `2n` and `2n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Stem {
    Vocals = 0,
    Drums = 1,
    Bass = 2,
    Other = 3,
}

impl Stem {
    /// Get all stems in order
    pub const ALL: [Stem; NUM_STEMS] = [Stem::Vocals, Stem::Drums, Stem::Bass, Stem::Other];

    /// Convert from index (0-3) to Stem
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Stem::Vocals),
            1 => Some(Stem::Drums),
            2 => Some(Stem::Bass),
            3 => Some(Stem::Other),
            _ => None,
        }
    }

    /// Get the name of this stem
    pub fn name(&self) -> &'static str {
        match self {
            Stem::Vocals => "Vocals",
            Stem::Drums => "Drums",
            Stem::Bass => "Bass",
            Stem::Other => "Other",
        }
    }

    /// Index of the stereo pair this stem occupies in a stem buffer
    #[inline]
    pub fn pair_index(&self) -> usize {
        *self as usize
    }

    /// First (left) channel of this stem in a stem buffer
    #[inline]
    pub fn channel_offset(&self) -> usize {
        self.pair_index() * 2
    }
}

/// A single stereo sample (left and right channels)
///
/// Uses `#[repr(C)]` to ensure predictable memory layout: [left, right].
/// This enables zero-copy conversion between `&[StereoSample]` and `&[f32]`
/// (interleaved format) using bytemuck, so every interleaved primitive in
/// [`crate::ops`] can run directly on a [`StereoBuffer`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a silent stereo sample
    #[inline]
    pub fn silence() -> Self {
        Self::default()
    }

    /// Create a mono sample (same value in both channels)
    #[inline]
    pub fn mono(value: Sample) -> Self {
        Self { left: value, right: value }
    }

    /// Get the peak amplitude (max of abs(left), abs(right))
    #[inline]
    pub fn peak(&self) -> Sample {
        self.left.abs().max(self.right.abs())
    }
}

impl std::ops::Add for StereoSample {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            left: self.left + other.left,
            right: self.right + other.right,
        }
    }
}

impl std::ops::Mul<Gain> for StereoSample {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Gain) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
        }
    }
}

/// A buffer of stereo samples
///
/// Allocate once at configuration time; every processing method below works
/// in place on the interleaved view and never reallocates.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    samples: Vec<StereoSample>,
}

impl StereoBuffer {
    /// Create a buffer filled with silence
    pub fn silence(len: usize) -> Self {
        Self {
            samples: vec![StereoSample::silence(); len],
        }
    }

    /// Create a buffer from interleaved samples [L, R, L, R, ...]
    ///
    /// Panics on an odd number of samples.
    pub fn from_interleaved(interleaved: &[Sample]) -> Self {
        assert!(interleaved.len() % 2 == 0, "Interleaved buffer must have even length");
        let samples = bytemuck::cast_slice::<Sample, StereoSample>(interleaved).to_vec();
        Self { samples }
    }

    /// Create a buffer from interleaved samples, rejecting odd lengths
    pub fn try_from_interleaved(interleaved: &[Sample]) -> SampleResult<Self> {
        ChannelCount::STEREO.checked_frames(interleaved.len())?;
        Ok(Self::from_interleaved(interleaved))
    }

    /// Create a buffer from separate left and right channel slices
    pub fn from_channels(left: &[Sample], right: &[Sample]) -> Self {
        assert_eq!(left.len(), right.len(), "Channel lengths must match");
        let mut buffer = Self::silence(left.len());
        ops::layout::interleave_stereo(buffer.as_interleaved_mut(), left, right);
        buffer
    }

    /// Get the number of stereo frames in the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fill the buffer with silence
    pub fn fill_silence(&mut self) {
        ops::clear(self.as_interleaved_mut());
    }

    /// Get a slice of the samples
    #[inline]
    pub fn as_slice(&self) -> &[StereoSample] {
        &self.samples
    }

    /// Get a mutable slice of the samples
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [StereoSample] {
        &mut self.samples
    }

    /// Get a zero-copy view of samples as interleaved f32 [L, R, L, R, ...]
    #[inline]
    pub fn as_interleaved(&self) -> &[Sample] {
        bytemuck::cast_slice(&self.samples)
    }

    /// Get a zero-copy mutable view of samples as interleaved f32 [L, R, L, R, ...]
    #[inline]
    pub fn as_interleaved_mut(&mut self) -> &mut [Sample] {
        bytemuck::cast_slice_mut(&mut self.samples)
    }

    /// Copy samples to an interleaved output buffer [L, R, L, R, ...]
    pub fn to_interleaved(&self, output: &mut [Sample]) {
        let src = self.as_interleaved();
        ops::copy(&mut output[..src.len()], src);
    }

    /// Write samples to separate left and right channel buffers
    pub fn to_channels(&self, left: &mut [Sample], right: &mut [Sample]) {
        let frames = self.len();
        ops::layout::deinterleave_stereo(
            &mut left[..frames],
            &mut right[..frames],
            self.as_interleaved(),
        );
    }

    /// Copy from another buffer of the same length
    pub fn copy_from(&mut self, other: &StereoBuffer) {
        assert_eq!(self.len(), other.len(), "Buffer lengths must match");
        ops::copy(self.as_interleaved_mut(), other.as_interleaved());
    }

    /// Add another buffer to this one (summing samples)
    pub fn add_buffer(&mut self, other: &StereoBuffer) {
        assert_eq!(self.len(), other.len(), "Buffer lengths must match");
        ops::mix::add(self.as_interleaved_mut(), other.as_interleaved());
    }

    /// Add another buffer scaled by `gain`
    pub fn add_buffer_with_gain(&mut self, other: &StereoBuffer, gain: Gain) {
        assert_eq!(self.len(), other.len(), "Buffer lengths must match");
        ops::mix::add_with_gain(self.as_interleaved_mut(), other.as_interleaved(), gain);
    }

    /// Scale all samples by a factor
    pub fn scale(&mut self, factor: Gain) {
        ops::gain::apply_gain(self.as_interleaved_mut(), factor);
    }

    /// Scale all samples by a gain that ramps across the buffer
    pub fn ramp_gain(&mut self, ramp: Ramp) {
        ops::gain::apply_ramping_gain(self.as_interleaved_mut(), ramp);
    }

    /// Fade this buffer out while fading `incoming` in
    pub fn crossfade_to(&mut self, incoming: &StereoBuffer) {
        assert_eq!(self.len(), incoming.len(), "Buffer lengths must match");
        ops::crossfade::linear_crossfade_stereo_buffers_out(
            self.as_interleaved_mut(),
            incoming.as_interleaved(),
        );
    }

    /// Reverse the order of frames in place
    pub fn reverse(&mut self) {
        ops::layout::reverse(self.as_interleaved_mut());
    }

    /// Get an iterator over the samples
    pub fn iter(&self) -> impl Iterator<Item = &StereoSample> {
        self.samples.iter()
    }

    /// Get a mutable iterator over the samples
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StereoSample> {
        self.samples.iter_mut()
    }

    /// Get the peak amplitude in the buffer
    pub fn peak(&self) -> Sample {
        ops::meter::max_abs_amplitude(self.as_interleaved())
    }

    /// Per-channel absolute sums and clip flags
    pub fn levels(&self) -> ChannelLevels {
        ops::meter::sum_abs_per_channel(self.as_interleaved())
    }
}

impl Index<usize> for StereoBuffer {
    type Output = StereoSample;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.samples[index]
    }
}

impl IndexMut<usize> for StereoBuffer {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.samples[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::meter::ClipStatus;

    #[test]
    fn test_stereo_sample_operations() {
        let a = StereoSample::new(1.0, 2.0);
        let b = StereoSample::new(0.5, 0.5);

        let sum = a + b;
        assert_eq!(sum.left, 1.5);
        assert_eq!(sum.right, 2.5);

        let scaled = a * 0.5;
        assert_eq!(scaled.left, 0.5);
        assert_eq!(scaled.right, 1.0);
        assert_eq!(StereoSample::new(-3.0, 2.0).peak(), 3.0);
    }

    #[test]
    fn test_stereo_buffer_from_interleaved() {
        let interleaved = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let buffer = StereoBuffer::from_interleaved(&interleaved);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer[0].left, 1.0);
        assert_eq!(buffer[0].right, 2.0);
        assert_eq!(buffer[2].left, 5.0);
        assert_eq!(buffer[2].right, 6.0);
    }

    #[test]
    fn test_try_from_interleaved_rejects_odd_length() {
        let err = StereoBuffer::try_from_interleaved(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, SampleError::ChannelMismatch { len: 3, channels: 2 });
    }

    #[test]
    fn test_stereo_buffer_channels_roundtrip() {
        let buffer = StereoBuffer::from_channels(&[1.0, 3.0], &[2.0, 4.0]);
        assert_eq!(buffer.as_interleaved(), &[1.0, 2.0, 3.0, 4.0]);

        let mut left = [0.0; 2];
        let mut right = [0.0; 2];
        buffer.to_channels(&mut left, &mut right);
        assert_eq!(left, [1.0, 3.0]);
        assert_eq!(right, [2.0, 4.0]);
    }

    #[test]
    fn test_stereo_buffer_to_interleaved() {
        let buffer = StereoBuffer::from_interleaved(&[1.0, 2.0, 3.0, 4.0]);
        let mut output = [0.0; 4];
        buffer.to_interleaved(&mut output);

        assert_eq!(output, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_stereo_buffer_processing() {
        let mut buffer = StereoBuffer::from_interleaved(&[0.5, -0.25, 1.5, 0.0]);
        let other = StereoBuffer::from_interleaved(&[0.5, 0.25, 0.0, 0.0]);

        buffer.add_buffer(&other);
        assert_eq!(buffer.as_interleaved(), &[1.0, 0.0, 1.5, 0.0]);
        assert_eq!(buffer.peak(), 1.5);

        let levels = buffer.levels();
        assert_eq!(levels.clipping, ClipStatus::LEFT);

        buffer.scale(0.5);
        assert_eq!(buffer.as_interleaved(), &[0.5, 0.0, 0.75, 0.0]);

        buffer.reverse();
        assert_eq!(buffer.as_interleaved(), &[0.75, 0.0, 0.5, 0.0]);

        buffer.fill_silence();
        assert_eq!(buffer.peak(), 0.0);
    }

    #[test]
    fn test_stereo_buffer_ramp_and_crossfade() {
        let mut buffer = StereoBuffer::from_interleaved(&[1.0, 1.0, 1.0, 1.0]);
        buffer.ramp_gain(Ramp::new(0.0, 1.0));
        assert_eq!(buffer.as_interleaved(), &[0.5, 0.5, 1.0, 1.0]);

        let mut outgoing = StereoBuffer::from_interleaved(&[1.0, 1.0, 1.0, 1.0]);
        let incoming = StereoBuffer::silence(2);
        outgoing.crossfade_to(&incoming);
        assert_eq!(outgoing.as_interleaved(), &[1.0, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_channel_count() {
        assert_eq!(ChannelCount::STEM.count(), 8);
        assert_eq!(ChannelCount::STEM.stereo_pairs(), 4);
        assert_eq!(ChannelCount::STEREO.frames(6), 3);
        assert!(ChannelCount::new(0).is_none());
        assert!(ChannelCount::STEREO.checked_frames(5).is_err());
        assert_eq!(ChannelCount::try_from(6usize).unwrap().count(), 6);
    }

    #[test]
    fn test_stem_enumeration() {
        assert_eq!(Stem::ALL.len(), 4);
        assert_eq!(Stem::Vocals.name(), "Vocals");
        assert_eq!(Stem::Drums as usize, 1);
        assert_eq!(Stem::Bass.channel_offset(), 4);
        assert_eq!(Stem::from_index(3), Some(Stem::Other));
        assert_eq!(Stem::from_index(4), None);
    }
}
