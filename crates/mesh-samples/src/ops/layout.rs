//! Channel layout transforms
//!
//! Moves samples between planar, interleaved, mono, stereo and multichannel
//! layouts. A stem buffer is 8 interleaved channels: four stereo pairs in
//! [`Stem`] order.

use super::clear;
use crate::types::{ChannelCount, Gain, Sample, Stem, GAIN_ONE, GAIN_ZERO, NUM_STEMS};

/// Number of planar channels in a stem buffer
const STEM_CHANNELS: usize = NUM_STEMS * 2;

// ─────────────────────────────────────────────────────────────────────────────
// Interleave / deinterleave
// ─────────────────────────────────────────────────────────────────────────────

/// Interleave two planar channels into `dest` as [L, R, L, R, ...]
pub fn interleave_stereo(dest: &mut [Sample], left: &[Sample], right: &[Sample]) {
    let frames = ChannelCount::STEREO.frames(dest.len());
    let (left, right) = (&left[..frames], &right[..frames]);
    for ((frame, l), r) in dest.chunks_exact_mut(2).zip(left).zip(right) {
        frame[0] = *l;
        frame[1] = *r;
    }
}

/// Split interleaved stereo `src` into two planar channels
pub fn deinterleave_stereo(left: &mut [Sample], right: &mut [Sample], src: &[Sample]) {
    let frames = left.len();
    debug_assert!(right.len() >= frames);
    let right = &mut right[..frames];
    let src = &src[..frames * 2];
    for ((l, r), frame) in left.iter_mut().zip(right.iter_mut()).zip(src.chunks_exact(2)) {
        *l = frame[0];
        *r = frame[1];
    }
}

/// Interleave eight planar channels into a stem buffer
pub fn interleave_stem(dest: &mut [Sample], sources: [&[Sample]; STEM_CHANNELS]) {
    let frames = ChannelCount::STEM.frames(dest.len());
    let sources = sources.map(|channel| &channel[..frames]);
    for (i, frame) in dest.chunks_exact_mut(STEM_CHANNELS).enumerate() {
        for (c, sample) in frame.iter_mut().enumerate() {
            *sample = sources[c][i];
        }
    }
}

/// Split a stem buffer into eight planar channels
pub fn deinterleave_stem(dests: [&mut [Sample]; STEM_CHANNELS], src: &[Sample]) {
    let frames = dests[0].len();
    let src = &src[..frames * STEM_CHANNELS];
    let mut dests = dests.map(|channel| &mut channel[..frames]);
    for (i, frame) in src.chunks_exact(STEM_CHANNELS).enumerate() {
        for (c, sample) in frame.iter().enumerate() {
            dests[c][i] = *sample;
        }
    }
}

/// Interleave any number of planar channels; the channel count is
/// `sources.len()`
pub fn interleave(dest: &mut [Sample], sources: &[&[Sample]]) {
    let channels = sources.len();
    if channels == 0 {
        return;
    }
    debug_assert!(dest.len() % channels == 0);
    for (i, frame) in dest.chunks_exact_mut(channels).enumerate() {
        for (sample, channel) in frame.iter_mut().zip(sources) {
            *sample = channel[i];
        }
    }
}

/// Split an interleaved buffer into planar channels; the channel count is
/// `dests.len()` and the frame count is the shortest destination
pub fn deinterleave(dests: &mut [&mut [Sample]], src: &[Sample]) {
    let channels = dests.len();
    let Some(frames) = dests.iter().map(|channel| channel.len()).min() else {
        return;
    };
    let src = &src[..frames * channels];
    for (i, frame) in src.chunks_exact(channels).enumerate() {
        for (channel, sample) in dests.iter_mut().zip(frame) {
            channel[i] = *sample;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Folding to mono / stereo
// ─────────────────────────────────────────────────────────────────────────────

/// Average each stereo frame of `src` and write it to both channels of `dest`
pub fn mix_stereo_to_mono(dest: &mut [Sample], src: &[Sample]) {
    let src = &src[..dest.len()];
    let mix_scale = GAIN_ONE / (GAIN_ONE + GAIN_ONE);
    for (d, s) in dest.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
        let mono = (s[0] + s[1]) * mix_scale;
        d[0] = mono;
        d[1] = mono;
    }
}

/// In-place form of [`mix_stereo_to_mono`]
pub fn mix_stereo_to_mono_in_place(buffer: &mut [Sample]) {
    let mix_scale = GAIN_ONE / (GAIN_ONE + GAIN_ONE);
    for frame in buffer.chunks_exact_mut(2) {
        let mono = (frame[0] + frame[1]) * mix_scale;
        frame[0] = mono;
        frame[1] = mono;
    }
}

/// Fold interleaved frames into true mono: one sample per frame holding the
/// channel average. `dest.len()` is the frame count.
pub fn mix_multichannel_to_mono(dest: &mut [Sample], src: &[Sample], channels: ChannelCount) {
    let ch = channels.count();
    let src = &src[..dest.len() * ch];
    let mix_scale = GAIN_ONE / ch as Gain;
    for (d, frame) in dest.iter_mut().zip(src.chunks_exact(ch)) {
        *d = frame.iter().sum::<Sample>() * mix_scale;
    }
}

/// Set of stereo pairs to leave out of a multichannel-to-stereo fold
///
/// Bit `n` excludes pair `n` (channels `2n, 2n + 1`). Pairs past bit 31 can
/// never be excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExcludeMask(u32);

impl ExcludeMask {
    /// Exclude nothing
    pub const NONE: ExcludeMask = ExcludeMask(0);
    /// Exclude every addressable pair
    pub const ALL: ExcludeMask = ExcludeMask(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask excluding the given stems of a stem buffer
    pub fn from_stems(stems: &[Stem]) -> Self {
        stems
            .iter()
            .fold(Self::NONE, |mask, stem| mask.with_pair(stem.pair_index()))
    }

    /// This mask with pair `pair` excluded as well
    pub fn with_pair(self, pair: usize) -> Self {
        let bit = u32::try_from(pair)
            .ok()
            .and_then(|pair| 1u32.checked_shl(pair))
            .unwrap_or(0);
        Self(self.0 | bit)
    }

    /// Whether pair `pair` is excluded
    #[inline]
    pub fn excludes(self, pair: usize) -> bool {
        u32::try_from(pair)
            .ok()
            .and_then(|pair| self.0.checked_shr(pair))
            .is_some_and(|bits| bits & 1 != 0)
    }
}

impl From<Stem> for ExcludeMask {
    fn from(stem: Stem) -> Self {
        Self::NONE.with_pair(stem.pair_index())
    }
}

/// Fold a multichannel buffer to stereo by summing its stereo pairs, skipping
/// the pairs in `exclude`. `dest` is cleared first, so excluding every pair
/// yields silence.
pub fn mix_multichannel_to_stereo(
    dest: &mut [Sample],
    src: &[Sample],
    channels: ChannelCount,
    exclude: ExcludeMask,
) {
    let ch = channels.count();
    let pairs = channels.stereo_pairs();
    debug_assert!(ch > 2, "multichannel fold needs more than two channels");
    debug_assert!(pairs <= u32::BITS as usize, "exclude mask cannot address every pair");

    let frames = ChannelCount::STEREO.frames(dest.len());
    let src = &src[..frames * ch];
    clear(dest);
    for pair in (0..pairs).filter(|&pair| !exclude.excludes(pair)) {
        let offset = pair * 2;
        for (d, frame) in dest.chunks_exact_mut(2).zip(src.chunks_exact(ch)) {
            d[0] += frame[offset];
            d[1] += frame[offset + 1];
        }
    }
}

/// [`mix_multichannel_to_stereo`] with no pairs excluded
pub fn mix_multichannel_to_stereo_all(dest: &mut [Sample], src: &[Sample], channels: ChannelCount) {
    mix_multichannel_to_stereo(dest, src, channels, ExcludeMask::NONE);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mono to stereo
// ─────────────────────────────────────────────────────────────────────────────

/// Expand `frames` mono samples at the front of `buffer` into dual mono in
/// place
///
/// Runs backwards so no sample is overwritten before it is read. `buffer`
/// must hold at least `2 * frames` samples.
pub fn double_mono_to_dual_mono(buffer: &mut [Sample], frames: usize) {
    debug_assert!(buffer.len() >= frames * 2);
    for i in (0..frames).rev() {
        let sample = buffer[i];
        buffer[i * 2] = sample;
        buffer[i * 2 + 1] = sample;
    }
}

/// Write each mono sample of `src` to both channels of `dest`
pub fn copy_mono_to_dual_mono(dest: &mut [Sample], src: &[Sample]) {
    let frames = ChannelCount::STEREO.frames(dest.len());
    let src = &src[..frames];
    for (d, s) in dest.chunks_exact_mut(2).zip(src) {
        d[0] = *s;
        d[1] = *s;
    }
}

/// Add each mono sample of `src`, scaled by `gain`, to both channels of `dest`
pub fn add_mono_to_stereo_with_gain(dest: &mut [Sample], src: &[Sample], gain: Gain) {
    if gain == GAIN_ZERO {
        return;
    }

    let frames = ChannelCount::STEREO.frames(dest.len());
    let src = &src[..frames];
    for (d, s) in dest.chunks_exact_mut(2).zip(src) {
        let sample = *s * gain;
        d[0] += sample;
        d[1] += sample;
    }
}

pub fn add_mono_to_stereo(dest: &mut [Sample], src: &[Sample]) {
    add_mono_to_stereo_with_gain(dest, src, GAIN_ONE);
}

// ─────────────────────────────────────────────────────────────────────────────
// Multichannel <-> stereo pairs
// ─────────────────────────────────────────────────────────────────────────────

/// Keep only the first stereo pair of each frame, packed to the front of
/// `buffer`
pub fn strip_multi_to_stereo(buffer: &mut [Sample], frames: usize, channels: ChannelCount) {
    let ch = channels.count();
    debug_assert!(ch > 2);
    debug_assert!(buffer.len() >= frames * ch);
    // Forward: frame i is written at 2i, which is never past its source at ch*i
    for i in 0..frames {
        buffer[i * 2] = buffer[i * ch];
        buffer[i * 2 + 1] = buffer[i * ch + 1];
    }
}

/// Copy the stereo pair starting at `source_channel` out of a multichannel
/// buffer
pub fn copy_one_stereo_from_multi(
    dest: &mut [Sample],
    src: &[Sample],
    channels: ChannelCount,
    source_channel: usize,
) {
    let ch = channels.count();
    debug_assert!(ch > 2);
    debug_assert!(source_channel + 1 < ch);

    let frames = ChannelCount::STEREO.frames(dest.len());
    let src = &src[..frames * ch];
    for (d, frame) in dest.chunks_exact_mut(2).zip(src.chunks_exact(ch)) {
        d[0] = frame[source_channel];
        d[1] = frame[source_channel + 1];
    }
}

/// Write stereo `src` into the pair starting at `channel_offset` of every
/// frame of a multichannel `dest`, leaving the other channels untouched
pub fn insert_stereo_to_multi(
    dest: &mut [Sample],
    src: &[Sample],
    channels: ChannelCount,
    channel_offset: usize,
) {
    let ch = channels.count();
    debug_assert!(ch > 2);
    debug_assert!(channel_offset + 1 < ch);

    let frames = channels.frames(dest.len());
    let src = &src[..frames * 2];
    for (frame, s) in dest.chunks_exact_mut(ch).zip(src.chunks_exact(2)) {
        frame[channel_offset] = s[0];
        frame[channel_offset + 1] = s[1];
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reversal
// ─────────────────────────────────────────────────────────────────────────────

/// Reverse the frame order of an interleaved stereo buffer in place, keeping
/// left and right in place within each frame
pub fn reverse(buffer: &mut [Sample]) {
    let len = buffer.len();
    debug_assert!(len % 2 == 0);
    for j in 0..len / 4 {
        let end = len - 1 - j * 2;
        buffer.swap(j * 2, end - 1);
        buffer.swap(j * 2 + 1, end);
    }
}

/// Copy `src` into `dest` with the frame order reversed
pub fn copy_reverse(dest: &mut [Sample], src: &[Sample], channels: ChannelCount) {
    let ch = channels.count();
    let frames = channels.frames(dest.len());
    let src = &src[..frames * ch];
    for (d, s) in dest.chunks_exact_mut(ch).zip(src.chunks_exact(ch).rev()) {
        d.copy_from_slice(s);
    }
}
