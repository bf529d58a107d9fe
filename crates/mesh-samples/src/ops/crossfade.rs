//! Linear crossfades between two buffers
//!
//! The mix position `t(i) = i / frames` advances once per frame, so the
//! first frame is entirely the outgoing signal and the last frame is one step
//! short of the incoming one. The result is written over the destination.
//!
//! Stereo and stem layouts have const-channel kernels; every other channel
//! count runs the runtime-width kernel. Both use the same arithmetic and agree
//! exactly.

use crate::types::{ChannelCount, Gain, Sample, GAIN_ONE};

/// Fade `dest_fading_out` out while fading `src_fading_in` in:
/// `dest = dest * (1 - t) + src * t`
pub fn linear_crossfade_buffers_out(
    dest_fading_out: &mut [Sample],
    src_fading_in: &[Sample],
    channels: ChannelCount,
) {
    match channels.count() {
        2 => linear_crossfade_stereo_buffers_out(dest_fading_out, src_fading_in),
        8 => linear_crossfade_stem_buffers_out(dest_fading_out, src_fading_in),
        n => {
            let (frames, src) = prepare(dest_fading_out, src_fading_in, channels);
            fade_out_frames_by(dest_fading_out, src, frames, n);
        }
    }
}

/// Fade `dest_fading_in` in while fading `src_fading_out` out:
/// `dest = dest * t + src * (1 - t)`
pub fn linear_crossfade_buffers_in(
    dest_fading_in: &mut [Sample],
    src_fading_out: &[Sample],
    channels: ChannelCount,
) {
    match channels.count() {
        2 => linear_crossfade_stereo_buffers_in(dest_fading_in, src_fading_out),
        8 => linear_crossfade_stem_buffers_in(dest_fading_in, src_fading_out),
        n => {
            let (frames, src) = prepare(dest_fading_in, src_fading_out, channels);
            fade_in_frames_by(dest_fading_in, src, frames, n);
        }
    }
}

pub fn linear_crossfade_stereo_buffers_out(
    dest_fading_out: &mut [Sample],
    src_fading_in: &[Sample],
) {
    let (frames, src) = prepare(dest_fading_out, src_fading_in, ChannelCount::STEREO);
    fade_out_frames::<2>(dest_fading_out, src, frames);
}

pub fn linear_crossfade_stereo_buffers_in(
    dest_fading_in: &mut [Sample],
    src_fading_out: &[Sample],
) {
    let (frames, src) = prepare(dest_fading_in, src_fading_out, ChannelCount::STEREO);
    fade_in_frames::<2>(dest_fading_in, src, frames);
}

pub fn linear_crossfade_stem_buffers_out(
    dest_fading_out: &mut [Sample],
    src_fading_in: &[Sample],
) {
    let (frames, src) = prepare(dest_fading_out, src_fading_in, ChannelCount::STEM);
    fade_out_frames::<8>(dest_fading_out, src, frames);
}

pub fn linear_crossfade_stem_buffers_in(
    dest_fading_in: &mut [Sample],
    src_fading_out: &[Sample],
) {
    let (frames, src) = prepare(dest_fading_in, src_fading_out, ChannelCount::STEM);
    fade_in_frames::<8>(dest_fading_in, src, frames);
}

#[inline]
fn prepare<'a>(
    dest: &[Sample],
    src: &'a [Sample],
    channels: ChannelCount,
) -> (usize, &'a [Sample]) {
    (channels.frames(dest.len()), &src[..dest.len()])
}

/// Mix increment per frame; unused when there are no frames
#[inline(always)]
fn increment(frames: usize) -> Gain {
    GAIN_ONE / frames as Gain
}

#[inline]
fn fade_out_frames<const CH: usize>(dest: &mut [Sample], src: &[Sample], frames: usize) {
    let inc = increment(frames);
    for (i, (d, s)) in dest.chunks_exact_mut(CH).zip(src.chunks_exact(CH)).enumerate() {
        let mix = inc * i as Gain;
        for c in 0..CH {
            d[c] *= GAIN_ONE - mix;
            d[c] += s[c] * mix;
        }
    }
}

#[inline]
fn fade_in_frames<const CH: usize>(dest: &mut [Sample], src: &[Sample], frames: usize) {
    let inc = increment(frames);
    for (i, (d, s)) in dest.chunks_exact_mut(CH).zip(src.chunks_exact(CH)).enumerate() {
        let mix = inc * i as Gain;
        for c in 0..CH {
            d[c] *= mix;
            d[c] += s[c] * (GAIN_ONE - mix);
        }
    }
}

fn fade_out_frames_by(dest: &mut [Sample], src: &[Sample], frames: usize, channels: usize) {
    let inc = increment(frames);
    for (i, (d, s)) in dest
        .chunks_exact_mut(channels)
        .zip(src.chunks_exact(channels))
        .enumerate()
    {
        let mix = inc * i as Gain;
        for (d, s) in d.iter_mut().zip(s) {
            *d *= GAIN_ONE - mix;
            *d += *s * mix;
        }
    }
}

fn fade_in_frames_by(dest: &mut [Sample], src: &[Sample], frames: usize, channels: usize) {
    let inc = increment(frames);
    for (i, (d, s)) in dest
        .chunks_exact_mut(channels)
        .zip(src.chunks_exact(channels))
        .enumerate()
    {
        let mix = inc * i as Gain;
        for (d, s) in d.iter_mut().zip(s) {
            *d *= mix;
            *d += *s * (GAIN_ONE - mix);
        }
    }
}
