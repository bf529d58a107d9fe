//! Additive mixing and weighted copies
//!
//! The `add*` family accumulates into the destination, the `copy*` family
//! overwrites it. Multi-source variants skip any source whose gain is exactly
//! zero by delegating to the next lower arity, so an inactive deck or stem
//! costs nothing and the result is bit-identical to leaving it out.
//!
//! Ramped variants step the gain once per stereo frame (see [`super::ramp`]);
//! `*_multichannel` variants do the same for any channel count.

use super::layout::mix_multichannel_to_mono;
use super::meter::max_abs_amplitude;
use super::ramp::{self, Ramp};
use super::{clear, copy};
use crate::types::{ChannelCount, Gain, Sample, GAIN_ONE, GAIN_ZERO, SAMPLE_ZERO};

/// `dest += src`
pub fn add(dest: &mut [Sample], src: &[Sample]) {
    let src = &src[..dest.len()];
    for (d, s) in dest.iter_mut().zip(src) {
        *d += *s;
    }
}

/// `dest += src * gain`; no-op for zero gain
pub fn add_with_gain(dest: &mut [Sample], src: &[Sample], gain: Gain) {
    if gain == GAIN_ZERO {
        return;
    }

    let src = &src[..dest.len()];
    for (d, s) in dest.iter_mut().zip(src) {
        *d += *s * gain;
    }
}

/// `dest += src * gain(frame)` over interleaved stereo frames
pub fn add_with_ramping_gain(dest: &mut [Sample], src: &[Sample], ramp: Ramp) {
    add_with_ramping_gain_multichannel(dest, src, ramp, ChannelCount::STEREO);
}

/// `dest += src * gain(frame)` over interleaved frames of any width
pub fn add_with_ramping_gain_multichannel(
    dest: &mut [Sample],
    src: &[Sample],
    ramp: Ramp,
    channels: ChannelCount,
) {
    if ramp.is_silent() {
        return;
    }
    if ramp.is_flat() {
        add_with_gain(dest, src, ramp.from);
        return;
    }

    let frames = channels.frames(dest.len());
    if frames == 0 {
        return;
    }
    let src = &src[..dest.len()];
    let step = ramp.step(frames);
    match channels.count() {
        2 => ramp::add_frames::<2>(dest, src, step),
        8 => ramp::add_frames::<8>(dest, src, step),
        n => ramp::add_frames_by(dest, src, step, n),
    }
}

/// `dest += src1 * gain1 + src2 * gain2`
pub fn add_2_with_gain(
    dest: &mut [Sample],
    src1: &[Sample],
    gain1: Gain,
    src2: &[Sample],
    gain2: Gain,
) {
    if gain1 == GAIN_ZERO {
        add_with_gain(dest, src2, gain2);
        return;
    }
    if gain2 == GAIN_ZERO {
        add_with_gain(dest, src1, gain1);
        return;
    }

    let len = dest.len();
    let (src1, src2) = (&src1[..len], &src2[..len]);
    for ((d, a), b) in dest.iter_mut().zip(src1).zip(src2) {
        *d += *a * gain1 + *b * gain2;
    }
}

/// `dest += src1 * gain1 + src2 * gain2 + src3 * gain3`
pub fn add_3_with_gain(
    dest: &mut [Sample],
    src1: &[Sample],
    gain1: Gain,
    src2: &[Sample],
    gain2: Gain,
    src3: &[Sample],
    gain3: Gain,
) {
    if gain1 == GAIN_ZERO {
        add_2_with_gain(dest, src2, gain2, src3, gain3);
        return;
    }
    if gain2 == GAIN_ZERO {
        add_2_with_gain(dest, src1, gain1, src3, gain3);
        return;
    }
    if gain3 == GAIN_ZERO {
        add_2_with_gain(dest, src1, gain1, src2, gain2);
        return;
    }

    let len = dest.len();
    let (src1, src2, src3) = (&src1[..len], &src2[..len], &src3[..len]);
    for (((d, a), b), c) in dest.iter_mut().zip(src1).zip(src2).zip(src3) {
        *d += *a * gain1 + *b * gain2 + *c * gain3;
    }
}

/// `dest = src * gain`; plain copy for unity, clear for zero
pub fn copy_with_gain(dest: &mut [Sample], src: &[Sample], gain: Gain) {
    if gain == GAIN_ONE {
        copy(dest, src);
        return;
    }
    if gain == GAIN_ZERO {
        clear(dest);
        return;
    }

    let src = &src[..dest.len()];
    for (d, s) in dest.iter_mut().zip(src) {
        *d = *s * gain;
    }
}

/// `dest = src * gain(frame)` over interleaved stereo frames
pub fn copy_with_ramping_gain(dest: &mut [Sample], src: &[Sample], ramp: Ramp) {
    copy_with_ramping_gain_multichannel(dest, src, ramp, ChannelCount::STEREO);
}

/// `dest = src * gain(frame)` over interleaved frames of any width
pub fn copy_with_ramping_gain_multichannel(
    dest: &mut [Sample],
    src: &[Sample],
    ramp: Ramp,
    channels: ChannelCount,
) {
    if ramp.is_flat() {
        // Unity and silence are handled by the constant path
        copy_with_gain(dest, src, ramp.from);
        return;
    }

    let frames = channels.frames(dest.len());
    if frames == 0 {
        return;
    }
    let src = &src[..dest.len()];
    let step = ramp.step(frames);
    match channels.count() {
        2 => ramp::copy_frames::<2>(dest, src, step),
        8 => ramp::copy_frames::<8>(dest, src, step),
        n => ramp::copy_frames_by(dest, src, step, n),
    }
}

/// Single-source member of the `copy_N_with_gain` family
#[inline]
pub fn copy_1_with_gain(dest: &mut [Sample], src0: &[Sample], gain0: Gain) {
    copy_with_gain(dest, src0, gain0);
}

/// Single-source member of the `copy_N_with_ramping_gain` family
#[inline]
pub fn copy_1_with_ramping_gain(dest: &mut [Sample], src0: &[Sample], ramp0: Ramp) {
    copy_with_ramping_gain(dest, src0, ramp0);
}

/// `dest = src0 * gain0 + src1 * gain1`
pub fn copy_2_with_gain(
    dest: &mut [Sample],
    src0: &[Sample],
    gain0: Gain,
    src1: &[Sample],
    gain1: Gain,
) {
    if gain0 == GAIN_ZERO {
        copy_1_with_gain(dest, src1, gain1);
        return;
    }
    if gain1 == GAIN_ZERO {
        copy_1_with_gain(dest, src0, gain0);
        return;
    }

    let len = dest.len();
    let (src0, src1) = (&src0[..len], &src1[..len]);
    for ((d, a), b) in dest.iter_mut().zip(src0).zip(src1) {
        *d = *a * gain0 + *b * gain1;
    }
}

/// `dest = src0 * gain0(frame) + src1 * gain1(frame)` over stereo frames
pub fn copy_2_with_ramping_gain(
    dest: &mut [Sample],
    src0: &[Sample],
    ramp0: Ramp,
    src1: &[Sample],
    ramp1: Ramp,
) {
    if ramp0.is_silent() {
        copy_1_with_ramping_gain(dest, src1, ramp1);
        return;
    }
    if ramp1.is_silent() {
        copy_1_with_ramping_gain(dest, src0, ramp0);
        return;
    }

    let frames = ChannelCount::STEREO.frames(dest.len());
    if frames == 0 {
        return;
    }
    let len = dest.len();
    let (src0, src1) = (&src0[..len], &src1[..len]);
    let (step0, step1) = (ramp0.step(frames), ramp1.step(frames));
    for (i, ((d, a), b)) in dest
        .chunks_exact_mut(2)
        .zip(src0.chunks_exact(2))
        .zip(src1.chunks_exact(2))
        .enumerate()
    {
        let gain0 = step0.gain_at(i);
        let gain1 = step1.gain_at(i);
        d[0] = a[0] * gain0 + b[0] * gain1;
        d[1] = a[1] * gain0 + b[1] * gain1;
    }
}

/// `dest = src0 * gain0 + src1 * gain1 + src2 * gain2`
pub fn copy_3_with_gain(
    dest: &mut [Sample],
    src0: &[Sample],
    gain0: Gain,
    src1: &[Sample],
    gain1: Gain,
    src2: &[Sample],
    gain2: Gain,
) {
    if gain0 == GAIN_ZERO {
        copy_2_with_gain(dest, src1, gain1, src2, gain2);
        return;
    }
    if gain1 == GAIN_ZERO {
        copy_2_with_gain(dest, src0, gain0, src2, gain2);
        return;
    }
    if gain2 == GAIN_ZERO {
        copy_2_with_gain(dest, src0, gain0, src1, gain1);
        return;
    }

    let len = dest.len();
    let (src0, src1, src2) = (&src0[..len], &src1[..len], &src2[..len]);
    for (((d, a), b), c) in dest.iter_mut().zip(src0).zip(src1).zip(src2) {
        *d = *a * gain0 + *b * gain1 + *c * gain2;
    }
}

/// `dest = src0 * gain0(frame) + src1 * gain1(frame) + src2 * gain2(frame)`
/// over stereo frames
pub fn copy_3_with_ramping_gain(
    dest: &mut [Sample],
    src0: &[Sample],
    ramp0: Ramp,
    src1: &[Sample],
    ramp1: Ramp,
    src2: &[Sample],
    ramp2: Ramp,
) {
    if ramp0.is_silent() {
        copy_2_with_ramping_gain(dest, src1, ramp1, src2, ramp2);
        return;
    }
    if ramp1.is_silent() {
        copy_2_with_ramping_gain(dest, src0, ramp0, src2, ramp2);
        return;
    }
    if ramp2.is_silent() {
        copy_2_with_ramping_gain(dest, src0, ramp0, src1, ramp1);
        return;
    }

    let frames = ChannelCount::STEREO.frames(dest.len());
    if frames == 0 {
        return;
    }
    let len = dest.len();
    let (src0, src1, src2) = (&src0[..len], &src1[..len], &src2[..len]);
    let (step0, step1, step2) = (ramp0.step(frames), ramp1.step(frames), ramp2.step(frames));
    for (i, (((d, a), b), c)) in dest
        .chunks_exact_mut(2)
        .zip(src0.chunks_exact(2))
        .zip(src1.chunks_exact(2))
        .zip(src2.chunks_exact(2))
        .enumerate()
    {
        let gain0 = step0.gain_at(i);
        let gain1 = step1.gain_at(i);
        let gain2 = step2.gain_at(i);
        d[0] = a[0] * gain0 + b[0] * gain1 + c[0] * gain2;
        d[1] = a[1] * gain0 + b[1] * gain1 + c[1] * gain2;
    }
}

/// Copy `src` into `dest` with a gain ramp that normalizes its peak
///
/// `src` is first folded to mono (into the front of `dest`, used as scratch)
/// to find its peak amplitude. The target gain is `target_amplitude / peak`,
/// or unity for a silent source. `dest` then receives `src` ramped from
/// `old_gain` to that target gain, which is returned so the caller can start
/// the next buffer's ramp from it.
pub fn copy_with_ramping_normalization(
    dest: &mut [Sample],
    src: &[Sample],
    old_gain: Gain,
    target_amplitude: Gain,
    channels: ChannelCount,
) -> Gain {
    let mono_len = channels.frames(dest.len());
    mix_multichannel_to_mono(&mut dest[..mono_len], src, channels);

    let peak = max_abs_amplitude(&dest[..mono_len]);
    let gain = if peak == SAMPLE_ZERO {
        GAIN_ONE
    } else {
        target_amplitude / peak
    };
    copy_with_ramping_gain_multichannel(dest, src, Ramp::new(old_gain, gain), channels);

    gain
}
