//! Buffer layout configuration
//!
//! Describes the scratch buffers an engine needs: how many, how wide, and
//! how long. Read once at startup or on reconfiguration, never on the audio
//! thread.

use serde::{Deserialize, Serialize};

use crate::error::{SampleError, SampleResult};
use crate::types::{ChannelCount, Gain};

/// Largest supported callback size in frames
pub const MAX_FRAMES_PER_BUFFER: usize = 8192;

/// Widest supported frame: 32 stereo pairs, one per exclude mask bit
pub const MAX_CHANNELS: usize = 64;

/// Most scratch buffers a single pool may hold
pub const MAX_BUFFER_COUNT: usize = 256;

/// Buffer layout configuration
///
/// Missing fields fall back to their defaults, so a partial YAML file only
/// needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Interleaved channels per frame
    /// Default: 2 (stereo). Use 8 for a four-stem layout.
    pub channel_count: ChannelCount,

    /// Frames per audio callback
    /// Default: 1024, at most [`MAX_FRAMES_PER_BUFFER`]
    pub frames_per_buffer: usize,

    /// Peak amplitude targeted by ramped normalization (linear, not dB)
    /// Default: 0.9
    pub normalization_target: Gain,

    /// Scratch buffers allocated per pool
    /// Default: 4
    pub buffer_count: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            channel_count: ChannelCount::STEREO,
            frames_per_buffer: 1024,
            normalization_target: 0.9,
            buffer_count: 4,
        }
    }
}

impl BufferConfig {
    /// Samples in one buffer (`frames_per_buffer * channel_count`)
    pub fn samples_per_buffer(&self) -> SampleResult<usize> {
        self.frames_per_buffer
            .checked_mul(self.channel_count.count())
            .ok_or_else(|| {
                SampleError::InvalidConfig(format!(
                    "{} frames x {} channels overflows a buffer length",
                    self.frames_per_buffer,
                    self.channel_count.count()
                ))
            })
    }

    /// Check every field is in range
    pub fn validate(&self) -> SampleResult<()> {
        if self.channel_count.count() > MAX_CHANNELS {
            return Err(SampleError::InvalidConfig(format!(
                "channel_count must be at most {}, got {}",
                MAX_CHANNELS,
                self.channel_count.count()
            )));
        }
        if self.buffer_count > MAX_BUFFER_COUNT {
            return Err(SampleError::InvalidConfig(format!(
                "buffer_count must be at most {}, got {}",
                MAX_BUFFER_COUNT, self.buffer_count
            )));
        }
        if self.frames_per_buffer == 0 || self.frames_per_buffer > MAX_FRAMES_PER_BUFFER {
            return Err(SampleError::InvalidConfig(format!(
                "frames_per_buffer must be in 1..={}, got {}",
                MAX_FRAMES_PER_BUFFER, self.frames_per_buffer
            )));
        }
        // Also rejects NaN
        if !(self.normalization_target.is_finite() && self.normalization_target > 0.0) {
            return Err(SampleError::InvalidConfig(format!(
                "normalization_target must be positive, got {}",
                self.normalization_target
            )));
        }
        self.samples_per_buffer()?;
        Ok(())
    }
}
