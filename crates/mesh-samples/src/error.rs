//! Sample buffer error types

use thiserror::Error;

/// Errors raised outside the real-time path (allocation and configuration)
///
/// Real-time operations never return errors: their preconditions are checked
/// with debug assertions only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// The allocator could not provide an aligned buffer
    #[error("Failed to allocate {samples} samples aligned to {alignment} bytes")]
    Allocation { samples: usize, alignment: usize },

    /// A buffer configuration value is out of range
    #[error("Invalid buffer configuration: {0}")]
    InvalidConfig(String),

    /// A buffer length is not a whole number of frames
    #[error("Buffer of {len} samples is not a whole number of {channels}-channel frames")]
    ChannelMismatch { len: usize, channels: usize },
}

/// Result type for sample buffer setup
pub type SampleResult<T> = Result<T, SampleError>;
