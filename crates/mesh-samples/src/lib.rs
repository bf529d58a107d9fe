//! Mesh Samples - Real-time sample buffer primitives
//!
//! Gain, mixing, layout, metering and crossfade operations over `f32` sample
//! slices, plus the aligned allocator and buffer pool that provide those
//! slices.
//!
//! Everything under [`ops`] is safe to call from the audio callback. The
//! allocator, [`pool`] and [`config`] are for setup and reconfiguration.

pub mod aligned;
pub mod config;
pub mod error;
pub mod gc;
pub mod ops;
pub mod pool;
pub mod types;

pub use aligned::{AlignedBuffer, AllocStrategy, ALIGNMENT};
pub use error::{SampleError, SampleResult};
pub use ops::layout::ExcludeMask;
pub use ops::meter::{ChannelLevels, ClipStatus};
pub use ops::ramp::Ramp;
pub use pool::BufferPool;
pub use types::*;
