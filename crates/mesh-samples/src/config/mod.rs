//! Buffer configuration
//!
//! - [`BufferConfig`]: channel layout, callback size and pool size
//! - Generic YAML loading/saving shared with the host application's own
//!   configuration types
//!
//! # Usage
//!
//! ```ignore
//! use mesh_samples::config::{load_buffer_config, save_config, BufferConfig};
//!
//! let config = load_buffer_config(&config_path);
//! save_config(&config, &config_path)?;
//! ```

mod buffers;
mod io;

pub use buffers::{BufferConfig, MAX_BUFFER_COUNT, MAX_CHANNELS, MAX_FRAMES_PER_BUFFER};
pub use io::{load_buffer_config, load_config, save_config};
