//! Configuration-time buffer pool
//!
//! A [`BufferPool`] owns the aligned scratch buffers an engine works in. It
//! allocates everything up front from a [`BufferConfig`]; the audio thread
//! then only borrows buffers by index. Reconfiguring allocates the new set
//! before touching the old one, and retired buffers are freed on the GC
//! thread.

use crate::aligned::AlignedBuffer;
use crate::config::BufferConfig;
use crate::error::SampleResult;
use crate::gc;
use crate::ops;
use crate::types::{Gain, Sample};

pub struct BufferPool {
    config: BufferConfig,
    buffers: Vec<AlignedBuffer>,
}

impl BufferPool {
    /// Allocate `config.buffer_count` zeroed buffers of
    /// `config.samples_per_buffer()` samples each
    pub fn new(config: BufferConfig) -> SampleResult<Self> {
        let buffers = allocate_set(&config)?;
        Ok(Self { config, buffers })
    }

    /// Switch to a new configuration
    ///
    /// On error the pool keeps its current buffers and configuration.
    pub fn reconfigure(&mut self, config: BufferConfig) -> SampleResult<()> {
        let buffers = allocate_set(&config)?;
        let retired = std::mem::replace(&mut self.buffers, buffers);
        self.config = config;
        gc::retire(retired);
        Ok(())
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Number of buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn buffer(&self, idx: usize) -> Option<&[Sample]> {
        self.buffers.get(idx).map(|buffer| &buffer[..])
    }

    pub fn buffer_mut(&mut self, idx: usize) -> Option<&mut [Sample]> {
        self.buffers.get_mut(idx).map(|buffer| &mut buffer[..])
    }

    /// Borrow one buffer mutably and another immutably
    ///
    /// Returns `None` if the indices are equal or out of range.
    pub fn split_pair(
        &mut self,
        dest_idx: usize,
        src_idx: usize,
    ) -> Option<(&mut [Sample], &[Sample])> {
        let len = self.buffers.len();
        if dest_idx == src_idx || dest_idx >= len || src_idx >= len {
            return None;
        }

        let (low, high) = self.buffers.split_at_mut(dest_idx.max(src_idx));
        let (dest, src) = if dest_idx < src_idx {
            (&mut low[dest_idx], &high[0])
        } else {
            (&mut high[0], &low[src_idx])
        };
        Some((&mut dest[..], &src[..]))
    }

    /// Silence every buffer
    pub fn clear_all(&mut self) {
        for buffer in self.buffers.iter_mut() {
            ops::clear(buffer);
        }
    }

    /// Copy buffer `src_idx` into `dest_idx`, ramping from `old_gain` to the
    /// gain that brings its peak to the configured normalization target
    ///
    /// Returns the new gain, or `None` for invalid indices.
    pub fn normalize_into(
        &mut self,
        dest_idx: usize,
        src_idx: usize,
        old_gain: Gain,
    ) -> Option<Gain> {
        let target = self.config.normalization_target;
        let channels = self.config.channel_count;
        let (dest, src) = self.split_pair(dest_idx, src_idx)?;
        Some(ops::mix::copy_with_ramping_normalization(
            dest, src, old_gain, target, channels,
        ))
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        gc::retire(std::mem::take(&mut self.buffers));
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("config", &self.config)
            .field("buffers", &self.buffers.len())
            .finish()
    }
}

fn allocate_set(config: &BufferConfig) -> SampleResult<Vec<AlignedBuffer>> {
    config.validate()?;

    let samples = config.samples_per_buffer()?;
    let buffers = (0..config.buffer_count)
        .map(|_| AlignedBuffer::try_allocate(samples))
        .collect::<SampleResult<Vec<_>>>()?;

    log::info!(
        "Allocated {} buffers of {} frames x {} channels",
        buffers.len(),
        config.frames_per_buffer,
        config.channel_count.count()
    );
    Ok(buffers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligned::ALIGNMENT;
    use crate::error::SampleError;
    use crate::types::ChannelCount;

    fn small_config() -> BufferConfig {
        BufferConfig {
            channel_count: ChannelCount::STEREO,
            frames_per_buffer: 64,
            normalization_target: 0.5,
            buffer_count: 3,
        }
    }

    #[test]
    fn test_new_pool() {
        let pool = BufferPool::new(small_config()).unwrap();
        assert_eq!(pool.len(), 3);
        for idx in 0..3 {
            let buffer = pool.buffer(idx).unwrap();
            assert_eq!(buffer.len(), 128);
            assert_eq!(buffer.as_ptr() as usize % ALIGNMENT, 0);
            assert!(buffer.iter().all(|&s| s == 0.0));
        }
        assert!(pool.buffer(3).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BufferConfig {
            frames_per_buffer: 0,
            ..small_config()
        };
        assert!(matches!(BufferPool::new(config), Err(SampleError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_config_rejected_without_allocating() {
        let wide = BufferConfig {
            channel_count: ChannelCount::new(usize::MAX / 2).unwrap(),
            ..small_config()
        };
        assert!(matches!(BufferPool::new(wide), Err(SampleError::InvalidConfig(_))));

        let many = BufferConfig {
            buffer_count: usize::MAX,
            ..small_config()
        };
        assert!(matches!(BufferPool::new(many), Err(SampleError::InvalidConfig(_))));
    }

    #[test]
    fn test_reconfigure() {
        let mut pool = BufferPool::new(small_config()).unwrap();
        pool.buffer_mut(0).unwrap()[0] = 1.0;

        let stem = BufferConfig {
            channel_count: ChannelCount::STEM,
            buffer_count: 2,
            ..small_config()
        };
        pool.reconfigure(stem.clone()).unwrap();
        assert_eq!(pool.config(), &stem);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.buffer(0).unwrap().len(), 512);
        assert_eq!(pool.buffer(0).unwrap()[0], 0.0);
    }

    #[test]
    fn test_failed_reconfigure_keeps_buffers() {
        let mut pool = BufferPool::new(small_config()).unwrap();
        let bad = BufferConfig {
            normalization_target: -1.0,
            ..small_config()
        };
        assert!(pool.reconfigure(bad).is_err());
        assert_eq!(pool.config(), &small_config());
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_split_pair() {
        let mut pool = BufferPool::new(small_config()).unwrap();
        pool.buffer_mut(2).unwrap().fill(0.25);

        let (dest, src) = pool.split_pair(0, 2).unwrap();
        ops::copy(dest, src);
        assert_eq!(pool.buffer(0).unwrap()[127], 0.25);

        let (dest, src) = pool.split_pair(2, 1).unwrap();
        ops::mix::add(dest, src);
        assert_eq!(pool.buffer(2).unwrap()[0], 0.25);

        assert!(pool.split_pair(1, 1).is_none());
        assert!(pool.split_pair(0, 3).is_none());
    }

    #[test]
    fn test_normalize_into() {
        let mut pool = BufferPool::new(small_config()).unwrap();
        pool.buffer_mut(1).unwrap().fill(0.25);

        // Target 0.5 over a 0.25 peak, ramped from unity
        let gain = pool.normalize_into(0, 1, 1.0).unwrap();
        assert_eq!(gain, 2.0);
        let dest = pool.buffer(0).unwrap();
        assert_eq!(dest[127], 0.5);
        assert!(dest[0] > 0.25 && dest[0] < 0.5);

        assert!(pool.normalize_into(0, 0, 1.0).is_none());
    }

    #[test]
    fn test_clear_all() {
        let mut pool = BufferPool::new(small_config()).unwrap();
        for idx in 0..pool.len() {
            pool.buffer_mut(idx).unwrap().fill(1.0);
        }
        pool.clear_all();
        assert!((0..pool.len()).all(|idx| pool.buffer(idx).unwrap().iter().all(|&s| s == 0.0)));
    }
}
