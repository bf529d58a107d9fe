//! SIMD-aligned sample buffers
//!
//! Buffers are allocated once at configuration time and handed to the audio
//! thread, which only reads and writes through the slice view. Every buffer
//! starts on an [`ALIGNMENT`] boundary and is zero-initialized.
//!
//! Three allocation strategies are available. They behave identically from
//! the outside; an [`AlignedBuffer`] remembers which one allocated it and
//! frees itself through the matching path when dropped.
//!
//! - [`AllocStrategy::Platform`]: `posix_memalign` / `free` (Unix only)
//! - [`AllocStrategy::Standard`]: `std::alloc` with an aligned `Layout`
//! - [`AllocStrategy::Manual`]: over-allocate by one alignment unit, round the
//!   pointer up and stash the original pointer just below the aligned start
//!
//! [`AllocStrategy::native`] picks the strategy for this build.

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use crate::error::{SampleError, SampleResult};
use crate::types::Sample;

/// Byte alignment of every allocated buffer: one AVX register when the
/// target has AVX, one SSE/NEON register otherwise
pub const ALIGNMENT: usize = if cfg!(target_feature = "avx") { 32 } else { 16 };

/// How an [`AlignedBuffer`] obtained its memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocStrategy {
    /// `posix_memalign`
    #[cfg(unix)]
    Platform,
    /// `std::alloc::alloc_zeroed` with an aligned layout
    Standard,
    /// Over-allocation with the original pointer stored before the buffer
    Manual,
}

impl AllocStrategy {
    /// Strategy used by [`allocate`] in this build
    pub const fn native() -> Self {
        #[cfg(feature = "manual-align")]
        return Self::Manual;
        #[cfg(all(not(feature = "manual-align"), unix))]
        return Self::Platform;
        #[cfg(all(not(feature = "manual-align"), not(unix)))]
        return Self::Standard;
    }

    /// Every strategy available on this platform
    pub fn available() -> &'static [AllocStrategy] {
        #[cfg(unix)]
        return &[Self::Platform, Self::Standard, Self::Manual];
        #[cfg(not(unix))]
        return &[Self::Standard, Self::Manual];
    }
}

/// Owned, aligned, zero-initialized buffer of samples
pub struct AlignedBuffer {
    ptr: NonNull<Sample>,
    len: usize,
    strategy: AllocStrategy,
}

// The buffer exclusively owns its allocation.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `len` samples with the native strategy
    pub fn allocate(len: usize) -> Option<Self> {
        Self::allocate_with(len, AllocStrategy::native())
    }

    /// Allocate `len` samples with a specific strategy
    ///
    /// Returns `None` if the size overflows or the allocator fails.
    pub fn allocate_with(len: usize, strategy: AllocStrategy) -> Option<Self> {
        let bytes = padded_bytes(len)?;
        let ptr = match strategy {
            #[cfg(unix)]
            AllocStrategy::Platform => platform::allocate(bytes),
            AllocStrategy::Standard => standard::allocate(bytes),
            AllocStrategy::Manual => manual::allocate(bytes),
        }?;
        debug_assert!(ptr.as_ptr() as usize % ALIGNMENT == 0);

        Some(Self {
            ptr: ptr.cast(),
            len,
            strategy,
        })
    }

    /// Allocate `len` samples, reporting failure as an error
    pub fn try_allocate(len: usize) -> SampleResult<Self> {
        Self::allocate(len).ok_or_else(|| {
            log::error!(
                "Failed to allocate {} samples ({:?}, {} byte alignment)",
                len,
                AllocStrategy::native(),
                ALIGNMENT
            );
            SampleError::Allocation {
                samples: len,
                alignment: ALIGNMENT,
            }
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn strategy(&self) -> AllocStrategy {
        self.strategy
    }

    #[inline]
    pub fn as_ptr(&self) -> *const Sample {
        self.ptr.as_ptr()
    }
}

impl Deref for AlignedBuffer {
    type Target = [Sample];

    #[inline]
    fn deref(&self) -> &[Sample] {
        // SAFETY: `ptr` points to at least `len` initialized samples owned by self
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Sample] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // `padded_bytes` succeeded for this length at allocation time
        let Some(bytes) = padded_bytes(self.len) else {
            return;
        };
        let ptr = self.ptr.cast::<u8>();
        // SAFETY: `ptr` was returned by the same strategy for the same size
        unsafe {
            match self.strategy {
                #[cfg(unix)]
                AllocStrategy::Platform => platform::release(ptr),
                AllocStrategy::Standard => standard::release(ptr, bytes),
                AllocStrategy::Manual => manual::release(ptr, bytes),
            }
        }
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("strategy", &self.strategy)
            .field("ptr", &self.ptr)
            .finish()
    }
}

/// Allocate `len` zeroed samples with the native strategy
pub fn allocate(len: usize) -> Option<AlignedBuffer> {
    let buffer = AlignedBuffer::allocate(len);
    match &buffer {
        Some(buffer) => log::debug!(
            "Allocated {} samples at {:p} ({:?})",
            len,
            buffer.as_ptr(),
            buffer.strategy()
        ),
        None => log::error!("Failed to allocate {} samples", len),
    }
    buffer
}

/// Free a buffer returned by [`allocate`]; `None` is ignored
pub fn release(buffer: Option<AlignedBuffer>) {
    if let Some(buffer) = buffer {
        log::debug!(
            "Releasing {} samples at {:p} ({:?})",
            buffer.len(),
            buffer.as_ptr(),
            buffer.strategy()
        );
        drop(buffer);
    }
}

/// Allocation size in bytes: at least one alignment unit, rounded up to a
/// multiple of it
fn padded_bytes(len: usize) -> Option<usize> {
    len.checked_mul(mem::size_of::<Sample>())?
        .max(1)
        .checked_next_multiple_of(ALIGNMENT)
}

#[cfg(unix)]
mod platform {
    use super::*;

    pub(super) fn allocate(bytes: usize) -> Option<NonNull<u8>> {
        let mut raw: *mut libc::c_void = ptr::null_mut();
        // SAFETY: ALIGNMENT is a power of two and a multiple of the pointer size
        let rc = unsafe { libc::posix_memalign(&mut raw, ALIGNMENT, bytes) };
        if rc != 0 {
            return None;
        }
        let ptr = NonNull::new(raw.cast::<u8>())?;
        // SAFETY: the allocation is `bytes` long
        unsafe { ptr::write_bytes(ptr.as_ptr(), 0, bytes) };
        Some(ptr)
    }

    pub(super) unsafe fn release(ptr: NonNull<u8>) {
        libc::free(ptr.as_ptr().cast());
    }
}

mod standard {
    use super::*;

    fn layout(bytes: usize) -> Option<Layout> {
        Layout::from_size_align(bytes, ALIGNMENT).ok()
    }

    pub(super) fn allocate(bytes: usize) -> Option<NonNull<u8>> {
        let layout = layout(bytes)?;
        // SAFETY: `bytes` is non-zero
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    pub(super) unsafe fn release(ptr: NonNull<u8>, bytes: usize) {
        if let Some(layout) = layout(bytes) {
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

mod manual {
    use super::*;

    /// Slot holding the original pointer, directly below the aligned start
    type Stash = *mut u8;

    fn layout(bytes: usize) -> Option<Layout> {
        Layout::from_size_align(bytes.checked_add(ALIGNMENT)?, mem::align_of::<Stash>()).ok()
    }

    pub(super) fn allocate(bytes: usize) -> Option<NonNull<u8>> {
        let layout = layout(bytes)?;
        // SAFETY: the layout is non-zero sized
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        if raw.is_null() {
            return None;
        }

        // `raw` is pointer aligned, so the gap is always at least one pointer
        // wide and at most ALIGNMENT
        let offset = ALIGNMENT - (raw as usize & (ALIGNMENT - 1));
        debug_assert!(offset >= mem::size_of::<Stash>());
        // SAFETY: offset <= ALIGNMENT, so `aligned + bytes` stays inside the
        // allocation and the stash slot lies between `raw` and `aligned`
        unsafe {
            let aligned = raw.add(offset);
            aligned.cast::<Stash>().sub(1).write(raw);
            NonNull::new(aligned)
        }
    }

    pub(super) unsafe fn release(ptr: NonNull<u8>, bytes: usize) {
        let raw = ptr.as_ptr().cast::<Stash>().sub(1).read();
        if let Some(layout) = layout(bytes) {
            alloc::dealloc(raw, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_aligned(buffer: &AlignedBuffer) -> bool {
        buffer.as_ptr() as usize % ALIGNMENT == 0
    }

    #[test]
    fn test_alignment_constant() {
        assert!(ALIGNMENT.is_power_of_two());
        assert!(ALIGNMENT >= 16);
    }

    #[test]
    fn test_every_strategy_is_aligned_and_zeroed() {
        for &strategy in AllocStrategy::available() {
            for len in [1, 3, 4, 7, 8, 1000, 4096 + 5] {
                let buffer = AlignedBuffer::allocate_with(len, strategy).unwrap();
                assert_eq!(buffer.len(), len);
                assert_eq!(buffer.strategy(), strategy);
                assert!(is_aligned(&buffer), "{:?} with {} samples", strategy, len);
                assert!(buffer.iter().all(|&s| s == 0.0));
            }
        }
    }

    #[test]
    fn test_buffers_are_writable() {
        for &strategy in AllocStrategy::available() {
            let mut buffer = AlignedBuffer::allocate_with(257, strategy).unwrap();
            for (i, sample) in buffer.iter_mut().enumerate() {
                *sample = i as Sample;
            }
            assert_eq!(buffer[0], 0.0);
            assert_eq!(buffer[256], 256.0);
        }
    }

    #[test]
    fn test_zero_length_allocation() {
        for &strategy in AllocStrategy::available() {
            let buffer = AlignedBuffer::allocate_with(0, strategy).unwrap();
            assert!(buffer.is_empty());
            assert!(is_aligned(&buffer));
            assert_eq!(&*buffer, &[] as &[Sample]);
        }
    }

    #[test]
    fn test_oversized_allocation_fails() {
        assert!(AlignedBuffer::allocate(usize::MAX).is_none());
        assert!(AlignedBuffer::allocate_with(usize::MAX / 2, AllocStrategy::Manual).is_none());
        assert_eq!(
            AlignedBuffer::try_allocate(usize::MAX).unwrap_err(),
            SampleError::Allocation {
                samples: usize::MAX,
                alignment: ALIGNMENT
            }
        );
    }

    #[test]
    fn test_allocate_and_release() {
        let buffer = allocate(512);
        assert!(buffer.as_ref().is_some_and(is_aligned));
        assert_eq!(buffer.as_ref().map(|b| b.strategy()), Some(AllocStrategy::native()));
        release(buffer);
        release(None);
    }

    #[test]
    fn test_padded_bytes() {
        assert_eq!(padded_bytes(0), Some(ALIGNMENT));
        assert_eq!(padded_bytes(1), Some(ALIGNMENT));
        assert_eq!(padded_bytes(ALIGNMENT / 4), Some(ALIGNMENT));
        assert_eq!(padded_bytes(ALIGNMENT / 4 + 1), Some(ALIGNMENT * 2));
        assert_eq!(padded_bytes(usize::MAX), None);
    }
}
