//! Deferred release of retired buffers
//!
//! A global `basedrop` collector runs on its own thread. Buffers retired
//! through [`retire`] are wrapped in `basedrop::Owned` and dropped at once,
//! which only enqueues them; the collector thread does the actual free.
//! Reconfiguring a [`BufferPool`](crate::pool::BufferPool) from a thread
//! that must not stall therefore never touches the allocator for the old set.

use basedrop::{Collector, Handle, Owned};
use std::sync::mpsc;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use crate::aligned::AlignedBuffer;

/// Handle to the collector thread, or `None` if it could not be started
static GC_HANDLE: OnceLock<Option<Handle>> = OnceLock::new();

/// How often the collector thread frees queued buffers
const COLLECT_INTERVAL: Duration = Duration::from_millis(100);

fn init_gc() -> Option<Handle> {
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("sample-gc".to_string())
        .spawn(move || {
            // Collector is !Sync, so it is created on the thread that owns it
            let mut collector = Collector::new();
            if tx.send(collector.handle()).is_err() {
                return;
            }

            log::info!("Sample buffer GC thread started");

            loop {
                collector.collect();
                thread::sleep(COLLECT_INTERVAL);
            }
        });

    if let Err(e) = spawned {
        log::error!("Failed to spawn sample buffer GC thread: {}", e);
        return None;
    }

    match rx.recv() {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("Failed to receive GC handle: {}", e);
            None
        }
    }
}

/// Handle for wrapping values in `basedrop::Owned`/`Shared`
///
/// Starts the collector thread on first use.
pub fn gc_handle() -> Option<Handle> {
    GC_HANDLE.get_or_init(init_gc).clone()
}

/// Hand buffers to the collector thread for freeing
///
/// Falls back to freeing in place if the collector is unavailable.
pub fn retire(buffers: Vec<AlignedBuffer>) {
    if buffers.is_empty() {
        return;
    }

    match gc_handle() {
        Some(handle) => drop(Owned::new(&handle, buffers)),
        None => {
            log::warn!("GC unavailable, releasing {} buffers in place", buffers.len());
            drop(buffers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_handle_is_shared() {
        assert!(gc_handle().is_some());
        assert!(gc_handle().is_some());
    }

    #[test]
    fn test_retire_buffers() {
        let buffers: Vec<AlignedBuffer> = (1..=4)
            .map(|n| AlignedBuffer::allocate(n * 64).unwrap())
            .collect();
        retire(buffers);
        retire(Vec::new());
    }
}
