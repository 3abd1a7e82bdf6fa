//! `ChunkBuffers` — recycled copy buffers.
//!
//! Each copy needs one fixed-size buffer for its whole duration. Buffers
//! are parked in a bounded lock-free queue between copies, so a pool of
//! N workers settles at N allocations. When the queue is empty a fresh
//! buffer is allocated; when it is full a returned buffer is dropped.

use crossbeam_queue::ArrayQueue;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct ChunkBuffers {
    free: ArrayQueue<Box<[u8]>>,
    chunk_size: usize,
    /// Buffers currently checked out (diagnostics).
    in_use: AtomicUsize,
    /// Buffers ever allocated (diagnostics).
    allocated: AtomicUsize,
}

impl ChunkBuffers {
    /// `chunk_size`: bytes per buffer (at least 1).
    /// `capacity`: how many idle buffers to keep (at least 1).
    pub fn new(chunk_size: usize, capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
            chunk_size: chunk_size.max(1),
            in_use: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        }
    }

    /// Take a buffer; returned to the pool when the guard drops.
    pub fn acquire(&self) -> ChunkBuffer<'_> {
        let buf = self.free.pop().unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            vec![0u8; self.chunk_size].into_boxed_slice()
        });
        self.in_use.fetch_add(1, Ordering::Relaxed);
        ChunkBuffer {
            buf: Some(buf),
            owner: self,
        }
    }

    fn release(&self, buf: Box<[u8]>) {
        self.in_use.fetch_sub(1, Ordering::Relaxed);
        // Full pool: let the extra buffer drop.
        let _ = self.free.push(buf);
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

impl Default for ChunkBuffers {
    fn default() -> Self {
        Self::new(8192, 20) // 8 KiB per worker, 20 workers
    }
}

/// A checked-out buffer.
pub struct ChunkBuffer<'a> {
    buf: Option<Box<[u8]>>,
    owner: &'a ChunkBuffers,
}

impl Deref for ChunkBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for ChunkBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for ChunkBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.owner.release(buf);
        }
    }
}
