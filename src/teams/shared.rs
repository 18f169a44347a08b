//! Team-shared scratch memory.
//!
//! A team owns one [`ScratchArena`] of 8-byte words for the lifetime of a
//! launch body. Elements are stored bit-for-bit in atomic words, so lanes
//! may write concurrently without `unsafe`; ordering between writes and
//! reads of different lanes comes from `team_sync`.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Backing store a launch context can carve team-shared arrays from.
pub trait TeamScratch: Sync {
    /// Capacity in words.
    fn capacity(&self) -> usize;

    /// Words `start..start + len`. Callers stay within `capacity`.
    fn words(&self, start: usize, len: usize) -> &[AtomicU64];
}

/// Heap-backed scratch, zero-initialised.
pub struct ScratchArena {
    words: Box<[AtomicU64]>,
}

impl ScratchArena {
    pub fn new(words: usize) -> Self {
        Self {
            words: (0..words).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

impl TeamScratch for ScratchArena {
    fn capacity(&self) -> usize {
        self.words.len()
    }

    fn words(&self, start: usize, len: usize) -> &[AtomicU64] {
        &self.words[start..start + len]
    }
}

/// A typed view of team-shared words. Each element occupies one word, so
/// `T` may be at most 8 bytes.
pub struct TeamSharedArray<'t, T> {
    words: &'t [AtomicU64],
    _elem: PhantomData<fn() -> T>,
}

impl<T> Clone for TeamSharedArray<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TeamSharedArray<'_, T> {}

impl<'t, T: bytemuck::Pod> TeamSharedArray<'t, T> {
    pub(crate) fn new(words: &'t [AtomicU64]) -> Self {
        const { assert!(std::mem::size_of::<T>() <= 8, "team-shared elements are at most 8 bytes") };
        Self {
            words,
            _elem: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// # Panics
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> T {
        let bytes = self.words[index].load(Ordering::Relaxed).to_ne_bytes();
        bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<T>()])
    }

    /// # Panics
    /// Panics if `index >= len()`.
    pub fn set(&self, index: usize, value: T) {
        let mut bytes = [0u8; 8];
        bytes[..std::mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
        self.words[index].store(u64::from_ne_bytes(bytes), Ordering::Relaxed);
    }

    /// Row-major 2-D access with `cols` elements per row.
    pub fn get2(&self, row: usize, col: usize, cols: usize) -> T {
        self.get(row * cols + col)
    }

    pub fn set2(&self, row: usize, col: usize, cols: usize, value: T) {
        self.set(row * cols + col, value);
    }
}
