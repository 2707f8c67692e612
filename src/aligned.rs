//! 64-byte aligned `f32` buffers for the aligned kernel variants.
#![allow(unsafe_code)]

use std::ops::{Deref, DerefMut};

/// SIMD alignment constant (64 bytes covers every variant's requirement).
pub const SIMD_ALIGNMENT: usize = 64;

const LANES_PER_BLOCK: usize = SIMD_ALIGNMENT / std::mem::size_of::<f32>();

#[derive(Clone, Copy)]
#[repr(C, align(64))]
struct Block([f32; LANES_PER_BLOCK]);

/// Owned `f32` buffer whose first element sits on a 64-byte boundary.
#[derive(Clone)]
pub struct AlignedVec {
    blocks: Vec<Block>,
    len: usize,
}

impl AlignedVec {
    /// Creates a buffer of `len` zeros.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        let blocks = vec![Block([0.0; LANES_PER_BLOCK]); len.div_ceil(LANES_PER_BLOCK)];
        Self { blocks, len }
    }

    /// Creates a buffer holding a copy of `values`.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Self {
        let mut buf = Self::zeroed(values.len());
        buf.as_mut_slice().copy_from_slice(values);
        buf
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[f32] {
        // SAFETY: blocks are repr(C) arrays of f32 with no padding, and
        // len <= blocks.len() * LANES_PER_BLOCK
        unsafe { std::slice::from_raw_parts(self.blocks.as_ptr().cast::<f32>(), self.len) }
    }

    /// Returns the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        // SAFETY: as in as_slice, with exclusive access through &mut self
        unsafe { std::slice::from_raw_parts_mut(self.blocks.as_mut_ptr().cast::<f32>(), self.len) }
    }
}

impl Deref for AlignedVec {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        self.as_slice()
    }
}

impl DerefMut for AlignedVec {
    fn deref_mut(&mut self) -> &mut [f32] {
        self.as_mut_slice()
    }
}

impl std::fmt::Debug for AlignedVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl From<&[f32]> for AlignedVec {
    fn from(values: &[f32]) -> Self {
        Self::from_slice(values)
    }
}
