use super::prelude::*;
use super::utils::USIZE_MAX;
use super::ExitError;
use core::cmp::min;
use core::ops::{BitAnd, Not};
use primitive_types::{H256, U256};

/// Byte-addressed frame memory. Its length is always a multiple of 32 and
/// it only ever grows.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create a new empty memory.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if nothing was allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the full memory.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Zero-extend the memory so that it covers `..end`, rounded up to the
    /// next word. Never shrinks. Gas is accounted by the caller.
    ///
    /// # Errors
    /// Return `ExitError::InvalidRange` if rounding `end` up overflows.
    pub fn resize_end(&mut self, end: usize) -> Result<(), ExitError> {
        if end > self.data.len() {
            let new_end = next_multiple_of_32(end).ok_or(ExitError::InvalidRange)?;
            self.data.resize(new_end, 0);
        }
        Ok(())
    }

    /// Get memory region at given offset, zero padded past the end.
    #[must_use]
    pub fn get(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut ret = vec![0; size];
        if offset < self.data.len() {
            let end = min(offset.saturating_add(size), self.data.len());
            ret[..end - offset].copy_from_slice(&self.data[offset..end]);
        }
        ret
    }

    /// Get `H256` value from a specific offset in memory.
    #[must_use]
    pub fn get_h256(&self, offset: usize) -> H256 {
        let mut ret = [0; 32];

        let data_len = self.data.len();
        if offset >= data_len {
            return H256(ret);
        }
        let count = 32.min(data_len - offset);
        ret[..count].copy_from_slice(&self.data[offset..offset + count]);

        H256(ret)
    }

    /// Write `value` into `offset..offset + target_size`. Bytes past the
    /// end of `value` are written as zero.
    ///
    /// The region must already be allocated with [`Memory::resize_end`].
    ///
    /// # Errors
    /// Return `ExitError::InvalidRange` if the region is outside memory.
    pub fn set(&mut self, offset: usize, value: &[u8], target_size: usize) -> Result<(), ExitError> {
        if target_size == 0 {
            return Ok(());
        }

        let dest = self.region_mut(offset, target_size)?;
        let copy_len = min(value.len(), target_size);
        dest[..copy_len].copy_from_slice(&value[..copy_len]);
        dest[copy_len..].fill(0);
        Ok(())
    }

    /// Copy `length` bytes of `data` starting at `data_offset` into memory
    /// at `memory_offset`. Source bytes past the end of `data` read as zero.
    ///
    /// # Errors
    /// Return `ExitError::InvalidRange` if the destination is outside memory.
    pub fn copy_data(
        &mut self,
        memory_offset: usize,
        data_offset: U256,
        length: usize,
        data: &[u8],
    ) -> Result<(), ExitError> {
        if length == 0 {
            return Ok(());
        }

        let dest = self.region_mut(memory_offset, length)?;
        if data_offset > USIZE_MAX || data_offset.as_usize() >= data.len() {
            dest.fill(0);
            return Ok(());
        }
        let data_offset = data_offset.as_usize();
        let copy_len = min(data.len() - data_offset, length);
        dest[..copy_len].copy_from_slice(&data[data_offset..data_offset + copy_len]);
        dest[copy_len..].fill(0);
        Ok(())
    }

    fn region_mut(&mut self, offset: usize, size: usize) -> Result<&mut [u8], ExitError> {
        let end = offset.checked_add(size).ok_or(ExitError::InvalidRange)?;
        self.data.get_mut(offset..end).ok_or(ExitError::InvalidRange)
    }
}

/// Rounds up `x` to the closest multiple of 32. If `x % 32 == 0` then `x` is returned.
#[inline]
fn next_multiple_of_32(x: usize) -> Option<usize> {
    let r = x.bitand(31).not().wrapping_add(1).bitand(31);
    x.checked_add(r)
}
