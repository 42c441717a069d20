use super::prelude::*;
use super::ExitError;
use primitive_types::{H256, U256};

/// Maximum number of words on the operand stack.
pub const STACK_LIMIT: usize = 1024;

/// EVM stack.
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<U256>,
    limit: usize,
}

impl Stack {
    /// Create a new stack with given limit.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Stack limit.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Stack length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the stack is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Stack data, bottom first.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[U256] {
        &self.data
    }

    /// Pop a value from the stack.
    ///
    /// # Errors
    /// Return `ExitError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<U256, ExitError> {
        self.data.pop().ok_or(ExitError::StackUnderflow)
    }

    /// Pop a value from the stack as a big-endian `H256`.
    ///
    /// # Errors
    /// Return `ExitError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn pop_h256(&mut self) -> Result<H256, ExitError> {
        self.pop().map(|it| H256(it.to_big_endian()))
    }

    /// Push a new value into the stack. If it will exceed the stack limit,
    /// returns `StackOverflow` error and leaves the stack unchanged.
    ///
    /// # Errors
    /// Return `ExitError::StackOverflow`
    #[inline]
    pub fn push(&mut self, value: U256) -> Result<(), ExitError> {
        if self.data.len() >= self.limit {
            return Err(ExitError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Push a big-endian `H256` into the stack.
    ///
    /// # Errors
    /// Return `ExitError::StackOverflow`
    #[inline]
    pub fn push_h256(&mut self, value: H256) -> Result<(), ExitError> {
        self.push(U256::from_big_endian(value.as_bytes()))
    }

    /// Peek a value at given index for the stack, where the top of
    /// the stack is at index `0`.
    ///
    /// # Errors
    /// Return `ExitError::StackUnderflow` if the index is too large.
    #[inline]
    pub fn peek(&self, no_from_top: usize) -> Result<U256, ExitError> {
        if self.data.len() > no_from_top {
            Ok(self.data[self.data.len() - no_from_top - 1])
        } else {
            Err(ExitError::StackUnderflow)
        }
    }

    /// Set a value at given index for the stack, where the top of the
    /// stack is at index `0`.
    ///
    /// # Errors
    /// Return `ExitError::StackUnderflow` if the index is too large.
    #[inline]
    pub fn set(&mut self, no_from_top: usize, val: U256) -> Result<(), ExitError> {
        if self.data.len() > no_from_top {
            let len = self.data.len();
            self.data[len - no_from_top - 1] = val;
            Ok(())
        } else {
            Err(ExitError::StackUnderflow)
        }
    }

    /// Duplicate the `n`-th item (1-based from the top) onto the top.
    ///
    /// # Errors
    /// Return `ExitError` on underflow or overflow.
    #[inline]
    pub fn dup(&mut self, n: usize) -> Result<(), ExitError> {
        let value = self.peek(n - 1)?;
        self.push(value)
    }

    /// Exchange the top item with the `n + 1`-th one.
    ///
    /// # Errors
    /// Return `ExitError::StackUnderflow`
    #[inline]
    pub fn swap(&mut self, n: usize) -> Result<(), ExitError> {
        let len = self.data.len();
        if len <= n {
            return Err(ExitError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_past_limit_overflows() {
        let mut stack = Stack::new(STACK_LIMIT);
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).unwrap();
        }
        assert_eq!(stack.push(U256::one()), Err(ExitError::StackOverflow));
        assert_eq!(stack.len(), STACK_LIMIT);
    }

    #[test]
    fn dup_and_swap() {
        let mut stack = Stack::new(STACK_LIMIT);
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();
        stack.push(U256::from(3)).unwrap();

        stack.dup(3).unwrap();
        assert_eq!(stack.peek(0), Ok(U256::from(1)));

        stack.swap(2).unwrap();
        assert_eq!(stack.data(), &[1u64, 1, 3, 2].map(U256::from));
        assert_eq!(stack.swap(4), Err(ExitError::StackUnderflow));
    }

    #[test]
    fn pop_empty_underflows() {
        let mut stack = Stack::new(STACK_LIMIT);
        assert_eq!(stack.pop(), Err(ExitError::StackUnderflow));
        assert_eq!(stack.peek(0), Err(ExitError::StackUnderflow));
    }
}
