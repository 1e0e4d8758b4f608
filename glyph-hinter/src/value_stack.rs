//! Operand stack shared by every instruction of a program.

use super::{code::InlineOperands, error::HintErrorKind};

use HintErrorKind::{ValueStackOverflow, ValueStackUnderflow};

/// Stack of 32-bit operands.
///
/// Values are addressed from the top: depth 0 is the most recently
/// pushed value. The stack grows without bound unless a limit is given,
/// in which case pushing past it fails with
/// [`ValueStackOverflow`](HintErrorKind::ValueStackOverflow).
#[derive(Clone, Default, Debug)]
pub struct ValueStack {
    values: Vec<i32>,
    limit: Option<usize>,
}

impl ValueStack {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            values: vec![],
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bottom to top.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn peek(&self) -> Option<i32> {
        self.values.last().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Fails unless `count` more values fit under the limit.
    fn reserve(&self, count: usize) -> Result<(), HintErrorKind> {
        match self.limit {
            Some(limit) if self.values.len() + count > limit => Err(ValueStackOverflow),
            _ => Ok(()),
        }
    }

    pub fn push(&mut self, value: i32) -> Result<(), HintErrorKind> {
        self.reserve(1)?;
        self.values.push(value);
        Ok(())
    }

    /// Pushes every operand of a push instruction, or none of them when
    /// they would exceed the limit.
    pub fn push_inline_operands(&mut self, operands: &InlineOperands) -> Result<(), HintErrorKind> {
        self.reserve(operands.len())?;
        self.values.extend(operands.values());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<i32, HintErrorKind> {
        self.values.pop().ok_or(ValueStackUnderflow)
    }

    /// Pops a value used as a point, control value or storage index.
    ///
    /// Negative values map to `usize::MAX` so that the subsequent lookup
    /// fails with the error of the indexed resource.
    pub fn pop_usize(&mut self) -> Result<usize, HintErrorKind> {
        Ok(usize::try_from(self.pop()?).unwrap_or(usize::MAX))
    }

    /// Pops the top `N` values, returned in push order.
    ///
    /// Nothing is removed when fewer than `N` values are present.
    pub fn pop_array<const N: usize>(&mut self) -> Result<[i32; N], HintErrorKind> {
        let start = self
            .values
            .len()
            .checked_sub(N)
            .ok_or(ValueStackUnderflow)?;
        let mut popped = [0; N];
        popped.copy_from_slice(&self.values[start..]);
        self.values.truncate(start);
        Ok(popped)
    }

    /// Replaces the top value with `f(top)`.
    pub fn map_top(
        &mut self,
        f: impl FnOnce(i32) -> Result<i32, HintErrorKind>,
    ) -> Result<(), HintErrorKind> {
        let top = self.values.last_mut().ok_or(ValueStackUnderflow)?;
        *top = f(*top)?;
        Ok(())
    }

    /// Replaces the top two values `a` (lower) and `b` (top) with
    /// `f(a, b)`.
    pub fn fold_top(
        &mut self,
        f: impl FnOnce(i32, i32) -> Result<i32, HintErrorKind>,
    ) -> Result<(), HintErrorKind> {
        let [a, b] = self.pop_array()?;
        // Two values were just removed so the result always fits
        self.values.push(f(a, b)?);
        Ok(())
    }

    /// Returns the value `depth` places below the top.
    pub fn get(&self, depth: usize) -> Result<i32, HintErrorKind> {
        self.slot(depth).map(|ix| self.values[ix])
    }

    /// Removes and returns the value `depth` places below the top.
    pub fn remove(&mut self, depth: usize) -> Result<i32, HintErrorKind> {
        let ix = self.slot(depth)?;
        Ok(self.values.remove(ix))
    }

    fn slot(&self, depth: usize) -> Result<usize, HintErrorKind> {
        self.values
            .len()
            .checked_sub(depth.checked_add(1).ok_or(ValueStackUnderflow)?)
            .ok_or(ValueStackUnderflow)
    }
}
