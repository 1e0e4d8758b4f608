//! Control value table.

use super::{error::HintErrorKind, fixed::F26Dot6};

/// Access to the control value table of a session.
///
/// This is just a wrapper for a mutable slice that converts out of bounds
/// accesses to appropriate errors.
pub struct Cvt<'a>(&'a mut [F26Dot6]);

impl Cvt<'_> {
    pub fn get(&self, index: usize) -> Result<F26Dot6, HintErrorKind> {
        self.0
            .get(index)
            .copied()
            .ok_or(HintErrorKind::InvalidCvtIndex(index))
    }

    pub fn set(&mut self, index: usize, value: F26Dot6) -> Result<(), HintErrorKind> {
        *self
            .0
            .get_mut(index)
            .ok_or(HintErrorKind::InvalidCvtIndex(index))? = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<&'a mut [F26Dot6]> for Cvt<'a> {
    fn from(value: &'a mut [F26Dot6]) -> Self {
        Self(value)
    }
}
