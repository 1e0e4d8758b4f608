//! Reading and writing data.
//!
//! Implements 3 instructions.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#reading-and-writing-data>

use super::{Engine, OpResult};

impl<'a> Engine<'a> {
    /// Get coordinate projected onto the projection vector.
    ///
    /// GC\[a\] (0x46 - 0x47)
    ///
    /// a: 0: use current position of point p
    ///    1: use the position of point p in the original outline
    ///
    /// Pops: p: point number
    /// Pushes: value: coordinate location (F26Dot6)
    ///
    /// Measures the coordinate value of point p on the current
    /// projection_vector and pushes the value onto the stack.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#get-coordinate-projected-onto-the-projection_vector>
    pub(super) fn op_gc(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let value = if (opcode & 1) != 0 {
            self.measure_original(p)?
        } else {
            self.measure_current(p)?
        };
        self.value_stack.push(value.to_i32_bits())
    }

    /// Measure distance.
    ///
    /// MD\[a\] (0x49 - 0x4A)
    ///
    /// a: 0: measure distance in grid-fitted outline
    ///    1: measure distance in original outline
    ///
    /// Pops: p2: point number
    ///       p1: point number
    /// Pushes: distance (F26Dot6)
    ///
    /// Measures the distance between outline point p1 and outline point p2
    /// along the projection vector. Reversing the order in which the points
    /// are listed will change the sign of the result.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#measure-distance>
    pub(super) fn op_md(&mut self, opcode: u8) -> OpResult {
        let p2 = self.value_stack.pop_usize()?;
        let p1 = self.value_stack.pop_usize()?;
        let distance = if (opcode & 1) != 0 {
            self.measure_original(p1)? - self.measure_original(p2)?
        } else {
            self.measure_current(p1)? - self.measure_current(p2)?
        };
        self.value_stack.push(distance.to_i32_bits())
    }

    /// Measure pixels per em.
    ///
    /// MPPEM[] (0x4B)
    ///
    /// Pushes: ppem: pixels per em (uint32)
    ///
    /// This instruction pushes the number of pixels per em onto the stack.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#measure-pixels-per-em>
    pub(super) fn op_mppem(&mut self) -> OpResult {
        self.value_stack.push(self.graphics.ppem)
    }
}
