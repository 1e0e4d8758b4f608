//! Compensating for the engine characteristics (rounding).
//!
//! Implements 8 instructions.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#compensating-for-the-engine-characteristics>

use super::{super::round::DistanceType, Engine, F26Dot6, OpResult};

impl<'a> Engine<'a> {
    /// Round value.
    ///
    /// ROUND\[ab\] (0x68 - 0x6B)
    ///
    /// Pops: n1
    /// Pushes: n2
    ///
    /// Rounds a value according to the state variable round_state while
    /// compensating for the engine. n1 is popped off the stack and,
    /// depending on the engine characteristics, is increased or decreased
    /// by a set amount. The number obtained is then rounded and pushed
    /// back onto the stack as n2.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-value>
    pub(super) fn op_round(&mut self, opcode: u8) -> OpResult {
        let distance_type = DistanceType::from_opcode(opcode);
        let round_state = self.graphics.round_state;
        self.value_stack.map_top(|n1| {
            Ok(round_state
                .round_distance(F26Dot6::from(n1), distance_type)
                .to_i32_bits())
        })
    }

    /// No rounding of value.
    ///
    /// NROUND\[ab\] (0x6C - 0x6F)
    ///
    /// Pops: n1
    /// Pushes: n2
    ///
    /// Changes the value by the amount needed to compensate for the engine
    /// characteristics without rounding. Compensation is zero for every
    /// distance type so the value passes through unchanged.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#no-rounding-of-value>
    pub(super) fn op_nround(&mut self, _opcode: u8) -> OpResult {
        self.value_stack.map_top(Ok)
    }
}
