//! Comparisons and boolean logic.
//!
//! Every instruction here pushes 1 for true and 0 for false. Any nonzero
//! operand counts as true.

use super::{super::code::opcodes as op, Engine, F26Dot6, HintErrorKind, OpResult};

impl<'a> Engine<'a> {
    /// LT, LTEQ, GT, GTEQ, EQ and NEQ.
    ///
    /// Pops `e2` then `e1` and pushes `e1 <op> e2`.
    pub(super) fn op_compare(&mut self, opcode: u8) -> OpResult {
        let test: fn(&i32, &i32) -> bool = match opcode {
            op::LT => i32::lt,
            op::LTEQ => i32::le,
            op::GT => i32::gt,
            op::GTEQ => i32::ge,
            op::EQ => i32::eq,
            op::NEQ => i32::ne,
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        };
        self.value_stack.fold_top(|a, b| Ok(test(&a, &b) as i32))
    }

    /// ODD and EVEN.
    ///
    /// The operand is rounded with the current round state before the
    /// whole pixel part is tested.
    pub(super) fn op_parity(&mut self, opcode: u8) -> OpResult {
        let want_odd = opcode == op::ODD;
        let round_state = self.graphics.round_state;
        self.value_stack.map_top(|value| {
            let pixels = round_state.round(F26Dot6::from(value)).to_bits() >> 6;
            let odd = pixels & 1 != 0;
            Ok((odd == want_odd) as i32)
        })
    }

    /// AND, OR and NOT.
    pub(super) fn op_logic(&mut self, opcode: u8) -> OpResult {
        match opcode {
            op::AND => self
                .value_stack
                .fold_top(|a, b| Ok((a != 0 && b != 0) as i32)),
            op::OR => self
                .value_stack
                .fold_top(|a, b| Ok((a != 0 || b != 0) as i32)),
            op::NOT => self.value_stack.map_top(|e| Ok((e == 0) as i32)),
            _ => Err(HintErrorKind::UnknownOpcode(opcode)),
        }
    }
}
