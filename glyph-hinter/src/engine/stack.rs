//! Stack manipulation and inline pushes.

use super::{
    super::code::{opcodes as op, Instruction},
    Engine, HintErrorKind, OpResult,
};

impl<'a> Engine<'a> {
    /// DUP, POP, CLEAR, SWAP, DEPTH, CINDEX, MINDEX and ROLL.
    ///
    /// `CINDEX` and `MINDEX` pop an element number `k`, where 1 is the
    /// element left on top after popping `k`. `ROLL` moves the third
    /// element to the top.
    pub(super) fn op_stack(&mut self, opcode: u8) -> OpResult {
        let stack = &mut self.value_stack;
        match opcode {
            op::DUP => {
                let top = stack.get(0)?;
                stack.push(top)
            }
            op::POP => stack.pop().map(drop),
            op::CLEAR => {
                stack.clear();
                Ok(())
            }
            op::SWAP => {
                let [a, b] = stack.pop_array()?;
                stack.push(b)?;
                stack.push(a)
            }
            op::DEPTH => {
                let depth = stack.len() as i32;
                stack.push(depth)
            }
            op::CINDEX | op::MINDEX => {
                let depth = element_depth(stack.pop()?)?;
                let value = if opcode == op::CINDEX {
                    stack.get(depth)?
                } else {
                    stack.remove(depth)?
                };
                stack.push(value)
            }
            op::ROLL => {
                let [a, b, c] = stack.pop_array()?;
                for value in [b, c, a] {
                    stack.push(value)?;
                }
                Ok(())
            }
            _ => Err(HintErrorKind::UnknownOpcode(opcode)),
        }
    }

    /// PUSHB, PUSHW, NPUSHB and NPUSHW.
    ///
    /// The decoder has already read and sign extended the operands.
    pub(super) fn op_push(&mut self, ins: &Instruction) -> OpResult {
        self.value_stack.push_inline_operands(&ins.inline_operands)
    }
}

/// Converts a one based element number into a depth below the top.
fn element_depth(k: i32) -> Result<usize, HintErrorKind> {
    usize::try_from(k)
        .ok()
        .and_then(|k| k.checked_sub(1))
        .ok_or(HintErrorKind::ValueStackUnderflow)
}

#[cfg(test)]
mod tests {
    use super::super::{super::code::opcodes as op, HintErrorKind, MockEngine};

    #[test]
    fn push_bytes_in_order() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000 + 3, 1, 2, 250, 4,
            op::NPUSHB, 2, 7, 8,
        ];
        engine.set_font_code(&font_code);
        engine.run().unwrap();
        assert_eq!(engine.value_stack.values(), &[1, 2, 250, 4, 7, 8]);
    }

    #[test]
    fn push_words_sign_extended() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHW000 + 1, 0xFF, 0xFE, 0x01, 0x00,
            op::NPUSHW, 1, 0x80, 0x00,
        ];
        engine.set_font_code(&font_code);
        engine.run().unwrap();
        assert_eq!(engine.value_stack.values(), &[-2, 256, -32768]);
    }

    #[test]
    fn reorder_and_copy() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for value in [2, 4, 6, 8, -2000, 4000] {
            engine.value_stack.push(value).unwrap();
        }
        engine.op_stack(op::DEPTH).unwrap();
        assert_eq!(engine.value_stack.pop(), Ok(6));
        engine.op_stack(op::SWAP).unwrap();
        assert_eq!(&engine.value_stack.values()[4..], &[4000, -2000]);
        engine.op_stack(op::ROLL).unwrap();
        assert_eq!(&engine.value_stack.values()[3..], &[4000, -2000, 8]);
        // Element 4 counts down from -2000
        engine.value_stack.push(4).unwrap();
        engine.op_stack(op::CINDEX).unwrap();
        assert_eq!(engine.value_stack.values(), &[2, 4, 6, 4000, -2000, 8, 6]);
        engine.value_stack.push(3).unwrap();
        engine.op_stack(op::MINDEX).unwrap();
        assert_eq!(engine.value_stack.values(), &[2, 4, 6, 4000, 8, 6, -2000]);
        engine.op_stack(op::DUP).unwrap();
        assert_eq!(engine.value_stack.len(), 8);
        engine.op_stack(op::POP).unwrap();
        engine.op_stack(op::CLEAR).unwrap();
        assert!(engine.value_stack.is_empty());
        assert_eq!(
            engine.op_stack(op::POP),
            Err(HintErrorKind::ValueStackUnderflow)
        );
    }

    #[test]
    fn element_numbers_out_of_range() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for k in [0, -1, 3] {
            engine.value_stack.clear();
            engine.value_stack.push(10).unwrap();
            engine.value_stack.push(20).unwrap();
            engine.value_stack.push(k).unwrap();
            assert_eq!(
                engine.op_stack(op::CINDEX),
                Err(HintErrorKind::ValueStackUnderflow)
            );
            engine.value_stack.push(k).unwrap();
            assert_eq!(
                engine.op_stack(op::MINDEX),
                Err(HintErrorKind::ValueStackUnderflow)
            );
        }
    }

    #[test]
    fn short_stacks_underflow() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.value_stack.push(1).unwrap();
        engine.value_stack.push(2).unwrap();
        assert!(engine.op_stack(op::ROLL).is_err());
        // Nothing is lost when there are too few values
        assert_eq!(engine.value_stack.values(), &[1, 2]);
        engine.value_stack.pop().unwrap();
        assert!(engine.op_stack(op::SWAP).is_err());
    }
}
