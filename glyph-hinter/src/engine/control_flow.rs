//! Managing control flow.
//!
//! Implements 6 instructions.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-flow-of-control>

use super::{
    super::code::{opcodes as op, Opcode},
    Engine, HintErrorKind, OpResult,
};

impl<'a> Engine<'a> {
    /// If test.
    ///
    /// IF[] (0x58)
    ///
    /// Pops: e: stack element
    ///
    /// Tests the element popped off the stack: if it is zero (FALSE), the
    /// instruction pointer is jumped to the next ELSE or EIF instruction
    /// in the instruction stream. If the element at the top of the stack is
    /// nonzero (TRUE), the next instruction in the instruction stream is
    /// executed. Execution continues until an ELSE instruction is encountered
    /// or an EIF instruction ends the IF. If an else statement is found
    /// before the EIF, the instruction pointer is moved to the EIF
    /// statement.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#if-test>
    pub(super) fn op_if(&mut self) -> OpResult {
        if self.value_stack.pop()? == 0 {
            let mut nest_depth = 1;
            loop {
                match self.next_opcode()? {
                    op::IF => nest_depth += 1,
                    op::ELSE if nest_depth == 1 => break,
                    op::EIF => {
                        nest_depth -= 1;
                        if nest_depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Else.
    ///
    /// ELSE[] (0x1B)
    ///
    /// Marks the start of the sequence of instructions that are to be executed
    /// if an IF instruction encounters a FALSE value on the stack. Reaching
    /// it by execution means the TRUE branch has finished so the remaining
    /// instructions up to the matching EIF are skipped.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#else>
    pub(super) fn op_else(&mut self) -> OpResult {
        let mut nest_depth = 1;
        while nest_depth != 0 {
            match self.next_opcode()? {
                op::IF => nest_depth += 1,
                op::EIF => nest_depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// End if.
    ///
    /// EIF[] (0x59)
    ///
    /// Marks the end of an IF[] instruction.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#end-if>
    pub(super) fn op_eif(&mut self) -> OpResult {
        // Nothing
        Ok(())
    }

    /// Jump relative on true.
    ///
    /// JROT[] (0x78)
    ///
    /// Pops: e: stack element
    ///       offset: number of bytes to move the instruction pointer
    ///
    /// Pops and tests the element value, and then pops the offset. If the
    /// element value is non-zero (TRUE), the signed offset will be added
    /// to the instruction pointer and execution will be resumed at the address
    /// obtained. Otherwise, the jump is not taken and the next instruction in
    /// the instruction stream is executed. The jump is relative to the position
    /// of the instruction itself.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#jump-relative-on-true>
    pub(super) fn op_jrot(&mut self) -> OpResult {
        let e = self.value_stack.pop()?;
        self.do_jump(e != 0)
    }

    /// Jump.
    ///
    /// JMPR[] (0x1C)
    ///
    /// Pops: offset: number of bytes to move the instruction pointer
    ///
    /// The signed offset is added to the instruction pointer and execution
    /// is resumed at the new location in the instruction steam. The jump is
    /// relative to the position of the instruction itself.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#jump>
    pub(super) fn op_jmpr(&mut self) -> OpResult {
        self.do_jump(true)
    }

    /// Jump relative on false.
    ///
    /// JROF[] (0x79)
    ///
    /// Pops: e: stack element
    ///       offset: number of bytes to move the instruction pointer
    ///
    /// Pops and tests the element value, and then pops the offset. If the
    /// element value is zero (FALSE), the signed offset will be added to the
    /// instruction pointer and execution will be resumed at the address
    /// obtained. Otherwise, the jump is not taken and the next instruction
    /// in the instruction stream is executed.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#jump-relative-on-false>
    pub(super) fn op_jrof(&mut self) -> OpResult {
        let e = self.value_stack.pop()?;
        self.do_jump(e == 0)
    }

    fn do_jump(&mut self, test: bool) -> OpResult {
        let offset = self.value_stack.pop()?;
        if !test {
            return Ok(());
        }
        if offset == 0 {
            // Would loop in place forever.
            return Err(HintErrorKind::InvalidJump);
        }
        // Jumps are single byte instructions and the decoder is already
        // pointing at the next one.
        let jump_pc = self.program.decoder.pc - 1;
        let target = jump_pc
            .checked_add_signed(offset as isize)
            .ok_or(HintErrorKind::InvalidJump)?;
        if !self.program.jump_range().contains(&target) {
            return Err(HintErrorKind::InvalidJump);
        }
        self.program.decoder.pc = target;
        Ok(())
    }

    /// Decodes the next instruction while scanning for the end of a
    /// block, returning its opcode.
    ///
    /// Running off the end of the program (or into a truncated push) means
    /// the block was never closed.
    pub(super) fn next_opcode(&mut self) -> Result<Opcode, HintErrorKind> {
        match self.program.decoder.decode() {
            Some(Ok(ins)) => Ok(ins.opcode),
            _ => Err(HintErrorKind::UnterminatedBlock),
        }
    }
}
