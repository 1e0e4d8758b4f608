//! The three bytecode sources of a font and the execution position
//! within them.

use core::ops::Range;

use super::{
    call_stack::{CallKind, CallRecord, CallStack},
    code::Decoder,
    definition::Definition,
    error::HintErrorKind,
};

/// Identifies one of the bytecode sources of a font.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Program {
    /// `fpgm`, run once per session to define functions.
    #[default]
    Font = 0,
    /// `prep`, run once per session to adjust control values and storage
    /// for the size.
    ControlValue = 1,
    /// Instructions of a single glyph in `glyf`.
    Glyph = 2,
}

impl Program {
    /// Returns the tag of the table holding the program.
    pub fn table_tag(self) -> &'static str {
        match self {
            Self::Font => "fpgm",
            Self::ControlValue => "prep",
            Self::Glyph => "glyf",
        }
    }
}

/// Execution position across the font, control value and glyph
/// programs.
///
/// `initial` is the program execution started in. `current` changes as
/// functions defined in another program are called and returned from.
pub struct ProgramState<'a> {
    code: [&'a [u8]; 3],
    pub initial: Program,
    pub current: Program,
    pub decoder: Decoder<'a>,
    pub call_stack: CallStack,
}

impl<'a> ProgramState<'a> {
    pub fn new(
        font_code: &'a [u8],
        control_value_code: &'a [u8],
        glyph_code: &'a [u8],
        program: Program,
    ) -> Self {
        let code = [font_code, control_value_code, glyph_code];
        Self {
            code,
            initial: program,
            current: program,
            decoder: Decoder::new(code[program as usize], 0),
            call_stack: CallStack::default(),
        }
    }

    /// Returns the bytecode of the given program.
    pub fn code(&self, program: Program) -> &'a [u8] {
        self.code[program as usize]
    }

    /// Returns the bytecode of the active program.
    pub fn current_bytecode(&self) -> &'a [u8] {
        self.code(self.current)
    }

    /// Starts `program` from its first instruction with no active calls.
    pub fn reset(&mut self, program: Program) {
        self.initial = program;
        self.call_stack.clear();
        self.resume(program, 0);
    }

    fn resume(&mut self, program: Program, pc: usize) {
        self.current = program;
        self.decoder = Decoder::new(self.code(program), pc);
    }

    /// Returns the offsets that jumps may target: the body of the active
    /// function, or the whole program at the top level.
    pub fn jump_range(&self) -> Range<usize> {
        match self.call_stack.peek() {
            Some(record) => record.definition.code_range(),
            None => 0..self.current_bytecode().len(),
        }
    }

    /// Transfers control to the body of `definition`, which runs `count`
    /// times before control returns after the calling instruction.
    ///
    /// All iterations share one call record.
    pub fn enter(&mut self, definition: Definition, count: u32) {
        let kind = match count {
            n if n > 1 => CallKind::Repeating {
                remaining: n - 1,
                function: definition.key(),
            },
            _ => CallKind::Returning,
        };
        let (program, start) = (definition.program(), definition.code_range().start);
        self.call_stack.push(CallRecord {
            caller_program: self.current,
            return_pc: self.decoder.pc,
            definition,
            kind,
        });
        self.resume(program, start);
    }

    /// Handles the end of a function body: restarts it while iterations
    /// remain, otherwise resumes the caller.
    pub fn leave(&mut self) -> Result<(), HintErrorKind> {
        let record = self.call_stack.pop()?;
        match record.kind {
            CallKind::Repeating {
                remaining,
                function,
            } if remaining > 0 => {
                self.decoder.pc = record.definition.code_range().start;
                self.call_stack.push(CallRecord {
                    kind: CallKind::Repeating {
                        remaining: remaining - 1,
                        function,
                    },
                    ..record
                });
            }
            _ => self.resume(record.caller_program, record.return_pc),
        }
        Ok(())
    }

    /// Replaces the bytecode of a program and starts it.
    #[cfg(test)]
    pub(crate) fn set_code(&mut self, program: Program, code: &'a [u8]) {
        self.code[program as usize] = code;
        self.reset(program);
    }
}
