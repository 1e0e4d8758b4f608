//! Defining and using functions.
//!
//! Implements 4 instructions.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#defining-and-using-functions-and-instructions>

use super::{
    super::{code::opcodes as op, definition::Definition, program::Program},
    Engine, HintErrorKind, OpResult,
};

impl<'a> Engine<'a> {
    /// Function definition.
    ///
    /// FDEF[] (0x2C)
    ///
    /// Pops: f: function identifier number
    ///
    /// Marks the start of a function definition. The argument f is a number
    /// that uniquely identifies this function. Functions may only be
    /// defined by the font program. Defining a number that already exists
    /// replaces the earlier function.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#function-definition>
    pub(super) fn op_fdef(&mut self) -> OpResult {
        let f = self.value_stack.pop()?;
        if self.program.initial != Program::Font {
            return Err(HintErrorKind::DefinitionOutsideFontProgram);
        }
        let start = self.program.decoder.pc;
        loop {
            let ins = match self.program.decoder.decode() {
                Some(Ok(ins)) => ins,
                _ => return Err(HintErrorKind::UnterminatedBlock),
            };
            match ins.opcode {
                op::FDEF => return Err(HintErrorKind::NestedDefinition),
                op::ENDF => {
                    let definition = Definition::new(self.program.current, start..ins.pc + 1, f);
                    return self.functions.define(definition);
                }
                _ => {}
            }
        }
    }

    /// End function definition.
    ///
    /// ENDF[] (0x2D)
    ///
    /// Marks the end of a function definition. Returns to the caller or
    /// restarts the function if a `LOOPCALL` has iterations left.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#end-function-definition>
    pub(super) fn op_endf(&mut self) -> OpResult {
        self.program.leave()
    }

    /// Call function.
    ///
    /// CALL[] (0x2B)
    ///
    /// Pops: f: function identifier number
    ///
    /// Calls the function identified by the number f.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#call-function>
    pub(super) fn op_call(&mut self) -> OpResult {
        let f = self.value_stack.pop()?;
        self.do_call(1, f)
    }

    /// Loop and call function.
    ///
    /// LOOPCALL[] (0x2a)
    ///
    /// Pops: f: function identifier number
    ///       count: number of times to call the function
    ///
    /// Calls the function f, count number of times. A count of zero or less
    /// does nothing.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#loop-and-call-function>
    pub(super) fn op_loopcall(&mut self) -> OpResult {
        let f = self.value_stack.pop()?;
        let count = self.value_stack.pop()?;
        if count > 0 {
            self.do_call(count as u32, f)
        } else {
            Ok(())
        }
    }

    fn do_call(&mut self, count: u32, key: i32) -> OpResult {
        let definition = self.functions.get(key)?.clone();
        self.program.enter(definition, count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        super::{
            super::{code::opcodes as op, program::Program},
            MockEngine,
        },
        HintErrorKind,
    };

    /// LOOPCALL runs the body the requested number of times using a single
    /// frame and then resumes after the call.
    #[test]
    fn loopcall_add() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000, 0,
            op::FDEF,
                op::ADD,
            op::ENDF,
            op::NPUSHB, 6, 1, 2, 3, 4, 3, 0,
            op::LOOPCALL, // pc = 13
            op::PUSHB000, 100,
        ];
        engine.set_font_code(&font_code);
        // Run up to the LOOPCALL
        for _ in 0..3 {
            engine.step().unwrap();
        }
        assert_eq!(engine.pc(), 13);
        engine.step().unwrap();
        assert_eq!(engine.call_depth(), 1);
        assert_eq!(engine.program(), Program::Font);
        assert_eq!(engine.pc(), 3);
        let mut iterations = 0;
        while engine.call_depth() != 0 {
            let at_add = engine.pc() == 3;
            engine.step().unwrap();
            iterations += at_add as u32;
            assert!(engine.call_depth() <= 1);
        }
        assert_eq!(iterations, 3);
        assert_eq!(engine.pc(), 14);
        engine.run().unwrap();
        assert_eq!(engine.value_stack.values(), &[10, 100]);
    }

    /// Functions defined in the font program can be called from a glyph
    /// program and from each other.
    #[test]
    fn call_from_glyph_program() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000 + 1, 1, 0,
            // FDEF 0: adds 2 to top stack value
            op::FDEF,
                op::PUSHB000, 2,
                op::ADD,
            op::ENDF,
            // FDEF 1: calls FDEF 0 once and then negates the result
            op::FDEF,
                op::PUSHB000, 0,
                op::CALL,
                op::NEG,
            op::ENDF,
        ];
        engine.set_font_code(&font_code);
        engine.run().unwrap();
        assert_eq!(engine.functions.table().len(), 2);
        #[rustfmt::skip]
        let glyph_code = [
            op::PUSHB000 + 1, 5, 1,
            op::CALL,
        ];
        engine.set_glyph_code(&glyph_code);
        engine.run().unwrap();
        assert_eq!(engine.value_stack.values(), &[-7]);
        assert_eq!(engine.program(), Program::Glyph);
    }

    #[test]
    fn loopcall_zero_count() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000, 0,
            op::FDEF,
                op::CLEAR,
            op::ENDF,
            op::PUSHB000 + 2, 7, 0, 0,
            op::LOOPCALL,
        ];
        engine.set_font_code(&font_code);
        engine.run().unwrap();
        assert_eq!(engine.value_stack.values(), &[7]);
        assert_eq!(engine.call_depth(), 0);
    }

    #[test]
    fn redefinition_replaces() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000, 3,
            op::FDEF,
                op::PUSHB000, 1,
            op::ENDF,
            op::PUSHB000, 3,
            op::FDEF,
                op::PUSHB000, 2,
            op::ENDF,
            op::PUSHB000, 3,
            op::CALL,
        ];
        engine.set_font_code(&font_code);
        engine.run().unwrap();
        assert_eq!(engine.value_stack.values(), &[2]);
        assert_eq!(engine.functions.get(3).unwrap().code_range(), 9..12);
    }

    #[test]
    fn nested_definition() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000, 0,
            op::FDEF,
                op::FDEF,
            op::ENDF,
        ];
        engine.set_font_code(&font_code);
        let err = engine.run().unwrap_err();
        assert_eq!(err.kind, HintErrorKind::NestedDefinition);
        assert_eq!(err.pc, 2);
    }

    #[test]
    fn unterminated_definition() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let font_code = [
            op::PUSHB000, 0,
            op::FDEF,
                op::NPUSHB, 1, op::ENDF,
        ];
        engine.set_font_code(&font_code);
        let err = engine.run().unwrap_err();
        assert_eq!(err.kind, HintErrorKind::UnterminatedBlock);
    }

    #[test]
    fn definition_outside_font_program() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        #[rustfmt::skip]
        let glyph_code = [
            op::PUSHB000, 0,
            op::FDEF,
            op::ENDF,
        ];
        engine.set_glyph_code(&glyph_code);
        let err = engine.run().unwrap_err();
        assert_eq!(err.kind, HintErrorKind::DefinitionOutsideFontProgram);
        assert_eq!(err.program, Program::Glyph);
    }

    #[test]
    fn undefined_function() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        let font_code = [op::PUSHB000, 9, op::CALL];
        engine.set_font_code(&font_code);
        let err = engine.run().unwrap_err();
        assert_eq!(err.kind, HintErrorKind::InvalidDefinition(9));
        assert_eq!(err.pc, 2);
    }

    #[test]
    fn endf_without_call() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        let glyph_code = [op::ENDF];
        engine.set_glyph_code(&glyph_code);
        let err = engine.run().unwrap_err();
        assert_eq!(err.kind, HintErrorKind::CallStackUnderflow);
    }
}
