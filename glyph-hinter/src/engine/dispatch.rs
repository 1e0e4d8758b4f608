//! Instruction decoding and dispatch.

use log::{debug, trace};

use super::{
    super::code::{opcodes as op, Instruction},
    Engine, HintError, HintErrorKind, Program,
};

/// Maximum number of instructions we will execute in a single program
/// unless configured otherwise. This is used to ensure termination of a
/// hinting program.
/// See <https://gitlab.freedesktop.org/freetype/freetype/-/blob/57617782464411201ce7bbc93b086c1b4d7d84a5/include/freetype/config/ftoption.h#L744>
pub const MAX_RUN_INSTRUCTIONS: usize = 1_000_000;

/// Counts executed instructions against a limit.
///
/// Instructions inside called functions count toward the same budget as
/// the program that called them.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct InstructionBudget {
    limit: usize,
    executed: usize,
}

impl InstructionBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, executed: 0 }
    }

    /// Returns the number of instructions executed so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn reset(&mut self) {
        self.executed = 0;
    }

    /// Accounts for one more instruction.
    fn consume(&mut self) -> Result<(), HintErrorKind> {
        if self.executed >= self.limit {
            return Err(HintErrorKind::ExceededExecutionBudget);
        }
        self.executed += 1;
        Ok(())
    }
}

impl Default for InstructionBudget {
    fn default() -> Self {
        Self::new(MAX_RUN_INSTRUCTIONS)
    }
}

impl<'a> Engine<'a> {
    /// Resets state for the specified program and executes all instructions.
    pub fn run_program(&mut self, program: Program) -> Result<(), HintError> {
        self.reset(program);
        self.run()
    }

    /// Set internal state for running the specified program.
    pub fn reset(&mut self, program: Program) {
        self.program.reset(program);
        // Reset overall graphics state, keeping the retained bits.
        self.graphics.reset();
        self.budget.reset();
        self.value_stack.clear();
        // Program specific setup.
        match program {
            Program::Font => self.functions.reset(),
            Program::ControlValue => self.graphics.reset_retained(),
            Program::Glyph => {}
        }
    }

    /// Decodes and dispatches all instructions until completion or error.
    pub fn run(&mut self) -> Result<(), HintError> {
        let program = self.program.current;
        debug!(
            "running {program:?} program ({} bytes)",
            self.program.current_bytecode().len()
        );
        while self.step()? {}
        debug!(
            "finished {program:?} program after {} instructions",
            self.budget.executed()
        );
        Ok(())
    }

    /// Decodes and dispatches the next instruction.
    ///
    /// Returns `false` without doing anything once the end of the program
    /// has been reached.
    pub fn step(&mut self) -> Result<bool, HintError> {
        let pc = self.program.decoder.pc;
        let Some(ins) = self.program.decoder.decode() else {
            return Ok(false);
        };
        let ins = ins.map_err(|kind| HintError {
            program: self.program.current,
            glyph_id: self.glyph_id,
            pc,
            opcode: self.program.decoder.bytecode.get(pc).copied(),
            kind,
        })?;
        trace!(
            "{:?}@{}: {} {}",
            self.program.current,
            ins.pc,
            ins.mnemonic(),
            ins.annotation()
        );
        self.dispatch(&ins)?;
        Ok(true)
    }

    /// Executes the appropriate code for the given instruction.
    pub fn dispatch(&mut self, ins: &Instruction) -> Result<(), HintError> {
        let current_program = self.program.current;
        let glyph_id = self.glyph_id;
        self.budget
            .consume()
            .and_then(|_| self.dispatch_inner(ins))
            .map_err(|kind| HintError {
                program: current_program,
                glyph_id,
                pc: ins.pc,
                opcode: Some(ins.opcode),
                kind,
            })
    }

    fn dispatch_inner(&mut self, ins: &Instruction) -> Result<(), HintErrorKind> {
        let opcode = ins.opcode;
        match opcode {
            op::SVTCA0..=op::SFVTCA1 => self.op_set_axis(opcode)?,
            op::SPVFS..=op::SFVTPV => self.op_vector(opcode)?,
            op::SRP0..=op::SRP2 => self.op_set_reference_point(opcode)?,
            op::SZP0..=op::SZPS => self.op_set_zone_pointer(opcode)?,
            op::RTG
            | op::RTHG
            | op::RTDG
            | op::RDTG
            | op::RUTG
            | op::ROFF
            | op::SROUND
            | op::S45ROUND => self.op_set_round_state(opcode)?,
            op::SLOOP | op::SMD | op::SCVTCI | op::SCANCTRL | op::SCANTYPE => {
                self.op_set_state_value(opcode)?
            }
            op::DUP..=op::MINDEX | op::ROLL => self.op_stack(opcode)?,
            op::NPUSHB | op::NPUSHW | op::PUSHB000..=op::PUSHW111 => self.op_push(ins)?,
            op::RS | op::RCVT => self.op_read(opcode)?,
            op::WS | op::WCVTP | op::WCVTF => self.op_write(opcode)?,
            op::LT..=op::NEQ => self.op_compare(opcode)?,
            op::ODD | op::EVEN => self.op_parity(opcode)?,
            op::AND | op::OR | op::NOT => self.op_logic(opcode)?,
            op::ELSE => self.op_else()?,
            op::JMPR => self.op_jmpr()?,
            op::JROT => self.op_jrot()?,
            op::JROF => self.op_jrof()?,
            op::IF => self.op_if()?,
            op::EIF => self.op_eif()?,
            op::LOOPCALL => self.op_loopcall()?,
            op::CALL => self.op_call()?,
            op::FDEF => self.op_fdef()?,
            op::ENDF => self.op_endf()?,
            op::MDAP0 | op::MDAP1 => self.op_mdap(opcode)?,
            op::IUP0 | op::IUP1 => self.op_iup(opcode)?,
            op::SHPIX => self.op_shpix()?,
            op::IP => self.op_ip()?,
            op::ALIGNRP => self.op_alignrp()?,
            op::MIAP0 | op::MIAP1 => self.op_miap(opcode)?,
            op::MDRP00000..=op::MDRP11111 => self.op_mdrp(opcode)?,
            op::MIRP00000..=op::MIRP11111 => self.op_mirp(opcode)?,
            op::GC0 | op::GC1 => self.op_gc(opcode)?,
            op::MD0 | op::MD1 => self.op_md(opcode)?,
            op::MPPEM => self.op_mppem()?,
            // Should be unused in production fonts. Just pops a value from
            // the stack.
            op::DEBUG => {
                self.value_stack.pop()?;
            }
            op::ADD => self.op_add()?,
            op::SUB => self.op_sub()?,
            op::DIV => self.op_div()?,
            op::MUL => self.op_mul()?,
            op::ABS => self.op_abs()?,
            op::NEG => self.op_neg()?,
            op::FLOOR => self.op_floor()?,
            op::CEILING => self.op_ceiling()?,
            op::MAX => self.op_max()?,
            op::MIN => self.op_min()?,
            op::ROUND00..=op::ROUND11 => self.op_round(opcode)?,
            op::NROUND00..=op::NROUND11 => self.op_nround(opcode)?,
            op::GETINFO => self.op_getinfo()?,
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        }
        Ok(())
    }
}
