//! Instruction decoding.
//!
//! The decoder and every forward scan over bytecode (`IF`, `ELSE`, `FDEF`)
//! share [`instruction_len`] so inline push data is never mistaken for
//! code.

use super::{error::HintErrorKind, round::DistanceType, snapshot::ListingEntry};

/// Type alias for a TrueType opcode.
pub type Opcode = u8;

/// Returns the size in bytes of the instruction at `pc`, including its
/// inline operands.
pub fn instruction_len(bytecode: &[u8], pc: usize) -> Result<usize, HintErrorKind> {
    let opcode = *bytecode
        .get(pc)
        .ok_or(HintErrorKind::UnexpectedEndOfBytecode)?;
    let len = match opcode {
        opcodes::NPUSHB | opcodes::NPUSHW => {
            let count = *bytecode
                .get(pc + 1)
                .ok_or(HintErrorKind::UnexpectedEndOfBytecode)? as usize;
            let size = if opcode == opcodes::NPUSHW { 2 } else { 1 };
            2 + count * size
        }
        opcodes::PUSHB000..=opcodes::PUSHB111 => 2 + (opcode - opcodes::PUSHB000) as usize,
        opcodes::PUSHW000..=opcodes::PUSHW111 => 3 + 2 * (opcode - opcodes::PUSHW000) as usize,
        _ => 1,
    };
    if pc + len > bytecode.len() {
        return Err(HintErrorKind::UnexpectedEndOfBytecode);
    }
    Ok(len)
}

/// Decoded TrueType instruction.
#[derive(Copy, Clone, Debug)]
pub struct Instruction<'a> {
    /// Raw opcode value.
    pub opcode: Opcode,
    /// Values pushed by the push family of instructions.
    pub inline_operands: InlineOperands<'a>,
    /// Program counter -- offset into the bytecode where this
    /// instruction was decoded.
    pub pc: usize,
}

impl Instruction<'_> {
    /// Returns the name of the instruction.
    pub fn name(&self) -> &'static str {
        name(self.opcode)
    }

    /// Returns the name of the instruction followed by the parameters
    /// encoded in the opcode, for example `MDRP[01101]` or `PUSHB[3]`.
    pub fn mnemonic(&self) -> String {
        let opcode = self.opcode;
        let name = self.name();
        match opcode {
            opcodes::PUSHB000..=opcodes::PUSHW111 => {
                format!("{name}[{}]", self.inline_operands.len())
            }
            opcodes::MDRP00000..=opcodes::MIRP11111 => format!("{name}[{:05b}]", opcode & 0x1F),
            opcodes::ROUND00..=opcodes::NROUND11 => format!("{name}[{:02b}]", opcode & 3),
            opcodes::SVTCA0..=opcodes::SFVTCA1
            | opcodes::MDAP0
            | opcodes::MDAP1
            | opcodes::IUP0
            | opcodes::IUP1
            | opcodes::MIAP0
            | opcodes::MIAP1
            | opcodes::GC0
            | opcodes::GC1 => format!("{name}[{}]", opcode & 1),
            // MD[0] is 0x49
            opcodes::MD0 | opcodes::MD1 => format!("{name}[{}]", (opcode == opcodes::MD1) as u8),
            _ => format!("{name}[]"),
        }
    }

    /// Returns a short human readable description of the inline operands
    /// or the parameters encoded in the opcode.
    pub fn annotation(&self) -> String {
        let opcode = self.opcode;
        let axis = |bit: u8| if bit != 0 { "x axis" } else { "y axis" };
        match opcode {
            opcodes::NPUSHB | opcodes::NPUSHW | opcodes::PUSHB000..=opcodes::PUSHW111 => self
                .inline_operands
                .values()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            opcodes::SVTCA0..=opcodes::SFVTCA1 => axis(opcode & 1).into(),
            opcodes::IUP0 | opcodes::IUP1 => axis(opcode & 1).into(),
            opcodes::GC0 | opcodes::GC1 | opcodes::MD0 | opcodes::MD1 => {
                let use_original = if matches!(opcode, opcodes::GC0 | opcodes::GC1) {
                    opcode & 1 != 0
                } else {
                    opcode & 1 == 0
                };
                if use_original { "original" } else { "current" }.into()
            }
            opcodes::MDAP1 | opcodes::MIAP1 => "rnd".into(),
            opcodes::ROUND00..=opcodes::NROUND11 => DistanceType::from_opcode(opcode).name().into(),
            opcodes::MDRP00000..=opcodes::MIRP11111 => {
                let mut parts = Vec::with_capacity(4);
                if opcode & 0x10 != 0 {
                    parts.push("rp0");
                }
                if opcode & 0x08 != 0 {
                    parts.push("min");
                }
                if opcode & 0x04 != 0 {
                    parts.push("rnd");
                }
                parts.push(DistanceType::from_opcode(opcode).name());
                parts.join(", ")
            }
            _ => String::new(),
        }
    }
}

/// Sequence of inline operands for a push instruction.
#[derive(Copy, Clone, Default, Debug)]
pub struct InlineOperands<'a> {
    raw: &'a [u8],
    is_words: bool,
}

impl<'a> InlineOperands<'a> {
    /// Returns the number of operands in the list.
    pub fn len(&self) -> usize {
        if self.is_words {
            self.raw.len() / 2
        } else {
            self.raw.len()
        }
    }

    /// Returns true if the operand list is empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns an iterator over the operand values.
    ///
    /// Bytes are unsigned and words are sign extended.
    pub fn values(&self) -> impl Iterator<Item = i32> + 'a + Clone {
        let (bytes, words) = if self.is_words {
            (&[][..], self.raw)
        } else {
            (self.raw, &[][..])
        };
        bytes.iter().map(|byte| *byte as u32 as i32).chain(
            words
                .chunks_exact(2)
                .map(|chunk| i16::from_be_bytes([chunk[0], chunk[1]]) as i32),
        )
    }
}

/// Decoder for TrueType bytecode.
#[derive(Copy, Clone, Debug)]
pub struct Decoder<'a> {
    /// The bytecode for the program.
    pub bytecode: &'a [u8],
    /// The "program counter" or current offset into the bytecode.
    pub pc: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given bytecode and program counter.
    pub fn new(bytecode: &'a [u8], pc: usize) -> Self {
        Self { bytecode, pc }
    }

    /// Decodes the next instruction.
    ///
    /// Returns `None` at the end of the bytecode stream. After an error,
    /// the decoder is positioned at the end of the stream.
    pub fn decode(&mut self) -> Option<Result<Instruction<'a>, HintErrorKind>> {
        let opcode = *self.bytecode.get(self.pc)?;
        let pc = self.pc;
        let len = match instruction_len(self.bytecode, pc) {
            Ok(len) => len,
            Err(e) => {
                self.pc = self.bytecode.len();
                return Some(Err(e));
            }
        };
        let operand_start = match opcode {
            opcodes::NPUSHB | opcodes::NPUSHW => pc + 2,
            _ => pc + 1,
        };
        let inline_operands = InlineOperands {
            raw: self.bytecode.get(operand_start..pc + len).unwrap_or_default(),
            is_words: opcode == opcodes::NPUSHW
                || (opcodes::PUSHW000..=opcodes::PUSHW111).contains(&opcode),
        };
        self.pc += len;
        Some(Ok(Instruction {
            opcode,
            inline_operands,
            pc,
        }))
    }
}

/// Decodes an entire program into a listing.
///
/// Uses the same decoder as execution. A truncated instruction at the end
/// of the program is listed as a single entry annotated with the decoding
/// error.
pub fn disassemble(bytecode: &[u8]) -> Vec<ListingEntry> {
    let mut decoder = Decoder::new(bytecode, 0);
    let mut listing = vec![];
    loop {
        let pc = decoder.pc;
        match decoder.decode() {
            Some(Ok(ins)) => listing.push(ListingEntry {
                address: ins.pc,
                mnemonic: ins.mnemonic(),
                annotation: ins.annotation(),
            }),
            Some(Err(e)) => {
                listing.push(ListingEntry {
                    address: pc,
                    mnemonic: format!("{}[]", name(bytecode[pc])),
                    annotation: e.to_string(),
                });
                break;
            }
            None => break,
        }
    }
    listing
}

/// Returns the name of the instruction with the given opcode.
///
/// Opcodes with parameters in their low bits share a name.
pub fn name(opcode: Opcode) -> &'static str {
    use opcodes::*;
    match opcode {
        SVTCA0 | SVTCA1 => "SVTCA",
        SPVTCA0 | SPVTCA1 => "SPVTCA",
        SFVTCA0 | SFVTCA1 => "SFVTCA",
        SPVFS => "SPVFS",
        SFVFS => "SFVFS",
        GPV => "GPV",
        GFV => "GFV",
        SFVTPV => "SFVTPV",
        SRP0 => "SRP0",
        SRP1 => "SRP1",
        SRP2 => "SRP2",
        SZP0 => "SZP0",
        SZP1 => "SZP1",
        SZP2 => "SZP2",
        SZPS => "SZPS",
        SLOOP => "SLOOP",
        RTG => "RTG",
        RTHG => "RTHG",
        SMD => "SMD",
        ELSE => "ELSE",
        JMPR => "JMPR",
        SCVTCI => "SCVTCI",
        DUP => "DUP",
        POP => "POP",
        CLEAR => "CLEAR",
        SWAP => "SWAP",
        DEPTH => "DEPTH",
        CINDEX => "CINDEX",
        MINDEX => "MINDEX",
        LOOPCALL => "LOOPCALL",
        CALL => "CALL",
        FDEF => "FDEF",
        ENDF => "ENDF",
        MDAP0 | MDAP1 => "MDAP",
        IUP0 | IUP1 => "IUP",
        SHPIX => "SHPIX",
        IP => "IP",
        ALIGNRP => "ALIGNRP",
        RTDG => "RTDG",
        MIAP0 | MIAP1 => "MIAP",
        NPUSHB => "NPUSHB",
        NPUSHW => "NPUSHW",
        WS => "WS",
        RS => "RS",
        WCVTP => "WCVTP",
        RCVT => "RCVT",
        GC0 | GC1 => "GC",
        MD0 | MD1 => "MD",
        MPPEM => "MPPEM",
        DEBUG => "DEBUG",
        LT => "LT",
        LTEQ => "LTEQ",
        GT => "GT",
        GTEQ => "GTEQ",
        EQ => "EQ",
        NEQ => "NEQ",
        ODD => "ODD",
        EVEN => "EVEN",
        IF => "IF",
        EIF => "EIF",
        AND => "AND",
        OR => "OR",
        NOT => "NOT",
        ADD => "ADD",
        SUB => "SUB",
        DIV => "DIV",
        MUL => "MUL",
        ABS => "ABS",
        NEG => "NEG",
        FLOOR => "FLOOR",
        CEILING => "CEILING",
        ROUND00..=ROUND11 => "ROUND",
        NROUND00..=NROUND11 => "NROUND",
        WCVTF => "WCVTF",
        SROUND => "SROUND",
        S45ROUND => "S45ROUND",
        JROT => "JROT",
        JROF => "JROF",
        ROFF => "ROFF",
        RUTG => "RUTG",
        RDTG => "RDTG",
        SCANCTRL => "SCANCTRL",
        GETINFO => "GETINFO",
        ROLL => "ROLL",
        MAX => "MAX",
        MIN => "MIN",
        SCANTYPE => "SCANTYPE",
        PUSHB000..=PUSHB111 => "PUSHB",
        PUSHW000..=PUSHW111 => "PUSHW",
        MDRP00000..=MDRP11111 => "MDRP",
        MIRP00000..=MIRP11111 => "MIRP",
        _ => "UNKNOWN",
    }
}

/// Raw TrueType instruction opcodes.
pub mod opcodes {
    pub const SVTCA0: u8 = 0x00;
    pub const SVTCA1: u8 = 0x01;
    pub const SPVTCA0: u8 = 0x02;
    pub const SPVTCA1: u8 = 0x03;
    pub const SFVTCA0: u8 = 0x04;
    pub const SFVTCA1: u8 = 0x05;
    pub const SPVFS: u8 = 0x0A;
    pub const SFVFS: u8 = 0x0B;
    pub const GPV: u8 = 0x0C;
    pub const GFV: u8 = 0x0D;
    pub const SFVTPV: u8 = 0x0E;
    pub const SRP0: u8 = 0x10;
    pub const SRP1: u8 = 0x11;
    pub const SRP2: u8 = 0x12;
    pub const SZP0: u8 = 0x13;
    pub const SZP1: u8 = 0x14;
    pub const SZP2: u8 = 0x15;
    pub const SZPS: u8 = 0x16;
    pub const SLOOP: u8 = 0x17;
    pub const RTG: u8 = 0x18;
    pub const RTHG: u8 = 0x19;
    pub const SMD: u8 = 0x1A;
    pub const ELSE: u8 = 0x1B;
    pub const JMPR: u8 = 0x1C;
    pub const SCVTCI: u8 = 0x1D;
    pub const DUP: u8 = 0x20;
    pub const POP: u8 = 0x21;
    pub const CLEAR: u8 = 0x22;
    pub const SWAP: u8 = 0x23;
    pub const DEPTH: u8 = 0x24;
    pub const CINDEX: u8 = 0x25;
    pub const MINDEX: u8 = 0x26;
    pub const LOOPCALL: u8 = 0x2A;
    pub const CALL: u8 = 0x2B;
    pub const FDEF: u8 = 0x2C;
    pub const ENDF: u8 = 0x2D;
    pub const MDAP0: u8 = 0x2E;
    pub const MDAP1: u8 = 0x2F;
    pub const IUP0: u8 = 0x30;
    pub const IUP1: u8 = 0x31;
    pub const SHPIX: u8 = 0x38;
    pub const IP: u8 = 0x39;
    pub const ALIGNRP: u8 = 0x3C;
    pub const RTDG: u8 = 0x3D;
    pub const MIAP0: u8 = 0x3E;
    pub const MIAP1: u8 = 0x3F;
    pub const NPUSHB: u8 = 0x40;
    pub const NPUSHW: u8 = 0x41;
    pub const WS: u8 = 0x42;
    pub const RS: u8 = 0x43;
    pub const WCVTP: u8 = 0x44;
    pub const RCVT: u8 = 0x45;
    pub const GC0: u8 = 0x46;
    pub const GC1: u8 = 0x47;
    pub const MD0: u8 = 0x49;
    pub const MD1: u8 = 0x4A;
    pub const MPPEM: u8 = 0x4B;
    pub const DEBUG: u8 = 0x4F;
    pub const LT: u8 = 0x50;
    pub const LTEQ: u8 = 0x51;
    pub const GT: u8 = 0x52;
    pub const GTEQ: u8 = 0x53;
    pub const EQ: u8 = 0x54;
    pub const NEQ: u8 = 0x55;
    pub const ODD: u8 = 0x56;
    pub const EVEN: u8 = 0x57;
    pub const IF: u8 = 0x58;
    pub const EIF: u8 = 0x59;
    pub const AND: u8 = 0x5A;
    pub const OR: u8 = 0x5B;
    pub const NOT: u8 = 0x5C;
    pub const ADD: u8 = 0x60;
    pub const SUB: u8 = 0x61;
    pub const DIV: u8 = 0x62;
    pub const MUL: u8 = 0x63;
    pub const ABS: u8 = 0x64;
    pub const NEG: u8 = 0x65;
    pub const FLOOR: u8 = 0x66;
    pub const CEILING: u8 = 0x67;
    pub const ROUND00: u8 = 0x68;
    pub const ROUND01: u8 = 0x69;
    pub const ROUND10: u8 = 0x6A;
    pub const ROUND11: u8 = 0x6B;
    pub const NROUND00: u8 = 0x6C;
    pub const NROUND01: u8 = 0x6D;
    pub const NROUND10: u8 = 0x6E;
    pub const NROUND11: u8 = 0x6F;
    pub const WCVTF: u8 = 0x70;
    pub const SROUND: u8 = 0x76;
    pub const S45ROUND: u8 = 0x77;
    pub const JROT: u8 = 0x78;
    pub const JROF: u8 = 0x79;
    pub const ROFF: u8 = 0x7A;
    pub const RUTG: u8 = 0x7C;
    pub const RDTG: u8 = 0x7D;
    pub const SCANCTRL: u8 = 0x85;
    pub const GETINFO: u8 = 0x88;
    pub const ROLL: u8 = 0x8A;
    pub const MAX: u8 = 0x8B;
    pub const MIN: u8 = 0x8C;
    pub const SCANTYPE: u8 = 0x8D;
    pub const PUSHB000: u8 = 0xB0;
    pub const PUSHB111: u8 = 0xB7;
    pub const PUSHW000: u8 = 0xB8;
    pub const PUSHW111: u8 = 0xBF;
    pub const MDRP00000: u8 = 0xC0;
    pub const MDRP11111: u8 = 0xDF;
    pub const MIRP00000: u8 = 0xE0;
    pub const MIRP11111: u8 = 0xFF;
}
