//! Hinting error definitions.

use read_fonts::ReadError;

use super::{code::name, program::Program};

/// Errors that may occur when interpreting TrueType bytecode.
#[derive(Clone, PartialEq, Debug)]
pub enum HintErrorKind {
    UnexpectedEndOfBytecode,
    UnknownOpcode(u8),
    UnterminatedBlock,
    DefinitionOutsideFontProgram,
    NestedDefinition,
    InvalidDefinition(i32),
    ValueStackOverflow,
    ValueStackUnderflow,
    CallStackUnderflow,
    InvalidPointIndex(usize),
    InvalidCvtIndex(usize),
    InvalidStorageIndex(i32),
    DivideByZero,
    InvalidZoneIndex(i32),
    NegativeLoopCounter,
    InvalidJump,
    ExceededExecutionBudget,
}

impl core::fmt::Display for HintErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEndOfBytecode => write!(f, "unexpected end of bytecode"),
            Self::UnknownOpcode(opcode) => write!(f, "unknown instruction opcode 0x{opcode:02X}"),
            Self::UnterminatedBlock => {
                write!(f, "reached the end of the program before the end of a block")
            }
            Self::DefinitionOutsideFontProgram => {
                write!(f, "function definition outside of the font program")
            }
            Self::NestedDefinition => write!(f, "nested function definition"),
            Self::InvalidDefinition(key) => write!(f, "function definition {key} not found"),
            Self::ValueStackOverflow => write!(f, "value stack overflow"),
            Self::ValueStackUnderflow => write!(f, "value stack underflow"),
            Self::CallStackUnderflow => write!(f, "call stack underflow"),
            Self::InvalidPointIndex(index) => write!(f, "point index {index} was out of bounds"),
            Self::InvalidCvtIndex(index) => write!(f, "cvt index {index} was out of bounds"),
            Self::InvalidStorageIndex(index) => {
                write!(f, "storage area index {index} was out of bounds")
            }
            Self::DivideByZero => write!(f, "attempt to divide by 0"),
            Self::InvalidZoneIndex(index) => write!(
                f,
                "zone index {index} was invalid (only 0 or 1 are permitted)"
            ),
            Self::NegativeLoopCounter => {
                write!(f, "attempt to set the loop counter to a negative value")
            }
            Self::InvalidJump => write!(f, "the target of a jump instruction was invalid"),
            Self::ExceededExecutionBudget => write!(f, "too many instructions executed"),
        }
    }
}

impl std::error::Error for HintErrorKind {}

/// Hinting error with additional context.
#[derive(Clone, PartialEq, Debug)]
pub struct HintError {
    pub program: Program,
    pub glyph_id: Option<u32>,
    pub pc: usize,
    pub opcode: Option<u8>,
    pub kind: HintErrorKind,
}

impl core::fmt::Display for HintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program.table_tag())?;
        if let Some(glyph_id) = self.glyph_id {
            write!(f, "[{glyph_id}]")?;
        }
        let (opcode, colon) = match self.opcode {
            Some(opcode) => (name(opcode), ":"),
            _ => ("", ""),
        };
        write!(f, "@{}:{opcode}{colon} {}", self.pc, self.kind)
    }
}

impl std::error::Error for HintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Errors that may occur while preparing a session or hinting a glyph.
#[derive(Clone, Debug)]
pub enum Error {
    /// Font data could not be read.
    Read(ReadError),
    /// The requested glyph is outside the range of the font.
    GlyphNotFound(u32),
    /// The glyph is a composite which this interpreter does not assemble.
    /// The glyph program is not run.
    UnsupportedGlyph(u32),
    /// Bytecode execution failed.
    Hint(HintError),
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

impl From<HintError> for Error {
    fn from(e: HintError) -> Self {
        Self::Hint(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "{e}"),
            Self::GlyphNotFound(gid) => write!(f, "glyph {gid} not found"),
            Self::UnsupportedGlyph(gid) => {
                write!(f, "glyph {gid} is a composite and cannot be hinted")
            }
            Self::Hint(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hint(e) => Some(e),
            _ => None,
        }
    }
}
