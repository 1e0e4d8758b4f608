//! Read-only views of interpreter state.
//!
//! Snapshots are plain values built from an [`Engine`] between
//! instructions. They hold no references into the engine and building one
//! never changes interpreter state.

use super::{
    call_stack::CallRecord,
    code::disassemble,
    engine::Engine,
    fixed::F26Dot6,
    geometry::{Point, Vector},
    graphics::GraphicsState,
    program::Program,
    round::RoundState,
    zone::GlyphZone,
};

/// A single decoded instruction in a program listing.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingEntry {
    /// Offset of the instruction in its program.
    pub address: usize,
    /// Instruction name with the parameters encoded in its opcode, for
    /// example `MDRP[01101]`.
    pub mnemonic: String,
    /// Push immediates or decoded opcode flags.
    pub annotation: String,
}

/// Summary of an active function call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameSummary {
    /// Function number being executed.
    pub function: i32,
    /// Program that will resume when the call returns.
    pub caller_program: Program,
    /// Offset in the caller program where execution resumes.
    pub return_pc: usize,
    /// `LOOPCALL` iterations left after the current one.
    pub remaining: u32,
}

impl From<&CallRecord> for FrameSummary {
    fn from(record: &CallRecord) -> Self {
        Self {
            function: record.definition.key(),
            caller_program: record.caller_program,
            return_pc: record.return_pc,
            remaining: record.remaining(),
        }
    }
}

/// Summary of the graphics state.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphicsSummary {
    pub round_state: RoundState,
    pub proj_vector: Vector,
    pub freedom_vector: Vector,
    pub rp0: usize,
    pub rp1: usize,
    pub rp2: usize,
    pub loop_counter: u32,
    pub control_value_cutin: F26Dot6,
    pub min_distance: F26Dot6,
    /// Zone numbers set by `SZP0`, `SZP1` and `SZP2`.
    pub zone_pointers: [u8; 3],
    pub scan_control: i32,
    pub scan_type: i32,
    pub ppem: i32,
}

impl From<&GraphicsState> for GraphicsSummary {
    fn from(gs: &GraphicsState) -> Self {
        Self {
            round_state: gs.round_state,
            proj_vector: gs.proj_vector,
            freedom_vector: gs.freedom_vector,
            rp0: gs.rp0,
            rp1: gs.rp1,
            rp2: gs.rp2,
            loop_counter: gs.loop_counter,
            control_value_cutin: gs.control_value_cutin,
            min_distance: gs.min_distance,
            zone_pointers: [gs.zp0 as u8, gs.zp1 as u8, gs.zp2 as u8],
            scan_control: gs.scan_control,
            scan_type: gs.scan_type,
            ppem: gs.ppem,
        }
    }
}

/// The glyph being hinted.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphSummary {
    pub glyph_id: Option<u32>,
    /// Current positions, including the two phantom points.
    pub points: Vec<Point>,
    /// Index of the last point of each contour.
    pub contours: Vec<u16>,
}

impl GlyphSummary {
    fn new(glyph_id: Option<u32>, zone: &GlyphZone) -> Self {
        Self {
            glyph_id,
            points: zone.points().to_vec(),
            contours: zone.contours().to_vec(),
        }
    }
}

/// Interpreter state between two instructions.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionSnapshot {
    /// The active program. Differs from the program execution started with
    /// while a function defined in the font program is running.
    pub program: Program,
    /// Offset of the next instruction in the active program.
    pub pc: usize,
    /// Listing of the active program.
    pub listing: Vec<ListingEntry>,
    /// Value stack, top first.
    pub stack: Vec<i32>,
    /// Active calls, innermost first.
    pub call_stack: Vec<FrameSummary>,
    /// Written storage slots in ascending index order.
    pub storage: Vec<(u32, i32)>,
    pub graphics: GraphicsSummary,
    /// Present when a glyph program is being executed.
    pub glyph: Option<GlyphSummary>,
}

impl ExecutionSnapshot {
    /// Captures the current state of the engine.
    pub fn from_engine(engine: &Engine) -> Self {
        let glyph = (engine.initial_program() == Program::Glyph)
            .then(|| GlyphSummary::new(engine.glyph_id(), engine.zone()));
        Self {
            program: engine.program(),
            pc: engine.pc(),
            listing: disassemble(engine.bytecode()),
            stack: engine.value_stack().values().iter().rev().copied().collect(),
            call_stack: engine
                .call_stack()
                .records()
                .iter()
                .rev()
                .map(FrameSummary::from)
                .collect(),
            storage: engine.storage().iter().collect(),
            graphics: engine.graphics().into(),
            glyph,
        }
    }

    /// Returns the listing entry of the next instruction, if any.
    pub fn current_entry(&self) -> Option<&ListingEntry> {
        self.listing.iter().find(|entry| entry.address == self.pc)
    }
}
