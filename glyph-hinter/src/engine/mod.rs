//! TrueType interpreter engine.

mod arith;
mod control_flow;
mod data;
mod definition;
mod dispatch;
mod graphics;
mod logical;
mod misc;
mod outline;
mod round;
mod stack;
mod storage;

pub use dispatch::{InstructionBudget, MAX_RUN_INSTRUCTIONS};

use super::{
    call_stack::CallStack,
    cvt::Cvt,
    definition::FunctionMap,
    error::{HintError, HintErrorKind},
    fixed::F26Dot6,
    graphics::GraphicsState,
    program::{Program, ProgramState},
    storage::Storage,
    value_stack::ValueStack,
    zone::GlyphZone,
};

pub type OpResult = Result<(), HintErrorKind>;

/// TrueType bytecode interpreter.
///
/// Borrows the session scoped state (function table, CVT, storage) and
/// the glyph zone for the duration of a single program.
pub struct Engine<'a> {
    program: ProgramState<'a>,
    value_stack: ValueStack,
    graphics: GraphicsState,
    functions: FunctionMap<'a>,
    cvt: Cvt<'a>,
    storage: &'a mut Storage,
    zone: &'a mut GlyphZone,
    budget: InstructionBudget,
    glyph_id: Option<u32>,
}

impl<'a> Engine<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        program: ProgramState<'a>,
        value_stack: ValueStack,
        graphics: GraphicsState,
        functions: FunctionMap<'a>,
        cvt: Cvt<'a>,
        storage: &'a mut Storage,
        zone: &'a mut GlyphZone,
        budget: InstructionBudget,
    ) -> Self {
        Self {
            program,
            value_stack,
            graphics,
            functions,
            cvt,
            storage,
            zone,
            budget,
            glyph_id: None,
        }
    }

    /// Sets the glyph identifier reported in errors and snapshots.
    pub fn set_glyph_id(&mut self, glyph_id: Option<u32>) {
        self.glyph_id = glyph_id;
    }

    pub fn glyph_id(&self) -> Option<u32> {
        self.glyph_id
    }

    /// Returns the active program.
    pub fn program(&self) -> Program {
        self.program.current
    }

    /// Returns the program that execution started with.
    pub fn initial_program(&self) -> Program {
        self.program.initial
    }

    /// Returns the bytecode of the active program.
    pub fn bytecode(&self) -> &'a [u8] {
        self.program.current_bytecode()
    }

    /// Returns the offset of the next instruction in the active program.
    pub fn pc(&self) -> usize {
        self.program.decoder.pc
    }

    /// Returns true when no instructions remain in the active program.
    pub fn is_finished(&self) -> bool {
        self.program.decoder.pc >= self.program.decoder.bytecode.len()
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.program.call_stack
    }

    /// Returns the number of active function calls.
    pub fn call_depth(&self) -> usize {
        self.program.call_stack.len()
    }

    pub fn value_stack(&self) -> &ValueStack {
        &self.value_stack
    }

    pub fn graphics(&self) -> &GraphicsState {
        &self.graphics
    }

    pub fn storage(&self) -> &Storage {
        self.storage
    }

    pub fn zone(&self) -> &GlyphZone {
        self.zone
    }

    pub fn budget(&self) -> &InstructionBudget {
        &self.budget
    }

    /// Consumes the engine, returning the graphics state so that retained
    /// values can be carried into later programs.
    pub fn into_graphics(self) -> GraphicsState {
        self.graphics
    }

    /// Moves the point at the given index to `target` along the freedom
    /// vector and marks it as touched.
    fn move_point(&mut self, index: usize, target: F26Dot6) -> OpResult {
        let point = self.zone.point(index)?;
        *self.zone.point_mut(index)? = self.graphics.move_to(point, target);
        self.zone.touch(index, self.graphics.moved_axes())
    }

    /// Returns the current measurement of the point at the given index.
    fn measure_current(&self, index: usize) -> Result<F26Dot6, HintErrorKind> {
        Ok(self.graphics.measure(self.zone.point(index)?))
    }

    /// Returns the original measurement of the point at the given index.
    fn measure_original(&self, index: usize) -> Result<F26Dot6, HintErrorKind> {
        Ok(self.graphics.measure(self.zone.original(index)?))
    }

    /// Takes the loop counter, resetting it to 1.
    fn take_loop_counter(&mut self) -> u32 {
        core::mem::replace(&mut self.graphics.loop_counter, 1)
    }
}

#[cfg(test)]
use super::{definition::FunctionTable, geometry::Point};

/// Owns the state borrowed by an [`Engine`] in tests.
#[cfg(test)]
pub(crate) struct MockEngine {
    cvt: Vec<F26Dot6>,
    storage: Storage,
    functions: FunctionTable,
    zone: GlyphZone,
}

#[cfg(test)]
impl MockEngine {
    pub fn new() -> Self {
        Self {
            cvt: (0..32).map(|i| F26Dot6::from_bits(i * 64)).collect(),
            storage: Storage::default(),
            functions: FunctionTable::default(),
            zone: Self::square(),
        }
    }

    /// Replaces the glyph zone with the given points, all on curve and
    /// forming a single contour.
    pub fn set_points(&mut self, points: &[(i64, i64)]) {
        let outline = points.iter().map(|(x, y)| {
            (
                Point::new(F26Dot6::from_bits(*x), F26Dot6::from_bits(*y)),
                true,
            )
        });
        let contours = vec![points.len().saturating_sub(1) as u16];
        self.zone = GlyphZone::new(outline, contours, Default::default(), F26Dot6::ZERO);
    }

    pub fn engine(&mut self) -> Engine<'_> {
        Engine::new(
            ProgramState::new(&[], &[], &[], Program::Font),
            ValueStack::default(),
            GraphicsState::default(),
            FunctionMap::Mut(&mut self.functions),
            Cvt::from(self.cvt.as_mut_slice()),
            &mut self.storage,
            &mut self.zone,
            InstructionBudget::default(),
        )
    }

    /// A one pixel square whose corners are offset from the grid.
    fn square() -> GlyphZone {
        let points = [(10, 10), (10, 74), (74, 74), (74, 10)];
        let outline = points
            .into_iter()
            .map(|(x, y)| (Point::new(F26Dot6::from_bits(x), F26Dot6::from_bits(y)), true));
        GlyphZone::new(outline, vec![3], Default::default(), F26Dot6::from_bits(84))
    }
}

#[cfg(test)]
impl<'a> Engine<'a> {
    pub(crate) fn set_font_code(&mut self, code: &'a [u8]) {
        self.set_code(Program::Font, code);
    }

    pub(crate) fn set_glyph_code(&mut self, code: &'a [u8]) {
        self.set_code(Program::Glyph, code);
    }

    fn set_code(&mut self, program: Program, code: &'a [u8]) {
        self.program.set_code(program, code);
    }

    /// Helper to push values to the stack, invoke a callback and check
    /// the expected result.
    pub(crate) fn test_exec(
        &mut self,
        push: &[i32],
        expected: impl Into<i32>,
        mut f: impl FnMut(&mut Engine) -> OpResult,
    ) {
        for value in push {
            self.value_stack.push(*value).unwrap();
        }
        f(self).unwrap();
        assert_eq!(self.value_stack.pop().ok(), Some(expected.into()));
    }
}
