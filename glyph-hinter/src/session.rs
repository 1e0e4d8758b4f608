//! Hinting sessions for a font at a particular size.

use log::{debug, warn};
use read_fonts::types::BoundingBox;

use super::{
    cvt::Cvt,
    debugger::Debugger,
    definition::{FunctionMap, FunctionTable},
    engine::{Engine, InstructionBudget, MAX_RUN_INSTRUCTIONS},
    error::{Error, HintError},
    fixed::F26Dot6,
    font::{FontReader, Outline},
    geometry::Point,
    graphics::{GraphicsState, RetainedGraphicsState},
    program::{Program, ProgramState},
    storage::Storage,
    value_stack::ValueStack,
    zone::GlyphZone,
};

/// Configuration settings for a hinting session.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintingOptions {
    /// Size in points.
    ///
    /// Defaults to 12.
    pub point_size: f32,
    /// Target resolution in dots per inch.
    ///
    /// Defaults to 72.
    pub resolution: u16,
    /// Maximum number of instructions executed by a single program,
    /// including those in called functions.
    ///
    /// Defaults to 1,000,000.
    pub max_instructions: usize,
    /// Maximum depth of the value stack. Unbounded when `None`, which is
    /// the default.
    pub max_stack_depth: Option<usize>,
}

impl HintingOptions {
    /// Returns the nominal pixels per em.
    pub fn ppem(&self) -> i32 {
        (self.point_size as f64 * self.resolution as f64 / 72.0).round() as i32
    }
}

impl Default for HintingOptions {
    fn default() -> Self {
        Self {
            point_size: 12.0,
            resolution: 72,
            max_instructions: MAX_RUN_INSTRUCTIONS,
            max_stack_depth: None,
        }
    }
}

/// An outline scaled to the size of a session along with its glyph
/// program.
#[derive(Clone, Debug)]
pub struct Glyph {
    id: u32,
    zone: GlyphZone,
    program: Vec<u8>,
}

impl Glyph {
    /// Scales the outline into a new glyph zone.
    pub fn new(id: u32, outline: &Outline, scale: f64) -> Self {
        let scale_units = |value: i32| F26Dot6::from_f64(value as f64 * scale);
        let points = outline
            .points
            .iter()
            .zip(&outline.on_curve)
            .map(|(point, on_curve)| {
                (
                    Point::new(scale_units(point.x), scale_units(point.y)),
                    *on_curve,
                )
            });
        let bounds = BoundingBox {
            x_min: scale_units(outline.bounds.x_min),
            y_min: scale_units(outline.bounds.y_min),
            x_max: scale_units(outline.bounds.x_max),
            y_max: scale_units(outline.bounds.y_max),
        };
        let advance = scale_units(outline.advance_width as i32);
        Self {
            id,
            zone: GlyphZone::new(points, outline.contours.clone(), bounds, advance),
            program: outline.program.clone(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the zone holding the current and original points.
    pub fn zone(&self) -> &GlyphZone {
        &self.zone
    }

    pub fn program(&self) -> &[u8] {
        &self.program
    }
}

/// State shared by all programs of a font at one size.
///
/// Creating a session runs the font program and the control value
/// program. The function table, control value table, storage area and
/// retained graphics state that result are then used for every glyph
/// hinted with the session. Sessions never share state with each other.
#[derive(Clone, Debug)]
pub struct Session {
    options: HintingOptions,
    scale: f64,
    ppem: i32,
    font_program: Vec<u8>,
    control_value_program: Vec<u8>,
    functions: FunctionTable,
    cvt: Vec<F26Dot6>,
    storage: Storage,
    graphics: RetainedGraphicsState,
    /// Control values and storage as left by the font program. The
    /// control value program always starts from these.
    font_cvt: Vec<F26Dot6>,
    font_storage: Storage,
    /// Zone used while no glyph is loaded.
    empty_zone: GlyphZone,
}

impl Session {
    /// Scales the control value table and runs the font and control value
    /// programs.
    pub fn new(font: &impl FontReader, options: HintingOptions) -> Result<Self, Error> {
        let scale = font.scale(options.point_size, options.resolution);
        let ppem = options.ppem();
        let cvt: Vec<_> = font
            .cvt()
            .into_iter()
            .map(|value| F26Dot6::from_f64(value as f64 * scale))
            .collect();
        let mut session = Self {
            options,
            scale,
            ppem,
            font_program: font.font_program().to_vec(),
            control_value_program: font.control_value_program().to_vec(),
            functions: FunctionTable::default(),
            font_cvt: cvt.clone(),
            cvt,
            storage: Storage::default(),
            graphics: RetainedGraphicsState::new(scale, ppem),
            font_storage: Storage::default(),
            empty_zone: GlyphZone::default(),
        };
        session.prepare()?;
        Ok(session)
    }

    fn prepare(&mut self) -> Result<(), HintError> {
        debug!(
            "preparing session at {} ppem with scale {}",
            self.ppem, self.scale
        );
        let result = self.engine(Program::Font, None).run_program(Program::Font);
        if let Err(e) = result {
            warn!("failed to prepare hinting session: {e}");
            return Err(e);
        }
        self.font_cvt.clone_from(&self.cvt);
        self.font_storage.clone_from(&self.storage);
        self.run_control_value_program()
    }

    fn run_control_value_program(&mut self) -> Result<(), HintError> {
        let (mut engine, graphics) = self.engine_with_graphics(Program::ControlValue, None);
        let result = engine.run_program(Program::ControlValue);
        // Save the retained state from the CV program
        let retained = engine.into_graphics().retained;
        if let Err(e) = result {
            warn!("failed to prepare hinting session: {e}");
            return Err(e);
        }
        *graphics = retained;
        Ok(())
    }

    pub fn options(&self) -> &HintingOptions {
        &self.options
    }

    /// Returns the factor converting font units to pixels.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ppem(&self) -> i32 {
        self.ppem
    }

    /// Returns the scaled control value table, including any changes made
    /// by programs.
    pub fn cvt(&self) -> &[F26Dot6] {
        &self.cvt
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Returns the graphics state left by the control value program.
    pub fn graphics(&self) -> &RetainedGraphicsState {
        &self.graphics
    }

    /// Loads the outline of a glyph and scales it to the session size.
    ///
    /// Returns `Ok(None)` for empty glyphs.
    pub fn load_glyph(
        &self,
        font: &impl FontReader,
        glyph_id: u32,
    ) -> Result<Option<Glyph>, Error> {
        Ok(font
            .outline(glyph_id)?
            .map(|outline| Glyph::new(glyph_id, &outline, self.scale)))
    }

    /// Runs the glyph program, moving the points of the glyph zone.
    pub fn hint(&mut self, glyph: &mut Glyph) -> Result<(), Error> {
        let glyph_id = glyph.id;
        let mut engine = self.engine(Program::Glyph, Some(glyph));
        engine.run_program(Program::Glyph).map_err(|e| {
            warn!("failed to hint glyph {glyph_id}: {e}");
            e.into()
        })
    }

    /// Loads, scales and hints a glyph.
    ///
    /// Glyphs that cannot be loaded are skipped without running any
    /// bytecode and the error is returned.
    pub fn hint_glyph(
        &mut self,
        font: &impl FontReader,
        glyph_id: u32,
    ) -> Result<Option<Glyph>, Error> {
        let mut glyph = match self.load_glyph(font, glyph_id) {
            Ok(Some(glyph)) => glyph,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("skipping glyph {glyph_id}: {e}");
                return Err(e);
            }
        };
        self.hint(&mut glyph)?;
        Ok(Some(glyph))
    }

    /// Returns a debugger positioned at the start of the glyph program.
    pub fn debug<'a>(&'a mut self, glyph: &'a mut Glyph) -> Debugger<'a> {
        let mut engine = self.engine(Program::Glyph, Some(glyph));
        engine.reset(Program::Glyph);
        Debugger::new(engine)
    }

    /// Returns a debugger positioned at the start of the font or control
    /// value program.
    ///
    /// The font program executes against the state of this session and
    /// redefines every function.
    ///
    /// The control value program starts from the control values and
    /// storage left by the font program, exactly as when the session was
    /// created. Running it to completion replaces the retained graphics
    /// state, so glyphs hinted afterwards match a freshly created session.
    /// A run abandoned part way leaves the control values and storage as
    /// the executed instructions left them.
    ///
    /// Passing [`Program::Glyph`] produces an empty program with no glyph.
    pub fn debug_program(&mut self, program: Program) -> Debugger<'_> {
        if program == Program::ControlValue {
            self.cvt.clone_from(&self.font_cvt);
            self.storage.clone_from(&self.font_storage);
            let (mut engine, graphics) = self.engine_with_graphics(program, None);
            engine.reset(program);
            return Debugger::new(engine).retain_graphics_into(graphics);
        }
        let mut engine = self.engine(program, None);
        engine.reset(program);
        Debugger::new(engine)
    }

    fn engine<'a>(&'a mut self, program: Program, glyph: Option<&'a mut Glyph>) -> Engine<'a> {
        self.engine_with_graphics(program, glyph).0
    }

    /// Builds an engine along with the retained graphics state it was
    /// seeded from.
    fn engine_with_graphics<'a>(
        &'a mut self,
        program: Program,
        glyph: Option<&'a mut Glyph>,
    ) -> (Engine<'a>, &'a mut RetainedGraphicsState) {
        let Self {
            options,
            font_program,
            control_value_program,
            functions,
            cvt,
            storage,
            graphics,
            empty_zone,
            ..
        } = self;
        let (glyph_id, glyph_code, zone) = match glyph {
            Some(glyph) => (Some(glyph.id), glyph.program.as_slice(), &mut glyph.zone),
            None => (None, &[][..], empty_zone),
        };
        // Functions may only be defined by the font program
        let functions = match program {
            Program::Font => FunctionMap::Mut(functions),
            _ => FunctionMap::Ref(functions),
        };
        let mut engine = Engine::new(
            ProgramState::new(font_program, control_value_program, glyph_code, program),
            ValueStack::new(options.max_stack_depth),
            GraphicsState::new(*graphics),
            functions,
            Cvt::from(cvt.as_mut_slice()),
            storage,
            zone,
            InstructionBudget::new(options.max_instructions),
        );
        engine.set_glyph_id(glyph_id);
        (engine, graphics)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        super::{
            code::opcodes as op,
            debugger::StepStatus,
            error::HintErrorKind,
            font::{
                test_font::{self, TestGlyph},
                TrueTypeFont,
            },
            snapshot::ExecutionSnapshot,
        },
        *,
    };
    use pretty_assertions::assert_eq;
    use read_fonts::FontRef;

    /// Font with a single two point glyph and the given control value
    /// program.
    fn font_with_prep(prep: &[u8]) -> Vec<u8> {
        let glyph = TestGlyph::Simple {
            points: vec![(0, 0), (100, 100)],
            program: vec![],
        };
        test_font::build(1000, &[(glyph, 200)], &[], &[], prep)
    }

    fn x_coords(points: &[Point]) -> Vec<i64> {
        points.iter().map(|point| point.x.to_bits()).collect()
    }

    #[test]
    fn default_options() {
        let options = HintingOptions::default();
        assert_eq!(options.ppem(), 12);
        assert_eq!(options.max_instructions, 1_000_000);
        assert_eq!(options.max_stack_depth, None);
        let options = HintingOptions {
            point_size: 10.5,
            resolution: 96,
            ..Default::default()
        };
        assert_eq!(options.ppem(), 14);
    }

    #[test]
    fn hint_triangle() {
        let _ = env_logger::builder().is_test(true).try_init();
        let data = test_font::triangle_font();
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut session = Session::new(&reader, HintingOptions::default()).unwrap();
        assert_eq!(session.scale(), 0.012);
        assert_eq!(session.ppem(), 12);
        assert_eq!(
            session.cvt(),
            [0, 94, -38].map(F26Dot6::from_bits).as_slice()
        );
        assert_eq!(session.functions().len(), 1);
        // The control value program stores the ppem
        assert_eq!(session.storage().iter().collect::<Vec<_>>(), [(0, 12)]);
        let glyph = session.hint_glyph(&reader, 1).unwrap().unwrap();
        let zone = glyph.zone();
        // 123 units is 94/64 pixels which rounds to a whole pixel
        assert_eq!(x_coords(zone.original_points()), [94, 384, 691, 0, 768]);
        assert_eq!(x_coords(zone.points()), [64, 384, 691, 0, 768]);
        assert_eq!(zone.points()[1].y, F26Dot6::from_bits(538));
        assert_eq!(zone.contours(), [2]);
        assert_eq!(zone.bounds().x_max, F26Dot6::from_bits(691));
    }

    #[test]
    fn glyphs_without_programs() {
        let data = test_font::triangle_font();
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut session = Session::new(&reader, HintingOptions::default()).unwrap();
        assert!(session.hint_glyph(&reader, 0).unwrap().is_none());
        assert!(matches!(
            session.hint_glyph(&reader, 2),
            Err(Error::UnsupportedGlyph(2))
        ));
        assert!(matches!(
            session.hint_glyph(&reader, 3),
            Err(Error::GlyphNotFound(3))
        ));
        // The session remains usable after skipped glyphs
        assert!(session.hint_glyph(&reader, 1).unwrap().is_some());
    }

    #[test]
    fn sessions_do_not_interfere() {
        let glyph = TestGlyph::Simple {
            points: vec![(0, 0), (100, 100)],
            // Write 7 to storage location 1
            program: vec![op::PUSHB000 + 1, 1, 7, op::WS],
        };
        let data = test_font::build(
            1000,
            &[(glyph, 200)],
            &[123],
            &[],
            &[op::PUSHB000, 0, op::MPPEM, op::WS],
        );
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut small = Session::new(&reader, HintingOptions::default()).unwrap();
        let large = Session::new(
            &reader,
            HintingOptions {
                point_size: 24.0,
                ..Default::default()
            },
        )
        .unwrap();
        small.hint_glyph(&reader, 0).unwrap();
        assert_eq!(
            small.storage().iter().collect::<Vec<_>>(),
            [(0, 12), (1, 7)]
        );
        assert_eq!(large.storage().iter().collect::<Vec<_>>(), [(0, 24)]);
        assert_eq!(small.cvt(), [F26Dot6::from_bits(94)].as_slice());
        assert_eq!(large.cvt(), [F26Dot6::from_bits(189)].as_slice());
    }

    #[test]
    fn control_value_program_failure() {
        let data = font_with_prep(&[op::POP]);
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let Err(Error::Hint(err)) = Session::new(&reader, HintingOptions::default()) else {
            panic!("expected a hinting error");
        };
        assert_eq!(err.program, Program::ControlValue);
        assert_eq!(err.kind, HintErrorKind::ValueStackUnderflow);
        assert_eq!(err.pc, 0);
    }

    #[test]
    fn glyph_program_failure() {
        let glyph = TestGlyph::Simple {
            points: vec![(0, 0), (100, 100)],
            program: vec![op::PUSHB000, 40, op::MDAP1],
        };
        let glyphs = [(TestGlyph::Empty, 0), (glyph, 200)];
        let data = test_font::build(1000, &glyphs, &[], &[], &[]);
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut session = Session::new(&reader, HintingOptions::default()).unwrap();
        let Err(Error::Hint(err)) = session.hint_glyph(&reader, 1) else {
            panic!("expected a hinting error");
        };
        assert_eq!(err.glyph_id, Some(1));
        assert_eq!(
            err.to_string(),
            "glyf[1]@2:MDAP: point index 40 was out of bounds"
        );
    }

    #[test]
    fn instruction_limit() {
        let data = font_with_prep(&[op::PUSHB000, 0, op::POP, op::PUSHB000, 0, op::POP]);
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let options = HintingOptions {
            max_instructions: 3,
            ..Default::default()
        };
        let Err(Error::Hint(err)) = Session::new(&reader, options) else {
            panic!("expected a hinting error");
        };
        assert_eq!(err.kind, HintErrorKind::ExceededExecutionBudget);
        assert_eq!(err.pc, 5);
    }

    #[test]
    fn stack_depth_limit() {
        let data = font_with_prep(&[op::PUSHB000 + 2, 1, 2, 3]);
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let options = HintingOptions {
            max_stack_depth: Some(2),
            ..Default::default()
        };
        let Err(Error::Hint(err)) = Session::new(&reader, options) else {
            panic!("expected a hinting error");
        };
        assert_eq!(err.kind, HintErrorKind::ValueStackOverflow);
    }

    #[test]
    fn debug_glyph() {
        let mut moved = vec![];
        let data = test_font::triangle_font();
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut session = Session::new(&reader, HintingOptions::default()).unwrap();
        let mut glyph = session.load_glyph(&reader, 1).unwrap().unwrap();
        let mut debugger = session.debug(&mut glyph);
        debugger.subscribe(|snapshot: &ExecutionSnapshot| {
            if let Some(glyph) = &snapshot.glyph {
                moved.push(glyph.points[0].x.to_bits());
            }
        });
        assert_eq!(debugger.step_into(), Ok(StepStatus::Running));
        assert_eq!(debugger.step_into(), Ok(StepStatus::Finished));
        let snapshot = debugger.snapshot();
        assert_eq!(snapshot.glyph.as_ref().and_then(|g| g.glyph_id), Some(1));
        assert_eq!(snapshot.graphics.ppem, 12);
        drop(debugger);
        assert_eq!(moved, [94, 64]);
        assert_eq!(glyph.zone().points()[0].x, F26Dot6::ONE);
    }

    #[test]
    fn debugged_control_value_program_matches_new_session() {
        #[rustfmt::skip]
        let prep = [
            // Add one pixel to control value 0
            op::PUSHB000 + 1, 0, 0,
            op::RCVT,
            op::PUSHB000, 64,
            op::ADD,
            op::WCVTP,
            op::RTHG,
            op::PUSHB000, 32,
            op::SCVTCI,
        ];
        let glyph = TestGlyph::Simple {
            points: vec![(123, 0), (500, 700), (900, 0)],
            // Store control value 0 in location 1 and round point 0
            program: vec![op::PUSHB000 + 1, 1, 0, op::RCVT, op::WS, op::PUSHB000, 0, op::MDAP1],
        };
        let data = test_font::build(1000, &[(glyph, 1000)], &[123], &[], &prep);
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut fresh = Session::new(&reader, HintingOptions::default()).unwrap();
        let expected = fresh.hint_glyph(&reader, 0).unwrap().unwrap();
        assert_eq!(fresh.cvt(), [F26Dot6::from_bits(158)].as_slice());
        // Half grid rounding from the control value program
        assert_eq!(expected.zone().points()[0].x, F26Dot6::from_bits(96));
        let mut session = Session::new(&reader, HintingOptions::default()).unwrap();
        // Abandon one run part way before completing another
        let mut debugger = session.debug_program(Program::ControlValue);
        for _ in 0..3 {
            debugger.step().unwrap();
        }
        drop(debugger);
        let mut debugger = session.debug_program(Program::ControlValue);
        assert_eq!(debugger.run(), Ok(StepStatus::Finished));
        drop(debugger);
        let glyph = session.hint_glyph(&reader, 0).unwrap().unwrap();
        assert_eq!(session.cvt(), fresh.cvt());
        assert_eq!(
            session.storage().iter().collect::<Vec<_>>(),
            fresh.storage().iter().collect::<Vec<_>>()
        );
        assert_eq!(session.graphics(), fresh.graphics());
        assert_eq!(glyph.zone().points(), expected.zone().points());
    }

    #[test]
    fn debug_control_value_program() {
        let data = test_font::triangle_font();
        let font = FontRef::new(&data).unwrap();
        let reader = TrueTypeFont::new(&font).unwrap();
        let mut session = Session::new(&reader, HintingOptions::default()).unwrap();
        let mut debugger = session.debug_program(Program::ControlValue);
        debugger.step().unwrap();
        debugger.step().unwrap();
        let snapshot = debugger.snapshot();
        assert_eq!(snapshot.program, Program::ControlValue);
        assert_eq!(snapshot.stack, [12, 0]);
        assert!(snapshot.glyph.is_none());
        assert_eq!(debugger.step(), Ok(StepStatus::Finished));
    }
}
