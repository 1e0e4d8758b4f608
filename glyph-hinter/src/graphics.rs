//! Graphics state for the TrueType interpreter.

use core::ops::{Deref, DerefMut};

use super::{
    fixed::F26Dot6,
    geometry::{measure, move_point_at, Point, Vector},
    round::RoundState,
    zone::ZonePointer,
};

/// Describes the axes along which a point moved.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct MovedAxes {
    pub x: bool,
    pub y: bool,
}

/// Describes the current state of the interpreter.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state>
#[derive(Clone, PartialEq, Debug)]
pub struct GraphicsState {
    /// Fields of the graphics state that persist between calls to the
    /// interpreter.
    pub retained: RetainedGraphicsState,
    /// A unit vector whose direction establishes an axis along which
    /// distances are measured.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#projection%20vector>
    pub proj_vector: Vector,
    /// A unit vector that establishes an axis along which points can move.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#freedom%20vector>
    pub freedom_vector: Vector,
    /// First reference point.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#reference_points>
    pub rp0: usize,
    /// Second reference point.
    pub rp1: usize,
    /// Third reference point.
    pub rp2: usize,
    /// Makes it possible to repeat certain instructions a designated number of
    /// times. The default value of one assures that unless the value of loop
    /// is altered, these instructions will execute one time.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#loop>
    pub loop_counter: u32,
    /// First zone pointer.
    ///
    /// Only the glyph zone exists so the zone pointers are recorded but
    /// never change which points an instruction addresses.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#zone_pointers>
    pub zp0: ZonePointer,
    /// Second zone pointer.
    pub zp1: ZonePointer,
    /// Third zone pointer.
    pub zp2: ZonePointer,
}

impl GraphicsState {
    /// Creates a graphics state with default values for everything except
    /// the given retained state.
    pub fn new(retained: RetainedGraphicsState) -> Self {
        Self {
            retained,
            ..Default::default()
        }
    }

    /// Resets the non-retained portions of the graphics state.
    pub fn reset(&mut self) {
        let retained = core::mem::take(&mut self.retained);
        *self = Self::new(retained);
    }

    /// Resets the retained portion of the graphics state to default
    /// values while saving the user instance settings.
    pub fn reset_retained(&mut self) {
        let scale = self.scale;
        let ppem = self.ppem;
        self.retained = RetainedGraphicsState::new(scale, ppem);
    }

    /// Returns the measurement of the point along the projection vector.
    pub fn measure(&self, point: Point) -> F26Dot6 {
        measure(point, self.proj_vector)
    }

    /// Moves the point along the freedom vector until its measurement along
    /// the projection vector equals `target`.
    pub fn move_to(&self, point: Point, target: F26Dot6) -> Point {
        move_point_at(point, target, self.proj_vector, self.freedom_vector)
    }

    /// Returns the axes that points move along given the current freedom
    /// vector.
    pub fn moved_axes(&self) -> MovedAxes {
        MovedAxes {
            x: self.freedom_vector.x != 0,
            y: self.freedom_vector.y != 0,
        }
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        // For table of default values, see <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state>
        Self {
            retained: RetainedGraphicsState::default(),
            proj_vector: Vector::X_AXIS,
            freedom_vector: Vector::X_AXIS,
            rp0: 0,
            rp1: 0,
            rp2: 0,
            loop_counter: 1,
            zp0: ZonePointer::default(),
            zp1: ZonePointer::default(),
            zp2: ZonePointer::default(),
        }
    }
}

/// Graphics state that is set by the control value program and carried
/// into every glyph program.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RetainedGraphicsState {
    /// Determines the manner in which values are rounded.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#round_state>
    pub round_state: RoundState,
    /// Limits the regularizing effects of control value table entries to
    /// cases where the difference between the table value and the
    /// measurement taken from the original outline is sufficiently small.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#control_value_cut-in>
    pub control_value_cutin: F26Dot6,
    /// Establishes the smallest possible value to which a distance will be
    /// rounded.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#minimum%20distance>
    pub min_distance: F26Dot6,
    /// Raw operand of the most recent `SCANCTRL`. Dropout control is not
    /// performed so this has no effect.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state#scan_control>
    pub scan_control: i32,
    /// Raw operand of the most recent `SCANTYPE`. Has no effect.
    pub scan_type: i32,
    /// Conversion factor from font units to pixels for the current
    /// instance.
    pub scale: f64,
    /// The nominal pixels per em value for the current instance.
    pub ppem: i32,
}

impl RetainedGraphicsState {
    pub fn new(scale: f64, ppem: i32) -> Self {
        Self {
            scale,
            ppem,
            ..Default::default()
        }
    }

    /// Converts a value in font units to 26.6 using the instance scale.
    pub fn scale_font_units(&self, value: i32) -> F26Dot6 {
        F26Dot6::from_f64(value as f64 * self.scale)
    }
}

impl Default for RetainedGraphicsState {
    fn default() -> Self {
        Self {
            round_state: RoundState::default(),
            // 17/16 pixels in 26.6
            // (17 * 64 / 16) = 68
            control_value_cutin: F26Dot6::from_bits(68),
            // 1 pixel in 26.6
            min_distance: F26Dot6::ONE,
            scan_control: 0,
            scan_type: 0,
            scale: 0.0,
            ppem: 0,
        }
    }
}

impl Deref for GraphicsState {
    type Target = RetainedGraphicsState;

    fn deref(&self) -> &Self::Target {
        &self.retained
    }
}

impl DerefMut for GraphicsState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.retained
    }
}
