//! Rounding state.
//!
//! All rounding modes are expressed with a single algorithm driven by a
//! period, a phase and a threshold. The preset instructions install fixed
//! parameters while `SROUND` and `S45ROUND` decode them from an operand.

use super::fixed::F26Dot6;

/// Rounding strategies supported by the interpreter.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundMode {
    /// Set by `RTG` instruction.
    #[default]
    Grid,
    /// Set by `RTHG` instruction.
    HalfGrid,
    /// Set by `RTDG` instruction.
    DoubleGrid,
    /// Set by `RDTG` instruction.
    DownToGrid,
    /// Set by `RUTG` instruction.
    UpToGrid,
    /// Set by `ROFF` instruction.
    Off,
    /// Set by `SROUND` instruction.
    Super,
    /// Set by `S45ROUND` instruction.
    Super45,
}

/// Classification of a distance encoded in the low two bits of `ROUND`,
/// `NROUND`, `MDRP` and `MIRP`.
///
/// Carried to every rounding call but does not currently change the
/// result: engine compensation for the three types is zero.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceType {
    #[default]
    Gray,
    Black,
    White,
}

impl DistanceType {
    /// Decodes the distance type from the low two bits of an opcode.
    pub fn from_opcode(opcode: u8) -> Self {
        match opcode & 3 {
            1 => Self::Black,
            2 => Self::White,
            _ => Self::Gray,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

/// Graphics state that controls rounding.
///
/// See <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM04/Chap4.html#round%20state>
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundState {
    pub mode: RoundMode,
    pub period: F26Dot6,
    pub phase: F26Dot6,
    pub threshold: F26Dot6,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::grid()
    }
}

/// Grid period used by `S45ROUND`: sqrt(2)/2 pixels.
const PERIOD_45: i64 = 45;

impl RoundState {
    const fn preset(mode: RoundMode, period: i64, phase: i64, threshold: i64) -> Self {
        Self {
            mode,
            period: F26Dot6::from_bits(period),
            phase: F26Dot6::from_bits(phase),
            threshold: F26Dot6::from_bits(threshold),
        }
    }

    /// Round to grid.
    pub const fn grid() -> Self {
        Self::preset(RoundMode::Grid, 64, 0, 32)
    }

    /// Round to half grid.
    pub const fn half_grid() -> Self {
        Self::preset(RoundMode::HalfGrid, 64, 32, 32)
    }

    /// Round to double grid.
    pub const fn double_grid() -> Self {
        // Half pixel period keeps rounding a rounded value a no-op
        Self::preset(RoundMode::DoubleGrid, 32, 0, 16)
    }

    /// Round up to grid.
    ///
    /// The threshold is one unit short of the period so any fractional
    /// remainder advances to the next grid line.
    pub const fn up_to_grid() -> Self {
        // A full pixel threshold would move values already on the grid
        Self::preset(RoundMode::UpToGrid, 64, 0, 63)
    }

    /// Round down to grid.
    pub const fn down_to_grid() -> Self {
        Self::preset(RoundMode::DownToGrid, 64, 0, 0)
    }

    /// Rounding disabled.
    pub const fn off() -> Self {
        Self::preset(RoundMode::Off, 64, 0, 0)
    }

    /// Decodes the operand of `SROUND`.
    ///
    /// Bits 6-7 select the period, bits 4-5 the phase and bits 0-3 the
    /// threshold.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#super-round>
    pub fn super_round(selector: i32) -> Self {
        Self::decode_super(RoundMode::Super, 64, selector)
    }

    /// Decodes the operand of `S45ROUND`.
    ///
    /// Same layout as `SROUND` with a base period of sqrt(2)/2 pixels.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#super-round-45-degrees>
    pub fn super_round_45(selector: i32) -> Self {
        Self::decode_super(RoundMode::Super45, PERIOD_45, selector)
    }

    fn decode_super(mode: RoundMode, grid_period: i64, selector: i32) -> Self {
        let period = match (selector >> 6) & 3 {
            0 => grid_period / 2,
            2 => grid_period * 2,
            // 3 is reserved
            _ => grid_period,
        };
        let phase = match (selector >> 4) & 3 {
            0 => 0,
            1 => period / 4,
            2 => period / 2,
            _ => period * 3 / 4,
        };
        let threshold = match selector & 0xF {
            0 => period - 1,
            n => (n as i64 - 4) * period / 8,
        };
        Self::preset(mode, period, phase, threshold)
    }

    /// Rounds a distance.
    ///
    /// The value is shifted by the phase, pushed forward by the threshold,
    /// truncated to a multiple of the period and shifted back. If that
    /// moves the value across zero, it is pulled back by whole periods to
    /// the side of zero it started on.
    pub fn round(&self, value: F26Dot6) -> F26Dot6 {
        if self.mode == RoundMode::Off {
            return value;
        }
        let period = self.period.to_bits();
        if period <= 0 {
            return value;
        }
        let v = value.to_bits();
        let phase = self.phase.to_bits();
        let shifted = v - phase + self.threshold.to_bits();
        let mut result = shifted.div_euclid(period) * period + phase;
        if v > 0 {
            while result < 0 {
                result += period;
            }
        } else if v < 0 {
            while result > 0 {
                result -= period;
            }
        }
        F26Dot6::from_bits(result)
    }

    /// Rounds a distance of the given type.
    pub fn round_distance(&self, value: F26Dot6, _distance_type: DistanceType) -> F26Dot6 {
        self.round(value)
    }
}
