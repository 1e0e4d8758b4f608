//! An interpreter and stepping debugger backend for TrueType hinting
//! programs.
//!
//! TrueType fonts carry bytecode that adjusts glyph outlines to the pixel
//! grid at a particular size. This crate executes that bytecode:
//!
//! * A [`Session`] runs the font program (`fpgm`) and the control value
//!   program (`prep`) for a font at one size and then hints individual
//!   glyphs by running their glyph programs.
//! * A [`Debugger`] executes any of those programs one instruction at a
//!   time and publishes an [`ExecutionSnapshot`] to subscribed observers
//!   after every step.
//!
//! Fonts are accessed through the [`FontReader`] trait. [`TrueTypeFont`]
//! implements it on top of [`read-fonts`](https://crates.io/crates/read-fonts).
//!
//! ```no_run
//! use glyph_hinter::{raw::FontRef, HintingOptions, Session, TrueTypeFont};
//!
//! # fn hint(data: &[u8]) -> Result<(), glyph_hinter::Error> {
//! let font = FontRef::new(data)?;
//! let reader = TrueTypeFont::new(&font)?;
//! let mut session = Session::new(&reader, HintingOptions::default())?;
//! if let Some(glyph) = session.hint_glyph(&reader, 1)? {
//!     println!("{:?}", glyph.zone().points());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Composite glyphs, variable fonts and rasterization are out of scope.
//! Twilight zone pointers, dropout control and engine distance types are
//! accepted but have no effect.

#![forbid(unsafe_code)]

/// Expose our "raw" underlying parser crate.
pub extern crate read_fonts as raw;

mod call_stack;
mod code;
mod cvt;
mod debugger;
mod definition;
mod engine;
mod error;
mod fixed;
mod font;
mod geometry;
mod graphics;
mod program;
mod round;
mod session;
mod snapshot;
mod storage;
mod value_stack;
mod zone;

pub use call_stack::{CallKind, CallRecord, CallStack};
pub use code::{disassemble, opcodes};
pub use debugger::{Debugger, Observer, StepStatus};
pub use definition::{Definition, FunctionTable};
pub use engine::{Engine, InstructionBudget, MAX_RUN_INSTRUCTIONS};
pub use error::{Error, HintError, HintErrorKind};
pub use fixed::F26Dot6;
pub use font::{FontReader, Outline, TrueTypeFont};
pub use geometry::{Line, Point, Vector};
pub use graphics::{GraphicsState, RetainedGraphicsState};
pub use program::Program;
pub use round::{DistanceType, RoundMode, RoundState};
pub use session::{Glyph, HintingOptions, Session};
pub use snapshot::{
    ExecutionSnapshot, FrameSummary, GlyphSummary, GraphicsSummary, ListingEntry,
};
pub use storage::Storage;
pub use value_stack::ValueStack;
pub use zone::{Axis, GlyphZone, PointFlags, ZonePointer};
