//! Access to the font data consumed by the interpreter.

use read_fonts::{
    tables::{
        glyf::{Glyf, Glyph, PointFlags},
        hmtx::Hmtx,
        loca::Loca,
    },
    types::{BigEndian, BoundingBox, GlyphId, Point, Tag},
    FontRef, ReadError, TableProvider,
};

use super::error::Error;

/// Source of the programs, control values and outlines of a TrueType font.
pub trait FontReader {
    fn units_per_em(&self) -> u16;

    /// Returns the factor that converts font units to pixels at the given
    /// point size and resolution in dots per inch.
    fn scale(&self, point_size: f32, resolution: u16) -> f64 {
        let upem = self.units_per_em().max(1) as f64;
        point_size as f64 * resolution as f64 / (72.0 * upem)
    }

    /// Returns the control value table in font units.
    fn cvt(&self) -> Vec<i32>;

    /// Returns the font program (`fpgm`).
    fn font_program(&self) -> &[u8];

    /// Returns the control value program (`prep`).
    fn control_value_program(&self) -> &[u8];

    /// Returns the unscaled outline of a simple glyph.
    ///
    /// Empty glyphs produce `Ok(None)` and composite glyphs produce
    /// [`Error::UnsupportedGlyph`].
    fn outline(&self, glyph_id: u32) -> Result<Option<Outline>, Error>;
}

/// Simple glyph outline in font units.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Outline {
    pub points: Vec<Point<i32>>,
    /// On-curve flag for each point.
    pub on_curve: Vec<bool>,
    /// Index of the last point of each contour.
    pub contours: Vec<u16>,
    pub bounds: BoundingBox<i32>,
    pub advance_width: u16,
    /// Glyph program.
    pub program: Vec<u8>,
}

/// [`FontReader`] backed by the `glyf` family of tables of a
/// [`FontRef`].
#[derive(Clone)]
pub struct TrueTypeFont<'a> {
    loca: Loca<'a>,
    glyf: Glyf<'a>,
    hmtx: Hmtx<'a>,
    cvt: &'a [BigEndian<i16>],
    fpgm: &'a [u8],
    prep: &'a [u8],
    units_per_em: u16,
}

impl<'a> TrueTypeFont<'a> {
    /// Loads the required tables from the font.
    ///
    /// Fails when `head`, `loca`, `glyf` or `hmtx` are missing or
    /// malformed. The `cvt `, `fpgm` and `prep` tables are optional.
    pub fn new(font: &FontRef<'a>) -> Result<Self, ReadError> {
        let cvt = font
            .data_for_tag(Tag::new(b"cvt "))
            .and_then(|d| d.read_array(0..d.len()).ok())
            .unwrap_or_default();
        let fpgm = font
            .data_for_tag(Tag::new(b"fpgm"))
            .unwrap_or_default()
            .as_bytes();
        let prep = font
            .data_for_tag(Tag::new(b"prep"))
            .unwrap_or_default()
            .as_bytes();
        Ok(Self {
            loca: font.loca(None)?,
            glyf: font.glyf()?,
            hmtx: font.hmtx()?,
            cvt,
            fpgm,
            prep,
            units_per_em: font.head()?.units_per_em(),
        })
    }

    pub fn glyph_count(&self) -> u32 {
        self.loca.len() as u32
    }
}

impl<'a> TryFrom<&FontRef<'a>> for TrueTypeFont<'a> {
    type Error = ReadError;

    fn try_from(font: &FontRef<'a>) -> Result<Self, Self::Error> {
        Self::new(font)
    }
}

impl FontReader for TrueTypeFont<'_> {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn cvt(&self) -> Vec<i32> {
        self.cvt.iter().map(|value| value.get() as i32).collect()
    }

    fn font_program(&self) -> &[u8] {
        self.fpgm
    }

    fn control_value_program(&self) -> &[u8] {
        self.prep
    }

    fn outline(&self, glyph_id: u32) -> Result<Option<Outline>, Error> {
        if glyph_id >= self.glyph_count() {
            return Err(Error::GlyphNotFound(glyph_id));
        }
        let gid = GlyphId::new(glyph_id);
        let glyph = match self.loca.get_glyf(gid, &self.glyf)? {
            Some(Glyph::Simple(simple)) => simple,
            Some(Glyph::Composite(_)) => return Err(Error::UnsupportedGlyph(glyph_id)),
            // This is a valid empty glyph
            None => return Ok(None),
        };
        let point_count = glyph.num_points();
        let mut points = vec![Point::default(); point_count];
        let mut flags = vec![PointFlags::default(); point_count];
        glyph.read_points_fast(&mut points, &mut flags)?;
        Ok(Some(Outline {
            points,
            on_curve: flags.iter().map(|flag| flag.to_bits() & 1 != 0).collect(),
            contours: glyph
                .end_pts_of_contours()
                .iter()
                .map(|end| end.get())
                .collect(),
            bounds: BoundingBox {
                x_min: glyph.x_min() as i32,
                y_min: glyph.y_min() as i32,
                x_max: glyph.x_max() as i32,
                y_max: glyph.y_max() as i32,
            },
            advance_width: self.hmtx.advance(gid).unwrap_or_default(),
            program: glyph.instructions().to_vec(),
        }))
    }
}

/// Test fonts assembled with `write-fonts`.
#[cfg(test)]
pub(crate) mod test_font {
    use super::super::code::opcodes as op;
    use write_fonts::{
        tables::{
            glyf::{
                Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour,
                GlyfLocaBuilder, SimpleGlyph, Transform,
            },
            head::Head,
            hhea::Hhea,
            hmtx::{Hmtx, LongMetric},
            maxp::Maxp,
        },
        read::tables::glyf::CurvePoint,
        types::{GlyphId16, Tag},
        FontBuilder,
    };

    /// A glyph to be written into the `glyf` table.
    pub enum TestGlyph {
        Empty,
        /// Single contour of on-curve points with a glyph program.
        Simple {
            points: Vec<(i16, i16)>,
            program: Vec<u8>,
        },
        /// Composite referencing glyph 1.
        Composite,
    }

    /// Builds a font with the given glyphs, control values and programs.
    ///
    /// Empty `cvt`, `fpgm` and `prep` slices omit the table.
    pub fn build(
        units_per_em: u16,
        glyphs: &[(TestGlyph, u16)],
        cvt: &[i16],
        fpgm: &[u8],
        prep: &[u8],
    ) -> Vec<u8> {
        let mut glyf = GlyfLocaBuilder::new();
        for (glyph, _) in glyphs {
            let added = match glyph {
                TestGlyph::Empty => glyf.add_glyph(&SimpleGlyph::default()),
                TestGlyph::Simple { points, program } => {
                    glyf.add_glyph(&simple_glyph(points, program))
                }
                TestGlyph::Composite => {
                    let component = Component::new(
                        GlyphId16::new(1),
                        Anchor::Offset { x: 0, y: 0 },
                        Transform::default(),
                        ComponentFlags::default(),
                    );
                    glyf.add_glyph(&CompositeGlyph::new(component, Bbox::default()))
                }
            };
            added.unwrap();
        }
        let (glyf, loca, loca_format) = glyf.build();
        let num_glyphs = glyphs.len() as u16;
        let hmtx = Hmtx {
            h_metrics: glyphs
                .iter()
                .map(|(_, advance)| LongMetric {
                    advance: *advance,
                    side_bearing: 0,
                })
                .collect(),
            left_side_bearings: vec![],
        };
        let mut builder = FontBuilder::new();
        builder
            .add_table(&Head {
                units_per_em,
                index_to_loc_format: loca_format as i16,
                ..Default::default()
            })
            .unwrap()
            .add_table(&Hhea {
                number_of_h_metrics: num_glyphs,
                ..Default::default()
            })
            .unwrap()
            .add_table(&Maxp {
                num_glyphs,
                ..Default::default()
            })
            .unwrap()
            .add_table(&hmtx)
            .unwrap()
            .add_table(&glyf)
            .unwrap()
            .add_table(&loca)
            .unwrap();
        let cvt = cvt
            .iter()
            .flat_map(|value| value.to_be_bytes())
            .collect::<Vec<_>>();
        for (tag, data) in [(b"cvt ", cvt), (b"fpgm", fpgm.to_vec()), (b"prep", prep.to_vec())] {
            if !data.is_empty() {
                builder.add_raw(Tag::new(tag), data);
            }
        }
        builder.build()
    }

    fn simple_glyph(points: &[(i16, i16)], program: &[u8]) -> SimpleGlyph {
        let contour = points
            .iter()
            .map(|&(x, y)| CurvePoint::on_curve(x, y))
            .collect::<Vec<_>>();
        let mut glyph = SimpleGlyph {
            bbox: Bbox::default(),
            // No points means no contours, which writes an empty glyph
            contours: if contour.is_empty() {
                vec![]
            } else {
                vec![Contour::from(contour)]
            },
            instructions: program.to_vec(),
        };
        glyph.recompute_bounding_box();
        glyph
    }

    /// Font with an empty glyph, a hinted triangle and a composite at 1000
    /// units per em.
    pub fn triangle_font() -> Vec<u8> {
        build(
            1000,
            &[
                (TestGlyph::Empty, 500),
                (
                    TestGlyph::Simple {
                        points: vec![(123, 0), (500, 700), (900, 0)],
                        program: vec![op::PUSHB000, 0, op::MDAP1],
                    },
                    1000,
                ),
                (TestGlyph::Composite, 1000),
            ],
            &[0, 123, -50],
            &[op::PUSHB000, 0, op::FDEF, op::ENDF],
            &[op::PUSHB000, 0, op::MPPEM, op::WS],
        )
    }
}
