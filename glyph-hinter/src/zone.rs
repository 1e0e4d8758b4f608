//! Glyph zone for instruction processing.

use read_fonts::types::BoundingBox;

use super::{error::HintErrorKind, fixed::F26Dot6, geometry::Point, graphics::MovedAxes};

use HintErrorKind::InvalidPointIndex;

/// Number of synthetic points appended after the outline.
pub const PHANTOM_POINT_COUNT: usize = 2;

/// Reference to either the twilight or glyph zone.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructing_glyphs#zones>
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum ZonePointer {
    Twilight = 0,
    #[default]
    Glyph = 1,
}

impl TryFrom<i32> for ZonePointer {
    type Error = HintErrorKind;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Twilight),
            1 => Ok(Self::Glyph),
            _ => Err(HintErrorKind::InvalidZoneIndex(value)),
        }
    }
}

/// Coordinate axis.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
}

/// Per point on-curve and touch state.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct PointFlags(u8);

impl PointFlags {
    const ON_CURVE: u8 = 1;
    const TOUCHED_X: u8 = 2;
    const TOUCHED_Y: u8 = 4;

    pub fn new(on_curve: bool) -> Self {
        Self(if on_curve { Self::ON_CURVE } else { 0 })
    }

    pub fn is_on_curve(self) -> bool {
        self.0 & Self::ON_CURVE != 0
    }

    pub fn is_touched(self, axis: Axis) -> bool {
        self.0 & Self::touched_bit(axis) != 0
    }

    pub fn set_touched(&mut self, axis: Axis) {
        self.0 |= Self::touched_bit(axis);
    }

    fn touched_bit(axis: Axis) -> u8 {
        match axis {
            Axis::X => Self::TOUCHED_X,
            Axis::Y => Self::TOUCHED_Y,
        }
    }
}

/// Glyph zone for TrueType hinting.
///
/// Holds the current and original positions of every outline point
/// followed by the two phantom points: the origin and the end of the
/// advance width. Only the current positions and touch flags change while
/// a program runs.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructing_glyphs#zones>
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct GlyphZone {
    /// Scaled outline points, modified by hinting.
    points: Vec<Point>,
    /// Copy of the outline points before hinting.
    original: Vec<Point>,
    flags: Vec<PointFlags>,
    /// Index of the last point of each contour.
    contours: Vec<u16>,
    bounds: BoundingBox<F26Dot6>,
}

impl GlyphZone {
    /// Creates a new zone from scaled outline points.
    ///
    /// Phantom points at `(0, 0)` and `(advance, 0)` are appended after the
    /// outline.
    pub fn new(
        outline: impl IntoIterator<Item = (Point, bool)>,
        contours: Vec<u16>,
        bounds: BoundingBox<F26Dot6>,
        advance: F26Dot6,
    ) -> Self {
        let (mut points, mut flags): (Vec<_>, Vec<_>) = outline
            .into_iter()
            .map(|(point, on_curve)| (point, PointFlags::new(on_curve)))
            .unzip();
        points.push(Point::default());
        points.push(Point::new(advance, F26Dot6::ZERO));
        flags.extend([PointFlags::default(); PHANTOM_POINT_COUNT]);
        Self {
            original: points.clone(),
            points,
            flags,
            contours,
            bounds,
        }
    }

    /// Returns the total number of points including phantom points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of outline points, excluding phantom points.
    pub fn outline_len(&self) -> usize {
        self.points.len().saturating_sub(PHANTOM_POINT_COUNT)
    }

    /// Returns the current positions of all points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the original positions of all points.
    pub fn original_points(&self) -> &[Point] {
        &self.original
    }

    pub fn flags(&self) -> &[PointFlags] {
        &self.flags
    }

    /// Returns the index of the last point of each contour.
    pub fn contours(&self) -> &[u16] {
        &self.contours
    }

    /// Returns the scaled bounding box of the outline.
    pub fn bounds(&self) -> BoundingBox<F26Dot6> {
        self.bounds
    }

    /// Returns the two phantom points.
    pub fn phantom_points(&self) -> &[Point] {
        &self.points[self.outline_len()..]
    }

    /// Returns the current position of the point at the given index.
    pub fn point(&self, index: usize) -> Result<Point, HintErrorKind> {
        self.points.get(index).copied().ok_or(InvalidPointIndex(index))
    }

    /// Returns a mutable reference to the current position of the point at
    /// the given index.
    pub fn point_mut(&mut self, index: usize) -> Result<&mut Point, HintErrorKind> {
        self.points.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    /// Returns the original position of the point at the given index.
    pub fn original(&self, index: usize) -> Result<Point, HintErrorKind> {
        self.original
            .get(index)
            .copied()
            .ok_or(InvalidPointIndex(index))
    }

    /// Marks the point as touched along the given axes.
    pub fn touch(&mut self, index: usize, axes: MovedAxes) -> Result<(), HintErrorKind> {
        let flags = self.flags.get_mut(index).ok_or(InvalidPointIndex(index))?;
        if axes.x {
            flags.set_touched(Axis::X);
        }
        if axes.y {
            flags.set_touched(Axis::Y);
        }
        Ok(())
    }

    /// Returns true if the point has been touched along the given axis.
    pub fn is_touched(&self, index: usize, axis: Axis) -> Result<bool, HintErrorKind> {
        self.flags
            .get(index)
            .map(|flags| flags.is_touched(axis))
            .ok_or(InvalidPointIndex(index))
    }

    /// Interpolate untouched points.
    ///
    /// Within each contour, points between two touched points are
    /// interpolated between them and points on a contour with a single
    /// touched point are shifted by that point's displacement.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#interpolate-untouched-points-through-the-outline>
    pub fn iup(&mut self, axis: Axis) -> Result<(), HintErrorKind> {
        let mut point = 0;
        let outline_len = self.outline_len();
        for i in 0..self.contours.len() {
            let first_point = point;
            let end_point = self.contours[i] as usize;
            if end_point >= outline_len {
                return Err(InvalidPointIndex(end_point));
            }
            while point <= end_point && !self.is_touched(point, axis)? {
                point += 1;
            }
            if point <= end_point {
                let first_touched = point;
                let mut cur_touched = point;
                point += 1;
                while point <= end_point {
                    if self.is_touched(point, axis)? {
                        self.iup_interpolate(axis, cur_touched + 1, point - 1, cur_touched, point)?;
                        cur_touched = point;
                    }
                    point += 1;
                }
                if cur_touched == first_touched {
                    self.iup_shift(axis, first_point, end_point, cur_touched)?;
                } else {
                    self.iup_interpolate(
                        axis,
                        cur_touched + 1,
                        end_point,
                        cur_touched,
                        first_touched,
                    )?;
                    if first_touched > 0 {
                        self.iup_interpolate(
                            axis,
                            first_point,
                            first_touched - 1,
                            cur_touched,
                            first_touched,
                        )?;
                    }
                }
            }
            point = end_point + 1;
        }
        Ok(())
    }

    /// Shift the range of points p1..=p2, excluding p, by the displacement
    /// of the reference point p.
    fn iup_shift(
        &mut self,
        axis: Axis,
        p1: usize,
        p2: usize,
        p: usize,
    ) -> Result<(), HintErrorKind> {
        let delta = coord(self.point(p)?, axis) - coord(self.original(p)?, axis);
        if delta == F26Dot6::ZERO {
            return Ok(());
        }
        for index in (p1..=p2).filter(|index| *index != p) {
            *coord_mut(self.point_mut(index)?, axis) += delta;
        }
        Ok(())
    }

    /// Interpolate the range of points p1..=p2 based on the displacements
    /// of the two reference points.
    ///
    /// Points outside the original span of the references take the
    /// displacement of the nearer one.
    fn iup_interpolate(
        &mut self,
        axis: Axis,
        p1: usize,
        p2: usize,
        mut ref1: usize,
        mut ref2: usize,
    ) -> Result<(), HintErrorKind> {
        if p1 > p2 {
            return Ok(());
        }
        let mut org1 = coord(self.original(ref1)?, axis);
        let mut org2 = coord(self.original(ref2)?, axis);
        if org1 > org2 {
            core::mem::swap(&mut org1, &mut org2);
            core::mem::swap(&mut ref1, &mut ref2);
        }
        let cur1 = coord(self.point(ref1)?, axis);
        let cur2 = coord(self.point(ref2)?, axis);
        let delta1 = cur1 - org1;
        let delta2 = cur2 - org2;
        let orig_range = (org2 - org1).to_bits() as i128;
        let cur_range = (cur2 - cur1).to_bits() as i128;
        for index in p1..=p2 {
            let a = coord(self.original(index)?, axis);
            let value = if a <= org1 {
                a + delta1
            } else if a >= org2 {
                a + delta2
            } else {
                let offset = (a - org1).to_bits() as i128 * cur_range / orig_range;
                cur1 + F26Dot6::from_bits(offset as i64)
            };
            *coord_mut(self.point_mut(index)?, axis) = value;
        }
        Ok(())
    }
}

fn coord(point: Point, axis: Axis) -> F26Dot6 {
    match axis {
        Axis::X => point.x,
        Axis::Y => point.y,
    }
}

fn coord_mut(point: &mut Point, axis: Axis) -> &mut F26Dot6 {
    match axis {
        Axis::X => &mut point.x,
        Axis::Y => &mut point.y,
    }
}
