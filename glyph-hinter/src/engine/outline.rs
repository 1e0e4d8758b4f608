//! Managing outlines.
//!
//! Implements 8 instructions.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-outlines>
//! and <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#moving-points>

use super::{
    super::{round::DistanceType, zone::Axis},
    Engine, F26Dot6, OpResult,
};

impl<'a> Engine<'a> {
    /// Move direct absolute point.
    ///
    /// MDAP\[a\] (0x2E - 0x2F)
    ///
    /// a: 0: do not round the value
    ///    1: round the value
    ///
    /// Pops: p: point number
    ///
    /// Sets the reference points rp0 and rp1 equal to point p. If a=1, this
    /// instruction moves point p to its original position rounded as
    /// specified by the state variable round_state. If a=0, it simply marks
    /// the point as touched in the direction(s) specified by the current
    /// freedom_vector.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-direct-absolute-point>
    pub(super) fn op_mdap(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let target = if (opcode & 1) != 0 {
            self.graphics.round_state.round(self.measure_original(p)?)
        } else {
            self.measure_current(p)?
        };
        self.move_point(p, target)?;
        self.graphics.rp0 = p;
        self.graphics.rp1 = p;
        Ok(())
    }

    /// Move indirect absolute point.
    ///
    /// MIAP\[a\] (0x3E - 0x3F)
    ///
    /// a: 0: do not round the distance and don't use control value cutin
    ///    1: round the distance and use control value cutin
    ///
    /// Pops: n: CVT entry number
    ///       p: point number
    ///
    /// Moves point p to the absolute coordinate position specified by the nth
    /// Control Value Table entry. The coordinate is measured along the current
    /// projection_vector. If a=1, the position will be rounded as specified by
    /// round_state. If a=1, and if the device space difference between the CVT
    /// value and the current position is greater than the
    /// control_value_cut_in, then the current position will be rounded
    /// (instead of the CVT value.)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-indirect-absolute-point>
    pub(super) fn op_miap(&mut self, opcode: u8) -> OpResult {
        let cvt_entry = self.value_stack.pop_usize()?;
        let p = self.value_stack.pop_usize()?;
        let mut target = self.cvt.get(cvt_entry)?;
        if (opcode & 1) != 0 {
            let current = self.measure_current(p)?;
            if (target - current).abs() > self.graphics.control_value_cutin {
                target = current;
            }
            target = self.graphics.round_state.round(target);
        }
        self.move_point(p, target)?;
        self.graphics.rp0 = p;
        self.graphics.rp1 = p;
        Ok(())
    }

    /// Move direct relative point.
    ///
    /// MDRP\[abcde\] (0xC0 - 0xDF)
    ///
    /// a: 0: do not set rp0 to point p after move
    ///    1: do set rp0 to point p after move
    /// b: 0: do not keep distance greater than or equal to minimum_distance
    ///    1: keep distance greater than or equal to minimum_distance
    /// c: 0: do not round distance
    ///    1: round the distance
    /// de: distance type for engine characteristic compensation
    ///
    /// Pops: p: point number
    ///
    /// MDRP moves point p along the freedom_vector so that the distance from
    /// its new position to the current position of rp0 is the same as the
    /// distance between the two points in the original uninstructed outline,
    /// and then adjusts it to be consistent with the Boolean settings.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-direct-relative-point>
    pub(super) fn op_mdrp(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let rp0 = self.graphics.rp0;
        let original_distance = self.measure_original(p)? - self.measure_original(rp0)?;
        let is_negative = original_distance < F26Dot6::ZERO;
        let distance = self.relative_distance(opcode, original_distance, is_negative);
        let target = self.measure_current(rp0)? + distance;
        self.finish_relative_move(opcode, p, target)
    }

    /// Move indirect relative point.
    ///
    /// MIRP\[abcde\] (0xE0 - 0xFF)
    ///
    /// a: 0: do not set rp0 to point p after move
    ///    1: do set rp0 to point p after move
    /// b: 0: do not keep distance greater than or equal to minimum_distance
    ///    1: keep distance greater than or equal to minimum_distance
    /// c: 0: do not round distance and do not look at control_value_cutin
    ///    1: round the distance and look at control_value_cutin
    /// de: distance type for engine characteristic compensation
    ///
    /// Pops: n: CVT entry number
    ///       p: point number
    ///
    /// Moves point p along the freedom_vector so that its distance from the
    /// current position of rp0 is the magnitude of the nth Control Value
    /// Table entry, keeping p on the side of rp0 where it currently lies.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-indirect-relative-point>
    pub(super) fn op_mirp(&mut self, opcode: u8) -> OpResult {
        let cvt_entry = self.value_stack.pop_usize()?;
        let p = self.value_stack.pop_usize()?;
        let rp0 = self.graphics.rp0;
        let reference = self.measure_current(rp0)?;
        let is_negative = self.measure_current(p)? < reference;
        let mut cvt_distance = self.cvt.get(cvt_entry)?.abs();
        if is_negative {
            cvt_distance = -cvt_distance;
        }
        let distance = self.relative_distance(opcode, cvt_distance, is_negative);
        self.finish_relative_move(opcode, p, reference + distance)
    }

    /// Applies the rounding and minimum distance flags shared by MDRP and
    /// MIRP.
    fn relative_distance(&self, opcode: u8, distance: F26Dot6, is_negative: bool) -> F26Dot6 {
        let mut distance = distance;
        if (opcode & 4) != 0 {
            distance = self
                .graphics
                .round_state
                .round_distance(distance, DistanceType::from_opcode(opcode));
        }
        if (opcode & 8) != 0 {
            let min_distance = self.graphics.min_distance;
            if distance.abs() < min_distance {
                distance = if is_negative {
                    -min_distance
                } else {
                    min_distance
                };
            }
        }
        distance
    }

    /// Moves the point and updates the reference points after MDRP and
    /// MIRP.
    fn finish_relative_move(&mut self, opcode: u8, p: usize, target: F26Dot6) -> OpResult {
        self.move_point(p, target)?;
        let gs = &mut self.graphics;
        gs.rp1 = gs.rp0;
        gs.rp2 = p;
        if (opcode & 16) != 0 {
            gs.rp0 = p;
        }
        Ok(())
    }

    /// Interpolate point by the last relative stretch.
    ///
    /// IP[] (0x39)
    ///
    /// Pops: p: point number
    ///
    /// Uses the loop counter.
    ///
    /// Moves point p so that its relationship to rp1 and rp2 is the same as it
    /// was in the original uninstructed outline. Measurements are made along
    /// the projection_vector, and movement to satisfy the interpolation
    /// relationship is constrained to be along the freedom_vector.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#interpolate-point-by-the-last-relative-stretch>
    pub(super) fn op_ip(&mut self) -> OpResult {
        let count = self.take_loop_counter();
        let (rp1, rp2) = (self.graphics.rp1, self.graphics.rp2);
        let orig_base = self.measure_original(rp1)?;
        let cur_base = self.measure_current(rp1)?;
        let orig_range = self.measure_original(rp2)? - orig_base;
        let cur_range = self.measure_current(rp2)? - cur_base;
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            let orig_distance = self.measure_original(p)? - orig_base;
            let distance = orig_distance
                .checked_mul_div(cur_range, orig_range)
                .unwrap_or(orig_distance);
            self.move_point(p, cur_base + distance)?;
        }
        Ok(())
    }

    /// Align to reference point.
    ///
    /// ALIGNRP[] (0x3C)
    ///
    /// Pops: p: point number
    ///
    /// Uses the loop counter.
    ///
    /// Reduces the distance between rp0 and point p to zero. Since distance
    /// is measured along the projection_vector and movement is along the
    /// freedom_vector, the effect of the instruction is to align points.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#align-to-reference-point>
    pub(super) fn op_alignrp(&mut self) -> OpResult {
        let count = self.take_loop_counter();
        let target = self.measure_current(self.graphics.rp0)?;
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            self.move_point(p, target)?;
        }
        Ok(())
    }

    /// Shift point by a pixel amount.
    ///
    /// SHPIX (0x38)
    ///
    /// Pops: amount: magnitude of the shift (F26Dot6)
    ///       p1, p2,.. pn: points to be shifted
    ///
    /// Uses the loop counter.
    ///
    /// Shifts the points specified by the amount stated. When the loop
    /// variable is used, the amount to be shifted is put onto the stack
    /// only once. That is, if loop = 3, then the contents of the top of
    /// the stack should be point p1, point p2, point p3, amount. The value
    /// amount is expressed in sixty-fourths of a pixel.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#shift-point-by-a-pixel-amount>
    pub(super) fn op_shpix(&mut self) -> OpResult {
        let amount = F26Dot6::from(self.value_stack.pop()?);
        let offset = self.graphics.freedom_vector.offset(amount);
        let axes = self.graphics.moved_axes();
        let count = self.take_loop_counter();
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            let point = self.zone.point_mut(p)?;
            point.x += offset.x;
            point.y += offset.y;
            self.zone.touch(p, axes)?;
        }
        Ok(())
    }

    /// Interpolate untouched points through the outline.
    ///
    /// IUP\[a\] (0x30 - 0x31)
    ///
    /// a: 0: interpolate in the y-direction
    ///    1: interpolate in the x-direction
    ///
    /// Considers a glyph contour by contour, moving any untouched points in
    /// each contour that are between a pair of touched points. If the
    /// coordinates of an untouched point were originally between those of
    /// the touched pair, it is linearly interpolated between the new
    /// coordinates, otherwise the untouched point is shifted by the amount
    /// the nearest touched point is shifted from its original coordinate.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#interpolate-untouched-points-through-the-outline>
    pub(super) fn op_iup(&mut self, opcode: u8) -> OpResult {
        let axis = if opcode & 1 != 0 { Axis::X } else { Axis::Y };
        self.zone.iup(axis)
    }
}
