//! Instructions that set or query the graphics state.

use super::{
    super::{code::opcodes as op, geometry::Vector, round::RoundState, zone::ZonePointer},
    Engine, F26Dot6, HintErrorKind, OpResult,
};

impl<'a> Engine<'a> {
    /// SVTCA, SPVTCA and SFVTCA.
    ///
    /// Bit 0 of the opcode selects the x axis when set. Opcodes below
    /// `SFVTCA` move the projection vector and opcodes with bit 1 clear
    /// move the freedom vector.
    pub(super) fn op_set_axis(&mut self, opcode: u8) -> OpResult {
        let axis = if opcode & 1 == 1 {
            Vector::X_AXIS
        } else {
            Vector::Y_AXIS
        };
        if opcode < op::SFVTCA0 {
            self.graphics.proj_vector = axis;
        }
        if opcode & 2 == 0 {
            self.graphics.freedom_vector = axis;
        }
        Ok(())
    }

    /// SPVFS, SFVFS, GPV, GFV and SFVTPV.
    ///
    /// Vectors travel on the stack as x then y in 2.14. Components popped
    /// by the setters are truncated to 16 bits and normalized, and a zero
    /// vector leaves the target unchanged.
    pub(super) fn op_vector(&mut self, opcode: u8) -> OpResult {
        let graphics = &mut self.graphics;
        match opcode {
            op::SPVFS | op::SFVFS => {
                let [x, y] = self.value_stack.pop_array()?;
                let (x, y) = (x as i16 as i64, y as i16 as i64);
                if x == 0 && y == 0 {
                    return Ok(());
                }
                let vector = Vector::from_components(x, y);
                if opcode == op::SPVFS {
                    graphics.proj_vector = vector;
                } else {
                    graphics.freedom_vector = vector;
                }
                Ok(())
            }
            op::GPV | op::GFV => {
                let vector = if opcode == op::GPV {
                    graphics.proj_vector
                } else {
                    graphics.freedom_vector
                };
                self.value_stack.push(vector.x)?;
                self.value_stack.push(vector.y)
            }
            op::SFVTPV => {
                graphics.freedom_vector = graphics.proj_vector;
                Ok(())
            }
            _ => Err(HintErrorKind::UnknownOpcode(opcode)),
        }
    }

    /// SRP0, SRP1 and SRP2.
    pub(super) fn op_set_reference_point(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let rp = match opcode {
            op::SRP0 => &mut self.graphics.rp0,
            op::SRP1 => &mut self.graphics.rp1,
            op::SRP2 => &mut self.graphics.rp2,
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        };
        *rp = p;
        Ok(())
    }

    /// SZP0, SZP1, SZP2 and SZPS.
    ///
    /// Zone 0 is the twilight zone and zone 1 the glyph zone. Any other
    /// number fails with
    /// [`InvalidZoneIndex`](HintErrorKind::InvalidZoneIndex).
    pub(super) fn op_set_zone_pointer(&mut self, opcode: u8) -> OpResult {
        let zone = ZonePointer::try_from(self.value_stack.pop()?)?;
        let graphics = &mut self.graphics;
        match opcode {
            op::SZP0 => graphics.zp0 = zone,
            op::SZP1 => graphics.zp1 = zone,
            op::SZP2 => graphics.zp2 = zone,
            op::SZPS => {
                graphics.zp0 = zone;
                graphics.zp1 = zone;
                graphics.zp2 = zone;
            }
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        }
        Ok(())
    }

    /// RTG, RTHG, RTDG, RDTG, RUTG and ROFF install a preset round state.
    /// SROUND and S45ROUND pop a selector that encodes period, phase and
    /// threshold.
    pub(super) fn op_set_round_state(&mut self, opcode: u8) -> OpResult {
        self.graphics.round_state = match opcode {
            op::RTG => RoundState::grid(),
            op::RTHG => RoundState::half_grid(),
            op::RTDG => RoundState::double_grid(),
            op::RDTG => RoundState::down_to_grid(),
            op::RUTG => RoundState::up_to_grid(),
            op::ROFF => RoundState::off(),
            op::SROUND => RoundState::super_round(self.value_stack.pop()?),
            op::S45ROUND => RoundState::super_round_45(self.value_stack.pop()?),
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        };
        Ok(())
    }

    /// SLOOP, SMD, SCVTCI, SCANCTRL and SCANTYPE.
    ///
    /// Each pops one value into a single graphics state field. Scan
    /// settings are recorded but never acted on.
    pub(super) fn op_set_state_value(&mut self, opcode: u8) -> OpResult {
        let n = self.value_stack.pop()?;
        let graphics = &mut self.graphics;
        match opcode {
            op::SLOOP => {
                graphics.loop_counter =
                    u32::try_from(n).map_err(|_| HintErrorKind::NegativeLoopCounter)?
            }
            op::SMD => graphics.min_distance = F26Dot6::from(n),
            op::SCVTCI => graphics.control_value_cutin = F26Dot6::from(n),
            op::SCANCTRL => graphics.scan_control = n,
            op::SCANTYPE => graphics.scan_type = n & 0xFFFF,
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        }
        Ok(())
    }
}
