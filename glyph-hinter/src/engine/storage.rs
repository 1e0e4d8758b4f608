//! Reads and writes of the storage area and control value table.

use super::{super::code::opcodes as op, Engine, F26Dot6, HintErrorKind, OpResult};

impl<'a> Engine<'a> {
    /// RS and RCVT.
    ///
    /// Pops a location and pushes the value stored there. Storage
    /// locations that were never written read as zero. Control values are
    /// pushed in 26.6 pixels.
    pub(super) fn op_read(&mut self, opcode: u8) -> OpResult {
        let value = match opcode {
            op::RS => self.storage.get(self.value_stack.pop()?)?,
            op::RCVT => {
                let location = self.value_stack.pop_usize()?;
                self.cvt.get(location)?.to_i32_bits()
            }
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        };
        self.value_stack.push(value)
    }

    /// WS, WCVTP and WCVTF.
    ///
    /// Pops a value and then a location. `WCVTP` takes the value in 26.6
    /// pixels while `WCVTF` takes it in font units and scales it to the
    /// current size first.
    pub(super) fn op_write(&mut self, opcode: u8) -> OpResult {
        let [location, value] = self.value_stack.pop_array()?;
        let cvt_value = match opcode {
            op::WS => return self.storage.set(location, value),
            op::WCVTP => F26Dot6::from(value),
            op::WCVTF => self.graphics.scale_font_units(value),
            _ => return Err(HintErrorKind::UnknownOpcode(opcode)),
        };
        let location = usize::try_from(location).unwrap_or(usize::MAX);
        self.cvt.set(location, cvt_value)
    }
}
