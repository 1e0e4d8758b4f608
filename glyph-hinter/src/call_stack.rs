//! Tracking function call state.

use super::{definition::Definition, error::HintErrorKind, program::Program};

/// How a frame behaves when its function reaches `ENDF`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CallKind {
    /// Return to the caller. Pushed by `CALL`.
    Returning,
    /// Restart the function body while iterations remain. Pushed by
    /// `LOOPCALL`; the same frame is reused for every iteration.
    Repeating { remaining: u32, function: i32 },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CallRecord {
    pub caller_program: Program,
    pub return_pc: usize,
    pub definition: Definition,
    pub kind: CallKind,
}

impl CallRecord {
    /// Returns the number of iterations left after the current one.
    pub fn remaining(&self) -> u32 {
        match self.kind {
            CallKind::Returning => 0,
            CallKind::Repeating { remaining, .. } => remaining,
        }
    }
}

/// Stack of active function calls.
///
/// There is no fixed depth limit; the instruction budget bounds runaway
/// recursion.
#[derive(Clone, Default, Debug)]
pub struct CallStack {
    records: Vec<CallRecord>,
}

impl CallStack {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records from outermost to innermost.
    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn push(&mut self, record: CallRecord) {
        self.records.push(record);
    }

    pub fn peek(&self) -> Option<&CallRecord> {
        self.records.last()
    }

    pub fn pop(&mut self) -> Result<CallRecord, HintErrorKind> {
        self.records.pop().ok_or(HintErrorKind::CallStackUnderflow)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: CallKind) -> CallRecord {
        CallRecord {
            caller_program: Program::Glyph,
            return_pc: 4,
            definition: Definition::new(Program::Font, 0..3, 1),
            kind,
        }
    }

    #[test]
    fn push_pop() {
        let mut stack = CallStack::default();
        stack.push(record(CallKind::Returning));
        stack.push(record(CallKind::Repeating {
            remaining: 2,
            function: 1,
        }));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek().map(|r| r.remaining()), Some(2));
        assert_eq!(stack.pop().unwrap().remaining(), 2);
        assert_eq!(stack.pop().unwrap().kind, CallKind::Returning);
        assert!(matches!(
            stack.pop(),
            Err(HintErrorKind::CallStackUnderflow)
        ));
    }
}
