//! Stepping execution of hinting programs.
//!
//! A [`Debugger`] owns an engine positioned at the start of a program and
//! executes it at one of three granularities:
//!
//! * [`step`](Debugger::step) executes one instruction, stepping over any
//!   function it calls.
//! * [`step_into`](Debugger::step_into) executes exactly one instruction.
//! * [`step_out`](Debugger::step_out) runs until the current function
//!   returns.
//!
//! After every call, a fresh [`ExecutionSnapshot`] is delivered to each
//! subscribed [`Observer`].

use log::debug;

use super::{
    engine::Engine, error::HintError, graphics::RetainedGraphicsState,
    snapshot::ExecutionSnapshot,
};

/// Receives execution snapshots from a [`Debugger`].
pub trait Observer {
    fn notify(&mut self, snapshot: &ExecutionSnapshot);
}

impl<F> Observer for F
where
    F: FnMut(&ExecutionSnapshot),
{
    fn notify(&mut self, snapshot: &ExecutionSnapshot) {
        self(snapshot)
    }
}

/// Outcome of a successful stepping call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepStatus {
    /// Instructions remain in the program.
    Running,
    /// The program has completed or previously halted with an error.
    Finished,
}

/// Single step driver for an [`Engine`].
pub struct Debugger<'a> {
    engine: Engine<'a>,
    observers: Vec<Box<dyn Observer + 'a>>,
    halted: bool,
    /// Receives the retained graphics state when the program completes.
    retained: Option<&'a mut RetainedGraphicsState>,
}

impl<'a> Debugger<'a> {
    /// Creates a debugger for an engine that has been reset to the program
    /// to debug.
    pub fn new(engine: Engine<'a>) -> Self {
        Self {
            engine,
            observers: vec![],
            halted: false,
            retained: None,
        }
    }

    /// Copies the retained graphics state into `target` once the program
    /// runs to completion without error.
    pub(crate) fn retain_graphics_into(mut self, target: &'a mut RetainedGraphicsState) -> Self {
        self.retained = Some(target);
        self
    }

    /// Registers an observer that receives a snapshot after each stepping
    /// call.
    pub fn subscribe(&mut self, observer: impl Observer + 'a) {
        self.observers.push(Box::new(observer));
    }

    /// Captures the current state without executing anything.
    pub fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot::from_engine(&self.engine)
    }

    pub fn engine(&self) -> &Engine<'a> {
        &self.engine
    }

    pub fn into_engine(self) -> Engine<'a> {
        self.engine
    }

    /// Returns true once the program has finished or failed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Executes one instruction. If it enters a function, execution
    /// continues until the call depth returns to its value before the
    /// step.
    pub fn step(&mut self) -> Result<StepStatus, HintError> {
        self.execute(|engine| {
            let depth = engine.call_depth();
            if engine.step()? {
                while engine.call_depth() > depth && engine.step()? {}
            }
            Ok(())
        })
    }

    /// Executes exactly one instruction regardless of call depth.
    pub fn step_into(&mut self) -> Result<StepStatus, HintError> {
        self.execute(|engine| engine.step().map(|_| ()))
    }

    /// Executes until the call depth drops below its value at invocation.
    ///
    /// Outside of a function this runs to the end of the program.
    pub fn step_out(&mut self) -> Result<StepStatus, HintError> {
        self.execute(|engine| {
            let depth = engine.call_depth();
            while engine.step()? {
                if engine.call_depth() < depth {
                    break;
                }
            }
            Ok(())
        })
    }

    /// Executes the remainder of the program.
    pub fn run(&mut self) -> Result<StepStatus, HintError> {
        self.execute(|engine| engine.run())
    }

    fn execute(
        &mut self,
        f: impl FnOnce(&mut Engine<'a>) -> Result<(), HintError>,
    ) -> Result<StepStatus, HintError> {
        if self.halted {
            self.publish();
            return Ok(StepStatus::Finished);
        }
        let result = f(&mut self.engine);
        if let Err(e) = &result {
            debug!("debugger halted: {e}");
        }
        if result.is_err() || self.engine.is_finished() {
            self.halted = true;
        }
        if result.is_ok() && self.halted && self.engine.call_depth() == 0 {
            if let Some(target) = self.retained.as_deref_mut() {
                *target = self.engine.graphics().retained;
            }
        }
        self.publish();
        result.map(|_| {
            if self.halted {
                StepStatus::Finished
            } else {
                StepStatus::Running
            }
        })
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.notify(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        super::{
            code::opcodes as op, engine::MockEngine, error::HintErrorKind, fixed::F26Dot6,
            program::Program, round::RoundState,
        },
        *,
    };
    use std::{cell::RefCell, rc::Rc};

    #[rustfmt::skip]
    const FONT_CODE: [u8; 15] = [
        // Function 0 adds 1 to the top of the stack
        op::PUSHB000, 0,
        op::FDEF,
            op::PUSHB000, 1,
            op::ADD,
        op::ENDF,
        op::PUSHB000, 10,   // pc = 7
        op::PUSHB000, 0,    // pc = 9
        op::CALL,           // pc = 11
        op::PUSHB000, 0,    // pc = 12
        op::CALL,           // pc = 14
    ];

    #[test]
    fn step_over_calls() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.set_font_code(&FONT_CODE);
        let mut debugger = Debugger::new(engine);
        // PUSHB, FDEF, PUSHB, PUSHB
        for _ in 0..4 {
            assert_eq!(debugger.step(), Ok(StepStatus::Running));
        }
        assert_eq!(debugger.engine().pc(), 11);
        // Stepping over CALL runs the whole function
        assert_eq!(debugger.step(), Ok(StepStatus::Running));
        assert_eq!(debugger.engine().pc(), 12);
        assert_eq!(debugger.engine().call_depth(), 0);
        assert_eq!(debugger.snapshot().stack, [11]);
        debugger.step().unwrap();
        assert_eq!(debugger.step(), Ok(StepStatus::Finished));
        assert_eq!(debugger.snapshot().stack, [12]);
        // Nothing else executes
        assert_eq!(debugger.step(), Ok(StepStatus::Finished));
        assert_eq!(debugger.engine().budget().executed(), 7 + 3 * 2);
    }

    #[test]
    fn step_into_and_out() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.set_font_code(&FONT_CODE);
        let mut debugger = Debugger::new(engine);
        for _ in 0..5 {
            debugger.step_into().unwrap();
        }
        // Inside the function at its first instruction
        assert_eq!(debugger.engine().call_depth(), 1);
        assert_eq!(debugger.engine().program(), Program::Font);
        assert_eq!(debugger.engine().pc(), 3);
        debugger.step_into().unwrap();
        assert_eq!(debugger.snapshot().stack, [1, 10]);
        // Return to the caller just after the CALL
        assert_eq!(debugger.step_out(), Ok(StepStatus::Running));
        assert_eq!(debugger.engine().call_depth(), 0);
        assert_eq!(debugger.engine().pc(), 12);
        assert_eq!(debugger.snapshot().stack, [11]);
        // At the top level, step out runs to the end
        assert_eq!(debugger.step_out(), Ok(StepStatus::Finished));
        assert_eq!(debugger.snapshot().stack, [12]);
    }

    #[test]
    fn observers_receive_snapshots() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.set_font_code(&FONT_CODE);
        let seen = Rc::new(RefCell::new(vec![]));
        let mut debugger = Debugger::new(engine);
        let sink = seen.clone();
        debugger.subscribe(move |snapshot: &ExecutionSnapshot| {
            sink.borrow_mut().push((snapshot.pc, snapshot.call_stack.len()));
        });
        let mut count = 0;
        debugger.subscribe(|_: &ExecutionSnapshot| count += 1);
        debugger.step().unwrap();
        debugger.step().unwrap();
        debugger.run().unwrap();
        drop(debugger);
        assert_eq!(*seen.borrow(), [(2, 0), (7, 0), (15, 0)]);
        assert_eq!(count, 3);
    }

    #[test]
    fn halts_on_error() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        let font_code = [op::PUSHB000, 1, op::POP, op::POP, op::PUSHB000, 2];
        engine.set_font_code(&font_code);
        let mut debugger = Debugger::new(engine);
        let err = debugger.run().unwrap_err();
        assert_eq!(err.kind, HintErrorKind::ValueStackUnderflow);
        assert_eq!(err.pc, 3);
        assert!(debugger.is_halted());
        // The program is not resumed after the failure
        assert_eq!(debugger.step_into(), Ok(StepStatus::Finished));
        assert_eq!(debugger.engine().pc(), 4);
        assert!(debugger.snapshot().stack.is_empty());
    }

    #[test]
    fn completed_run_updates_retained_graphics() {
        let mut retained = RetainedGraphicsState::default();
        let mut mock = MockEngine::new();
        let font_code = [op::RTHG, op::PUSHB000, 32, op::SCVTCI];
        let mut engine = mock.engine();
        engine.set_font_code(&font_code);
        // An unfinished run leaves the target alone
        let mut debugger = Debugger::new(engine).retain_graphics_into(&mut retained);
        assert_eq!(debugger.step(), Ok(StepStatus::Running));
        drop(debugger);
        assert_eq!(retained, RetainedGraphicsState::default());
        let mut engine = mock.engine();
        engine.set_font_code(&font_code);
        let mut debugger = Debugger::new(engine).retain_graphics_into(&mut retained);
        assert_eq!(debugger.run(), Ok(StepStatus::Finished));
        drop(debugger);
        assert_eq!(retained.round_state, RoundState::half_grid());
        assert_eq!(retained.control_value_cutin, F26Dot6::from_bits(32));
    }

    #[test]
    fn failed_run_keeps_retained_graphics() {
        let mut retained = RetainedGraphicsState::default();
        let mut mock = MockEngine::new();
        let font_code = [op::RTHG, op::POP];
        let mut engine = mock.engine();
        engine.set_font_code(&font_code);
        let mut debugger = Debugger::new(engine).retain_graphics_into(&mut retained);
        assert!(debugger.run().is_err());
        assert_eq!(debugger.step(), Ok(StepStatus::Finished));
        drop(debugger);
        assert_eq!(retained, RetainedGraphicsState::default());
    }

    #[test]
    fn empty_program_is_finished() {
        let mut mock = MockEngine::new();
        let engine = mock.engine();
        let mut debugger = Debugger::new(engine);
        assert_eq!(debugger.step(), Ok(StepStatus::Finished));
        assert_eq!(debugger.step_out(), Ok(StepStatus::Finished));
    }
}
