//! Arithmetic and math instructions.
//!
//! Implements 10 instructions.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#arithmetic-and-math-instructions>

use super::{super::fixed::F26Dot6, Engine, HintErrorKind, OpResult};

impl<'a> Engine<'a> {
    /// ADD[] (0x60)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 + n1)
    ///
    /// Pops n1 and n2 off the stack and pushes the sum of the two elements
    /// onto the stack.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#add>
    pub(super) fn op_add(&mut self) -> OpResult {
        self.value_stack.fold_top(|a, b| Ok(a.wrapping_add(b)))
    }

    /// SUB[] (0x61)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 - n1)
    ///
    /// Pops n1 and n2 off the stack and pushes the difference of the two
    /// elements onto the stack.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#subtract>
    pub(super) fn op_sub(&mut self) -> OpResult {
        self.value_stack.fold_top(|a, b| Ok(a.wrapping_sub(b)))
    }

    /// DIV[] (0x62)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 * 64)/n1
    ///
    /// Pops n1 and n2 off the stack and pushes onto the stack the quotient
    /// obtained by dividing n2 by n1. A zero divisor is an error.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#divide>
    pub(super) fn op_div(&mut self) -> OpResult {
        self.value_stack.fold_top(|a, b| {
            F26Dot6::from_bits(a as i64)
                .checked_div(F26Dot6::from_bits(b as i64))
                .map(F26Dot6::to_i32_bits)
                .ok_or(HintErrorKind::DivideByZero)
        })
    }

    /// MUL[] (0x63)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 * n1)/64
    ///
    /// Pops n1 and n2 off the stack and pushes onto the stack the product of
    /// the two elements, rounded to the nearest 26.6 value.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#multiply>
    pub(super) fn op_mul(&mut self) -> OpResult {
        self.value_stack.fold_top(|a, b| {
            Ok(F26Dot6::from_bits(a as i64)
                .mul(F26Dot6::from_bits(b as i64))
                .to_i32_bits())
        })
    }

    /// ABS[] (0x64)
    ///
    /// Pops: n
    /// Pushes: |n|: absolute value of n (F26Dot6)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#absolute-value>
    pub(super) fn op_abs(&mut self) -> OpResult {
        self.value_stack.map_top(|n| Ok(n.wrapping_abs()))
    }

    /// NEG[] (0x65)
    ///
    /// Pops: n1
    /// Pushes: -n1: negation of n1 (F26Dot6)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#negate>
    pub(super) fn op_neg(&mut self) -> OpResult {
        self.value_stack.map_top(|n| Ok(n.wrapping_neg()))
    }

    /// FLOOR[] (0x66)
    ///
    /// Pops: n1: number whose floor is desired (F26Dot6)
    /// Pushes: n: floor of n1 (F26Dot6)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#floor>
    pub(super) fn op_floor(&mut self) -> OpResult {
        self.value_stack
            .map_top(|n| Ok(F26Dot6::from_bits(n as i64).floor().to_i32_bits()))
    }

    /// CEILING[] (0x67)
    ///
    /// Pops: n1: number whose ceiling is desired (F26Dot6)
    /// Pushes: n: ceiling of n1 (F26Dot6)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#ceiling>
    pub(super) fn op_ceiling(&mut self) -> OpResult {
        self.value_stack
            .map_top(|n| Ok(F26Dot6::from_bits(n as i64).ceil().to_i32_bits()))
    }

    /// MAX[] (0x8B)
    ///
    /// Pops: e1, e2
    /// Pushes: maximum of e1 and e2
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#maximum-of-top-two-stack-elements>
    pub(super) fn op_max(&mut self) -> OpResult {
        self.value_stack.fold_top(|a, b| Ok(a.max(b)))
    }

    /// MIN[] (0x8C)
    ///
    /// Pops: e1, e2
    /// Pushes: minimum of e1 and e2
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#minimum-of-top-two-stack-elements>
    pub(super) fn op_min(&mut self) -> OpResult {
        self.value_stack.fold_top(|a, b| Ok(a.min(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{HintErrorKind, MockEngine};

    /// Test the binary operations that don't require fixed point
    /// arithmetic.
    #[test]
    fn simple_binops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for a in -10..=10 {
            for b in -10..=10 {
                let input = &[a, b];
                engine.test_exec(input, a + b, |engine| engine.op_add());
                engine.test_exec(input, a - b, |engine| engine.op_sub());
                engine.test_exec(input, a.max(b), |engine| engine.op_max());
                engine.test_exec(input, a.min(b), |engine| engine.op_min());
            }
        }
    }

    /// Test the unary operations that don't require fixed point
    /// arithmetic.
    #[test]
    fn simple_unops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for a in -10..=10 {
            let input = &[a];
            engine.test_exec(input, -a, |engine| engine.op_neg());
            engine.test_exec(input, a.abs(), |engine| engine.op_abs());
        }
    }

    #[test]
    fn f26dot6_binops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // 1.5 / 0.5 == 3
        engine.test_exec(&[96, 32], 192, |engine| engine.op_div());
        // -1 / 3 truncates toward zero
        engine.test_exec(&[-64, 192], -21, |engine| engine.op_div());
        // 1.5 * 0.5 == 0.75
        engine.test_exec(&[96, 32], 48, |engine| engine.op_mul());
        // 1/64 * 1/64 rounds to zero
        engine.test_exec(&[1, 1], 0, |engine| engine.op_mul());
        engine.test_exec(&[-128, 96], -192, |engine| engine.op_mul());
    }

    #[test]
    fn divide_by_zero() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.value_stack.push(64).unwrap();
        engine.value_stack.push(0).unwrap();
        assert_eq!(engine.op_div(), Err(HintErrorKind::DivideByZero));
    }

    #[test]
    fn f26dot6_unops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for (input, floor, ceiling) in [
            (0, 0, 0),
            (1, 0, 64),
            (63, 0, 64),
            (64, 64, 64),
            (100, 64, 128),
            (-1, -64, 0),
            (-64, -64, -64),
            (-100, -128, -64),
        ] {
            engine.test_exec(&[input], floor, |engine| engine.op_floor());
            engine.test_exec(&[input], ceiling, |engine| engine.op_ceiling());
        }
    }
}
