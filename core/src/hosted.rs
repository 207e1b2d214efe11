//! Single-invocation units for an external statistical harness.
//!
//! Criterion owns warmup, iteration counts and statistics; each unit here
//! performs exactly one strategy invocation on fixed inputs and hands both
//! results to a [`Consume`] sink. Nothing amortisable is hoisted out of a
//! unit: `fresh_container` allocates inside the call.

use std::hint::black_box;

use crate::context::{Container, ExecContext};
use crate::strategy::{Case, fill_container};

/// Fixed inputs shared by every hosted unit.
pub const XA: u32 = 0x1234_5678;
pub const XB: u32 = 0x9abc_def0;

/// Side-effecting consumer for hosted results.
pub trait Consume {
    fn consume_u32(&mut self, v: u32);
}

/// Consumes via [`black_box`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BlackHole;

impl Consume for BlackHole {
    #[inline(always)]
    fn consume_u32(&mut self, v: u32) {
        black_box(v);
    }
}

impl Consume for Vec<u32> {
    fn consume_u32(&mut self, v: u32) {
        self.push(v);
    }
}

/// Per-thread state of the hosted units.
#[derive(Debug)]
pub struct HostedState {
    pub xa: u32,
    pub xb: u32,
    container: Container,
    ctx: ExecContext,
}

impl HostedState {
    pub fn new() -> Self {
        Self::with_inputs(XA, XB)
    }

    pub fn with_inputs(xa: u32, xb: u32) -> Self {
        Self {
            xa,
            xb,
            container: Container::default(),
            ctx: ExecContext::new(),
        }
    }

    /// One invocation of `case`; consumes `a1` then `b1`.
    #[inline]
    pub fn invoke<C: Consume>(&mut self, case: Case, sink: &mut C) {
        let (a, b) = (black_box(self.xa), black_box(self.xb));
        let p = match case {
            Case::ReusedContainer => {
                fill_container(a, b, &mut self.container);
                self.container.pair()
            }
            other => other.deliver(a, b, &mut self.ctx),
        };
        sink.consume_u32(p.a);
        sink.consume_u32(p.b);
    }
}

impl Default for HostedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Benchmark id used when registering `case` with the harness.
pub fn bench_name(case: Case) -> String {
    format!("pair_return/{}", case.key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::transform;
    use crate::test_support::global_slot_guard;

    #[test]
    fn test_every_unit_consumes_fixture_pair() {
        let _guard = global_slot_guard();
        let expected = transform(XA, XB);
        let mut state = HostedState::new();
        for case in Case::ALL {
            let mut seen = Vec::new();
            state.invoke(case, &mut seen);
            assert_eq!(seen, vec![expected.a, expected.b], "case {}", case);
        }
        assert_eq!(expected.a, 0x8097_E2F9);
        assert_eq!(expected.b, 0x3016_8BA5);
    }

    #[test]
    fn test_units_are_repeatable() {
        let _guard = global_slot_guard();
        let mut state = HostedState::with_inputs(7, 11);
        for case in Case::ALL {
            let mut first = Vec::new();
            let mut second = Vec::new();
            state.invoke(case, &mut first);
            state.invoke(case, &mut second);
            assert_eq!(first, second, "case {}", case);
        }
    }

    #[test]
    fn test_bench_names_use_keys() {
        assert_eq!(bench_name(Case::FreshContainer), "pair_return/fresh_container");
        let mut hole = BlackHole;
        HostedState::new().invoke(Case::Inline, &mut hole);
    }
}
