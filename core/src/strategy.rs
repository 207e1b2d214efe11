//! The seven ways of getting a [`Pair`] back across a call.
//!
//! Dispatch on [`Case`] happens once per run, outside the measured loop;
//! each `*_n` loop below is monomorphic. Callees are `#[inline(never)]` so
//! the call boundary (and whatever carries the pair across it) is real.

use std::hint::black_box;

use serde::Serialize;

use crate::context::{Container, ExecContext, TlsSlot, UnsyncGlobalSlot};
use crate::pair::{Accumulator, B_MASK, Pair, transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Inline,
    FreshAlloc,
    ContextSlot,
    GlobalSlot,
    ThreadLocal,
    ReusedContainer,
    FreshContainer,
}

impl Case {
    /// Report order.
    pub const ALL: [Case; 7] = [
        Case::Inline,
        Case::FreshAlloc,
        Case::ContextSlot,
        Case::GlobalSlot,
        Case::ThreadLocal,
        Case::ReusedContainer,
        Case::FreshContainer,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Case::Inline => "inline",
            Case::FreshAlloc => "fresh_alloc",
            Case::ContextSlot => "context_slot",
            Case::GlobalSlot => "global_slot",
            Case::ThreadLocal => "thread_local",
            Case::ReusedContainer => "reused_container",
            Case::FreshContainer => "fresh_container",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Case::Inline => "base case: inline",
            Case::FreshAlloc => "using Box::new",
            Case::ContextSlot => "using execution context",
            Case::GlobalSlot => "using static vars (not thread-safe)",
            Case::ThreadLocal => "using thread_local!",
            Case::ReusedContainer => "using Container passed as extra arg",
            Case::FreshContainer => "using dyn alloc Container extra arg",
        }
    }

    pub fn from_key(key: &str) -> Option<Case> {
        Case::ALL.into_iter().find(|case| case.key() == key)
    }

    /// One strategy invocation for `(a, b)`.
    pub fn deliver(self, a: u32, b: u32, ctx: &mut ExecContext) -> Pair {
        match self {
            Case::Inline => transform(a, b),
            Case::FreshAlloc => *black_box(using_box(a, b)),
            Case::ContextSlot => {
                using_context(a, b, ctx);
                ctx.slot
            }
            Case::GlobalSlot => {
                using_global(a, b, ctx.global);
                ctx.global.load()
            }
            Case::ThreadLocal => {
                using_tls(a, b, ctx.tls);
                ctx.tls.get()
            }
            Case::ReusedContainer => {
                let mut c = Container::default();
                fill_container(a, b, &mut c);
                c.pair()
            }
            Case::FreshContainer => {
                let mut c = black_box(Box::new(Container::default()));
                fill_container(a, b, &mut c);
                c.pair()
            }
        }
    }

    /// Run `n` chained invocations seeded from `input`; returns `ra ^ rb`.
    pub fn drive(self, n: u64, input: u32, ctx: &mut ExecContext) -> u32 {
        match self {
            Case::Inline => inline_n(n, input),
            Case::FreshAlloc => fresh_alloc_n(n, input),
            Case::ContextSlot => context_slot_n(n, input, ctx),
            Case::GlobalSlot => global_slot_n(n, input, ctx.global),
            Case::ThreadLocal => thread_local_n(n, input, ctx.tls),
            Case::ReusedContainer => reused_container_n(n, input),
            Case::FreshContainer => fresh_container_n(n, input),
        }
    }
}

impl std::fmt::Display for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[inline(never)]
fn using_box(a: u32, b: u32) -> Box<Pair> {
    Box::new(transform(a, b))
}

#[inline(never)]
fn using_context(a: u32, b: u32, ctx: &mut ExecContext) {
    ctx.slot = transform(a, b);
}

#[inline(never)]
fn using_global(a: u32, b: u32, slot: UnsyncGlobalSlot) {
    slot.store(transform(a, b));
}

#[inline(never)]
fn using_tls(a: u32, b: u32, slot: TlsSlot) {
    slot.set(transform(a, b));
}

/// Callee of both container strategies: overwrite `c` with the result.
#[inline(never)]
pub fn fill_container(a: u32, b: u32, c: &mut Container) {
    let p = transform(a, b);
    c.a = p.a;
    c.b = p.b;
}

fn inline_n(n: u64, input: u32) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        let a = acc.ra;
        let b = acc.rb;
        let a1 = a.rotate_left(7) ^ b;
        let b1 = b ^ B_MASK;
        acc.ra ^= b1;
        acc.rb ^= a1;
    }
    acc.finish()
}

fn fresh_alloc_n(n: u64, input: u32) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        let t = black_box(using_box(acc.ra, acc.rb));
        acc.fold(*t);
    }
    acc.finish()
}

fn context_slot_n(n: u64, input: u32, ctx: &mut ExecContext) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        using_context(acc.ra, acc.rb, ctx);
        acc.fold(ctx.slot);
    }
    acc.finish()
}

fn global_slot_n(n: u64, input: u32, slot: UnsyncGlobalSlot) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        using_global(acc.ra, acc.rb, slot);
        acc.fold(slot.load());
    }
    acc.finish()
}

fn thread_local_n(n: u64, input: u32, slot: TlsSlot) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        using_tls(acc.ra, acc.rb, slot);
        acc.fold(slot.get());
    }
    acc.finish()
}

fn reused_container_n(n: u64, input: u32) -> u32 {
    let mut c = Container::default();
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        fill_container(acc.ra, acc.rb, &mut c);
        acc.fold(c.pair());
    }
    acc.finish()
}

fn fresh_container_n(n: u64, input: u32) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        // allocated per iteration; black_box keeps the Box from being scalarised
        let mut c = black_box(Box::new(Container::default()));
        fill_container(acc.ra, acc.rb, &mut c);
        acc.fold(c.pair());
    }
    acc.finish()
}
