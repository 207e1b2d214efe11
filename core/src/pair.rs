//! The pair payload every strategy delivers.
//!
//! The work done per call is deliberately tiny so the measured cost is
//! dominated by how the two results travel back to the caller.

/// Constant folded into the second half of every transform.
pub const B_MASK: u32 = 0xAAAA_5555;

/// Two 32-bit results produced by a single strategy invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pair {
    pub a: u32,
    pub b: u32,
}

impl Pair {
    #[inline(always)]
    pub const fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }
}

/// `(a, b) -> (rotl(a, 7) ^ b, b ^ B_MASK)`.
#[inline(always)]
pub const fn transform(a: u32, b: u32) -> Pair {
    Pair {
        a: a.rotate_left(7) ^ b,
        b: b ^ B_MASK,
    }
}

/// Running accumulators threaded through a measurement loop.
///
/// Each iteration feeds the previous result back in, so no call can be
/// hoisted or elided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    pub ra: u32,
    pub rb: u32,
}

impl Accumulator {
    /// Seed both halves from one observed input.
    #[inline(always)]
    pub const fn seed(input: u32) -> Self {
        Self {
            ra: input,
            rb: input.rotate_left(16),
        }
    }

    /// Cross-fold a delivered pair: `ra ^= b1`, `rb ^= a1`.
    #[inline(always)]
    pub fn fold(&mut self, delivered: Pair) {
        self.ra ^= delivered.b;
        self.rb ^= delivered.a;
    }

    #[inline(always)]
    pub const fn finish(self) -> u32 {
        self.ra ^ self.rb
    }
}

/// Reference fold computed straight from [`transform`], used to check that
/// every strategy chains accumulators identically.
pub fn reference_chain(n: u64, input: u32) -> u32 {
    let mut acc = Accumulator::seed(input);
    for _ in 0..n {
        acc.fold(transform(acc.ra, acc.rb));
    }
    acc.finish()
}
