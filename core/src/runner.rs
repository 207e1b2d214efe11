//! Self-timed runner: warmup pass, measurement pass, one report per case.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::alloc_stats::{self, HeapCounters};
use crate::config::BenchConfig;
use crate::context::ExecContext;
use crate::sink::Sink;
use crate::strategy::Case;

/// Width the case labels are padded to in text reports.
const LABEL_WIDTH: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Results discarded; lets the code paths settle.
    Warmup,
    Measure,
}

/// Accumulated result of one [`measure`] loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Measurement {
    pub total_time: Duration,
    pub total_iterations: u64,
    /// Iteration count of each round, in order.
    pub rounds: Vec<u64>,
}

impl Measurement {
    pub fn ns_per_iteration(&self) -> f64 {
        if self.total_iterations == 0 {
            return 0.0;
        }
        self.total_time.as_nanos() as f64 / self.total_iterations as f64
    }
}

/// Call `subject(n)` with `n = start, 2*start, 4*start, ...` until the
/// reported durations add up to at least `min_time`.
///
/// `subject` returns how long its `n` iterations took. A zero `min_time`
/// runs no rounds.
pub fn measure<F>(start_iterations: u64, min_time: Duration, mut subject: F) -> Measurement
where
    F: FnMut(u64) -> Duration,
{
    let mut m = Measurement::default();
    let mut n = start_iterations.max(1);
    while m.total_time < min_time {
        let t = subject(n);
        m.total_time += t;
        m.total_iterations = m.total_iterations.saturating_add(n);
        m.rounds.push(n);
        n = n.saturating_mul(2);
    }
    m
}

/// Time one round of `n` chained calls of `case`, seeded from and drained
/// into `sink`.
pub fn time_case(case: Case, n: u64, ctx: &mut ExecContext, sink: &mut Sink) -> Duration {
    let start = Instant::now();
    let res = case.drive(n, sink.produce(), ctx);
    sink.consume(res);
    start.elapsed()
}

/// One line of the measurement pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub case: Case,
    pub label: &'static str,
    pub ns_per_iteration: f64,
    pub heap_events: u64,
    pub heap_ms: u64,
    pub heap_percent: f64,
    pub total_iterations: u64,
    pub total_ms: u64,
}

impl CaseReport {
    pub fn new(case: Case, m: &Measurement, heap: HeapCounters) -> Self {
        let total_nanos = m.total_time.as_nanos() as f64;
        let heap_percent = if total_nanos > 0.0 {
            100.0 * heap.nanos as f64 / total_nanos
        } else {
            0.0
        };
        Self {
            case,
            label: case.label(),
            ns_per_iteration: m.ns_per_iteration(),
            heap_events: heap.events,
            heap_ms: heap.millis(),
            heap_percent,
            total_iterations: m.total_iterations,
            total_ms: m.total_time.as_millis() as u64,
        }
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<width$}: {:7.3}ns/it; GC: #{} {}ms {:2.2}%; {} iters",
            self.label,
            self.ns_per_iteration,
            self.heap_events,
            self.heap_ms,
            self.heap_percent,
            self.total_iterations,
            width = LABEL_WIDTH
        )
    }
}

/// Drives the selected cases through a warmup and a measurement pass.
///
/// Construct it on the execution unit that will run it: the [`ExecContext`]
/// it owns is that unit's slot.
pub struct Runner {
    config: BenchConfig,
    cases: Vec<Case>,
    ctx: ExecContext,
    sink: Sink,
}

impl Runner {
    pub fn new(config: BenchConfig, ctx: ExecContext, sink: Sink) -> Result<Self> {
        config.validate()?;
        let cases = config.selected_cases()?;
        alloc_stats::set_timing(config.alloc_timing);
        Ok(Self {
            config,
            cases,
            ctx,
            sink,
        })
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Run one case to its minimum time; the report is built only for
    /// [`Pass::Measure`].
    pub fn run_case(&mut self, case: Case, pass: Pass) -> Option<CaseReport> {
        let min_time = match pass {
            Pass::Warmup => self.config.warmup_time(),
            Pass::Measure => self.config.measure_time(),
        };
        let before = HeapCounters::snapshot();
        let ctx = &mut self.ctx;
        let sink = &mut self.sink;
        let m = measure(self.config.start_iterations, min_time, |n| time_case(case, n, ctx, sink));
        let heap = HeapCounters::snapshot().since(&before);
        debug!(
            case = case.key(),
            ?pass,
            rounds = m.rounds.len(),
            iterations = m.total_iterations,
            elapsed_ms = m.total_time.as_millis() as u64,
            heap_events = heap.events,
            "case finished"
        );
        match pass {
            Pass::Warmup => None,
            Pass::Measure => Some(CaseReport::new(case, &m, heap)),
        }
    }

    /// Run every selected case once for `pass`, calling `on_report` as each
    /// measured case completes.
    pub fn run_pass_with<F>(&mut self, pass: Pass, mut on_report: F) -> Vec<CaseReport>
    where
        F: FnMut(&CaseReport),
    {
        info!(?pass, cases = self.cases.len(), "starting pass");
        let cases = self.cases.clone();
        let mut reports = Vec::new();
        for case in cases {
            if let Some(report) = self.run_case(case, pass) {
                on_report(&report);
                reports.push(report);
            }
        }
        reports
    }

    pub fn run_pass(&mut self, pass: Pass) -> Vec<CaseReport> {
        self.run_pass_with(pass, |_| {})
    }

    /// Warmup then measurement. `on_event` sees the pass banners
    /// (`"warmup..."`, `"testing..."`) and each finished report.
    pub fn run_with<F>(&mut self, mut on_event: F) -> Vec<CaseReport>
    where
        F: FnMut(RunEvent<'_>),
    {
        on_event(RunEvent::Banner("warmup..."));
        self.run_pass(Pass::Warmup);
        on_event(RunEvent::Banner("testing..."));
        let reports = self.run_pass_with(Pass::Measure, |r| on_event(RunEvent::Report(r)));
        std::hint::black_box(self.sink.value());
        reports
    }

    pub fn run(&mut self) -> Vec<CaseReport> {
        self.run_with(|_| {})
    }
}

/// Progress notifications from [`Runner::run_with`].
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    Banner(&'static str),
    Report(&'a CaseReport),
}
