pub mod alloc_stats;
pub mod config;
pub mod context;
pub mod pair;
pub mod sink;
pub mod strategy;

// Self-timed runner and harness-hosted units share the strategies above
pub mod hosted;
pub mod runner;

#[cfg(test)]
mod pair_test;
#[cfg(test)]
mod runner_test;
#[cfg(test)]
mod test_support;

pub use config::BenchConfig;
pub use context::ExecContext;
pub use pair::{Pair, transform};
pub use runner::{CaseReport, Pass, RunEvent, Runner};
pub use sink::Sink;
pub use strategy::Case;
