use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::strategy::Case;

/// Knobs for the self-timed runner.
///
/// Every field has a default, so an empty TOML file (or none at all) gives the
/// stock 500 ms warmup / 3 s measurement run over every case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Minimum accumulated time per case during the warmup pass.
    pub warmup_ms: u64,
    /// Minimum accumulated time per case during the measurement pass.
    pub measure_ms: u64,
    /// Iteration count of the first round; doubled every round after.
    pub start_iterations: u64,
    /// Case keys to run, in report order. Empty means all.
    pub cases: Vec<String>,
    /// Time the allocator as well as counting it.
    pub alloc_timing: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 500,
            measure_ms: 3000,
            start_iterations: 256,
            cases: Vec::new(),
            alloc_timing: false,
        }
    }
}

impl BenchConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).context("parse benchmark config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src =
            std::fs::read_to_string(path).with_context(|| format!("read config file {}", path.display()))?;
        Self::from_toml_str(&src).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.measure_ms == 0 {
            bail!("measure_ms must be greater than zero");
        }
        if self.start_iterations == 0 {
            bail!("start_iterations must be greater than zero");
        }
        self.selected_cases()?;
        Ok(())
    }

    /// Resolve `cases` into [`Case`]s, keeping [`Case::ALL`] order and
    /// dropping duplicates.
    pub fn selected_cases(&self) -> Result<Vec<Case>> {
        if self.cases.is_empty() {
            return Ok(Case::ALL.to_vec());
        }
        let mut wanted = Vec::with_capacity(self.cases.len());
        for key in &self.cases {
            match Case::from_key(key.trim()) {
                Some(case) => wanted.push(case),
                None => {
                    let known: Vec<&str> = Case::ALL.iter().map(|c| c.key()).collect();
                    bail!("unknown case '{}' (known: {})", key, known.join(", "));
                }
            }
        }
        Ok(Case::ALL.into_iter().filter(|c| wanted.contains(c)).collect())
    }

    pub fn warmup_time(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn measure_time(&self) -> Duration {
        Duration::from_millis(self.measure_ms)
    }
}
