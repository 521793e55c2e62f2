//! Sample logs shipped with this crate.
//!
//! `claude_session.jsonl` is a two-round session that exercises every
//! decoder path the other crates care about:
//! - a snapshot record before the first prompt (preamble)
//! - a resolved call, a failed call and a call that never resolves
//! - a `thinking` block, an invalid JSON line and an orphan result
//! - an inline image referenced as `[Image #1]`

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CLAUDE_SESSION: &str = "claude_session.jsonl";

/// Sample file manager for test data.
pub struct SampleFiles {
    samples_dir: PathBuf,
}

impl Default for SampleFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleFiles {
    /// Samples live in `crates/roundtrace-testing/samples/`.
    pub fn new() -> Self {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            samples_dir: manifest_dir.join("samples"),
        }
    }

    pub fn path(&self, sample_name: &str) -> PathBuf {
        self.samples_dir.join(sample_name)
    }

    pub fn read(&self, sample_name: &str) -> Result<String> {
        let path = self.path(sample_name);
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read sample {}", path.display()))
    }

    /// Copy a sample file to a destination.
    pub fn copy_to(&self, sample_name: &str, dest: &Path) -> Result<()> {
        fs::copy(self.path(sample_name), dest)
            .with_context(|| format!("Failed to copy sample {}", sample_name))?;
        Ok(())
    }
}
