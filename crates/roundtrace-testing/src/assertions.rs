//! Custom assertions for roundtrace JSON output.
//!
//! Provides high-level assertions that make CLI tests more readable:
//! - Round count validation
//! - Tool invocation status checks

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert that `rounds` JSON output contains the expected number of rounds.
pub fn assert_round_count(json: &Value, expected: usize) -> Result<()> {
    let rounds = json["rounds"]
        .as_array()
        .context("Expected 'rounds' array in JSON")?;

    if rounds.len() != expected {
        anyhow::bail!("Expected {} rounds, got {}", expected, rounds.len());
    }

    Ok(())
}

/// Assert that the invocation `id` in `tools` JSON output has `status`.
pub fn assert_invocation_status(json: &Value, id: &str, status: &str) -> Result<()> {
    let invocations = json["invocations"]
        .as_array()
        .context("Expected 'invocations' array in JSON")?;

    let invocation = invocations
        .iter()
        .find(|inv| inv["id"] == id)
        .with_context(|| format!("No invocation with id {}", id))?;

    let actual = invocation["status"]
        .as_str()
        .with_context(|| format!("Invocation {} missing status", id))?;

    if actual != status {
        anyhow::bail!("Invocation {} is {} but expected {}", id, actual, status);
    }

    Ok(())
}
