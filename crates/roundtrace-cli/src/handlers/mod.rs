pub mod images;
pub mod issues;
pub mod rounds;
pub mod stats;
pub mod summary;
pub mod tools;

use anyhow::{Context, Result};
use roundtrace_engine::{Reconstruction, Round, Session, reconstruct_from_jsonl};
use serde::Serialize;

use crate::args::LogArgs;
use crate::config::OutputFormat;
use crate::context::ExecutionContext;
use crate::presentation::Painter;

/// Read and reconstruct the log named on the command line
pub(crate) fn load_session(log: &LogArgs) -> Result<Reconstruction> {
    let text = std::fs::read_to_string(&log.path)
        .with_context(|| format!("Failed to read log {}", log.path.display()))?;

    let session_id = log.session.clone().unwrap_or_else(|| {
        log.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    });
    let project_id = log.project.clone().unwrap_or_else(|| {
        log.path
            .canonicalize()
            .ok()
            .and_then(|path| {
                path.parent()
                    .and_then(|dir| dir.file_name())
                    .map(|name| name.to_string_lossy().to_string())
            })
            .unwrap_or_default()
    });

    let reconstruction = reconstruct_from_jsonl(project_id, session_id, &text);
    if !reconstruction.issues.is_empty() {
        tracing::info!(
            issues = reconstruction.issues.len(),
            "some records were skipped; run `roundtrace issues` for details"
        );
    }
    Ok(reconstruction)
}

pub(crate) fn require_round(session: &Session, index: usize) -> Result<&Round> {
    session.round(index).with_context(|| {
        format!(
            "Round {} not found (session has {} rounds)",
            index,
            session.rounds.len()
        )
    })
}

/// Print `view` as pretty JSON or through its text renderer
pub(crate) fn emit<T: Serialize>(
    ctx: &ExecutionContext,
    view: &T,
    render: impl FnOnce(&T, &Painter) -> String,
) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => println!("{}", render(view, &Painter::new(ctx.color))),
    }
    Ok(())
}
