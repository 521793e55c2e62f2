use anyhow::Result;

use super::{emit, load_session};
use crate::args::LogArgs;
use crate::context::ExecutionContext;
use crate::presentation::text::render_issues;
use crate::presentation::views::IssuesView;

pub fn handle(log: &LogArgs, ctx: &ExecutionContext) -> Result<()> {
    let reconstruction = load_session(log)?;
    let view = IssuesView {
        messages: reconstruction.session.messages.len(),
        issues: reconstruction.issues,
    };
    emit(ctx, &view, render_issues)
}
