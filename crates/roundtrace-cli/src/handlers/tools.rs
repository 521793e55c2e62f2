use anyhow::Result;

use super::{emit, load_session, require_round};
use crate::args::LogArgs;
use crate::context::ExecutionContext;
use crate::presentation::text::render_tools;
use crate::presentation::views::ToolsView;

pub fn handle(log: &LogArgs, round: Option<usize>, ctx: &ExecutionContext) -> Result<()> {
    let reconstruction = load_session(log)?;
    let session = &reconstruction.session;
    if let Some(index) = round {
        require_round(session, index)?;
    }

    let view = ToolsView::from_session(session, round, ctx.window, ctx.preview_chars);
    emit(ctx, &view, render_tools)
}
