use anyhow::Result;

use super::{emit, load_session};
use crate::args::LogArgs;
use crate::context::ExecutionContext;
use crate::presentation::text::render_stats;
use crate::presentation::views::StatsView;

pub fn handle(log: &LogArgs, ctx: &ExecutionContext) -> Result<()> {
    let reconstruction = load_session(log)?;
    let view = StatsView::from_session(&reconstruction.session, ctx.window);
    emit(ctx, &view, render_stats)
}
