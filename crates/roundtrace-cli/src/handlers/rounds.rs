use anyhow::Result;

use super::{emit, load_session};
use crate::args::LogArgs;
use crate::context::ExecutionContext;
use crate::presentation::text::render_rounds;
use crate::presentation::views::RoundsView;

pub fn handle(log: &LogArgs, ctx: &ExecutionContext) -> Result<()> {
    let reconstruction = load_session(log)?;
    let view = RoundsView::from_session(&reconstruction.session, ctx.preview_chars);
    emit(ctx, &view, render_rounds)
}
