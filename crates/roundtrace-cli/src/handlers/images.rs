use anyhow::Result;

use super::{emit, load_session, require_round};
use crate::args::LogArgs;
use crate::context::ExecutionContext;
use crate::presentation::text::render_images;
use crate::presentation::views::ImagesView;

pub fn handle(log: &LogArgs, round: usize, ctx: &ExecutionContext) -> Result<()> {
    let reconstruction = load_session(log)?;
    require_round(&reconstruction.session, round)?;

    let view = ImagesView::from_session(&reconstruction.session, round);
    emit(ctx, &view, render_images)
}
