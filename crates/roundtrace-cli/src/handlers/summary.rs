use anyhow::Result;
use roundtrace_engine::summary_payload;

use super::{emit, load_session, require_round};
use crate::args::LogArgs;
use crate::context::ExecutionContext;

pub fn handle(log: &LogArgs, round: usize, ctx: &ExecutionContext) -> Result<()> {
    let reconstruction = load_session(log)?;
    let round = require_round(&reconstruction.session, round)?;

    let payload = summary_payload(round);
    emit(ctx, &payload, |payload, _| payload.transcript.clone())
}
