pub mod assembler;
pub mod round_builder;
pub mod segmenter;
pub mod stats;
pub mod types;

pub use assembler::{Reconstruction, assemble_session, reconstruct_from_jsonl};
pub use segmenter::{segment, segment_rounds};
pub use stats::{calculate_round_stats, calculate_session_stats, token_totals, tool_counts};
pub use types::{
    CorrelationWindow, Round, RoundStats, Segmentation, Session, SessionStats, TokenTotals,
    ToolCounts,
};
