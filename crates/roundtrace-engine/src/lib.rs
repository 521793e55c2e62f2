// Engine - rebuilds conversation structure from decoded messages
// Pure and synchronous: no I/O, no shared state. Presentation lives in the CLI.

pub mod classify;
pub mod correlation;
pub mod format;
pub mod images;
pub mod ports;
pub mod session;
pub mod summary;

pub use classify::{MessageKind, classify, is_real_user_prompt};
pub use correlation::{
    Correlation, CorrelationReport, InvocationStatus, ToolCorrelator, ToolInvocation, correlate,
    correlate_with_report,
};
pub use format::{format_cost, format_duration_ms, format_tokens, tool_summary, truncate_preview};
pub use images::{
    ExtractedImage, ImageReference, extract_images, find_image_references, resolve_image,
    resolve_image_references,
};
pub use ports::{
    ClipboardSink, PortError, SnapshotKey, SnapshotSource, SummaryBuffer, SummaryObserver,
    SummaryStreamer, copy_round, fetch_round_snapshots, request_round_summary, snapshot_keys,
};
pub use session::{
    CorrelationWindow, Reconstruction, Round, RoundStats, Segmentation, Session, SessionStats,
    TokenTotals, ToolCounts, assemble_session, reconstruct_from_jsonl, segment, segment_rounds,
};
pub use summary::{SummaryPayload, round_transcript, summary_payload};
