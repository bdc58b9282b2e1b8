pub mod advisory;
pub mod frame_source;
pub mod sink;

pub use advisory::{
    advise_or_fallback, AdvisoryError, AdvisoryNote, AdvisoryRequest, AdvisoryService, Severity,
};
pub use frame_source::{frame_at, ClipSource, FrameSource};
pub use sink::{NullSink, PresentationSink, TickFrame};
