//! Client side of the Someleon HTTP API.
//!
//! [`FrameDecoder`] turns the run endpoint's SSE bytes back into
//! [`RunFrame`]s, [`RunView`] folds those frames into what a UI shows, and
//! [`ApiClient`] wraps the JSON endpoints. The `someleon ask` command is
//! built on these.
//!
//! [`RunFrame`]: sl_domain::RunFrame

pub mod api;
pub mod decoder;
pub mod render;
pub mod view;

pub use api::{ApiClient, Health, Sample, SessionDetail, SessionInfo};
pub use decoder::{FrameDecoder, SseBlock};
pub use view::{EntryKind, Indicator, RunView, TimelineEntry};
