//! Host-facing data model
//!
//! The shapes the host media application sees. The backend's own wire
//! entities live in [`crate::backend::types`]; translation between the two
//! happens in the service layer.

pub mod channel;
pub mod stream;
pub mod timer;

pub use channel::{ChannelInfo, ProgramInfo, RecordingInfo};
pub use stream::{StreamSession, StreamTransport};
pub use timer::{SeriesTimerRequest, TimerRequest, TimerStatus};
