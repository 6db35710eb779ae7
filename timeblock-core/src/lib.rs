//! timeblock-core: work-backward schedule calculation.
//!
//! Given a fixed event time and the tasks that must happen before it, compute
//! when each task starts and when to wake up. Pure and synchronous; callers
//! supply fully-formed inputs and receive a new [`Schedule`] per call.

pub mod error;
pub mod schedule;
pub mod task;
pub mod time;

pub use error::ValidationError;
pub use schedule::{compute_schedule, Block, BlockKind, Schedule, ScheduleRequest};
pub use task::{parse_duration_minutes, Anchor, Buffer, BufferKind, Task, DEFAULT_ANCHOR_LABEL};
pub use time::{local_to_utc, ClockTime, MINUTES_PER_DAY};
