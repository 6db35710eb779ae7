//! Backward schedule calculator.
//!
//! Starting from the anchor, every buffer and task is laid out in front of the
//! previous one, so the last task ends exactly when the first buffer begins
//! and the last buffer ends at the anchor. Positions that fall before midnight
//! are wrapped onto the clock and carry a negative `day_offset`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::task::{checked_minutes, Anchor, Buffer, Task};
use crate::time::{ClockTime, MINUTES_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Event,
    Buffer,
    Task,
}

/// One interval of the output timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub label: String,
    pub start: ClockTime,
    /// 0 on the anchor's day, -1 on the day before, and so on.
    pub day_offset: i64,
    /// Minutes.
    pub duration: u32,
    pub kind: BlockKind,
}

impl Block {
    /// Position on an unwrapped timeline where the anchor's midnight is 0.
    pub fn absolute_minutes(&self) -> i64 {
        self.day_offset * i64::from(MINUTES_PER_DAY) + i64::from(self.start.minutes())
    }

    pub fn absolute_end(&self) -> i64 {
        self.absolute_minutes() + i64::from(self.duration)
    }
}

/// A computed timeline, chronological with the anchor last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub blocks: Vec<Block>,
    /// Wake-up time: start of the earliest block.
    pub start_time: ClockTime,
    pub start_day_offset: i64,
    /// Minutes across all non-anchor blocks.
    pub total_duration: u64,
    /// True when the wake-up time falls on an earlier day than the anchor.
    pub spans_midnight: bool,
}

impl Schedule {
    pub fn anchor(&self) -> &Block {
        // The calculator always emits the anchor block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn wake_up(&self) -> ClockTime {
        self.start_time
    }

    /// Blocks other than the anchor, in chronological order.
    pub fn activities(&self) -> &[Block] {
        &self.blocks[..self.blocks.len() - 1]
    }
}

/// Immutable input for one computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub anchor: Anchor,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
}

impl ScheduleRequest {
    pub fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            tasks: Vec::new(),
            buffers: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_buffer(mut self, buffer: Buffer) -> Self {
        self.buffers.push(buffer);
        self
    }

    pub fn compute(&self) -> Result<Schedule> {
        compute_schedule(&self.anchor, &self.tasks, &self.buffers)
    }
}

/// Lay out `tasks` then `buffers` so that they finish exactly at `anchor.time`.
///
/// All durations are checked before any block is produced. Positions are
/// counted from the first task (1-based), continuing through the buffers.
pub fn compute_schedule(anchor: &Anchor, tasks: &[Task], buffers: &[Buffer]) -> Result<Schedule> {
    let mut items: Vec<(&str, u32, BlockKind)> = Vec::with_capacity(tasks.len() + buffers.len());
    for (i, t) in tasks.iter().enumerate() {
        items.push((t.name.as_str(), checked_minutes(&t.name, i + 1, t.duration)?, BlockKind::Task));
    }
    for (i, b) in buffers.iter().enumerate() {
        let position = tasks.len() + i + 1;
        items.push((b.label.as_str(), checked_minutes(&b.label, position, b.duration)?, BlockKind::Buffer));
    }

    let mut cursor = i64::from(anchor.time.minutes());
    let mut blocks = Vec::with_capacity(items.len() + 1);
    blocks.push(Block {
        label: anchor.label.clone(),
        start: anchor.time,
        day_offset: 0,
        duration: 0,
        kind: BlockKind::Event,
    });

    let mut total: u64 = 0;
    for (label, minutes, kind) in items.into_iter().rev() {
        cursor -= i64::from(minutes);
        total += u64::from(minutes);
        let (start, day_offset) = ClockTime::wrapping(cursor);
        blocks.push(Block {
            label: label.to_string(),
            start,
            day_offset,
            duration: minutes,
            kind,
        });
    }
    blocks.reverse();

    let (start_time, start_day_offset) = ClockTime::wrapping(cursor);

    Ok(Schedule {
        blocks,
        start_time,
        start_day_offset,
        total_duration: total,
        spans_midnight: start_day_offset < 0,
    })
}
