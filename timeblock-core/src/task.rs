//! Input model: the anchor event, preparatory tasks and fixed buffers.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::time::ClockTime;

pub const DEFAULT_ANCHOR_LABEL: &str = "Arrive at destination";

/// The fixed event the schedule is built backward from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub time: ClockTime,
    pub label: String,
}

impl Anchor {
    pub fn new(time: ClockTime, label: impl Into<String>) -> Self {
        let label = label.into();
        let label = if label.trim().is_empty() {
            DEFAULT_ANCHOR_LABEL.to_string()
        } else {
            label
        };
        Self { time, label }
    }

    /// Build an anchor from an `HH:MM` string.
    pub fn parse(time: &str, label: impl Into<String>) -> Result<Self> {
        Ok(Self::new(ClockTime::parse(time)?, label))
    }
}

/// A preparatory task, in execution order.
///
/// `duration` is kept signed so a negative value survives until validation
/// rather than being lost in a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Minutes.
    pub duration: i64,
}

impl Task {
    pub fn new(name: impl Into<String>, duration: i64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    /// Build a task from a textual duration such as a form field.
    pub fn parse(name: impl Into<String>, duration: &str) -> Result<Self> {
        let name = name.into();
        let minutes = parse_duration_minutes(&name, duration)?;
        Ok(Self::new(name, i64::from(minutes)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    Commute,
    Weather,
    #[default]
    Other,
}

/// A fixed-duration, non-task interval placed between the last task and the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffer {
    pub label: String,
    /// Minutes.
    pub duration: i64,
    #[serde(default)]
    pub kind: BufferKind,
}

impl Buffer {
    pub fn new(label: impl Into<String>, duration: i64, kind: BufferKind) -> Self {
        Self {
            label: label.into(),
            duration,
            kind,
        }
    }

    pub fn commute(duration: i64) -> Self {
        Self::new("Leave home / Commute", duration, BufferKind::Commute)
    }
}

/// Parse a whole, non-negative number of minutes.
///
/// `label` identifies the item in the error; the position is unknown here and reported as 0.
pub fn parse_duration_minutes(label: &str, text: &str) -> Result<u32> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::duration(label, 0, text.trim()))
}

/// Check a raw duration and narrow it to minutes.
pub(crate) fn checked_minutes(label: &str, position: usize, duration: i64) -> Result<u32> {
    u32::try_from(duration).map_err(|_| ValidationError::duration(label, position, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_default_label() {
        let a = Anchor::parse("10:00", "  ").unwrap();
        assert_eq!(a.label, DEFAULT_ANCHOR_LABEL);
        assert_eq!(a.time.minutes(), 600);
    }

    #[test]
    fn test_anchor_rejects_bad_time() {
        assert!(Anchor::parse("25:99", "Class").is_err());
    }

    #[test]
    fn test_task_parse_duration() {
        let t = Task::parse("Shower", " 20 ").unwrap();
        assert_eq!(t.duration, 20);

        let err = Task::parse("Shower", "twenty").unwrap_err();
        assert_eq!(err.field(), "Shower");
        assert!(matches!(err, ValidationError::InvalidDuration { .. }));

        assert!(Task::parse("Shower", "-5").is_err());
        assert!(Task::parse("Shower", "7.5").is_err());
    }

    #[test]
    fn test_buffer_kind_serde() {
        let b: Buffer = serde_json::from_str(r#"{"label":"Rain","duration":10,"kind":"weather"}"#).unwrap();
        assert_eq!(b.kind, BufferKind::Weather);

        // An untagged buffer is not taken for a commute.
        let b: Buffer = serde_json::from_str(r#"{"label":"Coffee stop","duration":5}"#).unwrap();
        assert_eq!(b.kind, BufferKind::Other);
    }
}
