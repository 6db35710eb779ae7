use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use timeblock_core::{local_to_utc, Block, BlockKind, Schedule};

pub struct CalendarEvent {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

fn to_utc(b: &Block, minute_offset: u32, date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let start = local_to_utc(date, b.day_offset, b.start, tz).with_context(|| {
        format!("ambiguous or invalid local time (DST?): {} {} {tz}", date, b.start)
    })?;
    Ok(start + chrono::Duration::minutes(i64::from(minute_offset)))
}

/// Place a schedule on `date` (the event's day) in `tz`.
pub fn schedule_to_events(s: &Schedule, date: NaiveDate, tz: Tz) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::with_capacity(s.blocks.len());
    for b in &s.blocks {
        let start_utc = to_utc(b, 0, date, tz)?;
        let end_utc = to_utc(b, b.duration, date, tz)?;
        let description = match b.kind {
            BlockKind::Event => "Event time".to_string(),
            BlockKind::Buffer => format!("Buffer: {} min", b.duration),
            BlockKind::Task => format!("Task: {} min", b.duration),
        };
        events.push(CalendarEvent {
            start_utc,
            end_utc,
            summary: b.label.clone(),
            description,
        });
    }
    Ok(events)
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Timeblock//EN\n");

    for (i, e) in events.iter().enumerate() {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:timeblock-{}-{}@timeblock\n", dtstart, i));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeblock_core::{compute_schedule, Anchor, Buffer, Task};

    #[test]
    fn test_ics_in_utc() {
        let anchor = Anchor::parse("10:00", "Class").unwrap();
        let tasks = [Task::new("Shower, shave", 60)];
        let s = compute_schedule(&anchor, &tasks, &[Buffer::commute(30)]).unwrap();

        // Feb is CST (UTC-6)
        let date = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let events = schedule_to_events(&s, date, chrono_tz::America::Chicago).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].start_utc.to_rfc3339(), "2026-02-20T14:30:00+00:00");
        assert_eq!(events[0].end_utc, events[1].start_utc);
        assert_eq!(events[2].start_utc, events[2].end_utc);

        let ics = events_to_ics(&events);
        assert!(ics.starts_with("BEGIN:VCALENDAR\n"));
        assert!(ics.contains("DTSTART:20260220T143000Z\n"));
        assert!(ics.contains("SUMMARY:Shower\\, shave\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
        assert!(ics.ends_with("END:VCALENDAR\n"));
    }

    #[test]
    fn test_previous_day_blocks_land_on_previous_date() {
        let anchor = Anchor::parse("00:10", "Night shift").unwrap();
        let s = compute_schedule(&anchor, &[Task::new("Dress", 40)], &[]).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let events = schedule_to_events(&s, date, chrono_tz::UTC).unwrap();
        assert_eq!(events[0].start_utc.to_rfc3339(), "2026-06-30T23:30:00+00:00");
        assert_eq!(events[0].end_utc.to_rfc3339(), "2026-07-01T00:10:00+00:00");
    }
}
