use timeblock_core::{
    compute_schedule, Anchor, BlockKind, Buffer, BufferKind, ClockTime, Schedule, Task,
    ValidationError,
};

fn assert_contiguous(s: &Schedule) {
    for pair in s.blocks.windows(2) {
        assert_eq!(
            pair[0].absolute_end(),
            pair[1].absolute_minutes(),
            "{} should end where {} starts",
            pair[0].label,
            pair[1].label
        );
    }
}

fn assert_anchor(s: &Schedule, anchor: &Anchor) {
    let last = s.blocks.last().unwrap();
    assert_eq!(last.kind, BlockKind::Event);
    assert_eq!(last.duration, 0);
    assert_eq!(last.start, anchor.time);
    assert_eq!(last.day_offset, 0);
    assert_eq!(last.label, anchor.label);
}

/// Inputs of varying shape, including ones that cross midnight.
fn fixtures() -> Vec<(Anchor, Vec<Task>, Vec<Buffer>)> {
    vec![
        (Anchor::parse("10:00", "Class").unwrap(), vec![], vec![]),
        (
            Anchor::parse("10:00", "Class").unwrap(),
            vec![Task::new("Shower", 60), Task::new("Breakfast", 30)],
            vec![Buffer::commute(30)],
        ),
        (
            Anchor::parse("07:15", "Gym").unwrap(),
            vec![Task::new("Light snack", 10), Task::new("Pack gym bag", 5)],
            vec![
                Buffer::commute(20),
                Buffer::new("Rain delay", 10, BufferKind::Weather),
            ],
        ),
        (
            Anchor::parse("00:10", "Night shift").unwrap(),
            vec![Task::new("Dress", 25), Task::new("Snack", 15)],
            vec![],
        ),
        (
            Anchor::parse("0:00", "Midnight train").unwrap(),
            vec![Task::new("Pack", 90), Task::new("Nap", 0)],
            vec![Buffer::commute(45)],
        ),
    ]
}

#[test]
fn test_adjacent_blocks_are_contiguous() {
    for (anchor, tasks, buffers) in fixtures() {
        let s = compute_schedule(&anchor, &tasks, &buffers).unwrap();
        assert_contiguous(&s);
    }
}

#[test]
fn test_anchor_is_last_with_zero_duration() {
    for (anchor, tasks, buffers) in fixtures() {
        let s = compute_schedule(&anchor, &tasks, &buffers).unwrap();
        assert_anchor(&s, &anchor);
        assert_eq!(s.blocks.len(), tasks.len() + buffers.len() + 1);
    }
}

#[test]
fn test_total_duration_is_sum_of_inputs() {
    for (anchor, tasks, buffers) in fixtures() {
        let s = compute_schedule(&anchor, &tasks, &buffers).unwrap();
        let expected: i64 = tasks.iter().map(|t| t.duration).sum::<i64>()
            + buffers.iter().map(|b| b.duration).sum::<i64>();
        assert_eq!(s.total_duration, u64::try_from(expected).unwrap());
        assert_eq!(
            s.blocks[0].absolute_minutes(),
            i64::from(anchor.time.minutes()) - expected
        );
    }
}

#[test]
fn test_total_duration_does_not_saturate() {
    let anchor = Anchor::parse("10:00", "Class").unwrap();
    let max = i64::from(u32::MAX);
    let tasks = [Task::new("a", max), Task::new("b", max)];
    let s = compute_schedule(&anchor, &tasks, &[Buffer::commute(30)]).unwrap();

    assert_eq!(s.total_duration, 2 * u64::from(u32::MAX) + 30);
    assert_contiguous(&s);
    assert_anchor(&s, &anchor);
}

#[test]
fn test_same_inputs_same_schedule() {
    for (anchor, tasks, buffers) in fixtures() {
        let a = compute_schedule(&anchor, &tasks, &buffers).unwrap();
        let b = compute_schedule(&anchor, &tasks, &buffers).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_inputs_are_not_mutated() {
    let anchor = Anchor::parse("10:00", "Class").unwrap();
    let tasks = vec![Task::new("Shower", 60), Task::new("Breakfast", 30)];
    let buffers = vec![Buffer::commute(30)];
    let before = (anchor.clone(), tasks.clone(), buffers.clone());
    compute_schedule(&anchor, &tasks, &buffers).unwrap();
    assert_eq!((anchor, tasks, buffers), before);
}

#[test]
fn test_commute_only_example() {
    let anchor = Anchor::parse("10:00", "Class").unwrap();
    let s = compute_schedule(&anchor, &[], &[Buffer::commute(30)]).unwrap();

    assert_eq!(s.blocks.len(), 2);
    assert_eq!(s.blocks[0].kind, BlockKind::Buffer);
    assert_eq!(s.blocks[0].start.to_string(), "09:30");
    assert_eq!(s.blocks[0].duration, 30);
    assert_eq!(s.blocks[1].start.to_string(), "10:00");
    assert_eq!(s.start_time.to_string(), "09:30");
}

#[test]
fn test_two_task_example() {
    let anchor = Anchor::parse("10:00", "Class").unwrap();
    let tasks = [Task::new("shower", 60), Task::new("breakfast", 30)];
    let s = compute_schedule(&anchor, &tasks, &[Buffer::commute(30)]).unwrap();

    let summary: Vec<(&str, String, u32)> = s
        .blocks
        .iter()
        .map(|b| (b.label.as_str(), b.start.to_string(), b.duration))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("shower", "08:00".to_string(), 60),
            ("breakfast", "09:00".to_string(), 30),
            ("Leave home / Commute", "09:30".to_string(), 30),
            ("Class", "10:00".to_string(), 0),
        ]
    );
    assert_eq!(s.start_time.to_string(), "08:00");
    assert_eq!(s.total_duration, 120);
    assert!(!s.spans_midnight);
}

#[test]
fn test_rejects_bad_anchor_time() {
    let err = Anchor::parse("25:99", "Class").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidTimeFormat { .. }));
    assert!("25:99".parse::<ClockTime>().is_err());
}

#[test]
fn test_rejects_negative_duration_before_computing() {
    let anchor = Anchor::parse("10:00", "Class").unwrap();
    let err = compute_schedule(&anchor, &[Task::new("Shower", -5)], &[Buffer::commute(30)])
        .unwrap_err();
    assert_eq!(err.field(), "Shower");
    assert!(matches!(err, ValidationError::InvalidDuration { .. }));
}

#[test]
fn test_midnight_crossing_reports_previous_day() {
    let anchor = Anchor::parse("00:10", "Night shift").unwrap();
    let tasks = [Task::new("Dress", 25), Task::new("Snack", 15)];
    let s = compute_schedule(&anchor, &tasks, &[]).unwrap();

    assert!(s.spans_midnight);
    assert_eq!(s.start_time.to_string(), "23:30");
    assert_eq!(s.start_day_offset, -1);
    assert_eq!(s.total_duration, 40);
    assert_contiguous(&s);
}
