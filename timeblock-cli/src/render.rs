use anyhow::{Context, Result};
use timeblock_core::{Block, BlockKind, Schedule};

fn day_marker(b: &Block) -> String {
    match b.day_offset {
        0 => String::new(),
        d => format!(" ({d}d)"),
    }
}

fn kind_label(k: BlockKind) -> &'static str {
    match k {
        BlockKind::Event => "event",
        BlockKind::Buffer => "buffer",
        BlockKind::Task => "task",
    }
}

pub fn render_text(s: &Schedule) -> String {
    let mut out = String::new();

    let wake = s.blocks.first().map(day_marker).unwrap_or_default();
    out.push_str(&format!("Wake up at {}{}\n", s.start_time, wake));
    if s.spans_midnight {
        out.push_str("Note: this schedule starts the day before the event.\n");
    }
    out.push('\n');

    for b in &s.blocks {
        let minutes = if b.duration > 0 {
            format!("{:>4} min", b.duration)
        } else {
            String::from("        ")
        };
        out.push_str(&format!(
            "{}{:<6} {}  [{}] {}\n",
            b.start,
            day_marker(b),
            minutes,
            kind_label(b.kind),
            b.label
        ));
    }

    out.push_str(&format!(
        "\nTotal prep time: {} min ({}h {:02}m)\n",
        s.total_duration,
        s.total_duration / 60,
        s.total_duration % 60
    ));
    out
}

pub fn render_json(s: &Schedule) -> Result<String> {
    serde_json::to_string_pretty(s).context("serialize schedule")
}
