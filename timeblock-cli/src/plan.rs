//! Building a `ScheduleRequest` from flags, plan files and defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use timeblock_core::{Anchor, Buffer, BufferKind, ClockTime, ScheduleRequest, Task};

/// Used when no tasks are given at all.
pub fn default_tasks() -> Vec<Task> {
    vec![
        Task::new("Get ready & shower", 60),
        Task::new("Make breakfast", 30),
    ]
}

/// Whether a task or buffer label describes the commute.
pub fn mentions_commute(label: &str) -> bool {
    label.to_lowercase().contains("commute")
}

/// Whether `req` already has a commute, as a tagged buffer or a task/buffer named for it.
pub fn has_commute(req: &ScheduleRequest) -> bool {
    req.tasks.iter().any(|t| mentions_commute(&t.name))
        || req
            .buffers
            .iter()
            .any(|b| b.kind == BufferKind::Commute || mentions_commute(&b.label))
}

/// Parse `NAME=MINUTES`. The last `=` separates the duration so names may contain one.
pub fn parse_task_spec(spec: &str) -> Result<Task> {
    let (name, minutes) = split_spec(spec)?;
    Ok(Task::parse(name, minutes)?)
}

/// Parse `LABEL=MINUTES` into an `other` buffer.
pub fn parse_buffer_spec(spec: &str) -> Result<Buffer> {
    let (label, minutes) = split_spec(spec)?;
    let task = Task::parse(label, minutes)?;
    Ok(Buffer::new(task.name, task.duration, BufferKind::Other))
}

fn split_spec(spec: &str) -> Result<(&str, &str)> {
    let Some((name, minutes)) = spec.rsplit_once('=') else {
        bail!("expected NAME=MINUTES, got '{spec}'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("missing name in '{spec}'");
    }
    Ok((name, minutes))
}

/// A saved plan, e.g. `morning.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanFile {
    #[serde(default)]
    pub event: String,
    pub at: ClockTime,
    pub location: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
}

impl PlanFile {
    pub fn parse(s: &str) -> Result<Self> {
        let plan: PlanFile = toml::from_str(s).context("parse plan file")?;
        if let Some(t) = plan.tasks.iter().find(|t| t.name.trim().is_empty()) {
            bail!("plan file has a task with no name (duration {})", t.duration);
        }
        Ok(plan)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&s).with_context(|| format!("in {}", path.display()))
    }

    pub fn into_request(self) -> ScheduleRequest {
        ScheduleRequest {
            anchor: Anchor::new(self.at, self.event),
            tasks: self.tasks,
            buffers: self.buffers,
        }
    }
}

/// Inputs from `timeblock plan` flags.
#[derive(Debug, Clone, Default)]
pub struct PlanArgs {
    pub at: Option<String>,
    pub event: Option<String>,
    pub tasks: Vec<String>,
    pub buffers: Vec<String>,
    pub commute: Option<u32>,
}

/// Merge flags over an optional plan file. Flags win for the anchor; flag
/// tasks replace file tasks; buffers are appended. A commute buffer is added
/// last when `--commute` asks for one, or when no commute is present yet and
/// the default is not 0.
pub fn build_request(args: &PlanArgs, file: Option<PlanFile>, default_commute: u32) -> Result<ScheduleRequest> {
    let mut req = match (file, args.at.as_deref()) {
        (Some(f), _) => f.into_request(),
        (None, Some(_)) => ScheduleRequest::new(Anchor::new(ClockTime::MIDNIGHT, "")),
        (None, None) => bail!("an event time is required (--at HH:MM or --file)"),
    };

    if let Some(at) = args.at.as_deref() {
        req.anchor.time = ClockTime::parse(at)?;
    }
    if let Some(event) = args.event.as_deref() {
        req.anchor = Anchor::new(req.anchor.time, event);
    }

    if !args.tasks.is_empty() {
        req.tasks = args
            .tasks
            .iter()
            .map(|s| parse_task_spec(s))
            .collect::<Result<Vec<_>>>()?;
    } else if req.tasks.is_empty() && req.buffers.is_empty() {
        req.tasks = default_tasks();
    }

    for spec in &args.buffers {
        req.buffers.push(parse_buffer_spec(spec)?);
    }

    let commute = args
        .commute
        .unwrap_or(if has_commute(&req) { 0 } else { default_commute });
    if commute > 0 {
        req.buffers.push(Buffer::commute(i64::from(commute)));
    }

    Ok(req)
}
