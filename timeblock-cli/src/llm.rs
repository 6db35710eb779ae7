//! Natural-language event extraction over an OpenAI-compatible chat API.
//!
//! The model is asked for a JSON object; the reply is validated into core
//! inputs before anything else sees it.

use anyhow::{bail, Context, Result};
use regex::Regex;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use timeblock_core::{parse_duration_minutes, Anchor, Buffer, ClockTime, ScheduleRequest, Task};

use crate::config::{LlmSection, OPENAI_KEY_ENV};
use crate::plan;

pub const DEFAULT_EVENT_TIME: &str = "10:00";

const SYSTEM_PROMPT: &str = r#"You are an AI assistant that extracts event details from natural language.

Extract these fields:
- eventName: The name of the event (e.g., "Class", "Meeting", "Gym")
- eventTime: Time in HH:MM 24-hour format (e.g., "10:00", "14:30")
- location: Location description (e.g., "University", "Office", "Downtown Gym")
- suggestedTasks: Array of tasks to do before the event

For each suggested task, provide:
- name: Task name
- duration: Duration in minutes

Common task suggestions by event type:
- Class/School: [shower (20), breakfast (15), review notes (10), commute (30)]
- Work/Meeting: [shower (15), breakfast (10), prepare materials (15), commute (30)]
- Gym: [light snack (10), pack gym bag (5), commute (20)]
- Doctor: [prepare insurance (5), commute (25)]

Return ONLY valid JSON, no markdown, no explanation.

Example output:
{
  "eventName": "Class",
  "eventTime": "10:00",
  "location": "University Building",
  "suggestedTasks": [
    {"name": "Shower & get ready", "duration": 20},
    {"name": "Breakfast", "duration": 15},
    {"name": "Review notes", "duration": 10},
    {"name": "Commute to campus", "duration": 30}
  ]
}"#;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?|\n?```").expect("valid fence regex"));

/// Raw model output, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extraction {
    pub event_name: Option<String>,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub suggested_tasks: Option<Vec<SuggestedTask>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedTask {
    pub name: String,
    /// Models return numbers, numeric strings, or worse.
    pub duration: Value,
}

/// An extraction that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPlan {
    pub anchor: Anchor,
    pub location: Option<String>,
    pub tasks: Vec<Task>,
}

impl ExtractedPlan {
    /// The request to compute. A commute buffer of `commute_minutes` goes
    /// before the event unless the model already suggested a commute.
    pub fn into_request(self, commute_minutes: u32) -> ScheduleRequest {
        let mut req = ScheduleRequest {
            anchor: self.anchor,
            tasks: self.tasks,
            buffers: Vec::new(),
        };
        if commute_minutes > 0 && !plan::has_commute(&req) {
            req.buffers.push(Buffer::commute(i64::from(commute_minutes)));
        }
        req
    }
}

impl Extraction {
    /// Validate into core inputs. Nothing is returned unless every field is usable.
    pub fn validate(self) -> Result<ExtractedPlan> {
        let time_text = self
            .event_time
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_TIME.to_string());
        let time = ClockTime::parse(&time_text).context("model returned an invalid eventTime")?;
        let anchor = Anchor::new(time, self.event_name.unwrap_or_default());

        let mut tasks = Vec::new();
        for (i, t) in self.suggested_tasks.unwrap_or_default().into_iter().enumerate() {
            let name = t.name.trim().to_string();
            if name.is_empty() {
                bail!("model returned a task with no name (item {})", i + 1);
            }
            let minutes = duration_from_value(&name, &t.duration)
                .with_context(|| format!("model returned an invalid duration for '{name}'"))?;
            tasks.push(Task::new(name, i64::from(minutes)));
        }

        Ok(ExtractedPlan {
            anchor,
            location: self.location.filter(|l| !l.trim().is_empty()),
            tasks,
        })
    }
}

fn duration_from_value(name: &str, v: &Value) -> Result<u32> {
    let minutes = match v {
        Value::Number(n) => match n.as_u64().and_then(|m| u32::try_from(m).ok()) {
            Some(m) => m,
            None => bail!("{n} is not a whole, non-negative number of minutes"),
        },
        Value::String(s) => parse_duration_minutes(name, s)?,
        other => bail!("{other} is not a number of minutes"),
    };
    Ok(minutes)
}

/// Remove markdown code fences the model sometimes wraps around its JSON.
pub fn strip_code_fences(content: &str) -> String {
    CODE_FENCE.replace_all(content, "").trim().to_string()
}

pub fn parse_extraction(content: &str) -> Result<Extraction> {
    let clean = strip_code_fences(content);
    serde_json::from_str(&clean).context("model returned invalid JSON")
}

/// Ask the model to turn `text` into an event, time, location and task list.
pub async fn extract_plan(cfg: &LlmSection, text: &str) -> Result<ExtractedPlan> {
    let key = cfg.api_key().ok_or_else(|| {
        anyhow::anyhow!("missing API key; set {OPENAI_KEY_ENV} or llm.api_key in config.toml")
    })?;

    let content = chat_complete(cfg, &key, SYSTEM_PROMPT, text).await?;
    tracing::debug!(len = content.len(), "extraction reply received");
    parse_extraction(&content)?.validate()
}

async fn chat_complete(cfg: &LlmSection, key: &str, system: &str, user: &str) -> Result<String> {
    #[derive(Serialize)]
    struct Msg<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Serialize)]
    struct Req<'a> {
        model: &'a str,
        messages: Vec<Msg<'a>>,
        temperature: f32,
        max_tokens: u32,
    }

    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let body = Req {
        model: &cfg.model,
        messages: vec![
            Msg {
                role: "system",
                content: system,
            },
            Msg {
                role: "user",
                content: user,
            },
        ],
        temperature: cfg.temperature,
        max_tokens: cfg.max_tokens,
    };

    let url = format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/'));
    tracing::debug!(%url, model = %cfg.model, "requesting extraction");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("build http client")?;
    let resp = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {key}"))
        .json(&body)
        .send()
        .await
        .context("extraction request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("extraction API error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse extraction response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}
