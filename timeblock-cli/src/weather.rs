//! Current-weather lookup and the commute adjustment it implies.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use timeblock_core::{Buffer, BufferKind, ScheduleRequest};

use crate::config::{WeatherSection, WEATHER_KEY_ENV};
use crate::plan::mentions_commute;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub condition: String,
    pub description: String,
    pub temp_c: i64,
    pub icon: String,
}

impl WeatherReport {
    /// Extra commute minutes for this condition: rain and snow slow things down.
    pub fn extra_minutes(&self, cfg: &WeatherSection) -> u32 {
        let c = self.condition.to_lowercase();
        if c.contains("rain") {
            cfg.rain_extra_minutes
        } else if c.contains("snow") {
            cfg.snow_extra_minutes
        } else {
            0
        }
    }
}

pub async fn fetch_weather(cfg: &WeatherSection, location: &str) -> Result<WeatherReport> {
    #[derive(Deserialize)]
    struct Resp {
        weather: Vec<Condition>,
        main: Main,
    }

    #[derive(Deserialize)]
    struct Condition {
        main: String,
        description: String,
        icon: String,
    }

    #[derive(Deserialize)]
    struct Main {
        temp: f64,
    }

    if location.trim().is_empty() {
        bail!("a location is required for the weather check");
    }
    let key = cfg.api_key().ok_or_else(|| {
        anyhow::anyhow!("missing API key; set {WEATHER_KEY_ENV} or weather.api_key in config.toml")
    })?;

    let url = format!("{}/data/2.5/weather", cfg.base_url.trim_end_matches('/'));
    tracing::debug!(%url, location, "requesting weather");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("build http client")?;
    let resp = client
        .get(&url)
        .query(&[("q", location), ("appid", key.as_str()), ("units", cfg.units.as_str())])
        .send()
        .await
        .context("weather request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("weather API error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse weather response")?;
    let Some(first) = out.weather.into_iter().next() else {
        bail!("weather response had no conditions");
    };

    Ok(WeatherReport {
        condition: first.main,
        description: first.description,
        temp_c: out.main.temp.round() as i64,
        icon: first.icon,
    })
}

/// Look up the weather at `location` and lengthen the commute to match.
///
/// Weather only enriches a plan: with no location, or when the lookup fails,
/// `req` comes back unchanged.
pub async fn apply_weather(cfg: &WeatherSection, req: ScheduleRequest, location: Option<&str>) -> ScheduleRequest {
    let Some(location) = location.filter(|l| !l.trim().is_empty()) else {
        tracing::warn!("weather check skipped: no location given");
        return req;
    };

    match fetch_weather(cfg, location).await {
        Ok(w) => {
            let extra = w.extra_minutes(cfg);
            tracing::info!(condition = %w.condition, temp_c = w.temp_c, extra, "weather checked");
            if extra > 0 {
                eprintln!(
                    "Bad weather detected ({}). Added {} min to commute.",
                    w.description, extra
                );
            }
            with_weather_delay(req, extra, &w.condition)
        }
        Err(e) => {
            tracing::warn!("could not fetch weather: {e:#}");
            req
        }
    }
}

/// Lengthen every commute by `extra` minutes before the schedule is computed.
///
/// Tasks and buffers whose label mentions "commute" are extended; when there
/// is none, a weather buffer is added just before the event instead.
pub fn with_weather_delay(mut req: ScheduleRequest, extra: u32, condition: &str) -> ScheduleRequest {
    if extra == 0 {
        return req;
    }
    let extra = i64::from(extra);

    let mut adjusted = 0;
    for t in req.tasks.iter_mut().filter(|t| mentions_commute(&t.name)) {
        t.duration += extra;
        adjusted += 1;
    }
    for b in req
        .buffers
        .iter_mut()
        .filter(|b| b.kind == BufferKind::Commute || mentions_commute(&b.label))
    {
        b.duration += extra;
        adjusted += 1;
    }

    if adjusted == 0 {
        req.buffers.push(Buffer::new(
            format!("{condition} delay"),
            extra,
            BufferKind::Weather,
        ));
    }
    tracing::info!(extra, adjusted, "applied weather delay");
    req
}
