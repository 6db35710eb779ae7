use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use timeblock_core::{Schedule, ScheduleRequest};
use tracing_subscriber::EnvFilter;

mod calendar;
mod config;
mod llm;
mod plan;
mod render;
mod state;
mod weather;

use config::Config;
use plan::{PlanArgs, PlanFile};

#[derive(Parser, Debug)]
#[command(
    name = "timeblock",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TIMEBLOCK_BUILD_SHA"), ")"),
    about = "Work backward from an event to find when to start each task"
)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Event date for ICS output (default: today in --tz)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// IANA timezone for ICS output (default: schedule.timezone from config)
    #[arg(long)]
    tz: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Ics,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a schedule from flags and/or a plan file
    Plan {
        /// Event time, HH:MM (24-hour)
        #[arg(long)]
        at: Option<String>,

        /// Event name
        #[arg(long)]
        event: Option<String>,

        /// Task as NAME=MINUTES, in the order you do them (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,

        /// Extra buffer as LABEL=MINUTES, placed before the event (repeatable)
        #[arg(long = "buffer")]
        buffers: Vec<String>,

        /// Commute minutes before the event (0 to disable; default from config)
        #[arg(long)]
        commute: Option<u32>,

        /// Location, used for the weather check
        #[arg(long)]
        location: Option<String>,

        /// Check the weather at --location and lengthen the commute if needed
        #[arg(long)]
        weather: bool,

        /// TOML plan file
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Describe your event in plain language and let the model fill in the plan
    Ask {
        /// e.g. "Class at 10am at the university, I need to shower and eat"
        text: String,

        /// Check the weather at the extracted location
        #[arg(long)]
        weather: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show current weather for a location and the commute adjustment it implies
    Weather { location: String },

    /// Manage ~/.timeblock/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file path
    Path,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Plan {
            at,
            event,
            tasks,
            buffers,
            commute,
            location,
            weather: check_weather,
            file,
            output,
        } => {
            let cfg = config::load_config()?;
            let file = file.as_deref().map(PlanFile::load).transpose()?;
            let location = location.or_else(|| file.as_ref().and_then(|f| f.location.clone()));

            let args = PlanArgs {
                at,
                event,
                tasks,
                buffers,
                commute,
            };
            let mut req = plan::build_request(&args, file, cfg.schedule.commute_minutes)?;
            if check_weather {
                req = weather::apply_weather(&cfg.weather, req, location.as_deref()).await;
            }
            emit(&cfg, &req, &output)?;
        }

        Command::Ask {
            text,
            weather: check_weather,
            output,
        } => {
            let cfg = config::load_config()?;
            let extracted = llm::extract_plan(&cfg.llm, &text)
                .await
                .context("could not process your description")?;
            eprintln!(
                "Understood: \"{}\" at {}{}\n",
                extracted.anchor.label,
                extracted.anchor.time,
                extracted
                    .location
                    .as_deref()
                    .map(|l| format!(" ({l})"))
                    .unwrap_or_default()
            );

            let location = extracted.location.clone();
            let mut req = extracted.into_request(cfg.schedule.commute_minutes);
            if check_weather {
                req = weather::apply_weather(&cfg.weather, req, location.as_deref()).await;
            }
            emit(&cfg, &req, &output)?;
        }

        Command::Weather { location } => {
            let cfg = config::load_config()?;
            let w = weather::fetch_weather(&cfg.weather, &location)
                .await
                .context("could not fetch weather; check the location and API key")?;
            println!("{} - {}°C ({})", w.condition, w.temp_c, w.description);
            println!("Icon: https://openweathermap.org/img/w/{}.png", w.icon);
            match w.extra_minutes(&cfg.weather) {
                0 => println!("No commute adjustment needed."),
                m => println!("Bad weather: add {m} min to your commute."),
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
            ConfigCommand::Path => println!("{}", config::config_path()?.display()),
        },
    }

    Ok(())
}

fn emit(cfg: &Config, req: &ScheduleRequest, output: &OutputArgs) -> Result<()> {
    let schedule = req.compute()?;
    tracing::debug!(
        blocks = schedule.blocks.len(),
        start = %schedule.start_time,
        spans_midnight = schedule.spans_midnight,
        "schedule computed"
    );

    match output.format {
        Format::Text => print!("{}", render::render_text(&schedule)),
        Format::Json => println!("{}", render::render_json(&schedule)?),
        Format::Ics => print!("{}", ics_for(cfg, &schedule, output)?),
    }
    Ok(())
}

fn ics_for(cfg: &Config, schedule: &Schedule, output: &OutputArgs) -> Result<String> {
    let tz_name = output.tz.as_deref().unwrap_or(&cfg.schedule.timezone);
    let tz: Tz = match tz_name.parse() {
        Ok(tz) => tz,
        Err(_) => bail!("invalid timezone: {tz_name}"),
    };
    let date = output
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
    let events = calendar::schedule_to_events(schedule, date, tz)?;
    Ok(calendar::events_to_ics(&events))
}
