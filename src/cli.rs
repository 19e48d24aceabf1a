use crate::{
    config::Config,
    label::{describe, describe_job, job_action},
    report::{load_reports, JobReport},
    tally::aggregate,
    util::now_rfc3339,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "job-summary")]
#[command(about = "Task tallies and action labels for background job reports")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./job-summary.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Completed/total task counts across all reports.
    Tally {
        /// JSON file with job reports; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Display label for one job.
    Describe {
        #[arg(long)]
        action: String,
        #[arg(long)]
        completed: bool,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Tally plus a label for every job.
    Summary {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct TallyOut {
    completed: i64,
    total: i64,
    #[serde(rename = "timeOfLastFinishedJob")]
    time_of_last_finished_job: String,
    remaining: i64,
    progress: f64,
}

#[derive(Debug, Serialize)]
struct JobLine {
    id: String,
    action: String,
    status: crate::report::JobStatus,
    label: String,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Tally { input } => tally(&cfg, input.as_deref()),
        Command::Describe {
            action,
            completed,
            input,
            index,
        } => describe_one(&cfg, action, *completed, input.as_deref(), *index),
        Command::Summary { input } => summary(&cfg, input.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("job-summary.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the JSON results.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {}", parent.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn load(cfg: &Config, input: Option<&Path>) -> Result<Option<Vec<JobReport>>> {
    match input {
        Some(p) => info!("reading job reports from {}", p.display()),
        None => info!("reading job reports from stdin"),
    }
    let jobs = load_reports(input, cfg.input.max_input_bytes)?;
    if jobs.is_none() {
        warn!("job report list is null; treating as empty");
    }
    Ok(jobs)
}

fn tally_out(jobs: Option<&[JobReport]>) -> TallyOut {
    let t = aggregate(jobs);
    TallyOut {
        remaining: t.remaining(),
        progress: t.progress(),
        completed: t.completed,
        total: t.total,
        time_of_last_finished_job: t.time_of_last_finished_job,
    }
}

pub fn tally_json(jobs: Option<&[JobReport]>) -> Value {
    json!(tally_out(jobs))
}

/// Label for the job at `index`; a missing job is labelled without a subject.
pub fn describe_json(
    action: &str,
    completed: bool,
    jobs: Option<&[JobReport]>,
    index: usize,
) -> Value {
    let job = jobs.and_then(|j| j.get(index));
    if job.is_none() {
        warn!("no job at index {index}; labelling without a subject");
    }
    json!({ "action": action, "label": describe(action, completed, job) })
}

pub fn summary_json(cfg: &Config, jobs: Option<&[JobReport]>) -> Value {
    let lines: Vec<JobLine> = jobs
        .unwrap_or_default()
        .iter()
        .map(|j| JobLine {
            id: j.id.clone(),
            action: job_action(j).to_string(),
            status: j.status,
            label: describe_job(j),
        })
        .collect();
    info!("summarized {} jobs", lines.len());

    let mut out = json!({
        "tally": tally_out(jobs),
        "jobs": lines,
    });
    if cfg.output.include_generated_at {
        out["generated_at"] = Value::String(now_rfc3339());
    }
    out
}

fn tally(cfg: &Config, input: Option<&Path>) -> Result<()> {
    let jobs = load(cfg, input)?;
    let out = tally_json(jobs.as_deref());
    debug!(completed = %out["completed"], total = %out["total"], "tally");
    print_json(cfg, &out)
}

fn describe_one(
    cfg: &Config,
    action: &str,
    completed: bool,
    input: Option<&Path>,
    index: usize,
) -> Result<()> {
    let jobs = load(cfg, input)?;
    print_json(cfg, &describe_json(action, completed, jobs.as_deref(), index))
}

fn summary(cfg: &Config, input: Option<&Path>) -> Result<()> {
    let jobs = load(cfg, input)?;
    print_json(cfg, &summary_json(cfg, jobs.as_deref()))
}

fn print_json<T: Serialize>(cfg: &Config, value: &T) -> Result<()> {
    let s = if cfg.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{s}");
    Ok(())
}
