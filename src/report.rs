use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Canceled,
    Failed,
    Paused,
    CompletedWithErrors,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub task_count: i32,
    #[serde(default)]
    pub completed_task_count: i32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub metadata: Vec<ReportMetadata>,
}

/// One tagged entry in a report's metadata list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(rename = "type", default)]
    pub kind: Option<MetadataKind>,
    #[serde(default)]
    pub metadata: Option<Subject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    Input,
    Output,
    #[serde(other)]
    Other,
}

/// What a job operates on, e.g. a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type", default)]
    pub kind: Option<SubjectKind>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Location,
    SubPath,
    #[serde(other)]
    Other,
}

impl ReportMetadata {
    pub fn is_input_location(&self) -> bool {
        self.kind == Some(MetadataKind::Input)
            && self
                .metadata
                .as_ref()
                .is_some_and(|s| s.kind == Some(SubjectKind::Location))
    }
}

impl JobReport {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

/// Reads reports from `path`, or stdin when no path is given.
/// A JSON `null` yields `None`.
pub fn load_reports(path: Option<&Path>, max_bytes: u64) -> Result<Option<Vec<JobReport>>> {
    let raw = match path {
        Some(p) => {
            let meta = std::fs::metadata(p).with_context(|| format!("stat input: {}", p.display()))?;
            if max_bytes > 0 && meta.len() > max_bytes {
                anyhow::bail!("input exceeds max_input_bytes: {}", meta.len());
            }
            let file = File::open(p).with_context(|| format!("reading input: {}", p.display()))?;
            read_limited(file, max_bytes).with_context(|| format!("reading input: {}", p.display()))?
        }
        None => read_limited(std::io::stdin().lock(), max_bytes).with_context(|| "reading stdin")?,
    };

    let reports = parse_reports(&raw)?;
    debug!(count = reports.as_ref().map_or(0, Vec::len), "loaded job reports");
    Ok(reports)
}

/// Reads at most `max_bytes` (zero means unbounded) and fails if more follow.
pub fn read_limited<R: Read>(reader: R, max_bytes: u64) -> Result<String> {
    let mut buf = String::new();
    if max_bytes == 0 {
        let mut reader = reader;
        reader.read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let n = reader.take(max_bytes + 1).read_to_string(&mut buf)?;
    if n as u64 > max_bytes {
        anyhow::bail!("input exceeds max_input_bytes: {}", max_bytes);
    }
    Ok(buf)
}

/// Accepts a JSON array, `null`, or `{ "jobs": <array or null> }`.
pub fn parse_reports(raw: &str) -> Result<Option<Vec<JobReport>>> {
    let doc: Value = serde_json::from_str(raw).with_context(|| "parsing job reports JSON")?;
    match doc {
        Value::Object(mut map) => {
            if let Some(key) = map.keys().find(|k| k.as_str() != "jobs") {
                anyhow::bail!("unexpected field in job reports object: {key}");
            }
            let jobs = map
                .remove("jobs")
                .ok_or_else(|| anyhow::anyhow!("job reports object has no `jobs` field"))?;
            reports_from_value(jobs)
        }
        other => reports_from_value(other),
    }
}

fn reports_from_value(v: Value) -> Result<Option<Vec<JobReport>>> {
    match v {
        Value::Null => Ok(None),
        Value::Array(_) => {
            let jobs: Vec<JobReport> =
                serde_json::from_value(v).with_context(|| "parsing job reports JSON")?;
            Ok(Some(jobs))
        }
        _ => anyhow::bail!("expected an array of job reports or null"),
    }
}
