use crate::{report::JobReport, util::nfc};

pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Job categories that have their own display phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ScanLocation,
    ScanLocationSubPath,
}

impl Action {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "scan_location" => Some(Action::ScanLocation),
            "scan_location-sub_path" => Some(Action::ScanLocationSubPath),
            _ => None,
        }
    }

    pub fn phrase(&self, completed: bool) -> &'static str {
        match (self, completed) {
            (Action::ScanLocation, true) => "Added location",
            (Action::ScanLocation, false) => "Adding location",
            (Action::ScanLocationSubPath, true) => "Indexed new files",
            (Action::ScanLocationSubPath, false) => "Indexing new files",
        }
    }
}

/// Display name of the location a job works on.
///
/// Only the first `input`/`location` metadata entry is looked at; if it has
/// no usable name the result is [`UNKNOWN_SUBJECT`] even when a later entry
/// would match. Names are returned in NFC, so a decomposed name reported by
/// the file system differs byte-wise from the stored one.
pub fn subject_name(job: Option<&JobReport>) -> String {
    job.and_then(|j| j.metadata.iter().find(|m| m.is_input_location()))
        .and_then(|m| m.metadata.as_ref())
        .and_then(|s| s.name.as_deref())
        .filter(|name| !name.is_empty())
        .map(nfc)
        .unwrap_or_else(|| UNKNOWN_SUBJECT.to_string())
}

/// Human-readable label for `action`. Unrecognized actions come back as-is.
pub fn describe(action: &str, completed: bool, job: Option<&JobReport>) -> String {
    match Action::parse(action) {
        Some(a) => format!("{} \"{}\"", a.phrase(completed), subject_name(job)),
        None => action.to_string(),
    }
}

/// Identifier used to label a job: its `action`, else its registered name.
pub fn job_action(job: &JobReport) -> &str {
    match job.action.as_deref() {
        Some(a) if !a.is_empty() => a,
        _ => job.name.as_str(),
    }
}

/// Label for a job in its current state.
pub fn describe_job(job: &JobReport) -> String {
    describe(job_action(job), job.is_completed(), Some(job))
}

