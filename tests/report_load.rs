use job_summary::{
    aggregate, describe,
    report::{load_reports, parse_reports, read_limited, JobStatus},
};
use std::path::PathBuf;

const SAMPLE: &str = r#"[
  {
    "id": "a1",
    "name": "indexer",
    "action": "scan_location",
    "status": "Completed",
    "task_count": 4,
    "completed_task_count": 2,
    "completed_at": "2024-05-01T10:00:00Z",
    "errors_text": [],
    "metadata": [
      { "type": "input", "metadata": { "type": "location", "name": "Photos", "id": 3 } },
      { "type": "output", "metadata": { "type": "metrics" } }
    ]
  },
  { "id": "b2", "name": "thumbnailer", "status": "Running", "task_count": 10, "completed_task_count": 6 }
]"#;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("job-summary-{}-{}", std::process::id(), name))
}

#[test]
fn null_means_absent() {
    assert!(parse_reports("null").unwrap().is_none());
    assert_eq!(aggregate(parse_reports("null").unwrap().as_deref()).total, 0);
}

#[test]
fn parses_list_and_ignores_unknown_fields() {
    let jobs = parse_reports(SAMPLE).unwrap().unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].status, JobStatus::Completed);
    assert!(jobs[1].metadata.is_empty());

    let t = aggregate(Some(&jobs));
    assert_eq!((t.completed, t.total), (10, 14));
    assert_eq!(t.time_of_last_finished_job, "2024-05-01T10:00:00Z");
    assert_eq!(describe("scan_location", true, jobs.first()), "Added location \"Photos\"");
}

#[test]
fn parses_wrapped_object() {
    let jobs = parse_reports(r#"{ "jobs": [ { "status": "Queued", "task_count": 1 } ] }"#)
        .unwrap()
        .unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].completed_task_count, 0);
}

#[test]
fn unknown_status_is_tolerated() {
    let jobs = parse_reports(r#"[ { "status": "Exploded", "task_count": 2, "completed_task_count": 1 } ]"#)
        .unwrap()
        .unwrap();
    assert_eq!(jobs[0].status, JobStatus::Unknown);
    assert_eq!(aggregate(Some(&jobs)).completed, 1);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(parse_reports("[ { \"task_count\": ").is_err());
}

#[test]
fn load_reports_reads_file_and_enforces_limit() {
    let path = temp_path("reports.json");
    std::fs::write(&path, SAMPLE).unwrap();

    let jobs = load_reports(Some(&path), 0).unwrap().unwrap();
    assert_eq!(jobs.len(), 2);

    let err = load_reports(Some(&path), 16).unwrap_err();
    assert!(err.to_string().contains("max_input_bytes"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn load_reports_missing_file_has_context() {
    let err = load_reports(Some(&temp_path("missing.json")), 0).unwrap_err();
    assert!(format!("{err:#}").contains("stat input"));
}

#[test]
fn objects_without_a_jobs_field_are_rejected() {
    let err = parse_reports(r#"{ "job": [ { "status": "Completed", "task_count": 5 } ] }"#).unwrap_err();
    assert!(err.to_string().contains("unexpected field"));

    let err = parse_reports("{}").unwrap_err();
    assert!(err.to_string().contains("no `jobs` field"));

    let err = parse_reports(r#"{ "jobs": [], "extra": 1 }"#).unwrap_err();
    assert!(err.to_string().contains("extra"));
}

#[test]
fn wrapped_null_means_absent() {
    assert!(parse_reports(r#"{ "jobs": null }"#).unwrap().is_none());
}

#[test]
fn scalar_documents_are_rejected() {
    assert!(parse_reports("42").is_err());
    assert!(parse_reports(r#"{ "jobs": "all" }"#).is_err());
}

#[test]
fn field_errors_keep_serde_detail() {
    let err = parse_reports(r#"[ { "task_count": "five" } ]"#).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("invalid type"), "{msg}");
    assert!(!msg.contains("untagged"), "{msg}");
}

#[test]
fn read_limited_stops_after_limit() {
    let big = vec![b'x'; 3_000_000];
    let mut reader: &[u8] = &big;
    let err = read_limited(&mut reader, 16).unwrap_err();
    assert!(err.to_string().contains("max_input_bytes"));
    // Only limit + 1 bytes were consumed.
    assert_eq!(reader.len(), big.len() - 17);
}

#[test]
fn read_limited_accepts_input_at_limit() {
    assert_eq!(read_limited("null".as_bytes(), 4).unwrap(), "null");
    assert_eq!(read_limited("[]".as_bytes(), 0).unwrap(), "[]");
}
