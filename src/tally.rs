use crate::report::JobReport;
use serde::{Deserialize, Serialize};

/// Completed/total task counts across a set of job reports.
///
/// `completed <= total` is not enforced; upstream counts pass through unclamped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTally {
    pub completed: i64,
    pub total: i64,
    #[serde(rename = "timeOfLastFinishedJob")]
    pub time_of_last_finished_job: String,
}

impl TaskTally {
    pub fn from_jobs(jobs: &[JobReport]) -> Self {
        aggregate(Some(jobs))
    }

    /// Fraction of tasks done, `0.0` when there is nothing to do.
    pub fn progress(&self) -> f64 {
        if self.total <= 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn remaining(&self) -> i64 {
        self.total - self.completed
    }
}

/// Folds job reports into a [`TaskTally`] in a single pass.
///
/// A `Completed` job counts its whole `task_count` and replaces the finish
/// time with its own `completed_at`, so the last completed job in iteration
/// order wins, not the latest timestamp. Other jobs count
/// `completed_task_count`. `None` yields the zero tally.
pub fn aggregate(jobs: Option<&[JobReport]>) -> TaskTally {
    let mut tally = TaskTally::default();

    for job in jobs.unwrap_or_default() {
        tally.total += i64::from(job.task_count);

        if job.is_completed() {
            tally.completed += i64::from(job.task_count);
            tally.time_of_last_finished_job = job.completed_at.clone().unwrap_or_default();
        } else {
            tally.completed += i64::from(job.completed_task_count);
        }
    }

    tally
}
