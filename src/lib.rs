pub mod cli;
pub mod config;
pub mod label;
pub mod report;
pub mod tally;
pub mod util;

pub use label::{describe, Action};
pub use report::{JobReport, JobStatus};
pub use tally::{aggregate, TaskTally};
