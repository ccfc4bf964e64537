//! This module keeps track of all the reporting related types.
//! A Sample is the recorded outcome of a single request, the Report is the
//! aggregate over a whole run. How the numbers are produced is not important
//! here, samples arrive through a channel and get folded one by one.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

/// How did a single request end?
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// got a 2xx answer back
    Success {
        /// http status code
        status: u16,
    },
    /// everything else: non-2xx status, connection error, timeout...
    Failure {
        /// short description, used as key of the failure histogram
        reason: String,
    },
}

/// One recorded outcome of a single request, consumed by the reporting layer
#[derive(Debug, Clone)]
pub struct Sample {
    /// name of the request, by convention "METHOD /path"
    pub name: String,
    /// index of the virtual user that produced it
    pub user: usize,
    pub outcome: Outcome,
    /// time from send to response (or to the error)
    pub latency: Duration,
    /// when the sample was recorded
    pub at: DateTime<Utc>,
}

impl Sample {
    /// true if the request got a 2xx back
    pub fn ok(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

/// Aggregate results of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub requests_per_sec: f64,
    pub latency_min_ms: f64,
    pub latency_mean_ms: f64,
    pub latency_max_ms: f64,
    /// failure reason -> how many times it was seen
    pub failures: BTreeMap<String, u64>,
}

impl Report {
    /// print the report on the console
    pub fn print(&self) {
        println!("{}", "=== load test report ===".bold());
        println!("elapsed: {:.1}s", self.elapsed_secs);
        println!(
            "requests: {} ({} ok, {} failed)",
            self.total,
            self.succeeded.to_string().green(),
            self.failed.to_string().red(),
        );
        println!("rate: {:.1} req/s", self.requests_per_sec);
        println!(
            "latency ms: min {:.1} / mean {:.1} / max {:.1}",
            self.latency_min_ms, self.latency_mean_ms, self.latency_max_ms
        );
        if !self.failures.is_empty() {
            println!("{}", "failures:".red().bold());
            for (reason, count) in &self.failures {
                println!("\t{count}x {reason}");
            }
        }
    }
}

/// Folds samples into a Report. Lives inside the collector task.
pub(crate) struct ReportBuilder {
    started: DateTime<Utc>,
    total: u64,
    succeeded: u64,
    failed: u64,
    latency_sum: Duration,
    latency_min: Option<Duration>,
    latency_max: Duration,
    failures: BTreeMap<String, u64>,
}

impl ReportBuilder {
    pub(crate) fn new(started: DateTime<Utc>) -> Self {
        Self {
            started,
            total: 0,
            succeeded: 0,
            failed: 0,
            latency_sum: Duration::ZERO,
            latency_min: None,
            latency_max: Duration::ZERO,
            failures: BTreeMap::new(),
        }
    }

    pub(crate) fn push(&mut self, sample: &Sample) {
        self.total += 1;
        match &sample.outcome {
            Outcome::Success { .. } => self.succeeded += 1,
            Outcome::Failure { reason } => {
                self.failed += 1;
                *self.failures.entry(reason.clone()).or_default() += 1;
            }
        }
        self.latency_sum += sample.latency;
        self.latency_max = self.latency_max.max(sample.latency);
        let min = self.latency_min.get_or_insert(sample.latency);
        *min = (*min).min(sample.latency);
    }

    pub(crate) fn finish(self) -> Report {
        let finished = Utc::now();
        let elapsed_secs = (finished - self.started).num_milliseconds() as f64 / 1000.0;
        let requests_per_sec = if elapsed_secs > 0.0 {
            self.total as f64 / elapsed_secs
        } else {
            0.0
        };
        let mean = if self.total > 0 {
            self.latency_sum.as_secs_f64() * 1000.0 / self.total as f64
        } else {
            0.0
        };
        Report {
            started: self.started,
            finished,
            elapsed_secs,
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            requests_per_sec,
            latency_min_ms: self.latency_min.unwrap_or(Duration::ZERO).as_secs_f64() * 1000.0,
            latency_mean_ms: mean,
            latency_max_ms: self.latency_max.as_secs_f64() * 1000.0,
            failures: self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(outcome: Outcome, latency_ms: u64) -> Sample {
        Sample {
            name: "POST /venta".to_string(),
            user: 0,
            outcome,
            latency: Duration::from_millis(latency_ms),
            at: Utc::now(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn aggregates_counts_and_latencies() {
        let mut b = ReportBuilder::new(Utc::now());
        b.push(&sample(Outcome::Success { status: 201 }, 10));
        b.push(&sample(Outcome::Success { status: 200 }, 30));
        b.push(&sample(
            Outcome::Failure {
                reason: "HTTP 500".to_string(),
            },
            20,
        ));
        b.push(&sample(
            Outcome::Failure {
                reason: "HTTP 500".to_string(),
            },
            40,
        ));
        let report = b.finish();
        assert_eq!(report.total, 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failures.get("HTTP 500"), Some(&2));
        assert!(close(report.latency_min_ms, 10.0));
        assert!(close(report.latency_max_ms, 40.0));
        assert!(close(report.latency_mean_ms, 25.0));
    }

    #[test]
    fn empty_run_does_not_divide_by_zero() {
        let report = ReportBuilder::new(Utc::now()).finish();
        assert_eq!(report.total, 0);
        assert_eq!(report.latency_mean_ms, 0.0);
        assert_eq!(report.latency_min_ms, 0.0);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut b = ReportBuilder::new(Utc::now());
        b.push(&sample(Outcome::Success { status: 200 }, 5));
        let report = b.finish();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["succeeded"], 1);
    }
}
