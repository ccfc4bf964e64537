//! This is the main module, and contains the definition of the runner:
//! it owns the population of virtual users and the stop condition.
use std::{mem, sync::Arc, time::Duration};

use chrono::Utc;
use indicatif::ProgressBar;
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
};

use crate::sample::{Report, ReportBuilder};
use crate::scenario::Scenario;
use crate::user::VirtualUser;

#[derive(Debug, thiserror::Error)]
/// Possible errors returned from the runner.
///
/// They are all startup-time problems: once the population is spawned
/// nothing that happens inside an iteration is fatal.
pub enum HarnessError {
    /// the host is not something we can resolve paths against
    #[error("invalid host {0:?}, expected something like http://localhost:8000")]
    InvalidHost(String),
    /// a population of zero users does nothing
    #[error("a load test needs at least one user")]
    NoUsers,
    /// think time bounds must be finite, positive and ordered
    #[error("invalid think time bounds [{0}, {1}]")]
    InvalidThinkTime(f64, f64),
    /// could not build the http client
    #[error("cannot build the http client: {0}")]
    Client(#[from] reqwest::Error),
    /// the sample collector died
    #[error("sample collector failed: {0}")]
    Collector(#[from] tokio::task::JoinError),
}

/// The population driver. Configure it with the set_* methods, then call
/// execute to run the whole test and get the report back.
pub struct Runner {
    scenario: Arc<dyn Scenario>,
    host: String,
    users: usize,
    run_time: Option<Duration>,
    iterations: Option<u64>,
    /// think time bounds, seconds
    think: (f64, f64),
}

impl Runner {
    /// Constructor, it takes the scenario every user of the population runs
    pub fn new(scenario: impl Scenario) -> Self {
        Runner {
            scenario: Arc::new(scenario),
            host: "http://localhost:8000".to_string(),
            users: 1,
            run_time: None,
            iterations: None,
            think: (0.1, 0.5),
        }
    }

    /// where the scenario paths are resolved against
    pub fn set_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// how many virtual users run the loop concurrently
    pub fn set_users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    /// stop the population after this much time.
    /// without it the test runs until ctrl-c
    pub fn set_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = Some(run_time);
        self
    }

    /// every user stops after this many iterations
    pub fn set_iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// idle duration bounds between iterations, seconds
    pub fn set_think_time(mut self, min: f64, max: f64) -> Self {
        self.think = (min, max);
        self
    }

    /// Runs the whole test: spawns the population, waits for the stop
    /// condition (run time elapsed, ctrl-c, or every user done with its
    /// iterations) and returns the aggregated report.
    pub async fn execute(self) -> Result<Report, HarnessError> {
        let Runner {
            scenario,
            host,
            users,
            run_time,
            iterations,
            think,
        } = self;
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(HarnessError::InvalidHost(host));
        }
        let host = host.trim_end_matches('/').to_string();
        if users == 0 {
            return Err(HarnessError::NoUsers);
        }
        let (min, max) = think;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < min {
            return Err(HarnessError::InvalidThinkTime(min, max));
        }

        let started = Utc::now();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let collector = tokio::spawn(async move {
            let mut builder = ReportBuilder::new(started);
            while let Some(sample) = rx.recv().await {
                builder.push(&sample);
            }
            builder.finish()
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut set = JoinSet::new();
        let bar = ProgressBar::new(users as u64);
        for index in 0..users {
            let user = VirtualUser::new(index, host.clone(), think, tx.clone())?;
            let scenario = scenario.clone();
            let stop = stop_rx.clone();
            set.spawn(drive_user(scenario, user, stop, iterations));
            bar.inc(1);
        }
        mem::drop(bar);
        // the collector stops once every user dropped its sender
        mem::drop(tx);
        mem::drop(stop_rx);

        let stopper = tokio::spawn(async move {
            match run_time {
                Some(time) => {
                    tokio::select! {
                        _ = tokio::time::sleep(time) => {}
                        _ = tokio::signal::ctrl_c() => {}
                    }
                }
                None => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
            let _ = stop_tx.send(true);
        });

        while set.join_next().await.is_some() {}
        stopper.abort();
        let report = collector.await?;
        Ok(report)
    }
}

/// the send/idle loop of a single user.
/// Iteration errors become failed samples, the loop only ends on the stop
/// signal or on the iteration cap.
async fn drive_user(
    scenario: Arc<dyn Scenario>,
    mut user: VirtualUser,
    mut stop: watch::Receiver<bool>,
    iterations: Option<u64>,
) {
    if let Err(err) = scenario.on_start(&mut user).await {
        user.report_failure(scenario.name(), err.to_string());
    }
    let mut completed = 0u64;
    loop {
        if *stop.borrow() {
            break;
        }
        if let Some(limit) = iterations {
            if completed >= limit {
                break;
            }
        }
        if let Err(err) = scenario.run(&mut user).await {
            user.report_failure(scenario.name(), err.to_string());
        }
        completed += 1;
        let pause = user.think_time();
        tokio::select! {
            _ = stop.changed() => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }
}
