//! A VirtualUser is one simulated client. It owns its own http client and
//! its own random stream, nothing is shared with the other users of the
//! population.
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::sample::{Outcome, Sample};

/// One simulated independent client executing the send/idle loop
pub struct VirtualUser {
    index: usize,
    base_url: String,
    client: Client,
    rng: StdRng,
    /// think time bounds, seconds
    think: (f64, f64),
    tx: UnboundedSender<Sample>,
}

impl VirtualUser {
    pub(crate) fn new(
        index: usize,
        base_url: String,
        think: (f64, f64),
        tx: UnboundedSender<Sample>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            index,
            base_url,
            client,
            rng: StdRng::from_entropy(),
            think,
            tx,
        })
    }

    /// index of this user inside the population
    pub fn index(&self) -> usize {
        self.index
    }

    /// the user owned random stream, use it to build payloads
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// POST a json body to base_url + path and record the outcome.
    ///
    /// All the failure modes are soft: a non-2xx answer or a transport error
    /// become a failed sample, never an error. The recorded sample is
    /// returned so the scenario can look at it if it wants.
    pub async fn post_json<B: Serialize>(&mut self, path: &str, body: &B) -> Sample {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();
        let outcome = match self.client.post(&url).json(body).send().await {
            Ok(res) if res.status().is_success() => Outcome::Success {
                status: res.status().as_u16(),
            },
            Ok(res) => Outcome::Failure {
                reason: format!("HTTP {}", res.status().as_u16()),
            },
            Err(err) => Outcome::Failure {
                // strip the url so equal errors fold together in the report
                reason: err.without_url().to_string(),
            },
        };
        let sample = Sample {
            name: format!("POST {path}"),
            user: self.index,
            outcome,
            latency: start.elapsed(),
            at: Utc::now(),
        };
        let _ = self.tx.send(sample.clone());
        sample
    }

    /// record a failed sample that is not tied to a completed request
    /// (used by the runner when a scenario iteration returns an error)
    pub fn report_failure(&mut self, name: &str, reason: String) {
        let sample = Sample {
            name: name.to_string(),
            user: self.index,
            outcome: Outcome::Failure { reason },
            latency: Duration::ZERO,
            at: Utc::now(),
        };
        let _ = self.tx.send(sample);
    }

    /// draw the idle duration before the next iteration, uniform between
    /// the configured bounds
    pub fn think_time(&mut self) -> Duration {
        let (min, max) = self.think;
        Duration::from_secs_f64(self.rng.gen_range(min..=max))
    }
}
