//! Utility used to perform load-test on a venta API: it fires randomized
//! sale events at POST /venta with a population of simulated users.
use std::{path::PathBuf, process::exit, time::Duration};

use clap::Parser;
use harness::prelude::*;

use crate::scenario::VentaScenario;

mod scenario;
#[cfg(test)]
mod test;
mod venta;

/// Fires randomized sales at a venta API with a population of simulated users
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// base url of the target API
    #[arg(long, default_value = "http://localhost:8000")]
    host: String,

    /// how many virtual users run at the same time
    #[arg(short, long, default_value_t = 10)]
    users: usize,

    /// stop after this many seconds, without it the test runs until ctrl-c
    #[arg(short, long)]
    run_time: Option<u64>,

    /// every user stops after this many iterations
    #[arg(short, long)]
    iterations: Option<u64>,

    /// lower think time bound, seconds
    #[arg(long, default_value_t = 0.1)]
    think_min: f64,

    /// upper think time bound, seconds
    #[arg(long, default_value_t = 0.5)]
    think_max: f64,

    /// write the final report to this file as json
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
/// Initialize and start the population
async fn main() {
    let args = Args::parse();
    let mut runner = Runner::new(VentaScenario)
        .set_host(args.host)
        .set_users(args.users)
        .set_think_time(args.think_min, args.think_max);
    if let Some(secs) = args.run_time {
        runner = runner.set_run_time(Duration::from_secs(secs));
    }
    if let Some(iterations) = args.iterations {
        runner = runner.set_iterations(iterations);
    }

    match runner.execute().await {
        Ok(report) => {
            report.print();
            if let Some(path) = args.report {
                let json = match serde_json::to_string_pretty(&report) {
                    Ok(json) => json,
                    Err(err) => {
                        println!("got error: {err}");
                        exit(1);
                    }
                };
                if let Err(err) = tokio::fs::write(&path, json).await {
                    println!("got error: cannot write {}: {err}", path.display());
                    exit(1);
                }
            }
        }
        Err(err) => {
            println!("got error: {err}");
            exit(1);
        }
    }
}
