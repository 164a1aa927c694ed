//! Command-line surface
//!
//! A thin wrapper over the library: demo flows showing the blocking-call
//! illusion against real timers, and a micro-benchmark of pass overhead.

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};

use crate::engine::{run, run_with_fallback, Interrupt};
use crate::errors::OpError;
use crate::ops::{op, OpSpec, Recovery, TrackedOp};

#[derive(Parser)]
#[command(name = "reprise")]
#[command(
    about = "Reprise - restart-based suspension over asynchronous operations",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the built-in demo flows and print their records
    Demo {
        /// Milliseconds of simulated latency per operation
        #[arg(long, default_value = "25")]
        latency_ms: u64,
    },

    /// Measure pass overhead for sequential vs. batched discovery
    Bench {
        /// Number of tracked operations per run
        #[arg(long, default_value = "100")]
        ops: usize,

        /// Number of measured rounds
        #[arg(long, default_value = "10")]
        rounds: usize,
    },
}

/// Run the CLI by parsing process arguments.
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { latency_ms } => demo(latency_ms).await,
        Commands::Bench { ops, rounds } => bench(ops, rounds).await,
    }
}

fn fetch_op(name: &str, value: JsonValue, latency_ms: u64) -> TrackedOp {
    op(name, move |_args| async move {
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        Ok(value)
    })
}

fn broken_op(name: &str, latency_ms: u64) -> TrackedOp {
    let message = format!("{} fetch failed", name);
    op(name, move |_args| async move {
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        Err(OpError::new("upstream_unavailable", message))
    })
}

async fn demo(latency_ms: u64) -> Result<()> {
    // Fan-out: two independent fetches summed by an apparently-blocking body.
    let ops = vec![
        fetch_op("price", json!(40), latency_ms),
        fetch_op("tax", json!(2), latency_ms),
    ];

    let (total, records) = run(
        |px| {
            let price = px.call(0, vec![])?;
            let tax = px.call(1, vec![])?;
            Ok(json!(price.as_f64().unwrap_or(0.0) + tax.as_f64().unwrap_or(0.0)))
        },
        ops,
    )
    .await?;

    println!("fan-out total: {}", total);
    println!("{}\n", serde_json::to_string_pretty(&records)?);

    // Fallbacks: one failure masked, one recorded but substituted.
    let specs = vec![
        OpSpec::masked(
            broken_op("inventory", latency_ms),
            Recovery::value(json!({ "stock": 0 })),
        ),
        OpSpec::with_handler(
            broken_op("reviews", latency_ms),
            Recovery::compute(|err| json!({ "error": err.code, "reviews": [] })),
        ),
    ];

    let (page, records) = run_with_fallback(
        |px| {
            let inventory = px.call(0, vec![])?;
            let reviews = px.call(1, vec![])?;
            Ok(json!({ "inventory": inventory, "reviews": reviews }))
        },
        specs,
    )
    .await?;

    println!("page assembled despite failures: {}", page);
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}

async fn bench(ops_count: usize, rounds: usize) -> Result<()> {
    if ops_count == 0 || rounds == 0 {
        eprintln!("Error: --ops and --rounds must both be at least 1");
        std::process::exit(1);
    }

    println!(
        "Measuring {} immediate ops over {} rounds per mode...",
        ops_count, rounds
    );

    let mut sequential = Vec::with_capacity(rounds);
    let mut batched = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        sequential.push(bench_round(ops_count, false).await?);
        batched.push(bench_round(ops_count, true).await?);
    }

    // Sequential discovery restarts once per op; batched discovery starts
    // every op in the first pass and finishes in the second.
    println!(
        "  sequential discovery ({} passes): {:.1} µs/run",
        ops_count + 1,
        avg_micros(&sequential)
    );
    println!("  batched discovery (2 passes): {:.1} µs/run", avg_micros(&batched));

    Ok(())
}

async fn bench_round(n: usize, batched: bool) -> Result<Duration> {
    let ops: Vec<TrackedOp> = (0..n)
        .map(|i| op(format!("op{}", i + 1), move |_args| async move { Ok(json!(1)) }))
        .collect();

    let start = Instant::now();
    if batched {
        run(
            |px| {
                let mut total = 0.0;
                let mut suspended = None;
                for id in 0..px.len() {
                    match px.call(id, vec![]) {
                        Ok(v) => total += v.as_f64().unwrap_or(0.0),
                        Err(Interrupt::Suspend(op)) => {
                            suspended = Some(Interrupt::Suspend(op));
                        }
                        Err(fault) => return Err(fault),
                    }
                }
                match suspended {
                    Some(signal) => Err(signal),
                    None => Ok(total),
                }
            },
            ops,
        )
        .await?;
    } else {
        run(
            |px| {
                let mut total = 0.0;
                for id in 0..px.len() {
                    total += px.call(id, vec![])?.as_f64().unwrap_or(0.0);
                }
                Ok(total)
            },
            ops,
        )
        .await?;
    }
    Ok(start.elapsed())
}

fn avg_micros(samples: &[Duration]) -> f64 {
    samples.iter().map(Duration::as_secs_f64).sum::<f64>() / samples.len() as f64 * 1e6
}
