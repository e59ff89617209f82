//! 生产计划仿真
//!
//! 读取 plan.json，按计划的最早开始时间派发活动，输出资源使用表与汇总指标。

use clap::Parser;
use mfgsim_rs::SimError;
use mfgsim_rs::factory::{AcquireMode, RunConfig, simulate};
use mfgsim_rs::operator::{RetryPolicy, ScriptedOperator};
use mfgsim_rs::plan::ProductionPlan;
use mfgsim_rs::report::{check_schedule, render_table};
use mfgsim_rs::sim::SimTime;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "mfgsim", about = "Simulate a production plan on a shared resource pool")]
struct Args {
    /// Path to plan.json
    #[arg(long)]
    plan: PathBuf,

    /// Run horizon in plan time units
    #[arg(long, default_value_t = 1_000)]
    until: u64,

    /// Seed handed to the dispatch layer (the engine itself is deterministic)
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// atomic: check and acquire in one step; deferred: yield after every unit, may wait in the pool
    #[arg(long, default_value = "atomic")]
    acquire: AcquireMode,

    /// Resubmit rejected activities after this many time units
    #[arg(long)]
    retry_delay: Option<u64>,

    /// Maximum dispatches per activity when retrying
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Write the resource usage table (JSON) to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write viz events (JSON) to this file
    #[arg(long)]
    viz_json: Option<PathBuf>,

    /// Print the resource usage table
    #[arg(long)]
    table: bool,

    /// Re-verify lags and incompatibilities on the finished schedule
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let plan = ProductionPlan::load(&args.plan)?;

    let mut operator = ScriptedOperator::from_plan(&plan);
    if let Some(delay) = args.retry_delay {
        operator = operator.with_retry(RetryPolicy {
            delay: SimTime(delay),
            max_attempts: args.max_attempts,
        });
    }
    let config = RunConfig {
        horizon: SimTime(args.until),
        seed: args.seed,
        acquire_mode: args.acquire,
        record_viz: args.viz_json.is_some(),
    };

    let report = simulate(plan.clone(), operator, config)?;

    if let Some(path) = &args.output {
        fs::write(path, report.usage_json()?)?;
        eprintln!("wrote usage table to {}", path.display());
    }
    if let (Some(path), Some(v)) = (&args.viz_json, &report.viz) {
        fs::write(path, serde_json::to_string_pretty(&v.events)?)?;
        eprintln!("wrote viz events to {}", path.display());
    }
    if args.table {
        print!("{}", render_table(&report.rows()));
    }
    if args.check {
        let violations = check_schedule(&plan, &report.records);
        for v in &violations {
            println!("violation {v}");
        }
        println!("violations {}", violations.len());
    }
    for (code, n) in &report.stats.clashes_by_code {
        println!("clash {code} {n}");
    }
    println!(
        "summary {} clashes={} in_flight={} end={}",
        report.metrics,
        report.clashes(),
        report.in_flight,
        report.end_time
    );
    Ok(())
}
