//! 最小示例仿真
//!
//! 两个产品、三类资源，按最早开始时间派发

use clap::Parser;
use mfgsim_rs::demo::build_minimal_plan;
use mfgsim_rs::factory::{AcquireMode, RunConfig, simulate};
use mfgsim_rs::operator::ScriptedOperator;
use mfgsim_rs::report::{check_schedule, render_table};
use mfgsim_rs::sim::SimTime;

#[derive(Debug, Parser)]
#[command(name = "minimal_example", about = "最小示例：2 个产品、Filter/Mixer/Dryer 各 1 台")]
struct Args {
    /// 仿真运行到的时间
    #[arg(long, default_value_t = 1_000)]
    until: u64,
    #[arg(long, default_value = "atomic")]
    acquire: AcquireMode,
}

fn main() {
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

    let plan = build_minimal_plan().expect("minimal plan is valid");
    let operator = ScriptedOperator::from_plan(&plan);
    let config = RunConfig {
        horizon: SimTime(args.until),
        acquire_mode: args.acquire,
        ..RunConfig::default()
    };
    let report = simulate(plan.clone(), operator, config).expect("run minimal plan");

    print!("{}", render_table(&report.rows()));
    let violations = check_schedule(&plan, &report.records);
    println!(
        "done @ {}: {} clashes={} violations={}",
        report.end_time,
        report.metrics,
        report.clashes(),
        violations.len()
    );
}
