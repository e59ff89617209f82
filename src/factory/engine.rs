//! 仿真引擎
//!
//! 一个引擎、一种调度器能力：引擎持有虚拟时钟与工厂世界，在 t=0 启动派发循环，
//! 运行到仿真截止时间后把使用记录交给指标计算。

use std::fmt;
use std::str::FromStr;

use tracing::info;

use super::dispatch::DispatchTick;
use super::world::FactoryWorld;
use crate::error::SimError;
use crate::operator::Operator;
use crate::plan::ProductionPlan;
use crate::report::RunReport;
use crate::sim::{SimTime, Simulator};

/// 约束检查与资源获取之间的关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquireMode {
    /// 检查通过后在同一次状态转移内取走全部实例，获取永不阻塞。
    #[default]
    Atomic,
    /// 逐个实例获取：第一个实例在检查的同一步里取走，之后每取走或归还一个实例，
    /// 进程都让出一次，同一时刻的其它进程可以插入。新派发进程的第一步排在该时刻
    /// 已排队的恢复事件之前。实例被取光时进程拿着已取得的实例在资源池中挂起，直到有实例归还。
    Deferred,
}

impl FromStr for AcquireMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "atomic" | "strict" => Ok(Self::Atomic),
            "deferred" | "legacy" => Ok(Self::Deferred),
            _ => Err(format!("unknown acquire mode: {raw} (expected atomic or deferred)")),
        }
    }
}

impl fmt::Display for AcquireMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Atomic => "atomic",
            Self::Deferred => "deferred",
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// 仿真截止时间（不含：恰好在此刻发生的事件不执行）
    pub horizon: SimTime,
    /// 仅供调度器/分布层使用；引擎自身是确定性的
    pub seed: u64,
    pub acquire_mode: AcquireMode,
    /// 是否收集可视化事件
    pub record_viz: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            horizon: SimTime(1_000),
            seed: 1,
            acquire_mode: AcquireMode::Atomic,
            record_viz: false,
        }
    }
}

pub struct Engine {
    sim: Simulator,
    world: FactoryWorld,
}

impl Engine {
    pub fn new(plan: ProductionPlan, operator: impl Operator + 'static, config: RunConfig) -> Self {
        let mut sim = Simulator::default();
        let world = FactoryWorld::new(plan, Box::new(operator), config);
        sim.schedule(SimTime::ZERO, DispatchTick);
        Self { sim, world }
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    pub fn world(&self) -> &FactoryWorld {
        &self.world
    }

    /// 处理 `until` 之前的全部事件（不超过仿真截止时间），时钟停在 `until`。
    /// 可多次调用以在中途采样状态。
    pub fn advance(&mut self, until: SimTime) {
        let until = until.min(self.world.config().horizon);
        self.sim.run_until(until, &mut self.world);
    }

    /// 运行到截止时间并汇总结果。截止时仍在加工的活动（包括恰好在截止时刻结束的）保持未处理状态。
    pub fn run(mut self) -> Result<RunReport, SimError> {
        info!(
            horizon = ?self.world.config().horizon,
            mode = %self.world.config().acquire_mode,
            seed = self.world.config().seed,
            "▶️  开始生产计划仿真"
        );
        self.advance(self.world.config().horizon);
        if let Some(err) = self.world.take_fatal() {
            return Err(err);
        }
        let report = RunReport::collect(&mut self.world, &self.sim);
        info!(
            makespan = ?report.metrics.makespan,
            total_lateness = report.metrics.total_lateness,
            unfinished_products = report.metrics.unfinished_products,
            clashes = report.stats.clashes,
            events = report.events,
            "✅ 仿真完成"
        );
        Ok(report)
    }
}

/// `Engine::new(..).run()` 的简写
pub fn simulate(
    plan: ProductionPlan,
    operator: impl Operator + 'static,
    config: RunConfig,
) -> Result<RunReport, SimError> {
    Engine::new(plan, operator, config).run()
}
