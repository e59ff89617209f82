//! 工厂世界实现
//!
//! 持有一次运行的全部共享状态：计划、资源池、活动日志、进程表、使用记录与调度器。
//! 所有修改都发生在某个事件的执行过程中，事件之间天然串行。

use std::collections::HashMap;

use tracing::{debug, error, info, trace, warn};

use super::constraint::FailureCode;
use super::engine::{AcquireMode, RunConfig};
use super::id::{ActivityKey, ProcessId};
use super::log::ActivityLog;
use super::pool::{ResourceInstance, ResourcePool};
use super::process::{ActivityProcess, ProcessState, ResumeProcess};
use super::stats::{Rejection, Stats};
use super::usage::UsageRecord;
use crate::error::SimError;
use crate::operator::{ActivityRequest, Operator};
use crate::plan::ProductionPlan;
use crate::sim::{SimTime, Simulator, World};
use crate::viz::{VizEvent, VizEventKind, VizLogger, VizProductInfo, VizResourceInfo};
use std::any::Any;

pub struct FactoryWorld {
    plan: ProductionPlan,
    config: RunConfig,
    operator: Box<dyn Operator>,
    pub(crate) pool: ResourcePool,
    pub(crate) log: ActivityLog,
    pub(crate) stats: Stats,
    pub(crate) viz: Option<VizLogger>,
    // 进程在执行期间被暂时取出，槽位为 None
    processes: Vec<Option<ActivityProcess>>,
    usage: Vec<UsageRecord>,
    usage_index: HashMap<ActivityKey, usize>,
    rejections: Vec<Rejection>,
    fatal: Option<SimError>,
    dispatch_finished: Option<SimTime>,
    idle_ticks: u32,
}

impl FactoryWorld {
    pub fn new(plan: ProductionPlan, operator: Box<dyn Operator>, config: RunConfig) -> Self {
        let pool = ResourcePool::new(plan.capacity());
        let usage: Vec<UsageRecord> = plan.activity_keys().map(UsageRecord::sentinel).collect();
        let usage_index = usage
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key, i))
            .collect();
        let viz = config.record_viz.then(|| meta_logger(&plan));
        let stats = Stats {
            peak_in_use: vec![0; plan.resource_groups()],
            ..Stats::default()
        };
        info!(
            resource_groups = pool.groups(),
            planned_activities = usage.len(),
            "🏭 工厂世界已初始化"
        );
        Self {
            plan,
            config,
            operator,
            pool,
            log: ActivityLog::default(),
            stats,
            viz,
            processes: Vec::new(),
            usage,
            usage_index,
            rejections: Vec::new(),
            fatal: None,
            dispatch_finished: None,
            idle_ticks: 0,
        }
    }

    pub fn plan(&self) -> &ProductionPlan {
        &self.plan
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn usage(&self) -> &[UsageRecord] {
        &self.usage
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// 调度器宣告结束派发的时间
    pub fn dispatch_finished(&self) -> Option<SimTime> {
        self.dispatch_finished
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn process_state(&self, pid: ProcessId) -> Option<ProcessState> {
        self.processes.get(pid.0)?.as_ref().map(|p| p.state())
    }

    /// 仍在获取资源或加工中的进程数
    pub fn in_flight(&self) -> usize {
        self.processes
            .iter()
            .flatten()
            .filter(|p| !p.state().is_terminal())
            .count()
    }

    pub fn viz(&self) -> Option<&VizLogger> {
        self.viz.as_ref()
    }

    pub(crate) fn take_viz(&mut self) -> Option<VizLogger> {
        self.viz.take()
    }

    pub(crate) fn take_fatal(&mut self) -> Option<SimError> {
        self.fatal.take()
    }

    pub(crate) fn fail(&mut self, err: SimError, sim: &mut Simulator) {
        error!(%err, "致命错误，终止仿真");
        self.fatal = Some(err);
        sim.halt();
    }

    pub(crate) fn next_decision(&mut self, now: SimTime) -> crate::operator::Dispatch {
        self.operator.send_next_activity(now)
    }

    pub(crate) fn finish_dispatch(&mut self, now: SimTime) {
        self.dispatch_finished = Some(now);
    }

    pub(crate) fn note_idle_tick(&mut self) -> u32 {
        self.idle_ticks += 1;
        self.idle_ticks
    }

    pub(crate) fn reset_idle_ticks(&mut self) {
        self.idle_ticks = 0;
    }

    /// 创建活动进程并在当前时间调度其第一次执行（延迟获取模式下为紧急事件）。
    /// 计划外或需求向量长度不符的派发是致命错误。
    pub(crate) fn spawn(
        &mut self,
        request: ActivityRequest,
        sim: &mut Simulator,
    ) -> Result<ProcessId, SimError> {
        let key = request.key;
        let Some(activity) = self.plan.activity(key) else {
            return Err(SimError::UnknownDispatch {
                product: key.product.0,
                activity: key.activity.0,
            });
        };
        if request.needs.len() != self.plan.resource_groups() {
            return Err(SimError::DispatchNeeds {
                product: key.product.0,
                activity: key.activity.0,
                expected: self.plan.resource_groups(),
                found: request.needs.len(),
            });
        }
        let pid = ProcessId(self.processes.len());
        let now = sim.now();
        let duration = request.duration;
        self.processes.push(Some(ActivityProcess::new(
            pid,
            request,
            activity.clone(),
            now,
        )));
        self.stats.dispatched += 1;
        self.viz_push(now, key, VizEventKind::Dispatch {
            pid: pid.0,
            duration: duration.0,
        });
        debug!(pid = pid.0, %key, ?duration, "📥 活动已派发");
        match self.config.acquire_mode {
            AcquireMode::Atomic => sim.schedule_now(ResumeProcess { pid }),
            // 新进程的第一步先于该时刻已排队的普通事件
            AcquireMode::Deferred => sim.schedule_urgent(ResumeProcess { pid }),
        }
        Ok(pid)
    }

    pub(crate) fn resume(&mut self, pid: ProcessId, sim: &mut Simulator) {
        // 暂时把进程取出来，避免 &mut self 与 &mut process 的重叠借用。
        let Some(mut process) = self.processes.get_mut(pid.0).and_then(Option::take) else {
            warn!(pid = pid.0, "恢复不存在的进程，忽略");
            return;
        };
        process.resume(sim, self);
        self.processes[pid.0] = Some(process);
    }

    pub(crate) fn reject(&mut self, key: ActivityKey, now: SimTime, code: FailureCode) {
        info!(%key, ?now, %code, "⛔ 活动被拒绝");
        self.operator
            .signal_failed_activity(key.product, key.activity, now, code);
        self.stats.count_clash(code);
        self.rejections.push(Rejection { key, at: now, code });
        self.viz_push(now, key, VizEventKind::Reject {
            code: code.to_string(),
        });
    }

    pub(crate) fn release(&mut self, inst: ResourceInstance, key: ActivityKey, sim: &mut Simulator) {
        let now = sim.now();
        self.viz_push(now, key, VizEventKind::Release {
            group: inst.group,
            resource_id: inst.id,
        });
        let Some((waiter, inst)) = self.pool.release(inst) else {
            return;
        };
        let Some(process) = self.processes.get_mut(waiter.0).and_then(Option::as_mut) else {
            warn!(pid = waiter.0, "等待进程不存在，实例无法交付");
            return;
        };
        process.grant(inst);
        let waiter_key = process.key();
        self.viz_push(now, waiter_key, VizEventKind::Acquire {
            group: inst.group,
            resource_id: inst.id,
        });
        trace!(pid = waiter.0, ?inst, "唤醒等待进程");
        sim.schedule_now(ResumeProcess { pid: waiter });
    }

    /// 用完整记录覆盖占位记录
    pub(crate) fn complete(&mut self, record: UsageRecord) {
        self.stats.completed += 1;
        match self.usage_index.get(&record.key) {
            Some(&i) => self.usage[i] = record,
            None => warn!(key = %record.key, "使用记录不在计划中"),
        }
    }

    pub(crate) fn viz_push(&mut self, t: SimTime, key: ActivityKey, kind: VizEventKind) {
        if let Some(v) = self.viz.as_mut() {
            v.push(VizEvent {
                t: t.0,
                product: Some(key.product.0),
                activity: Some(key.activity.0),
                kind,
            });
        }
    }
}

fn meta_logger(plan: &ProductionPlan) -> VizLogger {
    let resources = plan
        .resource_names()
        .iter()
        .zip(plan.capacity())
        .enumerate()
        .map(|(group, (name, &capacity))| VizResourceInfo {
            group,
            name: name.clone(),
            capacity,
        })
        .collect();
    let products = plan
        .products()
        .iter()
        .map(|p| VizProductInfo {
            index: p.index.0,
            product_id: p.product_id,
            name: p.name.clone(),
            deadline: p.deadline.0,
        })
        .collect();
    let mut v = VizLogger::default();
    v.push(VizEvent {
        t: 0,
        product: None,
        activity: None,
        kind: VizEventKind::Meta {
            resources,
            products,
        },
    });
    v
}

impl World for FactoryWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        for (group, peak) in self.stats.peak_in_use.iter_mut().enumerate() {
            let in_use = self.pool.in_use(group);
            debug_assert_eq!(
                in_use + self.pool.available(group),
                self.pool.capacity(group),
                "capacity invariant broken for group {group}"
            );
            *peak = (*peak).max(in_use);
        }
    }
}
