//! 活动进程
//!
//! 一个活动实例的显式状态机：
//! `Requested → Checking → {Rejected | Acquiring → Running → Releasing → Completed}`。
//! 进程在挂起点（等待资源、等待加工时长）停下，由 [`ResumeProcess`] 事件恢复；
//! 两个挂起点之间的状态转移在一次事件执行内完成。延迟获取模式下，每取走或归还一个实例
//! 也是一个挂起点。

use std::collections::VecDeque;

use tracing::{debug, error, info, trace, warn};

use super::constraint::{self, FailureCode};
use super::engine::AcquireMode;
use super::id::{ActivityKey, ProcessId};
use super::log::Action;
use super::needs::Needs;
use super::pool::{Acquire, ResourceInstance};
use super::usage::{CompletedUsage, UsageOutcome, UsageRecord};
use super::world::FactoryWorld;
use crate::operator::ActivityRequest;
use crate::plan::PlannedActivity;
use crate::sim::{Event, SimTime, Simulator, World, world_mut};
use crate::viz::VizEventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Requested,
    Checking,
    Rejected(FailureCode),
    Acquiring,
    Running,
    Releasing,
    Completed,
}

impl ProcessState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Rejected(_) | ProcessState::Completed)
    }
}

#[derive(Debug)]
pub struct ActivityProcess {
    pid: ProcessId,
    key: ActivityKey,
    duration: SimTime,
    needs: Needs,
    activity: PlannedActivity,
    state: ProcessState,
    /// 尚未拿到的实例，每个元素是一个资源组
    pending: VecDeque<usize>,
    held: Vec<ResourceInstance>,
    /// 加工结束后尚未归还的实例
    releasing: VecDeque<ResourceInstance>,
    request_time: SimTime,
    retrieve_time: Option<SimTime>,
    start_time: Option<SimTime>,
}

impl ActivityProcess {
    pub(crate) fn new(
        pid: ProcessId,
        request: ActivityRequest,
        activity: PlannedActivity,
        now: SimTime,
    ) -> Self {
        Self {
            pid,
            key: request.key,
            duration: request.duration,
            needs: request.needs,
            activity,
            state: ProcessState::Requested,
            pending: VecDeque::new(),
            held: Vec::new(),
            releasing: VecDeque::new(),
            request_time: now,
            retrieve_time: None,
            start_time: None,
        }
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn key(&self) -> ActivityKey {
        self.key
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn held(&self) -> &[ResourceInstance] {
        &self.held
    }

    /// 资源池把归还的实例直接交给本进程
    pub(crate) fn grant(&mut self, inst: ResourceInstance) {
        debug_assert_eq!(self.pending.front(), Some(&inst.group));
        self.pending.pop_front();
        self.held.push(inst);
    }

    /// 从当前状态推进到下一个挂起点或终止状态。
    #[tracing::instrument(skip(self, sim, w), fields(pid = self.pid.0, key = %self.key, now = ?sim.now()))]
    pub(crate) fn resume(&mut self, sim: &mut Simulator, w: &mut FactoryWorld) {
        let now = sim.now();
        let deferred = w.config().acquire_mode == AcquireMode::Deferred;
        loop {
            match self.state {
                ProcessState::Requested => {
                    self.state = ProcessState::Checking;
                }
                ProcessState::Checking => {
                    let code = constraint::check(
                        &w.pool,
                        &w.log,
                        self.key,
                        &self.activity,
                        &self.needs,
                        now,
                    );
                    if let Some(code) = code {
                        self.state = ProcessState::Rejected(code);
                        w.reject(self.key, now, code);
                        return;
                    }
                    // 第一个实例在检查的同一步里请求
                    self.pending = self.needs.units().collect();
                    self.state = ProcessState::Acquiring;
                    trace!(units = self.pending.len(), "约束满足，开始获取资源");
                }
                ProcessState::Acquiring => {
                    if let Some(&group) = self.pending.front() {
                        match w.pool.acquire(group, self.pid) {
                            Acquire::Ready(inst) => {
                                self.grant(inst);
                                w.viz_push(now, self.key, VizEventKind::Acquire {
                                    group,
                                    resource_id: inst.id,
                                });
                                // 延迟模式：实例已取走，进程在下一个事件中才继续
                                if deferred {
                                    sim.schedule_now(ResumeProcess { pid: self.pid });
                                    return;
                                }
                                continue;
                            }
                            Acquire::Parked => {
                                debug!(group, "资源已被占用，进程在资源池中挂起");
                                w.stats.parked += 1;
                                w.viz_push(now, self.key, VizEventKind::Park { group });
                                return;
                            }
                        }
                    }
                    self.retrieve_time = Some(now);
                    self.start_time = Some(now);
                    self.state = ProcessState::Running;
                    w.log.record(self.key, Action::Start, now);
                    w.viz_push(now, self.key, VizEventKind::Start);
                    debug!(duration = ?self.duration, "▶️ 活动开始加工");
                    sim.schedule(now.after(self.duration), ResumeProcess { pid: self.pid });
                    return;
                }
                ProcessState::Running => {
                    w.log.record(self.key, Action::End, now);
                    w.viz_push(now, self.key, VizEventKind::End);
                    self.releasing = self.held.iter().copied().collect();
                    self.state = ProcessState::Releasing;
                }
                ProcessState::Releasing => {
                    if let Some(inst) = self.releasing.pop_front() {
                        w.release(inst, self.key, sim);
                        // 延迟模式：每归还一个实例是单独的一步
                        if deferred {
                            sim.schedule_now(ResumeProcess { pid: self.pid });
                            return;
                        }
                        continue;
                    }
                    let resources = std::mem::take(&mut self.held);
                    let (Some(retrieve), Some(start)) = (self.retrieve_time, self.start_time)
                    else {
                        warn!("进程未记录开始时间，放弃写入使用记录");
                        return;
                    };
                    w.complete(UsageRecord {
                        key: self.key,
                        outcome: UsageOutcome::Completed(CompletedUsage {
                            needs: self.needs.clone(),
                            resources,
                            request: self.request_time,
                            retrieve,
                            start,
                            finish: now,
                        }),
                    });
                    self.state = ProcessState::Completed;
                    info!(start = ?start, finish = ?now, "✅ 活动完成");
                    return;
                }
                ProcessState::Rejected(_) | ProcessState::Completed => {
                    warn!(state = ?self.state, "进程已终止，忽略恢复");
                    return;
                }
            }
        }
    }
}

/// 事件：恢复一个挂起的活动进程
#[derive(Debug)]
pub struct ResumeProcess {
    pub pid: ProcessId,
}

impl Event for ResumeProcess {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let ResumeProcess { pid } = *self;
        let Some(w) = world_mut::<FactoryWorld>(world) else {
            error!(pid = pid.0, "世界类型不是 FactoryWorld，无法恢复进程");
            return;
        };
        w.resume(pid, sim);
    }
}
