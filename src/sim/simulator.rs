//! 仿真器
//!
//! 单线程协作式离散事件仿真器：维护虚拟时钟与事件队列。

use super::event::{Event, World};
use super::scheduled_event::{Priority, ScheduledEvent};
use super::time::SimTime;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace, warn};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
    executed: u64,
    halted: bool,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 已执行的事件总数
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 仿真是否已被致命错误终止
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// 终止仿真：之后的 `run`/`run_until` 不再执行任何事件。
    pub fn halt(&mut self) {
        warn!(now = ?self.now, pending = self.q.len(), "仿真被终止");
        self.halted = true;
    }

    /// 调度事件在指定时间执行。早于当前时间的请求按当前时间处理。
    #[tracing::instrument(level = "trace", skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        self.push(at, Priority::Normal, Box::new(ev));
    }

    /// 在当前时间调度事件（排在同一时间戳已有的普通事件之后）。
    pub fn schedule_now<E: Event>(&mut self, ev: E) {
        self.schedule(self.now, ev);
    }

    /// 在当前时间调度紧急事件：先于该时刻所有已排队的普通事件执行，
    /// 紧急事件之间仍按调度顺序。
    pub fn schedule_urgent<E: Event>(&mut self, ev: E) {
        self.push(self.now, Priority::Urgent, Box::new(ev));
    }

    fn push(&mut self, at: SimTime, priority: Priority, ev: Box<dyn Event>) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            priority,
            seq,
            ev,
        });
        trace!(now = ?self.now, ?priority, seq, queue_size = self.q.len(), "事件已加入队列");
    }

    fn step(&mut self, item: ScheduledEvent, world: &mut dyn World) {
        self.now = item.at;
        self.executed = self.executed.saturating_add(1);
        trace!(now = ?self.now, seq = item.seq, remaining_queue = self.q.len(), "执行事件");
        item.ev.execute(self, world);
        world.on_tick(self);
    }

    /// 运行直到事件队列为空或到达 `until`。`until` 时刻的事件不执行，时钟停在 `until`。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        while !self.halted {
            match self.q.peek() {
                Some(top) if top.at < until => {}
                _ => break,
            }
            let Some(item) = self.q.pop() else { break };
            self.step(item, world);
        }
        if !self.halted {
            self.now = self.now.max(until);
        }
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        while !self.halted {
            let Some(item) = self.q.pop() else { break };
            self.step(item, world);
        }

        info!(
            total_events = self.executed,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
    }
}
