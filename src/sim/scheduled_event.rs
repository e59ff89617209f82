//! 调度事件
//!
//! 队列中的条目：执行时间 + 优先级 + 序列号 + 事件对象。
//! 同一时间戳先执行紧急事件，同一优先级内按调度顺序（FIFO）执行。

use super::event::Event;
use super::time::SimTime;
use std::cmp::Ordering;
use std::fmt;

/// 同一时间戳内的执行优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// 排在该时刻所有普通事件之前（新进程的第一步）
    Urgent,
    Normal,
}

/// 调度事件，包含执行时间、优先级、序列号和事件对象。
pub struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) priority: Priority,
    pub(crate) seq: u64,
    pub(crate) ev: Box<dyn Event>,
}

impl ScheduledEvent {
    fn key(&self) -> (SimTime, Priority, u64) {
        (self.at, self.priority, self.seq)
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("at", &self.at)
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

// BinaryHeap 是 max-heap：(时间, 优先级, 序列号) 越小越先执行，因此比较方向取反。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}
