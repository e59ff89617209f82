//! 活动日志与活跃进程登记
//!
//! 只追加的 START/END 记录，外加两个索引：
//! 每个活动最近一次 START 的时间（前驱查询），以及当前处于 START 与 END 之间的活动集合（互斥检查）。

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::trace;

use super::id::ActivityKey;
use crate::sim::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub key: ActivityKey,
    pub action: Action,
    pub at: SimTime,
}

#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    latest_start: HashMap<ActivityKey, SimTime>,
    active: HashSet<ActivityKey>,
}

impl ActivityLog {
    pub fn record(&mut self, key: ActivityKey, action: Action, at: SimTime) {
        trace!(%key, ?action, ?at, "记录活动日志");
        self.entries.push(LogEntry { key, action, at });
        match action {
            Action::Start => {
                self.latest_start.insert(key, at);
                self.active.insert(key);
            }
            Action::End => {
                self.active.remove(&key);
            }
        }
    }

    /// 该活动最近一次 START 的时间；从未开始则为 `None`
    pub fn latest_start(&self, key: ActivityKey) -> Option<SimTime> {
        self.latest_start.get(&key).copied()
    }

    pub fn is_active(&self, key: ActivityKey) -> bool {
        self.active.contains(&key)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
