//! 资源池
//!
//! 带类型的资源实例集合（相当于按资源组过滤的 store）：
//! - 获取：组内有空闲实例时立即取走编号最小的一个，否则进程在池中排队挂起；
//! - 归还：若有等待同组实例的进程，实例直接交给最早排队者，否则放回空闲集合。
//!
//! 任意时刻每组满足 `available + in_use == capacity`。

use std::collections::{BTreeSet, VecDeque};

use super::id::ProcessId;
use tracing::{trace, warn};

/// 一个物理资源实例：资源组 + 组内唯一编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceInstance {
    pub group: usize,
    pub id: usize,
}

/// `ResourcePool::acquire` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Ready(ResourceInstance),
    /// 无匹配实例，进程已加入等待队列
    Parked,
}

#[derive(Debug, Default)]
struct Group {
    capacity: usize,
    available: BTreeSet<usize>,
    in_use: BTreeSet<usize>,
}

#[derive(Debug, Default)]
pub struct ResourcePool {
    groups: Vec<Group>,
    waiters: VecDeque<(ProcessId, usize)>,
}

impl ResourcePool {
    /// 按各组容量创建全部实例（组内编号 `0..capacity`）
    pub fn new(capacities: &[usize]) -> Self {
        let groups = capacities
            .iter()
            .map(|&capacity| Group {
                capacity,
                available: (0..capacity).collect(),
                in_use: BTreeSet::new(),
            })
            .collect();
        Self {
            groups,
            waiters: VecDeque::new(),
        }
    }

    pub fn groups(&self) -> usize {
        self.groups.len()
    }

    pub fn capacity(&self, group: usize) -> usize {
        self.groups.get(group).map_or(0, |g| g.capacity)
    }

    pub fn available(&self, group: usize) -> usize {
        self.groups.get(group).map_or(0, |g| g.available.len())
    }

    pub fn in_use(&self, group: usize) -> usize {
        self.groups.get(group).map_or(0, |g| g.in_use.len())
    }

    /// 在池中挂起等待的进程数
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    /// 立即获取组内编号最小的空闲实例
    pub fn try_acquire(&mut self, group: usize) -> Option<ResourceInstance> {
        let g = self.groups.get_mut(group)?;
        let id = g.available.pop_first()?;
        g.in_use.insert(id);
        trace!(group, id, "取走资源实例");
        Some(ResourceInstance { group, id })
    }

    /// 获取一个实例；无空闲实例时让 `pid` 排队挂起。
    pub fn acquire(&mut self, group: usize, pid: ProcessId) -> Acquire {
        match self.try_acquire(group) {
            Some(inst) => Acquire::Ready(inst),
            None => {
                trace!(group, pid = pid.0, "无空闲实例，进程排队");
                self.waiters.push_back((pid, group));
                Acquire::Parked
            }
        }
    }

    /// 归还实例。若有进程在等待该组，返回 (被唤醒的进程, 交给它的实例)。
    pub fn release(&mut self, inst: ResourceInstance) -> Option<(ProcessId, ResourceInstance)> {
        let Some(g) = self.groups.get_mut(inst.group) else {
            warn!(?inst, "归还未知资源组的实例，忽略");
            return None;
        };
        if !g.in_use.contains(&inst.id) {
            warn!(?inst, "归还未被占用的实例，忽略");
            return None;
        }
        if let Some(pos) = self.waiters.iter().position(|&(_, grp)| grp == inst.group) {
            let (pid, _) = self.waiters.remove(pos)?;
            trace!(?inst, pid = pid.0, "实例直接交给等待进程");
            return Some((pid, inst));
        }
        g.in_use.remove(&inst.id);
        g.available.insert(inst.id);
        trace!(?inst, "实例放回资源池");
        None
    }
}
