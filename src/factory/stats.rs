//! 统计信息
//!
//! 定义工厂仿真运行期间累计的计数。

use std::collections::BTreeMap;

use super::constraint::FailureCode;
use super::id::ActivityKey;
use crate::sim::SimTime;

/// 一次被拒绝的派发
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub key: ActivityKey,
    pub at: SimTime,
    pub code: FailureCode,
}

/// 工厂统计信息
#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub dispatched: u64,
    pub completed: u64,
    /// 被约束检查拒绝的次数
    pub clashes: u64,
    pub clashes_by_code: BTreeMap<FailureCode, u64>,
    /// 进程在资源池中挂起等待的次数（仅延迟获取模式下可能非零）
    pub parked: u64,
    /// 每个资源组在任一事件之后观察到的最大占用数
    pub peak_in_use: Vec<usize>,
}

impl Stats {
    pub(crate) fn count_clash(&mut self, code: FailureCode) {
        self.clashes += 1;
        *self.clashes_by_code.entry(code).or_insert(0) += 1;
    }
}
