//! 仿真时间类型
//!
//! 定义虚拟时钟。时间单位与生产计划中的加工时间、时滞一致（抽象单位）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 仿真时间（计划时间单位）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// 在当前时间之后推进 `d`（饱和加法）
    pub fn after(self, d: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(d.0))
    }

    /// 自 `earlier` 以来经过的时间；若 `earlier` 更晚则为 0。
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
