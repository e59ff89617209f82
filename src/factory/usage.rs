//! 资源使用记录
//!
//! 每个计划活动在仿真开始前都有一条占位记录（未处理）；只有活动成功完成时才整体覆盖为完整记录，
//! 因此外部不会观察到只填了一半的记录。

use super::id::ActivityKey;
use super::needs::Needs;
use super::pool::ResourceInstance;
use crate::sim::SimTime;

/// 一次成功完成的活动执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedUsage {
    pub needs: Needs,
    pub resources: Vec<ResourceInstance>,
    pub request: SimTime,
    pub retrieve: SimTime,
    pub start: SimTime,
    pub finish: SimTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageOutcome {
    /// 占位：被拒绝、从未派发，或在仿真截止时仍未完成（时间戳视为 +inf）
    NotProcessed,
    Completed(CompletedUsage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub key: ActivityKey,
    pub outcome: UsageOutcome,
}

impl UsageRecord {
    pub fn sentinel(key: ActivityKey) -> Self {
        Self {
            key,
            outcome: UsageOutcome::NotProcessed,
        }
    }

    pub fn completed(&self) -> Option<&CompletedUsage> {
        match &self.outcome {
            UsageOutcome::Completed(c) => Some(c),
            UsageOutcome::NotProcessed => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.completed().is_some()
    }

    pub fn start(&self) -> Option<SimTime> {
        self.completed().map(|c| c.start)
    }

    pub fn finish(&self) -> Option<SimTime> {
        self.completed().map(|c| c.finish)
    }
}
