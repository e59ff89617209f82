//! 约束检查
//!
//! 判断一个活动此刻能否开始。按固定优先级依次检查：可用性、前驱（含最小/最大时滞）、互斥；
//! 返回第一个不满足的检查对应的失败码。纯函数：只读资源池与日志，不做任何修改。

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::id::ActivityKey;
use super::log::ActivityLog;
use super::needs::Needs;
use super::pool::ResourcePool;
use crate::plan::PlannedActivity;
use crate::sim::SimTime;

/// 活动无法开始的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
    Availability,
    Precedence,
    MinLag,
    MaxLag,
    Compatibility,
}

impl FailureCode {
    pub const ALL: [FailureCode; 5] = [
        FailureCode::Availability,
        FailureCode::Precedence,
        FailureCode::MinLag,
        FailureCode::MaxLag,
        FailureCode::Compatibility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FailureCode::Availability => "AVAILABILITY",
            FailureCode::Precedence => "PRECEDENCE",
            FailureCode::MinLag => "MIN_LAG",
            FailureCode::MaxLag => "MAX_LAG",
            FailureCode::Compatibility => "COMPATIBILITY",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 完整检查。`needs` 取派发请求中的需求向量，前驱与互斥取自计划。
pub fn check(
    pool: &ResourcePool,
    log: &ActivityLog,
    key: ActivityKey,
    activity: &PlannedActivity,
    needs: &Needs,
    now: SimTime,
) -> Option<FailureCode> {
    let code = check_availability(pool, needs)
        .or_else(|| check_precedence(log, key, activity, now))
        .or_else(|| check_compatibility(log, activity));
    trace!(%key, ?now, ?code, "约束检查完成");
    code
}

/// 每个需求非零的资源组，空闲实例数都必须不少于需求
pub fn check_availability(pool: &ResourcePool, needs: &Needs) -> Option<FailureCode> {
    needs
        .demanded()
        .any(|(group, n)| pool.available(group) < n as usize)
        .then_some(FailureCode::Availability)
}

/// 按声明顺序检查前驱。
///
/// 前驱尚未开始（`Precedence`）或超过最大时滞（`MaxLag`）立即返回；
/// 未达到最小时滞只记下 `MinLag` 并继续扫描后续前驱，扫描结束后仍拒绝该活动。
pub fn check_precedence(
    log: &ActivityLog,
    key: ActivityKey,
    activity: &PlannedActivity,
    now: SimTime,
) -> Option<FailureCode> {
    let mut min_lag_violated = false;
    for pred in &activity.predecessors {
        let pred_key = ActivityKey {
            product: key.product,
            activity: pred.activity,
        };
        let Some(pred_start) = log.latest_start(pred_key) else {
            return Some(FailureCode::Precedence);
        };
        let elapsed = now.since(pred_start);
        if elapsed < pred.relation.min_lag {
            min_lag_violated = true;
        } else if pred.relation.max_lag.is_some_and(|max| elapsed > max) {
            return Some(FailureCode::MaxLag);
        }
    }
    min_lag_violated.then_some(FailureCode::MinLag)
}

/// 声明互斥的活动当前处于活跃状态则不能开始
pub fn check_compatibility(log: &ActivityLog, activity: &PlannedActivity) -> Option<FailureCode> {
    activity
        .incompatible_with
        .iter()
        .any(|&other| log.is_active(other))
        .then_some(FailureCode::Compatibility)
}
