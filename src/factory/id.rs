//! 标识符类型
//!
//! 定义产品下标、活动 id、活动键与活动进程 id。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 产品在生产计划中的下标（同一种产品可在计划中出现多次）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductIndex(pub usize);

/// 活动在所属产品内的 id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub usize);

/// (产品下标, 活动 id)：日志、活跃集合与使用记录的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivityKey {
    pub product: ProductIndex,
    pub activity: ActivityId,
}

impl ActivityKey {
    pub fn new(product: usize, activity: usize) -> Self {
        Self {
            product: ProductIndex(product),
            activity: ActivityId(activity),
        }
    }
}

/// 活动进程标识符（每次派发一个）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProductIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.product, self.activity)
    }
}
