//! 资源需求向量

use serde::{Deserialize, Serialize};
use std::fmt;

/// 每个资源组需要的实例数，顺序与工厂的资源组一致。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Needs(pub Vec<u32>);

impl Needs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 需求非零的 (资源组, 数量)
    pub fn demanded(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, n)| n > 0)
    }

    /// 逐个实例展开的资源组序列，例如 `[2, 0, 1]` -> `[0, 0, 2]`
    pub fn units(&self) -> impl Iterator<Item = usize> + '_ {
        self.demanded()
            .flat_map(|(group, n)| std::iter::repeat_n(group, n as usize))
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&n| n as u64).sum()
    }
}

impl From<Vec<u32>> for Needs {
    fn from(v: Vec<u32>) -> Self {
        Needs(v)
    }
}

impl fmt::Display for Needs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
