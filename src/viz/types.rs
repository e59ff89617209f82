use serde::{Deserialize, Serialize};

/// 可视化事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VizEventKind {
    /// 工厂/计划元信息（作为 t=0 的第一条事件）
    Meta {
        resources: Vec<VizResourceInfo>,
        products: Vec<VizProductInfo>,
    },
    /// 调度器派发了一个活动
    Dispatch { pid: usize, duration: u64 },
    /// 约束检查未通过
    Reject { code: String },
    /// 取得一个资源实例
    Acquire { group: usize, resource_id: usize },
    /// 资源不足，进程在资源池中挂起
    Park { group: usize },
    /// 开始加工
    Start,
    /// 加工结束
    End,
    /// 归还一个资源实例
    Release { group: usize, resource_id: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizResourceInfo {
    pub group: usize,
    pub name: String,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizProductInfo {
    pub index: usize,
    pub product_id: u64,
    pub name: String,
    pub deadline: u64,
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizEvent {
    /// 仿真时间（和 `SimTime.0` 同口径）
    pub t: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<usize>,
    #[serde(flatten)]
    pub kind: VizEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct VizLogger {
    pub events: Vec<VizEvent>,
}

impl VizLogger {
    pub fn push(&mut self, ev: VizEvent) {
        self.events.push(ev);
    }
}
