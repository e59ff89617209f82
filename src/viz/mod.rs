//! 可视化事件记录（用于离线回放/甘特图）
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **轻量**：只在内存里收集，仿真结束后一次性写文件
//! - **可回放**：每条事件带仿真时间，按发生顺序排列

mod types;

pub use types::{VizEvent, VizEventKind, VizLogger, VizProductInfo, VizResourceInfo};
