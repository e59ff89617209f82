//! 工厂仿真模块
//!
//! 此模块包含生产计划仿真的核心组件：资源池、活动日志、约束检查、活动进程与仿真引擎。

// 子模块声明
mod constraint;
mod dispatch;
mod engine;
mod id;
mod log;
mod needs;
mod pool;
mod process;
mod stats;
mod usage;
mod world;

// 重新导出公共接口
pub use constraint::{
    FailureCode, check, check_availability, check_compatibility, check_precedence,
};
pub use dispatch::{DispatchTick, MAX_IDLE_TICKS};
pub use engine::{AcquireMode, Engine, RunConfig, simulate};
pub use id::{ActivityId, ActivityKey, ProcessId, ProductIndex};
pub use log::{Action, ActivityLog, LogEntry};
pub use needs::Needs;
pub use pool::{Acquire, ResourceInstance, ResourcePool};
pub use process::{ActivityProcess, ProcessState, ResumeProcess};
pub use stats::{Rejection, Stats};
pub use usage::{CompletedUsage, UsageOutcome, UsageRecord};
pub use world::FactoryWorld;
