//! 仿真核心模块
//!
//! 此模块包含离散事件仿真的核心组件：仿真时间、事件与世界、仿真器。

// 子模块声明
mod event;
mod scheduled_event;
mod simulator;
mod time;

// 重新导出公共接口
pub use event::{Event, World, world_mut};
pub use scheduled_event::{Priority, ScheduledEvent};
pub use simulator::Simulator;
pub use time::SimTime;
