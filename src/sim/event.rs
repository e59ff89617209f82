//! 事件与世界
//!
//! 仿真器只认识这两个 trait：事件被调度、执行时拿到仿真器与世界；世界由业务层实现。

use super::simulator::Simulator;
use std::any::Any;

/// 事件：可被调度执行。使用 `self: Box<Self>` 以支持 move/所有权转移。
///
/// 一个事件的执行不会被其它事件打断，因此世界中的共享状态无需加锁。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}

/// 仿真世界：持有一次运行的全部可变状态（工厂资源池、活动日志等）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每执行完一个事件后调用，可用于采样状态。
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}

/// 把 `dyn World` 还原为具体的世界类型；类型不符时返回 `None`。
pub fn world_mut<W: World>(world: &mut dyn World) -> Option<&mut W> {
    world.as_any_mut().downcast_mut::<W>()
}
