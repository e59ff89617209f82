//! 派发循环事件
//!
//! 每次执行向调度器要一个决策：需要时派生活动进程（不等待它），然后在 `delay` 之后再次询问，
//! 直到调度器宣告结束。

use tracing::{debug, error, info};

use super::world::FactoryWorld;
use crate::error::SimError;
use crate::sim::{Event, SimTime, Simulator, World, world_mut};

/// 同一时刻连续“不派发、零延迟再问”的次数上限，超过即视为调度器卡死
pub const MAX_IDLE_TICKS: u32 = 10_000;

/// 事件：询问调度器下一步
#[derive(Debug, Default)]
pub struct DispatchTick;

impl Event for DispatchTick {
    #[tracing::instrument(skip(self, sim, world), fields(now = ?sim.now()))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let Some(w) = world_mut::<FactoryWorld>(world) else {
            error!("世界类型不是 FactoryWorld，派发循环停止");
            return;
        };
        let now = sim.now();
        let decision = w.next_decision(now);
        debug!(
            dispatch = decision.request.is_some(),
            delay = ?decision.delay,
            finished = decision.finished,
            "调度器决策"
        );

        let dispatched = decision.request.is_some();
        if let Some(request) = decision.request {
            if let Err(err) = w.spawn(request, sim) {
                w.fail(err, sim);
                return;
            }
        }

        if decision.finished {
            info!(?now, "🏁 调度器结束派发");
            w.finish_dispatch(now);
            return;
        }
        if !dispatched && decision.delay == SimTime::ZERO {
            let ticks = w.note_idle_tick();
            if ticks >= MAX_IDLE_TICKS {
                w.fail(SimError::DispatchStalled { at: now.0, ticks }, sim);
                return;
            }
        } else {
            w.reset_idle_ticks();
        }
        sim.schedule(now.after(decision.delay), DispatchTick);
    }
}
