//! Dispatch policy boundary.
//!
//! The engine never decides what to run: every tick it asks the operator for
//! the next decision and reports every rejected dispatch back to it.

mod scripted;

pub use scripted::{RetryPolicy, ScriptedOperator};

use crate::factory::{ActivityId, ActivityKey, FailureCode, Needs, ProductIndex};
use crate::sim::SimTime;

/// One activity the operator wants to start now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRequest {
    pub key: ActivityKey,
    /// Already-sampled processing duration.
    pub duration: SimTime,
    pub needs: Needs,
}

/// Answer to `send_next_activity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub request: Option<ActivityRequest>,
    /// Time until the engine asks again.
    pub delay: SimTime,
    /// No further decisions; the dispatch loop stops after this one.
    pub finished: bool,
}

impl Dispatch {
    pub fn wait(delay: SimTime) -> Self {
        Self {
            request: None,
            delay,
            finished: false,
        }
    }

    pub fn send(request: ActivityRequest, delay: SimTime) -> Self {
        Self {
            request: Some(request),
            delay,
            finished: false,
        }
    }

    pub fn finish() -> Self {
        Self {
            request: None,
            delay: SimTime::ZERO,
            finished: true,
        }
    }

    pub fn and_finish(mut self) -> Self {
        self.finished = true;
        self
    }
}

/// Dispatch policy driven by the engine's dispatch loop.
///
/// Answering `Dispatch::wait(SimTime::ZERO)` asks again at the same instant
/// without letting time move. After [`MAX_IDLE_TICKS`] such answers in a row the
/// engine stops with [`SimError::DispatchStalled`].
///
/// [`MAX_IDLE_TICKS`]: crate::factory::MAX_IDLE_TICKS
/// [`SimError::DispatchStalled`]: crate::error::SimError::DispatchStalled
pub trait Operator {
    fn send_next_activity(&mut self, now: SimTime) -> Dispatch;

    fn signal_failed_activity(
        &mut self,
        product: ProductIndex,
        activity: ActivityId,
        now: SimTime,
        code: FailureCode,
    );
}

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn send_next_activity(&mut self, now: SimTime) -> Dispatch {
        (**self).send_next_activity(now)
    }

    fn signal_failed_activity(
        &mut self,
        product: ProductIndex,
        activity: ActivityId,
        now: SimTime,
        code: FailureCode,
    ) {
        (**self).signal_failed_activity(product, activity, now, code)
    }
}
