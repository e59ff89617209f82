//! Release-list operator.
//!
//! Dispatches a fixed list of requests, each no earlier than its release time,
//! in release-time order (ties keep insertion order). Built from the plan's
//! earliest-start list by default. Optionally resubmits rejected activities.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info};

use super::{ActivityRequest, Dispatch, Operator};
use crate::factory::{ActivityId, ActivityKey, FailureCode, ProductIndex};
use crate::plan::ProductionPlan;
use crate::sim::SimTime;

/// Resubmit a rejected activity `delay` after the rejection, at most
/// `max_attempts` dispatches per activity in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: SimTime,
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
struct Release {
    at: SimTime,
    request: ActivityRequest,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedOperator {
    queue: VecDeque<Release>,
    retry: Option<RetryPolicy>,
    attempts: HashMap<ActivityKey, u32>,
    sent: HashMap<ActivityKey, ActivityRequest>,
    failures: Vec<(ActivityKey, SimTime, FailureCode)>,
}

impl ScriptedOperator {
    pub fn new(releases: impl IntoIterator<Item = (SimTime, ActivityRequest)>) -> Self {
        let mut op = Self::default();
        for (at, request) in releases {
            op.insert(at, request);
        }
        op
    }

    /// Earliest-start list of the plan, with the plan's processing times and needs.
    pub fn from_plan(plan: &ProductionPlan) -> Self {
        let releases = plan.earliest_start().iter().filter_map(|es| {
            let a = plan.activity(es.key)?;
            Some((
                es.at,
                ActivityRequest {
                    key: es.key,
                    duration: a.processing_time,
                    needs: a.needs.clone(),
                },
            ))
        });
        Self::new(releases)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Rejections reported by the engine, in arrival order.
    pub fn failures(&self) -> &[(ActivityKey, SimTime, FailureCode)] {
        &self.failures
    }

    fn insert(&mut self, at: SimTime, request: ActivityRequest) {
        // after every entry with the same release time
        let pos = self.queue.partition_point(|r| r.at <= at);
        self.queue.insert(pos, Release { at, request });
    }
}

impl Operator for ScriptedOperator {
    fn send_next_activity(&mut self, now: SimTime) -> Dispatch {
        let Some(front) = self.queue.front() else {
            return Dispatch::finish();
        };
        if front.at > now {
            return Dispatch::wait(SimTime(front.at.since(now)));
        }
        let Some(Release { request, .. }) = self.queue.pop_front() else {
            return Dispatch::finish();
        };
        *self.attempts.entry(request.key).or_insert(0) += 1;
        self.sent.insert(request.key, request.clone());
        debug!(key = %request.key, ?now, "派发活动");

        // a rejection of this request is reported before the next tick at the
        // same timestamp; with retries on, re-plan the wait after it
        if self.retry.is_some() {
            return Dispatch::send(request, SimTime::ZERO);
        }
        match self.queue.front() {
            Some(next) => Dispatch::send(request, SimTime(next.at.since(now))),
            None => Dispatch::send(request, SimTime::ZERO).and_finish(),
        }
    }

    fn signal_failed_activity(
        &mut self,
        product: ProductIndex,
        activity: ActivityId,
        now: SimTime,
        code: FailureCode,
    ) {
        let key = ActivityKey { product, activity };
        self.failures.push((key, now, code));
        let Some(retry) = self.retry else { return };
        let attempts = self.attempts.get(&key).copied().unwrap_or(0);
        if attempts >= retry.max_attempts {
            info!(%key, attempts, %code, "放弃重试");
            return;
        }
        if let Some(request) = self.sent.get(&key).cloned() {
            debug!(%key, %code, retry_at = ?now.after(retry.delay), "安排重试");
            self.insert(now.after(retry.delay), request);
        }
    }
}
