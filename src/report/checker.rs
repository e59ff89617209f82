//! Post-run schedule checker.
//!
//! Re-verifies completed activities against the plan: start-to-start lags on
//! every temporal relation whose two ends completed, and disjoint
//! `[start, finish)` intervals for every incompatible pair.

use std::collections::HashMap;
use std::fmt;

use crate::factory::{ActivityKey, CompletedUsage, UsageRecord};
use crate::plan::ProductionPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    MinLag {
        predecessor: ActivityKey,
        successor: ActivityKey,
        observed: i128,
        min_lag: u64,
    },
    MaxLag {
        predecessor: ActivityKey,
        successor: ActivityKey,
        observed: i128,
        max_lag: u64,
    },
    Overlap {
        a: ActivityKey,
        b: ActivityKey,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MinLag {
                predecessor,
                successor,
                observed,
                min_lag,
            } => write!(
                f,
                "{successor} started {observed} after {predecessor}, min lag is {min_lag}"
            ),
            Violation::MaxLag {
                predecessor,
                successor,
                observed,
                max_lag,
            } => write!(
                f,
                "{successor} started {observed} after {predecessor}, max lag is {max_lag}"
            ),
            Violation::Overlap { a, b } => write!(f, "incompatible {a} and {b} overlap"),
        }
    }
}

pub fn check_schedule(plan: &ProductionPlan, records: &[UsageRecord]) -> Vec<Violation> {
    let done: HashMap<ActivityKey, &CompletedUsage> = records
        .iter()
        .filter_map(|r| Some((r.key, r.completed()?)))
        .collect();

    let mut out = Vec::new();
    for record in records {
        let Some(usage) = record.completed() else {
            continue;
        };
        let Some(activity) = plan.activity(record.key) else {
            continue;
        };

        for pred in &activity.predecessors {
            let pred_key = ActivityKey {
                product: record.key.product,
                activity: pred.activity,
            };
            let Some(pred_usage) = done.get(&pred_key) else {
                continue;
            };
            let observed = i128::from(usage.start.0) - i128::from(pred_usage.start.0);
            if observed < i128::from(pred.relation.min_lag) {
                out.push(Violation::MinLag {
                    predecessor: pred_key,
                    successor: record.key,
                    observed,
                    min_lag: pred.relation.min_lag,
                });
            }
            if let Some(max_lag) = pred.relation.max_lag.filter(|&m| observed > i128::from(m)) {
                out.push(Violation::MaxLag {
                    predecessor: pred_key,
                    successor: record.key,
                    observed,
                    max_lag,
                });
            }
        }

        for &other in &activity.incompatible_with {
            // each unordered pair once
            if other <= record.key {
                continue;
            }
            let Some(o) = done.get(&other) else {
                continue;
            };
            if usage.start < o.finish && o.start < usage.finish {
                out.push(Violation::Overlap {
                    a: record.key,
                    b: other,
                });
            }
        }
    }
    out
}
