//! Schedule quality metrics.

use std::fmt;

use serde::Serialize;

use crate::factory::{ProductIndex, UsageRecord};
use crate::plan::ProductionPlan;
use crate::sim::SimTime;

/// `(makespan, total lateness, unfinished products)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleMetrics {
    /// Latest finish among completed activities; `None` when nothing completed.
    pub makespan: Option<SimTime>,
    /// Sum of `max(0, finish - deadline)` over finished products.
    pub total_lateness: u64,
    pub unfinished_products: usize,
}

impl ScheduleMetrics {
    pub fn compute(plan: &ProductionPlan, records: &[UsageRecord]) -> Self {
        let makespan = records.iter().filter_map(UsageRecord::finish).max();

        let mut total_lateness = 0u64;
        let mut unfinished_products = 0usize;
        for product in plan.products() {
            match product_finish(product.index, records) {
                ProductFinish::Unfinished => unfinished_products += 1,
                ProductFinish::At(finish) => {
                    total_lateness = total_lateness.saturating_add(finish.since(product.deadline));
                }
                ProductFinish::Empty => {}
            }
        }

        Self {
            makespan,
            total_lateness,
            unfinished_products,
        }
    }
}

enum ProductFinish {
    Empty,
    Unfinished,
    At(SimTime),
}

fn product_finish(index: ProductIndex, records: &[UsageRecord]) -> ProductFinish {
    let mut latest: Option<SimTime> = None;
    for r in records.iter().filter(|r| r.key.product == index) {
        let Some(f) = r.finish() else {
            return ProductFinish::Unfinished;
        };
        latest = Some(latest.map_or(f, |prev| prev.max(f)));
    }
    latest.map_or(ProductFinish::Empty, ProductFinish::At)
}

impl fmt::Display for ScheduleMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.makespan {
            Some(m) => write!(f, "makespan={m}")?,
            None => f.write_str("makespan=none (no activity completed)")?,
        }
        write!(
            f,
            " lateness={} unfinished_products={}",
            self.total_lateness, self.unfinished_products
        )
    }
}
