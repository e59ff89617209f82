//! Run results: usage records, summary metrics, counters and the optional
//! viz event stream.

mod checker;
mod metrics;
mod table;

pub use checker::{Violation, check_schedule};
pub use metrics::ScheduleMetrics;
pub use table::{NOT_PROCESSED, UsageRow, render_table};

use crate::factory::{FactoryWorld, Rejection, Stats, UsageRecord};
use crate::sim::{SimTime, Simulator};
use crate::viz::VizLogger;

#[derive(Debug)]
pub struct RunReport {
    pub metrics: ScheduleMetrics,
    /// One per planned activity, in plan order.
    pub records: Vec<UsageRecord>,
    pub rejections: Vec<Rejection>,
    pub stats: Stats,
    pub resource_names: Vec<String>,
    /// Events executed by the simulator.
    pub events: u64,
    pub end_time: SimTime,
    /// Processes still acquiring or running when the horizon was reached.
    pub in_flight: usize,
    pub seed: u64,
    pub viz: Option<VizLogger>,
}

impl RunReport {
    pub(crate) fn collect(world: &mut FactoryWorld, sim: &Simulator) -> Self {
        let records = world.usage().to_vec();
        Self {
            metrics: ScheduleMetrics::compute(world.plan(), &records),
            records,
            rejections: world.rejections().to_vec(),
            stats: world.stats().clone(),
            resource_names: world.plan().resource_names().to_vec(),
            events: sim.executed(),
            end_time: sim.now(),
            in_flight: world.in_flight(),
            seed: world.config().seed,
            viz: world.take_viz(),
        }
    }

    pub fn clashes(&self) -> u64 {
        self.stats.clashes
    }

    pub fn rows(&self) -> Vec<UsageRow> {
        self.records
            .iter()
            .map(|r| UsageRow::from_record(r, &self.resource_names))
            .collect()
    }

    /// Usage table as pretty JSON; identical runs produce identical bytes.
    pub fn usage_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows())
    }
}
