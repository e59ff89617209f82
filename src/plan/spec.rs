//! On-disk plan format (JSON).
//!
//! Products form a catalog keyed by `id`; `product_ids` instantiates the plan
//! (position = product index) and `deadlines` runs parallel to it.

use serde::{Deserialize, Serialize};

use crate::factory::Needs;

pub const PLAN_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub factory: FactorySpec,
    pub products: Vec<ProductSpec>,
    pub product_ids: Vec<u64>,
    pub deadlines: Vec<u64>,
    #[serde(default)]
    pub earliest_start: Vec<EarliestStartSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorySpec {
    #[serde(default)]
    pub name: Option<String>,
    pub resource_names: Vec<String>,
    pub capacity: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSpec {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub activities: Vec<ActivitySpec>,
    #[serde(default)]
    pub temporal_relations: Vec<TemporalRelationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySpec {
    pub id: usize,
    pub processing_time: u64,
    pub needs: Needs,
    /// Activities (by catalog product id) that must not run concurrently with this one.
    #[serde(default)]
    pub incompatible_with: Vec<ActivityRefSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRefSpec {
    pub product_id: u64,
    pub activity_id: usize,
}

/// Start-to-start relation: `min_lag <= start(successor) - start(predecessor) <= max_lag`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalRelationSpec {
    pub predecessor: usize,
    pub successor: usize,
    #[serde(default)]
    pub min_lag: u64,
    #[serde(default)]
    pub max_lag: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarliestStartSpec {
    pub product_index: usize,
    pub activity_id: usize,
    pub earliest_start: u64,
}
