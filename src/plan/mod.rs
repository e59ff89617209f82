//! 生产计划
//!
//! JSON 计划格式（`spec`）与校验后的只读模型（`model`）。

mod model;
mod spec;

pub use model::{
    EarliestStart, PlanBuilder, PlannedActivity, PlannedProduct, Predecessor, ProductionPlan,
    TemporalRelation,
};
pub use spec::{
    ActivityRefSpec, ActivitySpec, EarliestStartSpec, FactorySpec, PLAN_SCHEMA_VERSION, PlanSpec,
    ProductSpec, TemporalRelationSpec,
};
