//! 演示和示例代码
//!
//! 两个产品、三类资源的最小生产计划。

use crate::error::SimError;
use crate::factory::ActivityKey;
use crate::plan::ProductionPlan;

/// 构建最小示例计划
///
/// 资源：Filter/Mixer/Dryer 各 1 台
/// 产品 0：活动 0（Filter，4）→ 活动 1（Mixer，5），最小时滞 1，交期 8
/// 产品 1：活动 0（Dryer，3）→ 活动 1（Mixer，6），最小时滞 1，交期 20
pub fn build_minimal_plan() -> Result<ProductionPlan, SimError> {
    let mut b = ProductionPlan::builder("ProductionPlanJanuary");
    b.resource("Filter", 1);
    b.resource("Mixer", 1);
    b.resource("Dryer", 1);

    let p0 = b.product("Enzyme_1", 8);
    b.activity(p0, 0, 4, vec![1, 0, 0])
        .activity(p0, 1, 5, vec![0, 1, 0])
        .relation(p0, 0, 1, 1, None);

    let p1 = b.product("Enzyme_2", 20);
    b.activity(p1, 0, 3, vec![0, 0, 1])
        .activity(p1, 1, 6, vec![0, 1, 0])
        .relation(p1, 0, 1, 1, None);

    // 产品 1 的活动 1 要等产品 0 占用的 Mixer 在 t=6 释放
    b.earliest_start(ActivityKey::new(p0, 0), 0)
        .earliest_start(ActivityKey::new(p1, 0), 0)
        .earliest_start(ActivityKey::new(p0, 1), 1)
        .earliest_start(ActivityKey::new(p1, 1), 6);

    b.build()
}
