use crate::factory::{ActivityKey, CompletedUsage, Needs, UsageOutcome, UsageRecord};
use crate::plan::ProductionPlan;
use crate::report::ScheduleMetrics;
use crate::sim::SimTime;

fn plan() -> ProductionPlan {
    let mut b = ProductionPlan::builder("metrics");
    b.resource("A", 1);
    let p0 = b.product("P0", 10);
    b.activity(p0, 0, 1, vec![1]).activity(p0, 1, 1, vec![1]);
    let p1 = b.product("P1", 5);
    b.activity(p1, 0, 1, vec![1]);
    b.product("Empty", 0);
    b.build().expect("valid plan")
}

fn done(p: usize, a: usize, start: u64, finish: u64) -> UsageRecord {
    UsageRecord {
        key: ActivityKey::new(p, a),
        outcome: UsageOutcome::Completed(CompletedUsage {
            needs: Needs(vec![1]),
            resources: Vec::new(),
            request: SimTime(start),
            retrieve: SimTime(start),
            start: SimTime(start),
            finish: SimTime(finish),
        }),
    }
}

fn pending(p: usize, a: usize) -> UsageRecord {
    UsageRecord::sentinel(ActivityKey::new(p, a))
}

#[test]
fn nothing_completed_has_no_makespan() {
    let m = ScheduleMetrics::compute(&plan(), &[pending(0, 0), pending(0, 1), pending(1, 0)]);
    assert_eq!(m.makespan, None);
    assert_eq!(m.total_lateness, 0);
    assert_eq!(m.unfinished_products, 2);
    assert_eq!(
        m.to_string(),
        "makespan=none (no activity completed) lateness=0 unfinished_products=2"
    );
}

#[test]
fn lateness_uses_latest_finish_per_product() {
    let records = [done(0, 0, 0, 4), done(0, 1, 4, 13), done(1, 0, 0, 5)];
    let m = ScheduleMetrics::compute(&plan(), &records);
    assert_eq!(m.makespan, Some(SimTime(13)));
    // P0 晚 3，P1 恰好按期
    assert_eq!(m.total_lateness, 3);
    assert_eq!(m.unfinished_products, 0);
    assert_eq!(m.to_string(), "makespan=13 lateness=3 unfinished_products=0");
}

#[test]
fn unfinished_product_contributes_no_lateness() {
    let records = [done(0, 0, 0, 40), pending(0, 1), done(1, 0, 0, 7)];
    let m = ScheduleMetrics::compute(&plan(), &records);
    assert_eq!(m.makespan, Some(SimTime(40)));
    assert_eq!(m.total_lateness, 2);
    assert_eq!(m.unfinished_products, 1);
}
