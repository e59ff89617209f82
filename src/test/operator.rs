use crate::factory::{ActivityId, ActivityKey, FailureCode, Needs, ProductIndex};
use crate::operator::{ActivityRequest, Dispatch, Operator, RetryPolicy, ScriptedOperator};
use crate::plan::ProductionPlan;
use crate::sim::SimTime;

fn request(p: usize, a: usize) -> ActivityRequest {
    ActivityRequest {
        key: ActivityKey::new(p, a),
        duration: SimTime(1),
        needs: Needs(vec![1]),
    }
}

#[test]
fn waits_until_release_then_sends_in_order() {
    let mut op = ScriptedOperator::new([
        (SimTime(5), request(0, 1)),
        (SimTime(2), request(0, 0)),
        (SimTime(5), request(1, 0)),
    ]);
    assert_eq!(op.send_next_activity(SimTime(0)), Dispatch::wait(SimTime(2)));
    assert_eq!(
        op.send_next_activity(SimTime(2)),
        Dispatch::send(request(0, 0), SimTime(3))
    );
    // 同一时刻按插入顺序
    assert_eq!(
        op.send_next_activity(SimTime(5)),
        Dispatch::send(request(0, 1), SimTime(0))
    );
    assert_eq!(
        op.send_next_activity(SimTime(5)),
        Dispatch::send(request(1, 0), SimTime(0)).and_finish()
    );
    assert_eq!(op.remaining(), 0);
    assert_eq!(op.send_next_activity(SimTime(6)), Dispatch::finish());
}

#[test]
fn late_tick_sends_overdue_release() {
    let mut op = ScriptedOperator::new([(SimTime(1), request(0, 0))]);
    let d = op.send_next_activity(SimTime(4));
    assert_eq!(d.request, Some(request(0, 0)));
    assert!(d.finished);
}

#[test]
fn from_plan_uses_plan_durations_and_needs() {
    let mut b = ProductionPlan::builder("op");
    b.resource("A", 3);
    let p = b.product("P", 10);
    b.activity(p, 0, 7, vec![3]);
    b.earliest_start(ActivityKey::new(p, 0), 2);
    let plan = b.build().expect("valid plan");

    let mut op = ScriptedOperator::from_plan(&plan);
    let d = op.send_next_activity(SimTime(2));
    assert_eq!(
        d.request,
        Some(ActivityRequest {
            key: ActivityKey::new(0, 0),
            duration: SimTime(7),
            needs: Needs(vec![3]),
        })
    );
}

#[test]
fn without_retry_failures_are_only_recorded() {
    let mut op = ScriptedOperator::new([(SimTime(0), request(0, 0))]);
    let _ = op.send_next_activity(SimTime(0));
    op.signal_failed_activity(ProductIndex(0), ActivityId(0), SimTime(0), FailureCode::Precedence);
    assert_eq!(
        op.failures(),
        [(ActivityKey::new(0, 0), SimTime(0), FailureCode::Precedence)]
    );
    assert_eq!(op.remaining(), 0);
}

#[test]
fn retry_requeues_until_attempts_run_out() {
    let mut op = ScriptedOperator::new([(SimTime(0), request(0, 0))]).with_retry(RetryPolicy {
        delay: SimTime(3),
        max_attempts: 2,
    });
    assert_eq!(
        op.send_next_activity(SimTime(0)),
        Dispatch::send(request(0, 0), SimTime(0))
    );
    op.signal_failed_activity(ProductIndex(0), ActivityId(0), SimTime(0), FailureCode::Availability);
    assert_eq!(op.remaining(), 1);
    assert_eq!(op.send_next_activity(SimTime(0)), Dispatch::wait(SimTime(3)));

    let d = op.send_next_activity(SimTime(3));
    assert_eq!(d.request, Some(request(0, 0)));
    assert!(!d.finished);
    op.signal_failed_activity(ProductIndex(0), ActivityId(0), SimTime(3), FailureCode::Availability);
    assert_eq!(op.remaining(), 0);
    assert_eq!(op.send_next_activity(SimTime(3)), Dispatch::finish());
    assert_eq!(op.failures().len(), 2);
}
