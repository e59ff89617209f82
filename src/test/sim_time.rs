use crate::sim::SimTime;

#[test]
fn sim_time_after_and_since() {
    assert_eq!(SimTime(3).after(SimTime(4)), SimTime(7));
    assert_eq!(SimTime(9).since(SimTime(4)), 5);
    assert_eq!(SimTime(4).since(SimTime(9)), 0);
}

#[test]
fn sim_time_after_saturates_on_overflow() {
    assert_eq!(SimTime::MAX.after(SimTime(1)), SimTime::MAX);
    assert_eq!(SimTime(u64::MAX - 1).after(SimTime(5)), SimTime::MAX);
}

#[test]
fn sim_time_displays_raw_units() {
    assert_eq!(SimTime(42).to_string(), "42");
    assert_eq!(serde_json::to_string(&SimTime(42)).expect("serialize"), "42");
}
